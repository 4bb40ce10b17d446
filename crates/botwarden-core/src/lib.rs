pub mod config;
pub mod error;
pub mod types;

pub use config::{GatewayConfig, GlobalConfig, RegistrationConfig, WorkerConfig};
pub use error::{ConfigError, WorkerError};
pub use types::{WorkerState, WorkerStatus};
