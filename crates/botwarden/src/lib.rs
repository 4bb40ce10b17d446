//! # botwarden
//!
//! Keeps a single webhook worker process alive and relays inbound events to
//! it over stdin.
//!
//! The supervisor spawns the configured worker, restarts it after a crash
//! (fixed delay, no backoff), and writes each delivered event as one
//! newline-terminated payload to the worker's stdin. An axum front end
//! accepts webhook posts and exposes liveness and status probes; a shutdown
//! coordinator turns SIGTERM into an orderly stop of worker and listener.

pub mod api;
pub mod handle;
pub mod output;
pub mod registration;
pub mod shutdown;
pub mod supervisor;

pub use handle::{WorkerHandle, WorkerInput};
pub use output::OutputCapture;
pub use supervisor::Supervisor;
