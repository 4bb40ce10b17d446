use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::error::ConfigError;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct GlobalConfig {
	#[serde(default)]
	pub gateway: GatewayConfig,
	#[serde(default)]
	pub worker: WorkerConfig,
	#[serde(default)]
	pub registration: Option<RegistrationConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
	#[serde(default = "default_port")]
	pub port: u16,
	pub path_secret: Option<String>,
}

impl Default for GatewayConfig {
	fn default() -> Self {
		Self {
			port: default_port(),
			path_secret: None,
		}
	}
}

fn default_port() -> u16 {
	8080
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
	#[serde(default)]
	pub command: String,
	#[serde(default)]
	pub args: Vec<String>,
	#[serde(default = "default_restart_delay")]
	pub restart_delay_secs: u64,
	#[serde(default = "default_stop_timeout")]
	pub stop_timeout_secs: u64,
	#[serde(default)]
	pub env: HashMap<String, String>,
}

impl Default for WorkerConfig {
	fn default() -> Self {
		Self {
			command: String::new(),
			args: Vec::new(),
			restart_delay_secs: default_restart_delay(),
			stop_timeout_secs: default_stop_timeout(),
			env: HashMap::new(),
		}
	}
}

fn default_restart_delay() -> u64 {
	5
}

fn default_stop_timeout() -> u64 {
	10
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationConfig {
	pub endpoint: String,
	pub public_url: String,
}

pub fn load(path: &Path) -> Result<GlobalConfig, ConfigError> {
	let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
		path: path.display().to_string(),
		source: e,
	})?;
	let mut config: GlobalConfig = toml::from_str(&content).map_err(|e| ConfigError::Parse {
		path: path.display().to_string(),
		source: e,
	})?;

	if config.worker.command.is_empty() {
		return Err(ConfigError::MissingCommand {
			path: path.display().to_string(),
		});
	}

	// PORT from the environment wins over the file
	if let Ok(port) = std::env::var("PORT") {
		if let Ok(port) = port.parse() {
			config.gateway.port = port;
		}
	}

	Ok(config)
}
