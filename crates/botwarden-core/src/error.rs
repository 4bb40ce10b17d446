use std::io;
use thiserror::Error;

/// Failures around the supervised worker process. Spawn and write errors
/// feed the crash/restart cycle; only `NoWorker` reaches external callers
/// as a delivery failure.
#[derive(Debug, Error)]
pub enum WorkerError {
	#[error("failed to spawn worker: {0}")]
	Spawn(#[source] io::Error),
	#[error("worker input closed")]
	ClosedPipe,
	#[error("failed to write to worker: {0}")]
	Write(#[source] io::Error),
	#[error("no worker available")]
	NoWorker,
}

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("failed to read {path}: {source}")]
	Io {
		path: String,
		#[source]
		source: io::Error,
	},
	#[error("failed to parse {path}: {source}")]
	Parse {
		path: String,
		#[source]
		source: toml::de::Error,
	},
	#[error("worker.command is missing in {path}")]
	MissingCommand { path: String },
}
