use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum WorkerState {
	Starting,
	Running { pid: u32 },
	Crashed { exit_code: i32, restarts: u32 },
	Stopping,
	Stopped,
}

impl WorkerState {
	pub fn is_running(&self) -> bool {
		matches!(self, WorkerState::Running { .. })
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerStatus {
	pub state: WorkerState,
	pub pid: Option<u32>,
	pub restarts: u32,
}
