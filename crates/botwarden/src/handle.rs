use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};

use botwarden_core::config::WorkerConfig;
use botwarden_core::error::WorkerError;

/// One spawned worker instance. Owns the child for waiting and
/// termination; the writable stdin half lives in [`WorkerInput`] so the
/// supervisor can hand it to delivery while this handle waits for exit.
pub struct WorkerHandle {
	child: Child,
	pid: u32,
}

pub struct WorkerInput {
	stdin: ChildStdin,
}

impl WorkerHandle {
	pub fn spawn(config: &WorkerConfig) -> Result<(WorkerHandle, WorkerInput), WorkerError> {
		let mut cmd = Command::new(&config.command);
		cmd.args(&config.args)
			.stdin(Stdio::piped())
			.stdout(Stdio::piped())
			.stderr(Stdio::piped())
			// Own process group so the whole worker tree can be signalled
			.process_group(0);

		for (key, val) in &config.env {
			cmd.env(key, val);
		}

		let mut child = cmd.spawn().map_err(WorkerError::Spawn)?;
		let pid = child.id().unwrap_or(0);
		let stdin = child.stdin.take().ok_or(WorkerError::ClosedPipe)?;

		Ok((WorkerHandle { child, pid }, WorkerInput { stdin }))
	}

	pub fn pid(&self) -> u32 {
		self.pid
	}

	pub fn take_stdout(&mut self) -> Option<ChildStdout> {
		self.child.stdout.take()
	}

	pub fn take_stderr(&mut self) -> Option<ChildStderr> {
		self.child.stderr.take()
	}

	/// Resolves once the worker exits, with its exit code (-1 when killed
	/// by a signal or unobservable).
	pub async fn wait(&mut self) -> i32 {
		match self.child.wait().await {
			Ok(status) => status.code().unwrap_or(-1),
			Err(_) => -1,
		}
	}

	/// Best-effort SIGTERM to the worker's process group. Idempotent.
	pub fn terminate(&self) {
		use nix::sys::signal::{killpg, Signal};
		use nix::unistd::Pid;
		let _ = killpg(Pid::from_raw(self.pid as i32), Signal::SIGTERM);
	}

	/// SIGKILL the process group and reap the child.
	pub async fn kill(&mut self) {
		use nix::sys::signal::{killpg, Signal};
		use nix::unistd::Pid;
		let _ = killpg(Pid::from_raw(self.pid as i32), Signal::SIGKILL);
		let _ = self.child.wait().await;
	}
}

impl WorkerInput {
	/// Writes one event as a single newline-terminated payload. A broken
	/// pipe is reported as `ClosedPipe`, never raised.
	pub async fn write_event(&mut self, payload: &[u8]) -> Result<(), WorkerError> {
		let mut buf = Vec::with_capacity(payload.len() + 1);
		buf.extend_from_slice(payload);
		buf.push(b'\n');

		match self.stdin.write_all(&buf).await {
			Ok(()) => self.stdin.flush().await.map_err(map_write_err),
			Err(e) => Err(map_write_err(e)),
		}
	}
}

fn map_write_err(e: std::io::Error) -> WorkerError {
	if e.kind() == std::io::ErrorKind::BrokenPipe {
		WorkerError::ClosedPipe
	} else {
		WorkerError::Write(e)
	}
}
