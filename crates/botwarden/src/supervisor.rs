use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};

use botwarden_core::config::WorkerConfig;
use botwarden_core::error::WorkerError;
use botwarden_core::types::{WorkerState, WorkerStatus};

use crate::handle::{WorkerHandle, WorkerInput};
use crate::output::{pipe_worker_output, OutputCapture, WorkerStream};

/// Keeps one worker process alive and serializes event delivery to it.
///
/// The input slot mutex is the single writer lock: concurrent `deliver`
/// calls are serialized through it, and the run loop clears the slot before
/// tearing a handle down, so a delivery can never race a restart.
pub struct Supervisor {
	config: WorkerConfig,
	input: Mutex<Option<WorkerInput>>,
	shared: Mutex<Shared>,
	state: watch::Sender<WorkerState>,
	cancel: watch::Sender<bool>,
	output: OutputCapture,
}

struct Shared {
	restarts: u32,
	shutting_down: bool,
}

impl Supervisor {
	/// Creates the supervisor and spawns its run loop. The first worker
	/// spawn happens on that task, not in the caller.
	pub fn start(config: WorkerConfig) -> Arc<Self> {
		let (state_tx, _) = watch::channel(WorkerState::Starting);
		let (cancel_tx, cancel_rx) = watch::channel(false);

		let sup = Arc::new(Self {
			config,
			input: Mutex::new(None),
			shared: Mutex::new(Shared {
				restarts: 0,
				shutting_down: false,
			}),
			state: state_tx,
			cancel: cancel_tx,
			output: OutputCapture::new(),
		});

		let loop_sup = Arc::clone(&sup);
		tokio::spawn(async move {
			run_worker_loop(loop_sup, cancel_rx).await;
		});

		sup
	}

	/// Writes one event to the live worker's stdin, newline-terminated.
	/// At-most-once: no queueing, no retry. Fails fast with `NoWorker`
	/// when no writable worker exists.
	pub async fn deliver(&self, payload: &[u8]) -> Result<(), WorkerError> {
		let mut slot = self.input.lock().await;
		let input = slot.as_mut().ok_or(WorkerError::NoWorker)?;
		match input.write_event(payload).await {
			Ok(()) => Ok(()),
			Err(e) => {
				// Pipe is dead; drop it so later calls fail fast while
				// the run loop reaps the exit and respawns.
				*slot = None;
				Err(e)
			}
		}
	}

	pub fn state(&self) -> WorkerState {
		self.state.borrow().clone()
	}

	pub async fn status(&self) -> WorkerStatus {
		let state = self.state();
		let pid = match &state {
			WorkerState::Running { pid } => Some(*pid),
			_ => None,
		};
		let restarts = self.shared.lock().await.restarts;
		WorkerStatus { state, pid, restarts }
	}

	pub fn output(&self) -> &OutputCapture {
		&self.output
	}

	/// Stops the worker and the run loop. Idempotent: the first call drives
	/// the shutdown, later calls return once it is underway. Any pending
	/// restart timer is cancelled. The wait for a stopped worker is
	/// bounded; on expiry the loop falls back to SIGKILL and this returns
	/// regardless.
	pub async fn stop(&self) {
		{
			let mut shared = self.shared.lock().await;
			if shared.shutting_down {
				return;
			}
			shared.shutting_down = true;
		}

		let _ = self.cancel.send(true);

		// SIGTERM grace plus a margin for the SIGKILL fallback
		let timeout = Duration::from_secs(self.config.stop_timeout_secs + 2);
		let mut state_rx = self.state.subscribe();
		let stopped = tokio::time::timeout(
			timeout,
			state_rx.wait_for(|s| *s == WorkerState::Stopped),
		)
		.await;
		if stopped.is_err() {
			tracing::warn!(
				"worker did not stop within {}s, proceeding",
				self.config.stop_timeout_secs
			);
		}
	}

	async fn bump_restarts(&self) -> u32 {
		let mut shared = self.shared.lock().await;
		shared.restarts += 1;
		shared.restarts
	}
}

async fn run_worker_loop(sup: Arc<Supervisor>, mut cancel: watch::Receiver<bool>) {
	let delay = Duration::from_secs(sup.config.restart_delay_secs);

	loop {
		if *cancel.borrow() {
			break;
		}

		sup.state.send_replace(WorkerState::Starting);

		let (mut handle, input) = match WorkerHandle::spawn(&sup.config) {
			Ok(pair) => pair,
			Err(e) => {
				// A failed spawn is handled like a crash: retry after the
				// delay instead of giving up.
				tracing::error!("failed to spawn worker: {}", e);
				let restarts = sup.bump_restarts().await;
				sup.state.send_replace(WorkerState::Crashed {
					exit_code: -1,
					restarts,
				});
				tokio::select! {
					_ = tokio::time::sleep(delay) => continue,
					_ = cancel.changed() => break,
				}
			}
		};

		if let Some(stdout) = handle.take_stdout() {
			let capture = sup.output.clone();
			tokio::spawn(async move {
				pipe_worker_output(stdout, WorkerStream::Stdout, capture).await;
			});
		}
		if let Some(stderr) = handle.take_stderr() {
			let capture = sup.output.clone();
			tokio::spawn(async move {
				pipe_worker_output(stderr, WorkerStream::Stderr, capture).await;
			});
		}

		*sup.input.lock().await = Some(input);
		sup.state.send_replace(WorkerState::Running { pid: handle.pid() });
		tracing::info!("worker started (pid {})", handle.pid());

		let code = tokio::select! {
			code = handle.wait() => code,
			_ = cancel.changed() => {
				sup.state.send_replace(WorkerState::Stopping);
				// Kill before touching the input slot: a delivery blocked on
				// a full stdin pipe holds the slot lock until the pipe dies.
				handle.terminate();
				let grace = Duration::from_secs(sup.config.stop_timeout_secs);
				if tokio::time::timeout(grace, handle.wait()).await.is_err() {
					tracing::warn!("worker ignored SIGTERM, killing");
					handle.kill().await;
				}
				sup.input.lock().await.take();
				break;
			}
		};

		// The input half may still point at the dead process; clear it
		// before anything else can write.
		sup.input.lock().await.take();

		if *cancel.borrow() {
			break;
		}

		let restarts = sup.bump_restarts().await;
		tracing::warn!(
			"worker exited with code {}, restarting in {}s",
			code,
			delay.as_secs()
		);
		sup.state.send_replace(WorkerState::Crashed {
			exit_code: code,
			restarts,
		});

		tokio::select! {
			_ = tokio::time::sleep(delay) => {}
			_ = cancel.changed() => break,
		}
	}

	sup.state.send_replace(WorkerState::Stopped);
}
