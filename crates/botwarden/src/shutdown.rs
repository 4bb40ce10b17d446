use std::sync::Arc;
use tokio::sync::oneshot;

use crate::supervisor::Supervisor;

/// Completes when the process receives SIGTERM or ctrl-c.
pub async fn wait_for_signal() {
	use tokio::signal::unix::{signal, SignalKind};

	let mut sigterm = match signal(SignalKind::terminate()) {
		Ok(s) => s,
		Err(e) => {
			tracing::error!("failed to install SIGTERM handler: {}", e);
			let _ = tokio::signal::ctrl_c().await;
			return;
		}
	};

	tokio::select! {
		_ = sigterm.recv() => {}
		_ = tokio::signal::ctrl_c() => {}
	}
}

/// Drives an orderly stop: worker first, then the listener. Every wait in
/// the chain is bounded, so shutdown never hangs.
pub async fn coordinate(supervisor: Arc<Supervisor>, notify: oneshot::Sender<()>) {
	wait_for_signal().await;
	tracing::info!("shutting down");
	supervisor.stop().await;
	let _ = notify.send(());
}
