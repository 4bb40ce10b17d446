use std::path::Path;
use std::sync::Arc;

use botwarden::{api, registration, shutdown, Supervisor};
use botwarden_core::config;

#[tokio::main]
async fn main() {
	dotenvy::dotenv().ok();
	tracing_subscriber::fmt().init();

	let config_path = std::env::args()
		.nth(1)
		.or_else(|| std::env::var("BOTWARDEN_CONFIG").ok())
		.unwrap_or_else(|| "botwarden.toml".to_string());
	let config = match config::load(Path::new(&config_path)) {
		Ok(c) => c,
		Err(e) => {
			eprintln!("error: {}", e);
			std::process::exit(1);
		}
	};

	let supervisor = Supervisor::start(config.worker.clone());

	if let Some(reg) = config.registration.clone() {
		tokio::spawn(async move {
			match registration::announce(&reg).await {
				Ok(()) => tracing::info!("webhook registered at {}", reg.public_url),
				Err(e) => tracing::error!("failed to register webhook: {}", e),
			}
		});
	}

	let app = api::router(Arc::clone(&supervisor), config.gateway.path_secret.as_deref());
	let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.gateway.port));
	let listener = match tokio::net::TcpListener::bind(addr).await {
		Ok(l) => l,
		Err(e) => {
			tracing::error!("failed to bind {}: {}", addr, e);
			std::process::exit(1);
		}
	};
	tracing::info!("server running on port {}", config.gateway.port);

	let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
	tokio::spawn(shutdown::coordinate(Arc::clone(&supervisor), shutdown_tx));

	if let Err(e) = axum::serve(listener, app)
		.with_graceful_shutdown(async move {
			let _ = shutdown_rx.await;
		})
		.await
	{
		tracing::error!("server error: {}", e);
	}
}
