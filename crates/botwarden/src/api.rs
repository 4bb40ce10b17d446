use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use botwarden_core::types::WorkerStatus;

use crate::supervisor::Supervisor;

#[derive(Clone)]
pub struct AppState {
	pub supervisor: Arc<Supervisor>,
}

/// Builds the gateway router. With a path secret configured the webhook
/// route only answers on `/webhook/<secret>`.
pub fn router(supervisor: Arc<Supervisor>, path_secret: Option<&str>) -> Router {
	let state = AppState { supervisor };

	let webhook_path = match path_secret {
		Some(secret) => format!("/webhook/{}", secret),
		None => "/webhook".to_string(),
	};

	Router::new()
		.route("/health", get(health))
		.route("/status", get(status))
		.route("/logs", get(logs))
		.route(&webhook_path, post(webhook))
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
	status: &'static str,
}

#[derive(Serialize)]
struct AckResponse {
	status: &'static str,
}

#[derive(Serialize)]
struct ErrorResponse {
	error: String,
}

// Liveness of the gateway only; never probes the worker.
async fn health() -> Json<HealthResponse> {
	Json(HealthResponse { status: "OK" })
}

async fn status(State(state): State<AppState>) -> Json<WorkerStatus> {
	Json(state.supervisor.status().await)
}

async fn logs(State(state): State<AppState>) -> String {
	let snapshot = state.supervisor.output().snapshot().await;
	String::from_utf8_lossy(&snapshot).to_string()
}

async fn webhook(
	State(state): State<AppState>,
	Json(payload): Json<Value>,
) -> Result<Json<AckResponse>, (StatusCode, Json<ErrorResponse>)> {
	let bytes = serde_json::to_vec(&payload).map_err(|e| {
		(
			StatusCode::BAD_REQUEST,
			Json(ErrorResponse {
				error: e.to_string(),
			}),
		)
	})?;

	state
		.supervisor
		.deliver(&bytes)
		.await
		.map(|_| Json(AckResponse { status: "ok" }))
		.map_err(|e| {
			(
				StatusCode::SERVICE_UNAVAILABLE,
				Json(ErrorResponse {
					error: e.to_string(),
				}),
			)
		})
}
