use serde_json::json;
use thiserror::Error;

use botwarden_core::config::RegistrationConfig;

#[derive(Debug, Error)]
pub enum RegistrationError {
	#[error("registration request failed: {0}")]
	Http(#[from] reqwest::Error),
	#[error("registration rejected with status {0}")]
	Status(u16),
}

/// One-shot announcement of the gateway's public URL to the upstream event
/// source. Off the delivery path; callers log failures and carry on.
pub async fn announce(config: &RegistrationConfig) -> Result<(), RegistrationError> {
	let client = reqwest::Client::new();
	let response = client
		.post(&config.endpoint)
		.json(&json!({ "url": config.public_url }))
		.send()
		.await?;

	if !response.status().is_success() {
		return Err(RegistrationError::Status(response.status().as_u16()));
	}

	Ok(())
}
