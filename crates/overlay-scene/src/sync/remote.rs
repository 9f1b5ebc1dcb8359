use crate::config::SceneConfig;
use crate::error::SyncError;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::instrument;

/// Path of the scene resource relative to the remote base URL
pub const SCENE_PATH: &str = "/api/scene";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The shared copy of the scene
#[async_trait]
pub trait SceneRemote: Send + Sync {
	/// Latest stored scene, or `None` when nothing has been saved yet.
	/// The payload is returned unvalidated.
	async fn fetch(&self) -> Result<Option<Value>, SyncError>;

	async fn push(&self, config: &SceneConfig) -> Result<(), SyncError>;
}

/// [`SceneRemote`] over HTTP against `{base}/api/scene`
#[derive(Debug, Clone)]
pub struct HttpSceneRemote {
	client: reqwest::Client,
	endpoint: String,
}

impl HttpSceneRemote {
	pub fn new(base_url: &str) -> Result<Self, SyncError> {
		Self::with_client(reqwest::Client::new(), base_url)
	}

	pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, SyncError> {
		let parsed = reqwest::Url::parse(base_url).map_err(|e| SyncError::InvalidEndpoint(format!("{base_url}: {e}")))?;
		if !matches!(parsed.scheme(), "http" | "https") {
			return Err(SyncError::InvalidEndpoint(format!("{base_url}: unsupported scheme {}", parsed.scheme())));
		}

		Ok(Self {
			client,
			endpoint: format!("{}{SCENE_PATH}", base_url.trim_end_matches('/')),
		})
	}

	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}
}

#[async_trait]
impl SceneRemote for HttpSceneRemote {
	#[instrument(skip(self), fields(endpoint = %self.endpoint))]
	async fn fetch(&self) -> Result<Option<Value>, SyncError> {
		let response = self.client.get(&self.endpoint).timeout(REQUEST_TIMEOUT).send().await?;

		match response.status() {
			StatusCode::NOT_FOUND => Ok(None),
			status if status.is_success() => Ok(Some(response.json::<Value>().await?)),
			status => Err(SyncError::UnexpectedStatus {
				status: status.as_u16(),
				url: self.endpoint.clone(),
			}),
		}
	}

	#[instrument(skip(self, config), fields(endpoint = %self.endpoint, updated_at = config.updated_at))]
	async fn push(&self, config: &SceneConfig) -> Result<(), SyncError> {
		let response = self.client.post(&self.endpoint).timeout(REQUEST_TIMEOUT).json(config).send().await?;

		let status = response.status();
		if !status.is_success() {
			return Err(SyncError::UnexpectedStatus {
				status: status.as_u16(),
				url: self.endpoint.clone(),
			});
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_endpoint_joins_base() {
		assert_eq!(HttpSceneRemote::new("http://127.0.0.1:8080").unwrap().endpoint(), "http://127.0.0.1:8080/api/scene");
		assert_eq!(HttpSceneRemote::new("https://overlay.local/").unwrap().endpoint(), "https://overlay.local/api/scene");
	}

	#[test]
	fn test_rejects_bad_endpoints() {
		assert!(matches!(HttpSceneRemote::new("not a url"), Err(SyncError::InvalidEndpoint(_))));
		assert!(matches!(HttpSceneRemote::new("ftp://host"), Err(SyncError::InvalidEndpoint(_))));
	}
}
