use crate::config::{normalize_config, SceneConfig};
use crate::error::{Result, SyncError};
use crate::store::{ChangeOrigin, SceneStore};
use reqwest::header::CACHE_CONTROL;
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// Scene source requested by a preview page URL such as
/// `http://host/preview?config=/scenes/main.json&refresh=5000`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewQuery {
	/// Absolute URL of the scene file
	pub config: Option<Url>,
	/// Re-fetch interval; absent unless a positive number of ms was given
	pub refresh: Option<Duration>,
}

impl PreviewQuery {
	/// Read `config` and `refresh` from the page URL. A relative `config`
	/// resolves against the page itself.
	pub fn from_page_url(page: &str) -> std::result::Result<Self, SyncError> {
		let page = Url::parse(page).map_err(|e| SyncError::InvalidEndpoint(format!("{page}: {e}")))?;

		let mut config = None;
		let mut refresh = None;
		for (key, value) in page.query_pairs() {
			match key.as_ref() {
				"config" if !value.is_empty() => {
					config = Some(page.join(&value).map_err(|e| SyncError::InvalidEndpoint(format!("{value}: {e}")))?);
				}
				"refresh" => refresh = parse_refresh(&value),
				_ => {}
			}
		}

		Ok(Self { config, refresh })
	}

	/// Query for an absolute scene file URL given directly
	pub fn for_config(config: &str, refresh_ms: Option<u64>) -> std::result::Result<Self, SyncError> {
		let config = Url::parse(config).map_err(|e| SyncError::InvalidEndpoint(format!("{config}: {e}")))?;
		Ok(Self {
			config: Some(config),
			refresh: refresh_ms.filter(|ms| *ms > 0).map(Duration::from_millis),
		})
	}
}

fn parse_refresh(raw: &str) -> Option<Duration> {
	raw.trim().parse::<u64>().ok().filter(|ms| *ms > 0).map(Duration::from_millis)
}

/// Last outcome of the preview loader
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PreviewStatus {
	Loading,
	Ready { components: usize },
	Error { message: String },
}

/// Loads a scene file into a store, once or on a refresh interval
#[derive(Debug, Clone)]
pub struct PreviewLoader {
	client: reqwest::Client,
	store: SceneStore,
	source: Url,
	refresh: Option<Duration>,
}

impl PreviewLoader {
	pub fn new(store: SceneStore, source: Url, refresh: Option<Duration>) -> Self {
		Self {
			client: reqwest::Client::new(),
			store,
			source,
			refresh,
		}
	}

	pub fn from_query(store: SceneStore, query: &PreviewQuery) -> Option<Self> {
		query.config.clone().map(|source| Self::new(store, source, query.refresh))
	}

	/// Fetch, validate and apply the scene file. The store is untouched on any failure.
	#[instrument(skip(self), fields(source = %self.source))]
	pub async fn load_once(&self) -> Result<SceneConfig> {
		let response = self.client.get(self.source.clone()).header(CACHE_CONTROL, "no-store").send().await.map_err(SyncError::from)?;

		let status = response.status();
		if !status.is_success() {
			return Err(SyncError::SceneFileUnavailable(status.as_u16()).into());
		}

		let value: Value = response.json().await.map_err(SyncError::from)?;
		let config = normalize_config(value)?;
		self.store.apply_config(config.clone(), ChangeOrigin::Remote);
		Ok(config)
	}

	/// Load now, then keep refreshing when an interval was requested.
	/// Failures are published as a status message and never stop the loop.
	pub fn spawn(self, cancel: CancellationToken) -> (JoinHandle<()>, watch::Receiver<PreviewStatus>) {
		let (status_tx, status_rx) = watch::channel(PreviewStatus::Loading);
		let handle = tokio::spawn(async move {
			info!("🖼️ Previewing {}", self.source);

			let Some(refresh) = self.refresh else {
				tokio::select! {
					() = cancel.cancelled() => {}
					() = self.load_and_report(&status_tx) => {}
				}
				return;
			};

			let mut ticker = interval(refresh);
			ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
			loop {
				tokio::select! {
					() = cancel.cancelled() => break,
					_ = ticker.tick() => self.load_and_report(&status_tx).await,
				}
			}
			info!("✅ Preview refresh stopped");
		});
		(handle, status_rx)
	}

	async fn load_and_report(&self, status_tx: &watch::Sender<PreviewStatus>) {
		let status = match self.load_once().await {
			Ok(config) => PreviewStatus::Ready {
				components: config.components.len(),
			},
			Err(e) => {
				warn!("⚠️ Failed to load scene: {}", e);
				PreviewStatus::Error { message: e.to_string() }
			}
		};
		status_tx.send_replace(status);
	}
}
