use crate::{Error, PreviewArgs, Result, SceneSyncService};
use overlay_scene::{PreviewLoader, PreviewQuery, PreviewStatus};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

impl PreviewArgs {
	pub fn query(&self) -> Result<Option<PreviewQuery>> {
		match (&self.url, &self.config) {
			(Some(url), _) => Ok(Some(PreviewQuery::from_page_url(url)?)),
			(None, Some(config)) => Ok(Some(PreviewQuery::for_config(config, self.refresh)?)),
			(None, None) if self.refresh.is_some() => Err(Error::Config("--refresh needs a scene file".to_string())),
			(None, None) => Ok(None),
		}
	}
}

fn spawn_status_logger(mut status: watch::Receiver<PreviewStatus>, cancel: CancellationToken) {
	tokio::spawn(async move {
		loop {
			tokio::select! {
				() = cancel.cancelled() => break,
				changed = status.changed() => {
					if changed.is_err() {
						break;
					}
					match status.borrow_and_update().clone() {
						PreviewStatus::Loading => {}
						PreviewStatus::Ready { components } => tracing::info!("🖼️ Showing {} components", components),
						PreviewStatus::Error { message } => tracing::warn!("⚠️ {}", message),
					}
				}
			}
		}
	});
}

impl SceneSyncService {
	/// Show a scene without editing it.
	///
	/// With a scene file the file is loaded (and optionally refreshed);
	/// otherwise the remote scene is followed. The local mirror is read but
	/// never written.
	pub async fn preview(self, args: &PreviewArgs) -> Result<()> {
		let query = args.query()?;

		let service = Arc::new(self);
		service.spawn_signal_handler();
		service.persistence.restore(&service.store).await;

		let visibility = service.clone().spawn_visibility_supervisor();

		let feed = match query.as_ref().and_then(|query| PreviewLoader::from_query(service.store.clone(), query)) {
			Some(loader) => {
				let (handle, status) = loader.spawn(service.cancel_token.clone());
				spawn_status_logger(status, service.cancel_token.clone());
				handle
			}
			None => {
				tracing::info!("No scene file given, following {}", service.config.remote_url);
				service.clone().spawn_sync()
			}
		};

		service.wait_for_shutdown(vec![feed, visibility]).await;
		Ok(())
	}
}
