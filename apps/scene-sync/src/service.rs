use crate::{Config, Result};
use overlay_scene::{FileStore, HttpSceneRemote, KeyValueStore, PersistedScene, PersistenceAdapter, SceneRemote, SceneStore, SyncEngine};
use std::sync::Arc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

pub mod preview;
pub mod sync;
pub mod visibility;

/// Owns the scene and the background tasks that keep it mirrored, synced and animated
pub struct SceneSyncService {
	config: Config,
	store: SceneStore,
	persistence: PersistenceAdapter,
	remote: Arc<dyn SceneRemote>,
	cancel_token: CancellationToken,
}

impl SceneSyncService {
	/// Service backed by the configured storage directory and remote
	pub fn new(config: Config) -> Result<Self> {
		let remote: Arc<dyn SceneRemote> = Arc::new(HttpSceneRemote::new(&config.remote_url)?);
		let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.storage_dir.clone()));

		tracing::info!("📋 Remote {}, mirror in {}", config.remote_url, config.storage_dir.display());
		Ok(Self::with_parts(config, SceneStore::new(), storage, remote))
	}

	pub fn with_parts(config: Config, store: SceneStore, storage: Arc<dyn KeyValueStore>, remote: Arc<dyn SceneRemote>) -> Self {
		Self {
			config,
			store,
			persistence: PersistenceAdapter::new(storage),
			remote,
			cancel_token: CancellationToken::new(),
		}
	}

	pub const fn store(&self) -> &SceneStore {
		&self.store
	}

	pub fn cancel_token(&self) -> CancellationToken {
		self.cancel_token.clone()
	}

	pub fn sync_engine(&self) -> SyncEngine {
		SyncEngine::new(self.store.clone(), self.remote.clone(), self.config.sync_config())
	}

	/// Bring the store up to date for a one-shot command: local mirror
	/// first, then the remote copy if it is reachable and newer.
	pub async fn load(&self) -> SyncEngine {
		self.persistence.restore(&self.store).await;
		let engine = self.sync_engine();
		engine.poll_once().await;
		engine
	}

	/// Write the current projection to the local mirror
	pub async fn save_local(&self) -> Result<()> {
		self.persistence.save(&PersistedScene::from_state(&self.store.state())).await?;
		Ok(())
	}

	fn spawn_signal_handler(&self) {
		let shutdown_token = self.cancel_token.clone();
		tokio::spawn(async move {
			match tokio::signal::ctrl_c().await {
				Ok(()) => {
					tracing::info!("🛑 Shutdown signal received");
					shutdown_token.cancel();
				}
				Err(e) => {
					tracing::error!("❌ Failed to listen for shutdown signal: {}", e);
				}
			}
		});
	}

	async fn wait_for_shutdown(&self, tasks: Vec<tokio::task::JoinHandle<()>>) {
		self.cancel_token.cancelled().await;
		tracing::info!("🔄 Initiating graceful shutdown...");

		let joined = timeout(self.config.shutdown_timeout(), async {
			for task in tasks {
				if let Err(e) = task.await {
					tracing::warn!("⚠️ Task ended abnormally: {}", e);
				}
			}
		})
		.await;

		if joined.is_err() {
			tracing::warn!("⚠️ Shutdown timeout reached, abandoning remaining tasks");
		}
		tracing::info!("✅ Graceful shutdown complete");
	}

	/// Run until Ctrl+C: restore, then mirror, sync and animate
	pub async fn run(self) -> Result<()> {
		let service = Arc::new(self);
		service.spawn_signal_handler();

		service.persistence.restore(&service.store).await;

		let mirror = service.clone().spawn_mirror();
		let sync = service.clone().spawn_sync();
		let visibility = service.clone().spawn_visibility_supervisor();

		service.wait_for_shutdown(vec![mirror, sync, visibility]).await;
		Ok(())
	}
}
