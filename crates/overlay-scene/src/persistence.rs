use crate::error::StorageError;
use crate::model::OverlayComponent;
use crate::store::{SceneState, SceneStore};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Key under which the scene projection is mirrored
pub const STORAGE_KEY: &str = "trident-overlay-storage";

/// Minimal async string store backing the local mirror
#[async_trait]
pub trait KeyValueStore: Send + Sync {
	async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

	async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// One JSON file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
	dir: PathBuf,
}

impl FileStore {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self { dir: dir.into() }
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	pub fn path_for(&self, key: &str) -> PathBuf {
		self.dir.join(format!("{key}.json"))
	}
}

#[async_trait]
impl KeyValueStore for FileStore {
	async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
		match tokio::fs::read_to_string(self.path_for(key)).await {
			Ok(text) => Ok(Some(text)),
			Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
			Err(e) => Err(e.into()),
		}
	}

	async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
		tokio::fs::create_dir_all(&self.dir).await?;
		let target = self.path_for(key);
		let staging = self.dir.join(format!(".{key}.json.tmp"));

		tokio::fs::write(&staging, value).await?;
		tokio::fs::rename(&staging, &target).await?;
		Ok(())
	}
}

/// Process-local store, for previews and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
	entries: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl KeyValueStore for MemoryStore {
	async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
		Ok(self.entries.lock().await.get(key).cloned())
	}

	async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
		self.entries.lock().await.insert(key.to_string(), value.to_string());
		Ok(())
	}
}

/// The part of the scene kept in the local mirror. Theme overrides and
/// selection are not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedScene {
	pub components: Vec<OverlayComponent>,
	pub active_theme_id: String,
	pub canvas_width: f64,
	pub canvas_height: f64,
}

impl PersistedScene {
	pub fn from_state(state: &SceneState) -> Self {
		Self {
			components: state.components.clone(),
			active_theme_id: state.active_theme_id.clone(),
			canvas_width: state.canvas_width,
			canvas_height: state.canvas_height,
		}
	}
}

/// Keeps a durable copy of the scene in a [`KeyValueStore`]
#[derive(Clone)]
pub struct PersistenceAdapter {
	storage: Arc<dyn KeyValueStore>,
	key: String,
}

impl PersistenceAdapter {
	pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
		Self {
			storage,
			key: STORAGE_KEY.to_string(),
		}
	}

	pub async fn load(&self) -> Result<Option<PersistedScene>, StorageError> {
		let Some(text) = self.storage.get(&self.key).await? else {
			return Ok(None);
		};
		Ok(Some(serde_json::from_str(&text)?))
	}

	pub async fn save(&self, scene: &PersistedScene) -> Result<(), StorageError> {
		let body = serde_json::to_string(scene)?;
		self.storage.set(&self.key, &body).await
	}

	/// Load the mirrored scene into `store`.
	///
	/// Missing or unreadable data leaves the store at its defaults and is
	/// reported through the log only. Returns whether anything was applied.
	#[instrument(skip_all)]
	pub async fn restore(&self, store: &SceneStore) -> bool {
		match self.load().await {
			Ok(Some(persisted)) => {
				let components = persisted.components.len();
				store.restore(persisted);
				info!("📂 Restored {} components from local storage", components);
				true
			}
			Ok(None) => {
				debug!("No persisted scene found, keeping defaults");
				false
			}
			Err(e) => {
				warn!("⚠️ Ignoring persisted scene: {}", e);
				false
			}
		}
	}

	/// Write the projection every time it changes until cancelled
	pub fn spawn_mirror(&self, store: &SceneStore, cancel: CancellationToken) -> JoinHandle<()> {
		let adapter = self.clone();
		let mut rx = store.subscribe();
		let mut last_written = Some(PersistedScene::from_state(&rx.borrow_and_update().state));

		tokio::spawn(async move {
			info!("💾 Starting local mirror");

			loop {
				tokio::select! {
					() = cancel.cancelled() => break,
					changed = rx.changed() => {
						if changed.is_err() {
							break;
						}
						let projection = PersistedScene::from_state(&rx.borrow_and_update().state);
						adapter.write_if_changed(projection, &mut last_written).await;
					}
				}
			}

			if rx.has_changed().unwrap_or(false) {
				let projection = PersistedScene::from_state(&rx.borrow_and_update().state);
				adapter.write_if_changed(projection, &mut last_written).await;
			}

			info!("✅ Local mirror stopped");
		})
	}

	async fn write_if_changed(&self, projection: PersistedScene, last_written: &mut Option<PersistedScene>) {
		if last_written.as_ref() == Some(&projection) {
			return;
		}
		match self.save(&projection).await {
			Ok(()) => {
				debug!("Mirrored {} components", projection.components.len());
				*last_written = Some(projection);
			}
			Err(e) => warn!("⚠️ Failed to mirror scene: {}", e),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_file_store_round_trip() {
		let dir = tempfile::tempdir().unwrap();
		let store = FileStore::new(dir.path().join("nested"));

		assert_eq!(store.get("missing").await.unwrap(), None);
		store.set("k", "one").await.unwrap();
		store.set("k", "two").await.unwrap();
		assert_eq!(store.get("k").await.unwrap().as_deref(), Some("two"));
		assert!(!store.dir().join(".k.json.tmp").exists());
	}

	#[test]
	fn test_projection_omits_overrides() {
		let value = serde_json::to_value(PersistedScene::from_state(&SceneState::default())).unwrap();
		let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
		assert_eq!(keys.len(), 4);
		assert!(value.get("themeOverrides").is_none());
		assert_eq!(value["activeThemeId"], "dark-modern");
	}
}
