use async_trait::async_trait;
use overlay_scene::persistence::STORAGE_KEY;
use overlay_scene::{ComponentKind, KeyValueStore, MemoryStore, PersistedScene, SceneConfig, SceneRemote, SceneState, SceneStore, SyncError};
use scene_sync::{commands, Config, EditCommand, SceneSyncService};
use serde_json::Value;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingRemote {
	stored: Mutex<Option<Value>>,
	pushes: Mutex<Vec<SceneConfig>>,
	offline: bool,
}

#[async_trait]
impl SceneRemote for RecordingRemote {
	async fn fetch(&self) -> Result<Option<Value>, SyncError> {
		if self.offline {
			return Err(SyncError::UnexpectedStatus {
				status: 502,
				url: "recording".to_string(),
			});
		}
		Ok(self.stored.lock().unwrap().clone())
	}

	async fn push(&self, config: &SceneConfig) -> Result<(), SyncError> {
		if self.offline {
			return Err(SyncError::UnexpectedStatus {
				status: 502,
				url: "recording".to_string(),
			});
		}
		self.pushes.lock().unwrap().push(config.clone());
		*self.stored.lock().unwrap() = Some(serde_json::to_value(config).unwrap());
		Ok(())
	}
}

fn service(storage: &Arc<MemoryStore>, remote: &Arc<RecordingRemote>) -> SceneSyncService {
	let storage: Arc<dyn KeyValueStore> = storage.clone();
	let remote: Arc<dyn SceneRemote> = remote.clone();
	SceneSyncService::with_parts(Config::default(), SceneStore::new(), storage, remote)
}

async fn mirrored(storage: &MemoryStore) -> PersistedScene {
	serde_json::from_str(&storage.get(STORAGE_KEY).await.unwrap().unwrap()).unwrap()
}

#[tokio::test]
async fn test_edit_saves_locally_and_pushes() {
	let storage = Arc::new(MemoryStore::default());
	let remote = Arc::new(RecordingRemote::default());

	let edit = EditCommand::Add {
		kind: ComponentKind::Journal,
		name: Some("Week 12".to_string()),
	};
	commands::edit(&service(&storage, &remote), &edit).await.unwrap();

	let pushes = remote.pushes.lock().unwrap().clone();
	assert_eq!(pushes.len(), 1);
	assert_eq!(pushes[0].components.len(), 3);
	assert!(pushes[0].updated_at.is_some());
	assert_eq!(mirrored(&storage).await.components.len(), 3);

	// a second invocation starts from the remote copy
	commands::edit(&service(&storage, &remote), &EditCommand::Remove { id: "default-marquee".to_string() }).await.unwrap();
	let last = remote.pushes.lock().unwrap().last().cloned().unwrap();
	assert_eq!(last.components.len(), 2);
	assert!(last.components.iter().any(|c| c.base().name == "Week 12"));
}

#[tokio::test]
async fn test_edit_starts_from_newer_remote_scene() {
	let storage = Arc::new(MemoryStore::default());
	let remote = Arc::new(RecordingRemote::default());
	let mut state = SceneState::empty();
	state.active_theme_id = "retro-wave".to_string();
	*remote.stored.lock().unwrap() = Some(serde_json::to_value(SceneConfig::from_state(&state, 10)).unwrap());

	commands::edit(&service(&storage, &remote), &EditCommand::Canvas { width: 1280.0, height: 720.0 }).await.unwrap();

	let last = remote.pushes.lock().unwrap().last().cloned().unwrap();
	assert_eq!(last.active_theme_id, "retro-wave");
	assert!(last.components.is_empty());
	assert_eq!(last.canvas_width, 1280.0);
}

#[tokio::test]
async fn test_offline_edit_is_kept_locally() {
	let storage = Arc::new(MemoryStore::default());
	let remote = Arc::new(RecordingRemote {
		offline: true,
		..RecordingRemote::default()
	});

	commands::edit(&service(&storage, &remote), &EditCommand::Theme { id: "royal-gold".to_string() }).await.unwrap();
	assert!(remote.pushes.lock().unwrap().is_empty());
	assert_eq!(mirrored(&storage).await.active_theme_id, "royal-gold");
}

#[tokio::test]
async fn test_failed_edit_writes_nothing() {
	let storage = Arc::new(MemoryStore::default());
	let remote = Arc::new(RecordingRemote::default());

	let result = commands::edit(&service(&storage, &remote), &EditCommand::Remove { id: "nope".to_string() }).await;
	assert!(result.is_err());
	assert!(remote.pushes.lock().unwrap().is_empty());
	assert!(storage.get(STORAGE_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn test_export_then_import_into_another_scene() {
	let dir = tempfile::tempdir().unwrap();
	let source_storage = Arc::new(MemoryStore::default());
	let source_remote = Arc::new(RecordingRemote::default());
	let source = service(&source_storage, &source_remote);
	source.store().add_component(ComponentKind::Media, Some("Sponsor"));

	commands::export(&source, dir.path()).await.unwrap();
	let exported = std::fs::read_dir(dir.path()).unwrap().next().unwrap().unwrap().path();
	assert!(exported.file_name().unwrap().to_string_lossy().starts_with("trident-overlay-config-"));

	let target_storage = Arc::new(MemoryStore::default());
	let target_remote = Arc::new(RecordingRemote::default());
	commands::import(&service(&target_storage, &target_remote), &exported).await.unwrap();

	let pushed = target_remote.pushes.lock().unwrap().last().cloned().unwrap();
	assert_eq!(pushed.components, source.store().state().components);
	assert_eq!(mirrored(&target_storage).await.components.len(), 3);
}
