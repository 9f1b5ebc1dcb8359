use overlay_scene::persistence::STORAGE_KEY;
use overlay_scene::{ChangeOrigin, ColorKey, ComponentKind, FileStore, KeyValueStore, MemoryStore, PersistedScene, PersistenceAdapter, SceneState, SceneStore};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

async fn wait_for_file(store: &FileStore) -> String {
	for _ in 0..200 {
		if let Ok(Some(text)) = store.get(STORAGE_KEY).await {
			return text;
		}
		tokio::time::sleep(Duration::from_millis(10)).await;
	}
	panic!("mirror never wrote {}", store.path_for(STORAGE_KEY).display());
}

#[tokio::test]
async fn test_mirror_then_restore_in_fresh_store() {
	let dir = tempfile::tempdir().unwrap();
	let files = FileStore::new(dir.path());
	let adapter = PersistenceAdapter::new(Arc::new(files.clone()));

	let store = SceneStore::new();
	let cancel = CancellationToken::new();
	let mirror = adapter.spawn_mirror(&store, cancel.clone());

	let id = store.add_component(ComponentKind::Media, Some("Sponsor"));
	store.set_canvas_size(2560.0, 1440.0);
	store.set_theme_override(ColorKey::Accent, "#ff00ff");

	cancel.cancel();
	mirror.await.unwrap();
	wait_for_file(&files).await;

	let fresh = SceneStore::with_state(SceneState::empty());
	assert!(PersistenceAdapter::new(Arc::new(files)).restore(&fresh).await);

	let snapshot = fresh.snapshot();
	assert_eq!(snapshot.origin, ChangeOrigin::Restore);
	assert_eq!(snapshot.state.components, store.state().components);
	assert_eq!(snapshot.state.canvas_width, 2560.0);
	assert!(snapshot.state.component(&id).is_some());
	// overrides are not part of the mirrored projection
	assert!(snapshot.state.theme_overrides.is_empty());
}

#[tokio::test]
async fn test_missing_or_corrupt_storage_keeps_defaults() {
	let memory = Arc::new(MemoryStore::default());
	let adapter = PersistenceAdapter::new(memory.clone());
	let store = SceneStore::new();
	let defaults = store.state();

	assert!(!adapter.restore(&store).await);

	memory.set(STORAGE_KEY, "{ not json").await.unwrap();
	assert!(!adapter.restore(&store).await);

	memory.set(STORAGE_KEY, r#"{"components":[{"type":"hologram"}],"activeThemeId":"x","canvasWidth":1,"canvasHeight":1}"#).await.unwrap();
	assert!(!adapter.restore(&store).await);

	assert_eq!(store.state(), defaults);
	assert_eq!(store.revision(), 0);
}

#[tokio::test]
async fn test_mirror_skips_selection_only_changes() {
	let memory = Arc::new(MemoryStore::default());
	let adapter = PersistenceAdapter::new(memory.clone());
	let store = SceneStore::new();
	let cancel = CancellationToken::new();
	let mirror = adapter.spawn_mirror(&store, cancel.clone());

	store.select_component(Some("default-journal"));
	tokio::time::sleep(Duration::from_millis(50)).await;
	assert_eq!(memory.get(STORAGE_KEY).await.unwrap(), None);

	store.set_theme("neon-cyber");
	tokio::time::sleep(Duration::from_millis(50)).await;
	let saved: PersistedScene = serde_json::from_str(&memory.get(STORAGE_KEY).await.unwrap().unwrap()).unwrap();
	assert_eq!(saved.active_theme_id, "neon-cyber");

	cancel.cancel();
	mirror.await.unwrap();
}
