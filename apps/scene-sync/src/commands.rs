use crate::{EditCommand, Error, Result, SceneSyncService};
use overlay_scene::sync::PushOutcome;
use overlay_scene::{export_file, import_file, ComponentPatch, SceneStore, ThemeRegistry};
use std::path::Path;
use tracing::{info, warn};

/// Apply one edit to the store and describe what happened
pub fn apply_edit(store: &SceneStore, edit: &EditCommand) -> Result<String> {
	let summary = match edit {
		EditCommand::Add { kind, name } => {
			let id = store.add_component(*kind, name.as_deref());
			format!("Added {kind} component {id}")
		}
		EditCommand::Remove { id } => {
			if !store.remove_component(id) {
				return Err(Error::UnknownComponent(id.clone()));
			}
			format!("Removed {id}")
		}
		EditCommand::Duplicate { id } => {
			let copy = store.duplicate_component(id).ok_or_else(|| Error::UnknownComponent(id.clone()))?;
			format!("Duplicated {id} as {copy}")
		}
		EditCommand::Reorder { id, direction } => {
			if store.state().component(id).is_none() {
				return Err(Error::UnknownComponent(id.clone()));
			}
			if store.reorder_component(id, *direction) {
				format!("Moved {id} {direction:?}")
			} else {
				format!("{id} already in place")
			}
		}
		EditCommand::Theme { id } => {
			if !ThemeRegistry::default().contains(id) {
				warn!("⚠️ Theme {} is not built in, renderers will fall back to the default", id);
			}
			store.set_theme(id);
			format!("Active theme is now {id}")
		}
		EditCommand::Override { key, value } => {
			store.set_theme_override(*key, value);
			format!("Overrode {} with {value}", key.as_str())
		}
		EditCommand::ResetOverrides => {
			store.reset_theme_overrides();
			"Cleared theme overrides".to_string()
		}
		EditCommand::Canvas { width, height } => {
			if !(width.is_finite() && height.is_finite() && *width > 0.0 && *height > 0.0) {
				return Err(Error::Config(format!("canvas must be positive, got {width}x{height}")));
			}
			store.set_canvas_size(*width, *height);
			format!("Canvas is now {width}x{height}")
		}
		EditCommand::Patch { id, json } => {
			let patch: ComponentPatch = serde_json::from_str(json).map_err(|e| Error::InvalidPatch(e.to_string()))?;
			if !store.update_component(id, &patch)? {
				return Err(Error::UnknownComponent(id.clone()));
			}
			format!("Patched {id}")
		}
	};
	Ok(summary)
}

/// Save locally, then push. A failed push keeps the local copy and is only reported.
async fn commit(service: &SceneSyncService, engine: &overlay_scene::SyncEngine) -> Result<()> {
	service.save_local().await?;
	match engine.push_once().await {
		PushOutcome::Pushed { updated_at } => info!("📤 Scene pushed (updatedAt {})", updated_at),
		PushOutcome::SkippedEcho => info!("Scene unchanged, nothing to push"),
		PushOutcome::Failed => warn!("⚠️ Saved locally only, the remote will be updated by the next run"),
	}
	Ok(())
}

pub async fn edit(service: &SceneSyncService, edit: &EditCommand) -> Result<()> {
	let engine = service.load().await;
	let summary = apply_edit(service.store(), edit)?;
	commit(service, &engine).await?;
	println!("{summary}");
	Ok(())
}

pub async fn export(service: &SceneSyncService, out: &Path) -> Result<()> {
	service.load().await;
	let path = export_file(service.store(), out).await?;
	println!("{}", path.display());
	Ok(())
}

pub async fn import(service: &SceneSyncService, file: &Path) -> Result<()> {
	let engine = service.load().await;
	let config = import_file(service.store(), file).await?;
	commit(service, &engine).await?;
	println!("Imported {} components", config.components.len());
	Ok(())
}
