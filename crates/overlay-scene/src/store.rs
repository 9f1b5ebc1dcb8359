use crate::config::{SceneConfig, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};
use crate::error::{Result, SceneError};
use crate::factory::{create_component, initial_components};
use crate::model::{ComponentId, ComponentKind, ComponentPatch, OverlayComponent};
use crate::persistence::PersistedScene;
use crate::theme::{ColorKey, Theme, ThemeOverrides, ThemeRegistry, DEFAULT_THEME_ID};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

mod reorder;

pub use reorder::{reorder, ReorderDirection};

/// Everything the overlay needs to render a frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneState {
	pub canvas_width: f64,
	pub canvas_height: f64,
	pub active_theme_id: String,
	pub theme_overrides: ThemeOverrides,
	pub components: Vec<OverlayComponent>,
	pub selected_component_id: Option<ComponentId>,
}

impl SceneState {
	/// A scene with default canvas and theme but no components
	pub fn empty() -> Self {
		Self {
			canvas_width: DEFAULT_CANVAS_WIDTH,
			canvas_height: DEFAULT_CANVAS_HEIGHT,
			active_theme_id: DEFAULT_THEME_ID.to_string(),
			theme_overrides: ThemeOverrides::new(),
			components: Vec::new(),
			selected_component_id: None,
		}
	}

	pub fn component(&self, id: &str) -> Option<&OverlayComponent> {
		self.components.iter().find(|c| c.id() == id)
	}

	/// Components sorted back to front
	pub fn paint_order(&self) -> Vec<&OverlayComponent> {
		let mut ordered: Vec<&OverlayComponent> = self.components.iter().collect();
		ordered.sort_by_key(|c| c.z_index());
		ordered
	}

	pub fn selected_component(&self) -> Option<&OverlayComponent> {
		self.selected_component_id.as_deref().and_then(|id| self.component(id))
	}

	fn drop_stale_selection(&mut self) {
		if let Some(selected) = self.selected_component_id.as_deref() {
			if self.component(selected).is_none() {
				self.selected_component_id = None;
			}
		}
	}
}

impl Default for SceneState {
	fn default() -> Self {
		Self {
			components: initial_components(),
			..Self::empty()
		}
	}
}

/// Who caused the latest change to the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
	/// An edit made through the store's mutation API
	Local,
	/// A snapshot received from the remote scene endpoint
	Remote,
	/// State reloaded from the local durable mirror
	Restore,
}

/// State plus change tracking, as published to subscribers
#[derive(Debug, Clone)]
pub struct SceneSnapshot {
	pub state: SceneState,
	/// Increments on every change that actually modified the state
	pub revision: u64,
	pub origin: ChangeOrigin,
}

/// The single authoritative scene container.
///
/// Cloning yields another handle to the same scene. Every mutation runs
/// synchronously and notifies subscribers only when the state changed.
#[derive(Debug, Clone)]
pub struct SceneStore {
	tx: Arc<watch::Sender<SceneSnapshot>>,
}

impl SceneStore {
	pub fn new() -> Self {
		Self::with_state(SceneState::default())
	}

	pub fn with_state(state: SceneState) -> Self {
		let (tx, _rx) = watch::channel(SceneSnapshot {
			state,
			revision: 0,
			origin: ChangeOrigin::Local,
		});
		Self { tx: Arc::new(tx) }
	}

	pub fn subscribe(&self) -> watch::Receiver<SceneSnapshot> {
		self.tx.subscribe()
	}

	pub fn snapshot(&self) -> SceneSnapshot {
		self.tx.borrow().clone()
	}

	pub fn state(&self) -> SceneState {
		self.tx.borrow().state.clone()
	}

	pub fn revision(&self) -> u64 {
		self.tx.borrow().revision
	}

	pub fn selected_component(&self) -> Option<OverlayComponent> {
		self.tx.borrow().state.selected_component().cloned()
	}

	/// Active theme with this scene's colour overrides applied
	pub fn active_theme(&self, registry: &ThemeRegistry) -> Theme {
		let snapshot = self.tx.borrow();
		registry.resolve(&snapshot.state.active_theme_id, &snapshot.state.theme_overrides)
	}

	/// Run `f` against the state; publish a new revision if it reports a change
	fn mutate<F>(&self, origin: ChangeOrigin, f: F) -> bool
	where
		F: FnOnce(&mut SceneState) -> bool,
	{
		self.tx.send_if_modified(|snapshot| {
			let changed = f(&mut snapshot.state);
			if changed {
				snapshot.revision += 1;
				snapshot.origin = origin;
			}
			changed
		})
	}

	/// Create a component with type defaults, append it and select it
	pub fn add_component(&self, kind: ComponentKind, name: Option<&str>) -> ComponentId {
		let mut id = ComponentId::new();
		self.mutate(ChangeOrigin::Local, |state| {
			let component = create_component(kind, &state.components, state.canvas_width, state.canvas_height, name);
			id = component.id().to_string();
			state.components.push(component);
			state.selected_component_id = Some(id.clone());
			true
		});
		debug!("Added {} component {}", kind, id);
		id
	}

	/// Add a copy of `id` named `"<name> (Copy)"` with the same props and
	/// size, placed like a fresh component of its kind and selected.
	/// Returns `None` when no such component exists.
	pub fn duplicate_component(&self, id: &str) -> Option<ComponentId> {
		let mut copy_id = None;
		self.mutate(ChangeOrigin::Local, |state| {
			let Some(source) = state.component(id).cloned() else {
				return false;
			};
			let name = format!("{} (Copy)", source.base().name);
			let mut copy = create_component(source.kind(), &state.components, state.canvas_width, state.canvas_height, Some(&name));
			copy.copy_content_from(&source);

			let new_id = copy.id().to_string();
			state.components.push(copy);
			state.selected_component_id = Some(new_id.clone());
			copy_id = Some(new_id);
			true
		});
		if let Some(copy) = &copy_id {
			debug!("Duplicated {} as {}", id, copy);
		}
		copy_id
	}

	/// Merge `patch` into the component with `id`.
	///
	/// Returns `Ok(false)` when no such component exists. A patch whose props
	/// no longer decode for the component's type is rejected as a whole.
	pub fn update_component(&self, id: &str, patch: &ComponentPatch) -> Result<bool> {
		let mut outcome = Ok(false);
		self.mutate(ChangeOrigin::Local, |state| {
			let Some(component) = state.components.iter_mut().find(|c| c.id() == id) else {
				return false;
			};
			let before = component.clone();
			match component.apply_patch(patch) {
				Ok(()) => {
					outcome = Ok(true);
					*component != before
				}
				Err(reason) => {
					outcome = Err(SceneError::InvalidPatch { id: id.to_string(), reason });
					false
				}
			}
		});
		if let Err(e) = &outcome {
			warn!("{}", e);
		}
		outcome
	}

	pub fn remove_component(&self, id: &str) -> bool {
		self.mutate(ChangeOrigin::Local, |state| {
			let before = state.components.len();
			state.components.retain(|c| c.id() != id);
			if state.selected_component_id.as_deref() == Some(id) {
				state.selected_component_id = None;
			}
			state.components.len() != before
		})
	}

	/// Select a component by id. The id is not checked against the collection.
	pub fn select_component(&self, id: Option<&str>) {
		self.mutate(ChangeOrigin::Local, |state| {
			let next = id.map(str::to_string);
			if state.selected_component_id == next {
				return false;
			}
			state.selected_component_id = next;
			true
		});
	}

	pub fn reorder_component(&self, id: &str, direction: ReorderDirection) -> bool {
		self.mutate(ChangeOrigin::Local, |state| {
			let Some(reordered) = reorder(&state.components, id, direction) else {
				return false;
			};
			if reordered == state.components {
				return false;
			}
			state.components = reordered;
			true
		})
	}

	pub fn set_canvas_size(&self, width: f64, height: f64) {
		self.mutate(ChangeOrigin::Local, |state| {
			if state.canvas_width == width && state.canvas_height == height {
				return false;
			}
			state.canvas_width = width;
			state.canvas_height = height;
			true
		});
	}

	pub fn set_theme(&self, theme_id: &str) {
		self.mutate(ChangeOrigin::Local, |state| {
			if state.active_theme_id == theme_id {
				return false;
			}
			state.active_theme_id = theme_id.to_string();
			true
		});
	}

	pub fn set_theme_override(&self, key: ColorKey, value: &str) {
		self.mutate(ChangeOrigin::Local, |state| {
			if state.theme_overrides.get(&key).map(String::as_str) == Some(value) {
				return false;
			}
			state.theme_overrides.insert(key, value.to_string());
			true
		});
	}

	pub fn reset_theme_overrides(&self) {
		self.mutate(ChangeOrigin::Local, |state| {
			if state.theme_overrides.is_empty() {
				return false;
			}
			state.theme_overrides.clear();
			true
		});
	}

	/// Replace the scene wholesale with a validated config.
	///
	/// Returns the revision that now holds the config.
	pub fn apply_config(&self, config: SceneConfig, origin: ChangeOrigin) -> u64 {
		self.mutate(origin, |state| {
			let mut next = SceneState {
				canvas_width: config.canvas_width,
				canvas_height: config.canvas_height,
				active_theme_id: config.active_theme_id,
				theme_overrides: config.theme_overrides,
				components: config.components,
				selected_component_id: state.selected_component_id.clone(),
			};
			next.drop_stale_selection();
			if next == *state {
				return false;
			}
			*state = next;
			true
		});
		self.revision()
	}

	/// Load the locally persisted projection. Theme overrides are not part
	/// of it and are left as they are.
	pub fn restore(&self, persisted: PersistedScene) -> u64 {
		self.mutate(ChangeOrigin::Restore, |state| {
			let mut next = SceneState {
				canvas_width: persisted.canvas_width,
				canvas_height: persisted.canvas_height,
				active_theme_id: persisted.active_theme_id,
				theme_overrides: state.theme_overrides.clone(),
				components: persisted.components,
				selected_component_id: state.selected_component_id.clone(),
			};
			next.drop_stale_selection();
			if next == *state {
				return false;
			}
			*state = next;
			true
		});
		self.revision()
	}
}

impl Default for SceneStore {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::SCENE_VERSION;
	use serde_json::json;
	use std::collections::HashSet;

	fn z_set(store: &SceneStore) -> Vec<i64> {
		let mut z: Vec<i64> = store.state().components.iter().map(OverlayComponent::z_index).collect();
		z.sort_unstable();
		z
	}

	#[test]
	fn test_starts_with_builtin_components() {
		let store = SceneStore::new();
		let state = store.state();
		let ids: Vec<&str> = state.components.iter().map(OverlayComponent::id).collect();
		assert_eq!(ids, vec!["default-marquee", "default-journal"]);
		assert_eq!(state.active_theme_id, DEFAULT_THEME_ID);
		assert_eq!((state.canvas_width, state.canvas_height), (1920.0, 1080.0));
		assert!(state.selected_component_id.is_none());
	}

	#[test]
	fn test_add_component_ids_distinct_and_z_increasing() {
		let store = SceneStore::new();
		let mut ids = HashSet::new();
		let mut previous_max = z_set(&store).into_iter().max().unwrap();

		for kind in [ComponentKind::Marquee, ComponentKind::Journal, ComponentKind::Media, ComponentKind::Marquee, ComponentKind::Media] {
			let id = store.add_component(kind, None);
			assert!(ids.insert(id.clone()), "duplicate id {id}");

			let state = store.state();
			let added = state.component(&id).unwrap();
			assert!(added.z_index() > previous_max);
			previous_max = added.z_index();
			assert_eq!(state.selected_component_id.as_deref(), Some(id.as_str()));
		}
	}

	#[test]
	fn test_duplicate_copies_props_and_size() {
		let store = SceneStore::new();
		let patch = ComponentPatch::default().sized(800.0, 90.0).with_props(json!({ "text": "Final score", "speed": 80 }));
		store.update_component("default-marquee", &patch).unwrap();

		let copy_id = store.duplicate_component("default-marquee").unwrap();
		let state = store.state();
		assert_eq!(state.components.len(), 3);
		assert_eq!(state.selected_component_id.as_deref(), Some(copy_id.as_str()));

		let (Some(OverlayComponent::Marquee(source)), Some(OverlayComponent::Marquee(copy))) = (state.component("default-marquee"), state.component(&copy_id)) else {
			panic!("expected two marquees");
		};
		assert_ne!(copy.base.id, source.base.id);
		assert_eq!(copy.base.name, "Disclaimer (Copy)");
		assert_eq!(copy.props, source.props);
		assert_eq!((copy.base.width, copy.base.height), (800.0, 90.0));
		assert!(copy.base.z_index > source.base.z_index);
		// second marquee on the canvas, so cascaded by one step
		assert_eq!((copy.base.x, copy.base.y), (20.0, 1080.0 / 2.0 - 30.0 + 20.0));
	}

	#[test]
	fn test_duplicate_unknown_id_is_noop() {
		let store = SceneStore::new();
		let revision = store.revision();
		assert!(store.duplicate_component("ghost").is_none());
		assert_eq!(store.revision(), revision);
	}

	#[test]
	fn test_update_component_merges_and_ignores_unknown_ids() {
		let store = SceneStore::new();
		let patch = ComponentPatch::default().at(100.0, 200.0).with_props(json!({ "text": "Breaking news" }));

		assert!(store.update_component("default-marquee", &patch).unwrap());
		let state = store.state();
		let OverlayComponent::Marquee(marquee) = state.component("default-marquee").unwrap() else {
			panic!("expected marquee");
		};
		assert_eq!((marquee.base.x, marquee.base.y), (100.0, 200.0));
		assert_eq!(marquee.props.text, "Breaking news");
		assert_eq!(marquee.props.speed, 50.0);

		let revision = store.revision();
		assert!(!store.update_component("ghost", &patch).unwrap());
		assert_eq!(store.revision(), revision);
	}

	#[test]
	fn test_update_component_rejects_invalid_props() {
		let store = SceneStore::new();
		let before = store.snapshot();
		let patch = ComponentPatch::default().with_props(json!({ "data": "not rows" }));

		let result = store.update_component("default-journal", &patch);
		assert!(matches!(result, Err(SceneError::InvalidPatch { .. })));
		assert_eq!(store.snapshot().revision, before.revision);
		assert_eq!(store.state(), before.state);
	}

	#[test]
	fn test_remove_clears_matching_selection() {
		let store = SceneStore::new();
		store.select_component(Some("default-journal"));
		assert!(store.remove_component("default-marquee"));
		assert_eq!(store.state().selected_component_id.as_deref(), Some("default-journal"));

		assert!(store.remove_component("default-journal"));
		assert!(store.state().selected_component_id.is_none());
		assert!(!store.remove_component("default-journal"));
	}

	#[test]
	fn test_select_stale_id_yields_no_component() {
		let store = SceneStore::new();
		store.select_component(Some("gone"));
		assert_eq!(store.state().selected_component_id.as_deref(), Some("gone"));
		assert!(store.selected_component().is_none());
		store.select_component(None);
		assert!(store.state().selected_component_id.is_none());
	}

	#[test]
	fn test_reorder_keeps_dense_ranking() {
		let store = SceneStore::new();
		let a = store.add_component(ComponentKind::Media, None);
		store.add_component(ComponentKind::Journal, None);

		for (id, direction) in [
			(a.as_str(), ReorderDirection::Top),
			("default-marquee", ReorderDirection::Up),
			(a.as_str(), ReorderDirection::Down),
			("default-journal", ReorderDirection::Bottom),
		] {
			store.reorder_component(id, direction);
			assert_eq!(z_set(&store), vec![1, 2, 3, 4]);
		}
	}

	#[test]
	fn test_reorder_up_on_topmost_is_noop() {
		let store = SceneStore::new();
		let before = store.snapshot();

		assert!(!store.reorder_component("default-journal", ReorderDirection::Up));
		let after = store.snapshot();
		assert_eq!(after.revision, before.revision);
		assert_eq!(after.state, before.state);
	}

	#[test]
	fn test_theme_operations() {
		let store = SceneStore::new();
		let registry = ThemeRegistry::new();

		store.set_theme("unknown-theme");
		store.set_theme_override(ColorKey::Accent, "#123456");
		let theme = store.active_theme(&registry);
		assert_eq!(theme.id, DEFAULT_THEME_ID);
		assert_eq!(theme.colors.accent, "#123456");

		store.reset_theme_overrides();
		assert!(store.state().theme_overrides.is_empty());
		assert_eq!(store.state().active_theme_id, "unknown-theme");
	}

	#[test]
	fn test_noop_mutations_do_not_notify() {
		let store = SceneStore::new();
		let mut rx = store.subscribe();
		rx.borrow_and_update();

		store.set_canvas_size(1920.0, 1080.0);
		store.set_theme(DEFAULT_THEME_ID);
		store.reset_theme_overrides();
		assert!(!rx.has_changed().unwrap());

		store.set_canvas_size(1280.0, 720.0);
		assert!(rx.has_changed().unwrap());
		assert_eq!(rx.borrow_and_update().origin, ChangeOrigin::Local);
	}

	#[test]
	fn test_apply_config_tags_origin_and_drops_stale_selection() {
		let store = SceneStore::new();
		store.select_component(Some("default-marquee"));

		let config = SceneConfig {
			version: SCENE_VERSION,
			updated_at: Some(10),
			components: Vec::new(),
			active_theme_id: "clean-light".to_string(),
			theme_overrides: ThemeOverrides::new(),
			canvas_width: 1280.0,
			canvas_height: 720.0,
		};
		let revision = store.apply_config(config.clone(), ChangeOrigin::Remote);
		let snapshot = store.snapshot();

		assert_eq!(snapshot.revision, revision);
		assert_eq!(snapshot.origin, ChangeOrigin::Remote);
		assert!(snapshot.state.selected_component_id.is_none());
		assert!(snapshot.state.components.is_empty());

		assert_eq!(store.apply_config(config, ChangeOrigin::Remote), revision);
	}
}
