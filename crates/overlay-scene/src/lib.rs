//! Headless engine for broadcast overlay scenes.
//!
//! A [`SceneStore`] holds the components, theme and canvas of one scene and
//! publishes every change. [`PersistenceAdapter`] mirrors it to local storage,
//! [`SyncEngine`] keeps it converged with a shared remote copy and
//! [`VisibilityScheduler`] drives the show/hide cycle of animated widgets.

pub mod config;
pub mod error;
pub mod factory;
pub mod model;
pub mod persistence;
pub mod preview;
pub mod store;
pub mod sync;
pub mod theme;
pub mod velocity;
pub mod visibility;

pub use config::{check_version, export_file, import_file, import_str, normalize_config, parse_config, SceneConfig, SCENE_VERSION};
pub use error::{Result, SceneError, SchemaError, StorageError, SyncError};
pub use factory::{create_component, initial_components};
pub use model::{ComponentId, ComponentKind, ComponentPatch, OverlayComponent};
pub use persistence::{FileStore, KeyValueStore, MemoryStore, PersistedScene, PersistenceAdapter};
pub use preview::{PreviewLoader, PreviewQuery, PreviewStatus};
pub use store::{ChangeOrigin, ReorderDirection, SceneSnapshot, SceneState, SceneStore};
pub use sync::{HttpSceneRemote, SceneRemote, SyncConfig, SyncEngine};
pub use theme::{ColorKey, Theme, ThemeRegistry, DEFAULT_THEME_ID};
pub use velocity::scroll_cycle_seconds;
pub use visibility::{Visibility, VisibilityClock, VisibilityHandle, VisibilityScheduler, VisibilityState, VisibilityTiming};
