//! Convergence of the local scene with the shared remote copy.
//!
//! The remote is polled on a fixed interval and applied when its `updatedAt`
//! is newer than anything seen. Local edits are pushed after a quiet period.
//! Applying a remote scene never triggers a push of that same scene.

mod debounce;
mod engine;
mod remote;

pub use debounce::Debouncer;
pub use engine::{Clock, PollOutcome, PushOutcome, SyncConfig, SyncCursor, SyncEngine};
pub use remote::{HttpSceneRemote, SceneRemote, SCENE_PATH};
