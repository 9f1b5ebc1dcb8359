use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
	#[error("Scene error: {0}")]
	Scene(#[from] overlay_scene::SceneError),

	#[error("Remote sync error: {0}")]
	Sync(#[from] overlay_scene::SyncError),

	#[error("Local storage error: {0}")]
	Storage(#[from] overlay_scene::StorageError),

	#[error("Invalid patch: {0}")]
	InvalidPatch(String),

	#[error("Unknown component: {0}")]
	UnknownComponent(String),

	#[error("Configuration error: {0}")]
	Config(String),

	#[error("JSON parsing error: {0}")]
	JsonParse(#[from] serde_json::Error),
}
