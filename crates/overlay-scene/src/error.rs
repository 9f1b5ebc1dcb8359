use thiserror::Error;

pub type Result<T> = std::result::Result<T, SceneError>;

/// Rejections raised while validating an imported or fetched scene
#[derive(Error, Debug)]
pub enum SchemaError {
	#[error("Invalid scene file: expected a JSON object")]
	NotAnObject,

	#[error("Unsupported scene version: {0}")]
	UnsupportedVersion(String),

	#[error("Scene file is missing components")]
	MissingComponents,

	#[error("Component #{index} is malformed: {source}")]
	InvalidComponent {
		index: usize,
		#[source]
		source: serde_json::Error,
	},

	#[error("Duplicate component id: {0}")]
	DuplicateComponentId(String),

	#[error("Scene file is not valid JSON: {0}")]
	Json(#[from] serde_json::Error),
}

/// Failures talking to the remote scene endpoint
#[derive(Error, Debug)]
pub enum SyncError {
	#[error("HTTP transport error: {0}")]
	Http(#[from] reqwest::Error),

	#[error("Unexpected response status {status} from {url}")]
	UnexpectedStatus { status: u16, url: String },

	#[error("Remote scene rejected: {0}")]
	Schema(#[from] SchemaError),

	#[error("Invalid remote endpoint: {0}")]
	InvalidEndpoint(String),

	#[error("Unable to load scene file ({0})")]
	SceneFileUnavailable(u16),
}

/// Failures of the local durable mirror
#[derive(Error, Debug)]
pub enum StorageError {
	#[error("Storage I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Persisted scene is corrupt: {0}")]
	Corrupt(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum SceneError {
	#[error(transparent)]
	Schema(#[from] SchemaError),

	#[error(transparent)]
	Sync(#[from] SyncError),

	#[error(transparent)]
	Storage(#[from] StorageError),

	#[error("Rejected update for component {id}: {reason}")]
	InvalidPatch { id: String, reason: String },

	#[error("Visibility scheduler has stopped")]
	SchedulerStopped,

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
}
