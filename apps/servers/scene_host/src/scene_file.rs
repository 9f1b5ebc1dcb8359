use crate::error::SceneHostError;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

/// The saved scene, kept as one JSON document on disk
#[derive(Debug)]
pub struct SceneFile {
	path: PathBuf,
	write_lock: Mutex<()>,
}

impl SceneFile {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			write_lock: Mutex::new(()),
		}
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	#[instrument(skip(self), fields(path = %self.path.display()))]
	pub async fn load(&self) -> Result<Option<Value>, SceneHostError> {
		match tokio::fs::read(&self.path).await {
			Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
			Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
			Err(e) => Err(e.into()),
		}
	}

	/// Replace the saved scene. The previous document stays intact until the
	/// new one is fully written.
	#[instrument(skip(self, scene), fields(path = %self.path.display()))]
	pub async fn save(&self, scene: &Value) -> Result<(), SceneHostError> {
		let body = serde_json::to_vec_pretty(scene)?;
		let staging = self.path.with_extension("json.tmp");

		let _guard = self.write_lock.lock().await;
		if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
			tokio::fs::create_dir_all(parent).await?;
		}
		tokio::fs::write(&staging, &body).await?;
		tokio::fs::rename(&staging, &self.path).await?;

		debug!("Saved {} bytes", body.len());
		Ok(())
	}
}
