use crate::error::{Result, SchemaError};
use crate::model::OverlayComponent;
use crate::store::{ChangeOrigin, SceneState, SceneStore};
use crate::theme::{ColorKey, ThemeOverrides, DEFAULT_THEME_ID};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Scene schema version this engine reads and writes
pub const SCENE_VERSION: i64 = 1;

pub const DEFAULT_CANVAS_WIDTH: f64 = 1920.0;
pub const DEFAULT_CANVAS_HEIGHT: f64 = 1080.0;

/// Current wall-clock time in epoch milliseconds
pub fn now_millis() -> i64 {
	chrono::Utc::now().timestamp_millis()
}

/// Serializable snapshot of a scene, as exchanged with files and the remote endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneConfig {
	pub version: i64,
	/// Write timestamp, the only signal used to resolve conflicts
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub updated_at: Option<i64>,
	pub components: Vec<OverlayComponent>,
	pub active_theme_id: String,
	#[serde(default)]
	pub theme_overrides: ThemeOverrides,
	pub canvas_width: f64,
	pub canvas_height: f64,
}

impl SceneConfig {
	pub fn from_state(state: &SceneState, updated_at: i64) -> Self {
		Self {
			version: SCENE_VERSION,
			updated_at: Some(updated_at),
			components: state.components.clone(),
			active_theme_id: state.active_theme_id.clone(),
			theme_overrides: state.theme_overrides.clone(),
			canvas_width: state.canvas_width,
			canvas_height: state.canvas_height,
		}
	}

	/// Timestamp used for last-writer-wins comparison; absent counts as 0
	pub fn timestamp(&self) -> i64 {
		self.updated_at.unwrap_or(0)
	}

	pub fn to_json_pretty(&self) -> serde_json::Result<String> {
		serde_json::to_string_pretty(self)
	}
}

/// Validate an untyped payload into a [`SceneConfig`].
///
/// Version and components are strict; theme, overrides and canvas size fall
/// back to defaults when absent or mistyped.
pub fn normalize_config(value: Value) -> std::result::Result<SceneConfig, SchemaError> {
	let Value::Object(candidate) = value else {
		return Err(SchemaError::NotAnObject);
	};

	check_version(&candidate)?;

	let raw_components = candidate.get("components").and_then(Value::as_array).ok_or(SchemaError::MissingComponents)?;

	let mut components = Vec::with_capacity(raw_components.len());
	let mut seen = HashSet::new();
	for (index, raw) in raw_components.iter().enumerate() {
		let component: OverlayComponent = serde_json::from_value(raw.clone()).map_err(|source| SchemaError::InvalidComponent { index, source })?;
		if !seen.insert(component.id().to_string()) {
			return Err(SchemaError::DuplicateComponentId(component.id().to_string()));
		}
		components.push(component);
	}

	let active_theme_id = candidate
		.get("activeThemeId")
		.and_then(Value::as_str)
		.filter(|id| !id.is_empty())
		.unwrap_or(DEFAULT_THEME_ID)
		.to_string();

	let theme_overrides = candidate.get("themeOverrides").and_then(Value::as_object).map(parse_overrides).unwrap_or_default();

	Ok(SceneConfig {
		version: SCENE_VERSION,
		updated_at: candidate.get("updatedAt").and_then(timestamp_millis),
		components,
		active_theme_id,
		theme_overrides,
		canvas_width: candidate.get("canvasWidth").and_then(Value::as_f64).unwrap_or(DEFAULT_CANVAS_WIDTH),
		canvas_height: candidate.get("canvasHeight").and_then(Value::as_f64).unwrap_or(DEFAULT_CANVAS_HEIGHT),
	})
}

/// Integral value of a JSON number, accepting float encodings such as `1.0`
#[allow(clippy::cast_possible_truncation)]
fn as_integer(value: &Value) -> Option<i64> {
	value.as_i64().or_else(|| {
		let float = value.as_f64()?;
		(float.is_finite() && float.fract() == 0.0).then_some(float as i64)
	})
}

/// Epoch milliseconds of any finite JSON number, fractions truncated
#[allow(clippy::cast_possible_truncation)]
fn timestamp_millis(value: &Value) -> Option<i64> {
	value.as_i64().or_else(|| {
		let float = value.as_f64().filter(|f| f.is_finite())?;
		Some(float.trunc() as i64)
	})
}

/// Require `version` to be the supported schema version
pub fn check_version(document: &serde_json::Map<String, Value>) -> std::result::Result<(), SchemaError> {
	match document.get("version") {
		Some(version) if as_integer(version) == Some(SCENE_VERSION) => Ok(()),
		Some(other) => Err(SchemaError::UnsupportedVersion(other.to_string())),
		None => Err(SchemaError::UnsupportedVersion("missing".to_string())),
	}
}

fn parse_overrides(raw: &serde_json::Map<String, Value>) -> ThemeOverrides {
	raw
		.iter()
		.filter_map(|(key, value)| {
			let key = key.parse::<ColorKey>().ok()?;
			let value = value.as_str()?;
			Some((key, value.to_string()))
		})
		.collect()
}

/// Parse JSON text and validate it as a scene
pub fn parse_config(text: &str) -> std::result::Result<SceneConfig, SchemaError> {
	let value: Value = serde_json::from_str(text)?;
	normalize_config(value)
}

/// File name used for exports made on the given day
pub fn export_file_name(now: chrono::DateTime<chrono::Utc>) -> String {
	format!("trident-overlay-config-{}.json", now.format("%Y-%m-%d"))
}

/// Write the current scene as pretty JSON into `dir`
#[instrument(skip(store))]
pub async fn export_file(store: &SceneStore, dir: &Path) -> Result<PathBuf> {
	let now = chrono::Utc::now();
	let config = SceneConfig::from_state(&store.state(), now.timestamp_millis());
	let path = dir.join(export_file_name(now));
	let body = config.to_json_pretty().map_err(SchemaError::from)?;

	tokio::fs::write(&path, body).await?;
	info!("Exported {} components to {}", config.components.len(), path.display());
	Ok(path)
}

/// Validate `text` and replace the scene with it.
/// Nothing is applied unless the whole document validates.
pub fn import_str(store: &SceneStore, text: &str) -> Result<SceneConfig> {
	let config = parse_config(text)?;
	store.apply_config(config.clone(), ChangeOrigin::Local);
	Ok(config)
}

#[instrument(skip(store))]
pub async fn import_file(store: &SceneStore, path: &Path) -> Result<SceneConfig> {
	let text = tokio::fs::read_to_string(path).await?;
	let config = import_str(store, &text)?;
	info!("Imported {} components from {}", config.components.len(), path.display());
	Ok(config)
}
