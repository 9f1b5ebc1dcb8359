use crate::{AppState, SceneHostError};
use axum::{extract::State, http::StatusCode, Json};
use overlay_scene::SchemaError;
use serde_json::Value;
use tracing::{info, instrument};

#[axum::debug_handler]
#[instrument(name = "get_scene", skip(state))]
pub async fn get_scene(State(state): State<AppState>) -> Result<Json<Value>, SceneHostError> {
	let scene = state.scenes.load().await?.ok_or(SceneHostError::NoScene)?;
	Ok(Json(scene))
}

#[axum::debug_handler]
#[instrument(name = "post_scene", skip(state, scene))]
pub async fn post_scene(State(state): State<AppState>, Json(scene): Json<Value>) -> Result<StatusCode, SceneHostError> {
	check_version(&scene)?;
	state.scenes.save(&scene).await?;

	let updated_at = scene.get("updatedAt").and_then(Value::as_i64).unwrap_or_default();
	info!("💾 Scene saved (updatedAt {})", updated_at);
	Ok(StatusCode::OK)
}

/// The only server-side validation: the document is an object of the current schema version
fn check_version(scene: &Value) -> Result<(), SceneHostError> {
	let object = scene.as_object().ok_or(SceneHostError::NotAnObject)?;
	overlay_scene::check_version(object).map_err(|e| match e {
		SchemaError::UnsupportedVersion(version) => SceneHostError::UnsupportedVersion(version),
		_ => SceneHostError::NotAnObject,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_check_version() {
		assert!(check_version(&json!({ "version": 1, "components": "anything" })).is_ok());
		assert!(check_version(&json!({ "version": 1.0 })).is_ok());
		assert!(matches!(check_version(&json!({ "version": 2 })), Err(SceneHostError::UnsupportedVersion(v)) if v == "2"));
		assert!(matches!(check_version(&json!({})), Err(SceneHostError::UnsupportedVersion(_))));
		assert!(matches!(check_version(&json!([1])), Err(SceneHostError::NotAnObject)));
	}
}
