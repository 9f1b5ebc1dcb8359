use crate::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use serde::Serialize;
use tracing::instrument;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
	status: &'static str,
	version: &'static str,
	scene_saved: bool,
}

#[axum::debug_handler]
#[instrument(name = "health", skip(state))]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
	let scene_saved = tokio::fs::try_exists(state.scenes.path()).await.unwrap_or(false);

	let response = HealthResponse {
		status: "healthy",
		version: env!("CARGO_PKG_VERSION"),
		scene_saved,
	};

	(StatusCode::OK, Json(response))
}
