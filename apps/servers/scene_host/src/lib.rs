use axum::{error_handling::HandleErrorLayer, extract::FromRef, Router};
use std::sync::Arc;
use std::time::Duration;
use tower::{timeout::TimeoutLayer, BoxError, ServiceBuilder};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod scene_file;

pub use config::Config;
pub use error::SceneHostError;
pub use scene_file::SceneFile;

#[derive(Clone)]
pub struct AppState {
	pub config: Arc<Config>,
	pub scenes: Arc<SceneFile>,
}

impl AppState {
	pub fn build(config: Arc<Config>) -> Self {
		let scenes = Arc::new(SceneFile::new(config.scene_file.clone()));
		Self { config, scenes }
	}
}

impl FromRef<AppState> for Arc<Config> {
	fn from_ref(state: &AppState) -> Self {
		state.config.clone()
	}
}

async fn handle_tower_error(error: BoxError) -> SceneHostError {
	if error.is::<tower::timeout::error::Elapsed>() {
		tracing::warn!("Request timeout: {}", error);
		SceneHostError::RequestTimeout
	} else {
		tracing::error!("Unhandled tower error: {}", error);
		SceneHostError::TowerError(error)
	}
}

/// Every route of the scene host with its middleware stack
pub fn app(state: AppState) -> Router {
	let timeout = Duration::from_millis(state.config.request_timeout_ms);

	Router::new()
		.merge(routes::scene::scene_routes(state.config.enable_cors))
		.merge(routes::health::get_health())
		.with_state(state)
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(HandleErrorLayer::new(handle_tower_error))
				.layer(TimeoutLayer::new(timeout)),
		)
}
