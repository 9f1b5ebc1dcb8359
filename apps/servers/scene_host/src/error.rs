use axum::body::Body;
use axum::http::{Response, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

#[derive(thiserror::Error, Debug)]
pub enum SceneHostError {
	#[error("no scene has been saved yet")]
	NoScene,

	#[error("scene must be a JSON object")]
	NotAnObject,

	#[error("unsupported scene version: {0}")]
	UnsupportedVersion(String),

	#[error("stored scene is not valid JSON: {0}")]
	CorruptScene(#[from] serde_json::Error),

	#[error("I/O error: {0}")]
	IoError(#[from] std::io::Error),

	#[error("Request timeout")]
	RequestTimeout,

	#[error("Unexpected Tower Service error: {0}")]
	TowerError(#[from] tower::BoxError),
}

impl SceneHostError {
	const fn status_code(&self) -> StatusCode {
		match self {
			Self::NoScene => StatusCode::NOT_FOUND,
			Self::NotAnObject | Self::UnsupportedVersion(_) => StatusCode::UNPROCESSABLE_ENTITY,
			Self::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
			Self::CorruptScene(_) | Self::IoError(_) | Self::TowerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

#[derive(Serialize)]
struct ErrorBody {
	error: String,
}

impl IntoResponse for SceneHostError {
	fn into_response(self) -> Response<Body> {
		let status = self.status_code();
		if status.is_server_error() {
			tracing::error!("❌ {}", self);
		}
		(status, Json(ErrorBody { error: self.to_string() })).into_response()
	}
}
