use axum::body::{to_bytes, Body};
use axum::http::{header::CONTENT_TYPE, Method, Request, StatusCode};
use axum::Router;
use scene_host::{app, AppState, Config};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;

fn test_config(scene_file: &Path) -> Config {
	Config {
		log_json: false,
		rust_log: None,
		host: "127.0.0.1".to_string(),
		port: 0,
		scene_file: scene_file.to_path_buf(),
		enable_cors: false,
		request_timeout_ms: 5_000,
	}
}

fn router(scene_file: &Path) -> Router {
	app(AppState::build(Arc::new(test_config(scene_file))))
}

fn post(body: &Value) -> Request<Body> {
	Request::builder()
		.method(Method::POST)
		.uri("/api/scene")
		.header(CONTENT_TYPE, "application/json")
		.body(Body::from(body.to_string()))
		.unwrap()
}

fn get(uri: &str) -> Request<Body> {
	Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
	let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
	serde_json::from_slice(&bytes).unwrap()
}

fn scene(updated_at: i64) -> Value {
	json!({
		"version": 1,
		"updatedAt": updated_at,
		"components": [],
		"activeThemeId": "dark-modern",
		"themeOverrides": {},
		"canvasWidth": 1920,
		"canvasHeight": 1080
	})
}

#[tokio::test]
async fn test_get_before_any_save_is_not_found() {
	let dir = tempfile::tempdir().unwrap();
	let response = router(&dir.path().join("scene.json")).oneshot(get("/api/scene")).await.unwrap();
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_post_then_get_returns_saved_scene() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("data").join("scene.json");

	let response = router(&path).oneshot(post(&scene(1_700_000_000_000))).await.unwrap();
	assert_eq!(response.status(), StatusCode::OK);
	assert!(path.exists());

	// a fresh router reads what the previous one wrote
	let response = router(&path).oneshot(get("/api/scene")).await.unwrap();
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(json_body(response).await, scene(1_700_000_000_000));
}

#[tokio::test]
async fn test_later_post_replaces_scene() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("scene.json");
	let app = router(&path);

	app.clone().oneshot(post(&scene(1))).await.unwrap();
	app.clone().oneshot(post(&scene(2))).await.unwrap();

	let body = json_body(app.oneshot(get("/api/scene")).await.unwrap()).await;
	assert_eq!(body["updatedAt"], 2);
}

#[tokio::test]
async fn test_rejects_wrong_version_and_non_objects() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("scene.json");
	let app = router(&path);

	let mut wrong_version = scene(5);
	wrong_version["version"] = json!(2);
	let response = app.clone().oneshot(post(&wrong_version)).await.unwrap();
	assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
	assert_eq!(json_body(response).await["error"], "unsupported scene version: 2");

	let response = app.clone().oneshot(post(&json!([1, 2, 3]))).await.unwrap();
	assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

	assert!(!path.exists());
}

#[tokio::test]
async fn test_write_failure_is_server_error() {
	let dir = tempfile::tempdir().unwrap();
	// the scene path is an existing directory, so the final rename fails
	let path = dir.path().join("occupied");
	std::fs::create_dir_all(path.join("child")).unwrap();

	let response = router(&path).oneshot(post(&scene(1))).await.unwrap();
	assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_health() {
	let dir = tempfile::tempdir().unwrap();
	let response = router(&dir.path().join("scene.json")).oneshot(get("/health")).await.unwrap();
	assert_eq!(response.status(), StatusCode::OK);

	let body = json_body(response).await;
	assert_eq!(body["status"], "healthy");
	assert_eq!(body["sceneSaved"], false);
}
