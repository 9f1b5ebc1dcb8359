use axum::extract::State;
use axum::http::{header::CACHE_CONTROL, HeaderMap, StatusCode};
use axum::routing::get;
use axum::Router;
use overlay_scene::{ChangeOrigin, PreviewLoader, PreviewStatus, SceneError, SceneStore, SchemaError, SyncError};
use reqwest::Url;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

/// Responses served in order; the last one repeats
#[derive(Clone, Default)]
struct SceneFileServer {
	responses: Arc<Mutex<VecDeque<(StatusCode, String)>>>,
	cache_headers: Arc<Mutex<Vec<String>>>,
}

impl SceneFileServer {
	fn new(responses: Vec<(StatusCode, String)>) -> Self {
		Self {
			responses: Arc::new(Mutex::new(responses.into())),
			cache_headers: Arc::default(),
		}
	}

	fn requests(&self) -> usize {
		self.cache_headers.lock().unwrap().len()
	}

	async fn start(&self) -> Url {
		let app = Router::new().route("/scenes/main.json", get(serve_scene)).with_state(self.clone());
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		tokio::spawn(async move {
			axum::serve(listener, app).await.unwrap();
		});
		Url::parse(&format!("http://{addr}/scenes/main.json")).unwrap()
	}
}

async fn serve_scene(State(server): State<SceneFileServer>, headers: HeaderMap) -> (StatusCode, String) {
	let cache = headers.get(CACHE_CONTROL).and_then(|v| v.to_str().ok()).unwrap_or_default().to_string();
	server.cache_headers.lock().unwrap().push(cache);

	let mut responses = server.responses.lock().unwrap();
	if responses.len() > 1 {
		responses.pop_front().unwrap()
	} else {
		responses.front().cloned().unwrap()
	}
}

fn scene_body() -> String {
	json!({
		"version": 1,
		"updatedAt": 1_700_000_000_000_i64,
		"components": [{
			"type": "media", "id": "logo", "name": "Logo",
			"x": 10, "y": 10, "width": 100, "height": 100, "zIndex": 1, "loop": true,
			"props": { "src": "https://example.com/logo.png" }
		}],
		"activeThemeId": "royal-gold",
		"canvasWidth": 1280,
		"canvasHeight": 720
	})
	.to_string()
}

#[tokio::test]
async fn test_non_success_status_leaves_store_untouched() {
	let server = SceneFileServer::new(vec![(StatusCode::NOT_FOUND, String::new())]);
	let url = server.start().await;
	let store = SceneStore::new();
	let before = store.snapshot();

	let err = PreviewLoader::new(store.clone(), url, None).load_once().await.unwrap_err();
	assert!(matches!(err, SceneError::Sync(SyncError::SceneFileUnavailable(404))));
	assert_eq!(err.to_string(), "Unable to load scene file (404)");

	let after = store.snapshot();
	assert_eq!(after.revision, before.revision);
	assert_eq!(after.state, before.state);
	assert_eq!(server.cache_headers.lock().unwrap().as_slice(), ["no-store"]);
}

#[tokio::test]
async fn test_invalid_body_is_rejected_before_applying() {
	let server = SceneFileServer::new(vec![
		(StatusCode::OK, json!({ "version": 2, "components": [] }).to_string()),
		(StatusCode::OK, "{ not json".to_string()),
	]);
	let url = server.start().await;
	let store = SceneStore::new();
	let loader = PreviewLoader::new(store.clone(), url, None);

	let wrong_version = loader.load_once().await.unwrap_err();
	assert!(matches!(wrong_version, SceneError::Schema(SchemaError::UnsupportedVersion(_))));

	let garbage = loader.load_once().await.unwrap_err();
	assert!(matches!(garbage, SceneError::Sync(SyncError::Http(_))));

	assert_eq!(store.revision(), 0);
	assert_eq!(store.state().components.len(), 2);
}

#[tokio::test]
async fn test_load_once_applies_as_remote() {
	let server = SceneFileServer::new(vec![(StatusCode::OK, scene_body())]);
	let url = server.start().await;
	let store = SceneStore::new();

	let config = PreviewLoader::new(store.clone(), url, None).load_once().await.unwrap();
	assert_eq!(config.components.len(), 1);

	let snapshot = store.snapshot();
	assert_eq!(snapshot.origin, ChangeOrigin::Remote);
	assert_eq!(snapshot.state.active_theme_id, "royal-gold");
	assert!(snapshot.state.component("logo").is_some());
}

#[tokio::test]
async fn test_refresh_keeps_going_after_failure() {
	let server = SceneFileServer::new(vec![(StatusCode::INTERNAL_SERVER_ERROR, String::new()), (StatusCode::OK, scene_body())]);
	let url = server.start().await;
	let store = SceneStore::new();
	let cancel = CancellationToken::new();

	let loader = PreviewLoader::new(store.clone(), url, Some(Duration::from_millis(200)));
	let (handle, mut status) = loader.spawn(cancel.clone());

	let failed = timeout(Duration::from_secs(5), status.wait_for(|s| !matches!(s, PreviewStatus::Loading))).await.unwrap().unwrap().clone();
	assert_eq!(
		failed,
		PreviewStatus::Error {
			message: "Unable to load scene file (500)".to_string()
		}
	);
	assert_eq!(store.revision(), 0);

	let ready = timeout(Duration::from_secs(5), status.wait_for(|s| matches!(s, PreviewStatus::Ready { .. }))).await.unwrap().unwrap().clone();
	assert_eq!(ready, PreviewStatus::Ready { components: 1 });
	assert!(store.state().component("logo").is_some());
	assert!(server.requests() >= 2);

	cancel.cancel();
	timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
}
