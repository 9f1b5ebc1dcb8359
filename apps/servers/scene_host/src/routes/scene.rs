use crate::handlers::scene as routes;
use crate::AppState;
use axum::{
	extract::FromRef,
	http::{header::CONTENT_TYPE, Method},
	routing::get,
	Router,
};
use tower_http::cors::{Any, CorsLayer};

pub fn scene_routes<S>(enable_cors: bool) -> Router<S>
where
	S: Clone + Send + Sync + 'static,
	AppState: FromRef<S>,
{
	let router = Router::new().route("/api/scene", get(routes::get_scene).post(routes::post_scene));

	if !enable_cors {
		return router;
	}

	let cors = CorsLayer::new().allow_origin(Any).allow_methods([Method::GET, Method::POST]).allow_headers([CONTENT_TYPE]);
	router.layer(cors)
}
