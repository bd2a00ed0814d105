use axum::{
    extract::{DefaultBodyLimit, Request},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::recommend::Recommender;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub recommender: Arc<Recommender>,
}

impl AppState {
    pub fn new(config: Config, recommender: Arc<Recommender>) -> Self {
        Self {
            config: Arc::new(config),
            recommender,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/api/recommend-movies", post(crate::api::recommend_movies))
        .route("/api/recommend-tvshows", post(crate::api::recommend_tvshows))
        .route("/api/recommend-by-genre", post(crate::api::recommend_by_genre))
        .route(
            "/api/recommend-by-description",
            post(crate::api::recommend_by_description),
        )
        .route("/api/find-movie", post(crate::api::find_movie))
        .route(
            "/api/search-by-image",
            post(crate::api::search_by_image)
                .layer(DefaultBodyLimit::max(state.config.upload.max_bytes)),
        );

    let mut router = Router::new()
        .merge(api_routes)
        .fallback(fallback_handler);

    if let Some(ref appdir) = state.config.appdir {
        router = router.fallback_service(ServeDir::new(appdir));
    }

    router
        .layer(axum::middleware::from_fn(crate::middleware::log_request))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn fallback_handler(req: Request<axum::body::Body>) -> impl IntoResponse {
    // CORS preflight for unknown paths
    if req.method() == axum::http::Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    StatusCode::NOT_FOUND.into_response()
}
