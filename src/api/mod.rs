use axum::http::{HeaderValue, Method, header};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::pipeline::AnswerPipeline;

pub mod handlers;
pub mod models;

pub fn create_router(pipeline: Arc<AnswerPipeline>, allowed_origin: HeaderValue) -> Router {
    // Only the configured front-end may call us from a browser
    let cors = CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/search", post(handlers::search_handler))
        .route("/health", get(handlers::health_handler))
        .with_state(pipeline)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
