use axum::extract::rejection::JsonRejection;
use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;

use crate::data_models::SearchAnswer;
use crate::pipeline::AnswerPipeline;

use super::models::{ErrorResponse, HealthResponse, SearchRequest};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(error: impl ToString) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

pub async fn search_handler(
    State(pipeline): State<Arc<AnswerPipeline>>,
    request: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchAnswer>, ApiError> {
    let Json(request) = request.map_err(|e| bad_request(e.body_text()))?;

    let answer = pipeline.run(&request.q).await.map_err(|e| {
        tracing::error!(error = %e, "search failed");
        bad_request(e)
    })?;

    Ok(Json(answer))
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
