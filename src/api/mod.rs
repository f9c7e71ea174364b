use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::{
    activity::{ActivityError, ActivityPipeline},
    models::is_valid_address,
    pipeline_stats::{PipelineSnapshot, PIPELINE_STATS},
};

const ACTIVITY_CACHE_CONTROL: &str = "public, s-maxage=300, stale-while-revalidate=600";

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ActivityPipeline>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("invalid address format")]
    InvalidAddress,
    #[error(transparent)]
    Activity(#[from] ActivityError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::InvalidAddress => (StatusCode::BAD_REQUEST, "Invalid address format"),
            ApiError::Activity(err) => {
                tracing::error!("activity API error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch activity")
            }
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn activity(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Response, ApiError> {
    if !is_valid_address(&address) {
        return Err(ApiError::InvalidAddress);
    }

    let result = state.pipeline.get_activity_summary(&address).await?;
    Ok((
        [(header::CACHE_CONTROL, ACTIVITY_CACHE_CONTROL)],
        Json(result),
    )
        .into_response())
}

async fn pipeline_stats() -> Json<PipelineSnapshot> {
    Json(PIPELINE_STATS.snapshot())
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/activity/:address", get(activity))
        .route("/stats/pipeline", get(pipeline_stats))
        .with_state(state)
}

pub async fn run_http_server(addr: &str, state: AppState) -> Result<()> {
    let app = app_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
