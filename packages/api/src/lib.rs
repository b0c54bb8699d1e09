//! HTTP surface for the print queue.
//!
//! This crate wires a [`PrintDesk`] into an axum router:
//! - Job submission (multipart upload) and listing
//! - Operator transitions (accept, complete, reject, rename)
//! - Document downloads
//! - Real-time events (SSE streaming)

mod documents;
mod error;
mod jobs;
mod realtime;

use actors::PrintDesk;
use axum::Json;
use axum::Router;
use axum::extract::{DefaultBodyLimit, State};
use axum::routing::{get, post};
use serde::Serialize;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub use documents::fetch_document;
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use jobs::{
    RenameRequest, SubmitResponse, accept_job, complete_job, get_job, list_jobs, queue_stats,
    reject_job, rename_job, submit_job,
};
pub use realtime::{event_stream, sse_event};

/// Largest accepted request body; uploads are whole documents.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub jobs: u64,
}

/// Liveness check that also proves the queue actor still answers.
pub async fn health(State(desk): State<PrintDesk>) -> ApiResult<Json<HealthResponse>> {
    let stats = desk.stats().await?;
    Ok(Json(HealthResponse {
        status: "ok",
        jobs: stats.total(),
    }))
}

pub fn create_router(desk: PrintDesk) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health))
        .route("/jobs", get(list_jobs).post(submit_job))
        .route("/jobs/stats", get(queue_stats))
        .route("/jobs/{id}", get(get_job))
        .route("/jobs/{id}/accept", post(accept_job))
        .route("/jobs/{id}/complete", post(complete_job))
        .route("/jobs/{id}/reject", post(reject_job))
        .route("/jobs/{id}/rename", post(rename_job))
        .route("/documents/{name}", get(fetch_document))
        .route("/events", get(event_stream))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(trace_layer)
        .with_state(desk)
}
