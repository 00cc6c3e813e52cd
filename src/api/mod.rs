pub mod page;
pub mod search;
pub mod server;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use mlsearch::search::{ErrorKind, PipelineError, Stage};

/// Error body: `{"error": {"stage", "kind", "message"}}` / 错误响应
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub stage: Stage,
    pub kind: ErrorKind,
    pub message: String,
}

/// Pipeline failure as an HTTP response / 流水线错误转 HTTP 响应
pub struct ApiError(pub PipelineError);

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.kind {
            ErrorKind::SegmentationFailure => StatusCode::BAD_REQUEST,
            ErrorKind::SearchUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::QueryRejected => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorResponse {
            error: ErrorDetail {
                stage: self.0.stage,
                kind: self.0.kind,
                message: self.0.message,
            },
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(page::index))
        .route("/api/health", get(server::health_check))
        .route("/search", get(search::search_get).post(search::search_post))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
