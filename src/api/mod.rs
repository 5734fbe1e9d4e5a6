//! Web API module for brandforge
//!
//! Provides REST and SSE endpoints for:
//! - Brief parsing and clarification
//! - Generation task start / status / cancel / evict
//! - Streaming generation progress
//! - Interactive workflow runs and resume
//! - Health checks

pub mod briefs;
pub mod health;
pub mod stream;
pub mod tasks;
pub mod workflow;

use crate::server::AppState;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use utoipa::OpenApi;

/// API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Error type for API handlers; maps the core taxonomy onto status codes.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl From<brandforge_core::Error> for ApiError {
    fn from(err: brandforge_core::Error) -> Self {
        use brandforge_core::Error;
        let status = match &err {
            Error::TaskNotFound(_) | Error::PendingNotFound(_) => StatusCode::NOT_FOUND,
            Error::Validation(_) | Error::SafetyRefusal(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::TaskNotTerminal(_) => StatusCode::CONFLICT,
            Error::Capability(e) if e.is_transient() => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::<()>::error(self.message))).into_response()
    }
}

/// OpenAPI description of the JSON surface (SSE endpoints excluded)
#[derive(OpenApi)]
#[openapi(
    paths(
        briefs::parse_brief,
        tasks::start_generation,
        tasks::get_task,
        tasks::cancel_task,
        tasks::evict_task,
        workflow::respond,
    ),
    components(schemas(
        briefs::ParseBriefRequest,
        briefs::ParseBriefResponse,
        tasks::GenerateRequest,
        tasks::GenerateResponse,
        tasks::TaskStatusResponse,
        tasks::CancelResponse,
        workflow::RespondRequest,
    ))
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Create the API router with all endpoints
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .merge(health::health_routes())
        .merge(briefs::briefs_routes())
        .merge(tasks::tasks_routes())
        .merge(stream::stream_routes())
        .merge(workflow::workflow_routes())
        .route("/api/v1/openapi.json", get(openapi_json))
        .with_state(state)
}
