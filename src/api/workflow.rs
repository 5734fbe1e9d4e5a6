//! Interactive workflow endpoints
//!
//! POST /api/v1/workflow/run                  - Run the handoff router, streaming events
//! POST /api/v1/workflow/:request_id/respond  - Answer a suspended run
//!
//! Workflow runs stream their events over SSE, ending with `[DONE]`. When a
//! run emits `needs_user_input` it stays suspended; the caller answers via
//! the respond endpoint and the same stream resumes.

use super::{ApiError, ApiResponse};
use crate::server::AppState;
use axum::extract::{Path, State};
use axum::response::sse::{Event, Sse};
use axum::routing::post;
use axum::{Json, Router};
use brandforge_core::WorkflowEvent;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use utoipa::ToSchema;
use uuid::Uuid;

/// Workflow run request
#[derive(Debug, Deserialize, ToSchema)]
pub struct RunWorkflowRequest {
    /// The caller's message, e.g. a creative brief or a content request
    pub message: String,
}

/// Answer to a suspended run
#[derive(Debug, Deserialize, ToSchema)]
pub struct RespondRequest {
    /// The caller's answer to the pending question
    pub answer: String,
}

/// Acknowledgement for an accepted answer
#[derive(Debug, Serialize, ToSchema)]
pub struct RespondResponse {
    pub accepted: bool,
}

fn event_name(event: &WorkflowEvent) -> &'static str {
    match event {
        WorkflowEvent::Status { .. } => "status",
        WorkflowEvent::NeedsUserInput { .. } => "needs_user_input",
        WorkflowEvent::Output { .. } => "agent_response",
        WorkflowEvent::Error { .. } => "error",
    }
}

/// Run a workflow, streaming its events
pub async fn run_workflow(
    State(state): State<AppState>,
    Json(request): Json<RunWorkflowRequest>,
) -> Sse<BoxStream<'static, Result<Event, Infallible>>> {
    let mut events = state.router.run(request.message);
    let stream = async_stream::stream! {
        while let Some(event) = events.recv().await {
            let data = serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string());
            yield Ok(Event::default().event(event_name(&event)).data(data));
            if event.is_terminal() {
                break;
            }
        }
        yield Ok(Event::default().data("[DONE]"));
    };
    Sse::new(stream.boxed())
}

/// Answer a suspended workflow run
#[utoipa::path(
    post,
    path = "/api/v1/workflow/{request_id}/respond",
    tag = "workflow",
    params(("request_id" = Uuid, Path, description = "Pending request id")),
    request_body = RespondRequest,
    responses(
        (status = 200, description = "Answer accepted"),
        (status = 404, description = "Unknown or already-answered request id")
    )
)]
pub async fn respond(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
    Json(request): Json<RespondRequest>,
) -> Result<Json<ApiResponse<RespondResponse>>, ApiError> {
    state.router.send_response(request_id, request.answer).await?;
    Ok(Json(ApiResponse::success(RespondResponse { accepted: true })))
}

/// Create workflow routes
pub fn workflow_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/workflow/run", post(run_workflow))
        .route("/api/v1/workflow/:request_id/respond", post(respond))
}
