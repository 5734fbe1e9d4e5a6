//! Generation task endpoints
//!
//! POST   /api/v1/generate        - Start a generation task
//! GET    /api/v1/tasks/:id       - Get task status (404 on unknown id)
//! POST   /api/v1/tasks/:id/cancel - Signal cancellation
//! DELETE /api/v1/tasks/:id       - Evict a terminal task

use super::ApiError;
use crate::server::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use brandforge_core::{CreativeBrief, GenerationResult, GenerationTask, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Generation request
#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateRequest {
    /// The confirmed creative brief; all critical fields must be stated
    #[schema(value_type = Object)]
    pub brief: CreativeBrief,
    /// Optional product description block for the image prompt
    #[serde(default)]
    pub product_context: Option<String>,
    /// Whether to generate an image alongside the copy
    #[serde(default = "default_true")]
    pub generate_images: bool,
}

fn default_true() -> bool {
    true
}

/// Generation start response
#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateResponse {
    /// Id to poll or stream
    pub task_id: Uuid,
}

/// Task status view
#[derive(Debug, Serialize, ToSchema)]
pub struct TaskStatusResponse {
    pub task_id: Uuid,
    #[schema(value_type = String)]
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub result: Option<GenerationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<GenerationTask> for TaskStatusResponse {
    fn from(task: GenerationTask) -> Self {
        Self {
            task_id: task.id,
            status: task.status,
            created_at: task.created_at,
            started_at: task.started_at,
            completed_at: task.completed_at,
            result: task.result,
            error: task.error,
        }
    }
}

/// Cancellation response
#[derive(Debug, Serialize, ToSchema)]
pub struct CancelResponse {
    /// False when the task was already terminal
    pub cancelled: bool,
}

/// Start a generation task; returns immediately with the task id
#[utoipa::path(
    post,
    path = "/api/v1/generate",
    tag = "tasks",
    request_body = GenerateRequest,
    responses(
        (status = 202, description = "Task scheduled", body = GenerateResponse),
        (status = 422, description = "Brief is missing critical fields")
    )
)]
pub async fn start_generation(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<(StatusCode, Json<GenerateResponse>), ApiError> {
    let task_id = state
        .tasks
        .start(request.brief, request.product_context, request.generate_images)
        .await?;
    Ok((StatusCode::ACCEPTED, Json(GenerateResponse { task_id })))
}

/// Get the status of a task
#[utoipa::path(
    get,
    path = "/api/v1/tasks/{id}",
    tag = "tasks",
    params(("id" = Uuid, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task status", body = TaskStatusResponse),
        (status = 404, description = "Unknown task id")
    )
)]
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskStatusResponse>, ApiError> {
    let task = state.tasks.status(id).await?;
    Ok(Json(task.into()))
}

/// Signal cancellation to a running task
#[utoipa::path(
    post,
    path = "/api/v1/tasks/{id}/cancel",
    tag = "tasks",
    params(("id" = Uuid, Path, description = "Task id")),
    responses(
        (status = 200, description = "Cancellation signal result", body = CancelResponse),
        (status = 404, description = "Unknown task id")
    )
)]
pub async fn cancel_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CancelResponse>, ApiError> {
    let cancelled = state.tasks.cancel(id).await?;
    Ok(Json(CancelResponse { cancelled }))
}

/// Evict a terminal task from the registry
#[utoipa::path(
    delete,
    path = "/api/v1/tasks/{id}",
    tag = "tasks",
    params(("id" = Uuid, Path, description = "Task id")),
    responses(
        (status = 200, description = "Evicted task", body = TaskStatusResponse),
        (status = 404, description = "Unknown task id"),
        (status = 409, description = "Task is not terminal")
    )
)]
pub async fn evict_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskStatusResponse>, ApiError> {
    let task = state.tasks.registry().evict(id).await?;
    Ok(Json(task.into()))
}

/// Create tasks routes
pub fn tasks_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/generate", post(start_generation))
        .route("/api/v1/tasks/:id", get(get_task).delete(evict_task))
        .route("/api/v1/tasks/:id/cancel", post(cancel_task))
}
