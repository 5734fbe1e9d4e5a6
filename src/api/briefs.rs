//! Brief parsing endpoint
//!
//! POST /api/v1/briefs/parse - Extract a creative brief from free text

use super::ApiError;
use crate::server::AppState;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use brandforge_core::CreativeBrief;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Brief parsing request
#[derive(Debug, Deserialize, ToSchema)]
pub struct ParseBriefRequest {
    /// Free-text creative brief
    pub brief_text: String,
}

/// Brief parsing response.
///
/// `blocked` is a distinguished shape: when true, `clarifying_question`
/// carries the upstream refusal explanation and the draft is unusable.
#[derive(Debug, Serialize, ToSchema)]
pub struct ParseBriefResponse {
    /// Extracted draft brief
    #[schema(value_type = Object)]
    pub draft: CreativeBrief,
    /// Follow-up question, when the brief is incomplete
    pub clarifying_question: Option<String>,
    /// True when the upstream safety layer refused the request
    pub blocked: bool,
    /// True when every critical field is stated
    pub complete: bool,
}

/// Parse a free-text brief into a draft, asking for anything missing
#[utoipa::path(
    post,
    path = "/api/v1/briefs/parse",
    tag = "briefs",
    request_body = ParseBriefRequest,
    responses(
        (status = 200, description = "Draft brief with optional clarifying question", body = ParseBriefResponse),
        (status = 503, description = "Chat capability unavailable")
    )
)]
pub async fn parse_brief(
    State(state): State<AppState>,
    Json(request): Json<ParseBriefRequest>,
) -> Result<Json<ParseBriefResponse>, ApiError> {
    let parse = state.clarifier.parse(&request.brief_text).await?;
    let complete = !parse.blocked && parse.draft.is_complete();
    Ok(Json(ParseBriefResponse {
        draft: parse.draft,
        clarifying_question: parse.clarifying_question,
        blocked: parse.blocked,
        complete,
    }))
}

/// Create briefs routes
pub fn briefs_routes() -> Router<AppState> {
    Router::new().route("/api/v1/briefs/parse", post(parse_brief))
}
