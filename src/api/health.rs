//! Health check endpoints
//!
//! - `/health` - simple "healthy" + version (for load balancers)
//! - `/health/detailed` - per-component status (tasks, pending workflow requests)

use crate::server::AppState;
use axum::extract::State;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Serialize;

/// Simple health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Detailed health response with per-component checks
#[derive(Debug, Serialize)]
pub struct DetailedHealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub checks: HealthChecks,
}

/// All component health checks
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub tasks: ComponentHealth,
    pub pending_requests: ComponentHealth,
}

/// Individual component health status
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ComponentHealth {
    fn healthy_with_details(details: serde_json::Value) -> Self {
        Self {
            status: "healthy",
            details: Some(details),
        }
    }
}

/// Simple health check (for load balancers)
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Detailed health check with component statuses
async fn detailed_health_check(State(state): State<AppState>) -> Json<DetailedHealthResponse> {
    let task_count = state.tasks.registry().len().await;
    let pending_count = state.router.pending().len().await;

    Json(DetailedHealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        checks: HealthChecks {
            tasks: ComponentHealth::healthy_with_details(serde_json::json!({
                "registered_tasks": task_count,
            })),
            pending_requests: ComponentHealth::healthy_with_details(serde_json::json!({
                "awaiting_answer": pending_count,
            })),
        },
    })
}

/// Create health routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/detailed", get(detailed_health_check))
}
