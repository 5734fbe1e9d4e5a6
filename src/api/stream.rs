//! Streaming generation endpoints
//!
//! POST /api/v1/generate/stream  - Start a task and stream its progress
//! GET  /api/v1/tasks/:id/stream - Attach to an existing task
//!
//! The wire protocol is SSE: zero or more `heartbeat` events while the task
//! runs, exactly one terminal event (`agent_response` or `error`), then the
//! literal `[DONE]` sentinel. Nothing is ever emitted after the terminal
//! event. Dropping the connection cancels the in-flight task; callers that
//! want resumability poll instead.

use super::tasks::GenerateRequest;
use crate::server::AppState;
use axum::extract::{Path, State};
use axum::response::sse::{Event, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use brandforge_core::{GenerationResult, TaskRegistry, TaskStatus};
use futures::{Stream, StreamExt};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::debug;
use uuid::Uuid;

/// One frame of the streaming protocol, ordered: heartbeats, one terminal,
/// then the end marker.
#[derive(Debug)]
pub(crate) enum StreamFrame {
    /// Keepalive while the task is still running
    Heartbeat { seq: u32 },
    /// Terminal: the task completed with a result
    Completed(Box<GenerationResult>),
    /// Terminal: the task failed, timed out, or is unknown
    Error { message: String },
    /// End-of-stream sentinel
    Done,
}

impl StreamFrame {
    fn into_event(self) -> Event {
        match self {
            Self::Heartbeat { seq } => Event::default()
                .event("heartbeat")
                .data(format!("{{\"seq\":{seq}}}")),
            Self::Completed(result) => {
                let data = serde_json::to_string(result.as_ref())
                    .unwrap_or_else(|_| "{}".to_string());
                Event::default().event("agent_response").data(data)
            }
            Self::Error { message } => {
                let data = serde_json::json!({ "message": message }).to_string();
                Event::default().event("error").data(data)
            }
            Self::Done => Event::default().data("[DONE]"),
        }
    }
}

/// Cancels the watched task when the stream is dropped before its terminal
/// frame - a disconnected streaming caller abandons the computation.
struct CancelOnDrop {
    registry: Arc<TaskRegistry>,
    task_id: Uuid,
    armed: bool,
}

impl CancelOnDrop {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if self.armed {
            debug!(task_id = %self.task_id, "Stream dropped, cancelling task");
            let registry = Arc::clone(&self.registry);
            let task_id = self.task_id;
            tokio::spawn(async move {
                let _ = registry.cancel(task_id).await;
            });
        }
    }
}

/// The protocol loop: wait on the task's watch channel with a heartbeat
/// ticker, emitting exactly one terminal frame.
pub(crate) fn task_frames(
    registry: Arc<TaskRegistry>,
    task_id: Uuid,
    heartbeat_interval: Duration,
    max_heartbeats: u32,
) -> impl Stream<Item = StreamFrame> {
    async_stream::stream! {
        let mut status_rx = match registry.watch(task_id).await {
            Ok(rx) => rx,
            Err(e) => {
                yield StreamFrame::Error { message: e.to_string() };
                yield StreamFrame::Done;
                return;
            }
        };

        let mut guard = CancelOnDrop {
            registry: Arc::clone(&registry),
            task_id,
            armed: true,
        };

        let mut ticker = tokio::time::interval(heartbeat_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval fires immediately; consume the first tick so the first
        // heartbeat lands one full interval in.
        ticker.tick().await;

        let mut heartbeats = 0u32;
        let watching = loop {
            if status_rx.borrow_and_update().is_terminal() {
                break true;
            }
            tokio::select! {
                changed = status_rx.changed() => {
                    if changed.is_err() {
                        // Registry entry evicted under the stream
                        break false;
                    }
                }
                _ = ticker.tick() => {
                    heartbeats += 1;
                    if heartbeats > max_heartbeats {
                        // The task keeps running and stays pollable; only
                        // the stream gives up.
                        guard.disarm();
                        yield StreamFrame::Error {
                            message: format!(
                                "timed out after {max_heartbeats} heartbeats; poll /api/v1/tasks/{task_id} instead"
                            ),
                        };
                        yield StreamFrame::Done;
                        return;
                    }
                    yield StreamFrame::Heartbeat { seq: heartbeats };
                }
            }
        };

        guard.disarm();

        if !watching {
            yield StreamFrame::Error { message: format!("task {task_id} was evicted") };
            yield StreamFrame::Done;
            return;
        }

        match registry.get(task_id).await {
            Ok(task) if task.status == TaskStatus::Completed => {
                match task.result {
                    Some(result) => yield StreamFrame::Completed(Box::new(result)),
                    None => yield StreamFrame::Error {
                        message: "task completed without a result".to_string(),
                    },
                }
            }
            Ok(task) => {
                yield StreamFrame::Error {
                    message: task.error.unwrap_or_else(|| "generation failed".to_string()),
                };
            }
            Err(e) => yield StreamFrame::Error { message: e.to_string() },
        }
        yield StreamFrame::Done;
    }
}

type EventStream = futures::stream::BoxStream<'static, Result<Event, Infallible>>;

fn sse_response(state: &AppState, task_id: Uuid) -> Sse<EventStream> {
    let frames = task_frames(
        Arc::clone(state.tasks.registry()),
        task_id,
        Duration::from_secs(state.config.stream.heartbeat_interval_secs),
        state.config.stream.max_heartbeats,
    );
    Sse::new(StreamExt::map(frames, |frame| Ok(frame.into_event())).boxed())
}

/// Start a generation task and stream its progress.
///
/// A brief that fails validation surfaces as a terminal `error` frame so the
/// stream shape stays uniform for SSE clients.
pub async fn generate_stream(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Sse<EventStream> {
    let started = state
        .tasks
        .start(request.brief, request.product_context, request.generate_images)
        .await;

    match started {
        Ok(task_id) => sse_response(&state, task_id),
        Err(e) => {
            let frames = futures::stream::iter(vec![
                StreamFrame::Error { message: e.to_string() },
                StreamFrame::Done,
            ]);
            Sse::new(StreamExt::map(frames, |frame| Ok(frame.into_event())).boxed())
        }
    }
}

/// Attach to an existing task's stream
pub async fn attach_stream(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Sse<EventStream> {
    sse_response(&state, id)
}

/// Create streaming routes
pub fn stream_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/generate/stream", post(generate_stream))
        .route("/api/v1/tasks/:id/stream", get(attach_stream))
}
