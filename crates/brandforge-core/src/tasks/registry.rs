//! In-memory task registry
//!
//! Injected, server-owned state - not a module-level global. All mutation
//! goes through the map-level lock, so pollers never observe a half-written
//! task. Each entry carries a watch channel announcing status changes and a
//! cancellation token owned by the entry's unit of work.

use super::types::{GenerationResult, GenerationTask, TaskStatus};
use crate::error::{Error, Result};
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::{watch, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::warn;
use uuid::Uuid;

struct TaskEntry {
    task: GenerationTask,
    status_tx: watch::Sender<TaskStatus>,
    cancel: CancellationToken,
}

/// Shared registry of generation tasks
#[derive(Default)]
pub struct TaskRegistry {
    tasks: RwLock<HashMap<Uuid, TaskEntry>>,
}

impl TaskRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new pending task.
    ///
    /// Returns the task id and the cancellation token its unit of work
    /// observes.
    pub async fn create(&self) -> (Uuid, CancellationToken) {
        let task = GenerationTask::new();
        let id = task.id;
        let (status_tx, _) = watch::channel(TaskStatus::Pending);
        let cancel = CancellationToken::new();

        let mut tasks = self.tasks.write().await;
        tasks.insert(
            id,
            TaskEntry {
                task,
                status_tx,
                cancel: cancel.clone(),
            },
        );
        (id, cancel)
    }

    /// Snapshot a task by id. Never blocks on the unit of work.
    ///
    /// # Errors
    /// `TaskNotFound` on an unknown id.
    pub async fn get(&self, id: Uuid) -> Result<GenerationTask> {
        let tasks = self.tasks.read().await;
        tasks
            .get(&id)
            .map(|entry| entry.task.clone())
            .ok_or(Error::TaskNotFound(id))
    }

    /// Subscribe to status changes for a task.
    ///
    /// # Errors
    /// `TaskNotFound` on an unknown id.
    pub async fn watch(&self, id: Uuid) -> Result<watch::Receiver<TaskStatus>> {
        let tasks = self.tasks.read().await;
        tasks
            .get(&id)
            .map(|entry| entry.status_tx.subscribe())
            .ok_or(Error::TaskNotFound(id))
    }

    /// Transition `Pending -> Running`.
    pub async fn mark_running(&self, id: Uuid) {
        self.transition(id, TaskStatus::Running, |task| {
            task.started_at = Some(Utc::now());
        })
        .await;
    }

    /// Transition `Running -> Completed` with the result.
    pub async fn complete(&self, id: Uuid, result: GenerationResult) {
        self.transition(id, TaskStatus::Completed, |task| {
            task.completed_at = Some(Utc::now());
            task.result = Some(result);
        })
        .await;
    }

    /// Transition to `Failed` with the error.
    pub async fn fail(&self, id: Uuid, error: String) {
        self.transition(id, TaskStatus::Failed, |task| {
            task.completed_at = Some(Utc::now());
            task.error = Some(error);
        })
        .await;
    }

    /// Signal cancellation to a task's unit of work.
    ///
    /// Returns true when the signal was sent, false when the task was
    /// already terminal.
    ///
    /// # Errors
    /// `TaskNotFound` on an unknown id.
    pub async fn cancel(&self, id: Uuid) -> Result<bool> {
        let tasks = self.tasks.read().await;
        let entry = tasks.get(&id).ok_or(Error::TaskNotFound(id))?;
        if entry.task.status.is_terminal() {
            return Ok(false);
        }
        entry.cancel.cancel();
        Ok(true)
    }

    /// Remove a terminal task, making room for the external reaper policy.
    ///
    /// # Errors
    /// `TaskNotFound` on an unknown id, `TaskNotTerminal` when the task is
    /// still pending or running.
    pub async fn evict(&self, id: Uuid) -> Result<GenerationTask> {
        let mut tasks = self.tasks.write().await;
        let entry = tasks.get(&id).ok_or(Error::TaskNotFound(id))?;
        if !entry.task.status.is_terminal() {
            return Err(Error::TaskNotTerminal(id));
        }
        Ok(tasks.remove(&id).map(|e| e.task).expect("entry present"))
    }

    /// Number of registered tasks
    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    /// True when no tasks are registered
    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }

    /// Apply a guarded status transition under the map lock. Illegal
    /// transitions are dropped: a terminal task never regresses.
    async fn transition(
        &self,
        id: Uuid,
        next: TaskStatus,
        apply: impl FnOnce(&mut GenerationTask),
    ) {
        let mut tasks = self.tasks.write().await;
        let Some(entry) = tasks.get_mut(&id) else {
            warn!(task_id = %id, "Status transition for unknown task");
            return;
        };
        if !entry.task.status.can_transition_to(next) {
            warn!(
                task_id = %id,
                from = ?entry.task.status,
                to = ?next,
                "Illegal status transition dropped"
            );
            return;
        }
        entry.task.status = next;
        apply(&mut entry.task);
        // Watchers learn about the change after the task record is
        // consistent; both happen under the same map lock.
        let _ = entry.status_tx.send(next);
    }
}
