//! Generation task and result types

use crate::agents::{Severity, Violation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Observable status of a generation task.
///
/// Status is monotonic: `Pending -> Running -> (Completed | Failed)`. A task
/// never regresses once terminal, and no other transitions are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Allocated, not yet started
    Pending,
    /// The background unit of work is executing
    Running,
    /// Finished with a result
    Completed,
    /// Finished with an error
    Failed,
}

impl TaskStatus {
    /// True for `Completed` and `Failed`
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether `self -> next` is a legal transition
    #[must_use]
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Running)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Failed)
                // A task cancelled before its unit of work starts
                | (Self::Pending, Self::Failed)
        )
    }
}

/// One unit of background generation work with an observable status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationTask {
    /// Opaque unique key
    pub id: Uuid,
    /// Current status
    pub status: TaskStatus,
    /// Allocation time
    pub created_at: DateTime<Utc>,
    /// When the unit of work began
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// When the task reached a terminal state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Populated exactly when `Completed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<GenerationResult>,
    /// Populated exactly when `Failed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationTask {
    /// Allocate a new pending task
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            status: TaskStatus::Pending,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            result: None,
            error: None,
        }
    }
}

impl Default for GenerationTask {
    fn default() -> Self {
        Self::new()
    }
}

/// The final structured result of one generation.
///
/// Never carries image bytes; the image lives in blob storage behind
/// `image_url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Generated marketing copy
    pub text_content: String,
    /// Reference to the persisted image, when one was produced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Prompt the image was generated from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_prompt: Option<String>,
    /// Why the image step failed, when it did (the task still completes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_error: Option<String>,
    /// Compliance findings over the final text and image prompt
    pub violations: Vec<Violation>,
    /// True iff at least one violation has severity `error`
    pub requires_modification: bool,
}

impl GenerationResult {
    /// Build a result; `requires_modification` is derived from the
    /// violations, never trusted from model output.
    #[must_use]
    pub fn new(
        text_content: String,
        image_url: Option<String>,
        image_prompt: Option<String>,
        image_error: Option<String>,
        violations: Vec<Violation>,
    ) -> Self {
        let requires_modification = violations
            .iter()
            .any(|v| v.severity == Severity::Error);
        Self {
            text_content,
            image_url,
            image_prompt,
            image_error,
            violations,
            requires_modification,
        }
    }
}
