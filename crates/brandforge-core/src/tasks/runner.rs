//! Generation task manager
//!
//! Decouples "generate content for this brief" from the request that asked
//! for it. `start` allocates a task and schedules the unit of work on the
//! runtime; callers poll, stream, or disconnect without losing the
//! computation. The spawned unit of work is the sole writer of its task.

use super::registry::TaskRegistry;
use super::types::{GenerationResult, GenerationTask};
use crate::agents::{Agent, AgentName, ComplianceReport, Severity, SpecialistReply, Violation};
use crate::brief::CreativeBrief;
use crate::budget::{condense_product_context, enforce_budget};
use crate::error::{Error, Result};
use crate::storage::BlobStore;
use brandforge_llm::{ChatCompletion, ImageGeneration, ImageQuality, ImageSize, Message};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Generation settings
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Character budget for the image model's prompt
    pub image_prompt_budget: usize,
    /// Output dimensions
    pub image_size: ImageSize,
    /// Rendering quality
    pub image_quality: ImageQuality,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            image_prompt_budget: 1000,
            image_size: ImageSize::Square,
            image_quality: ImageQuality::Standard,
        }
    }
}

/// Owns the lifecycle of generation tasks.
pub struct TaskManager {
    registry: Arc<TaskRegistry>,
    worker: Arc<GenerationWorker>,
}

impl TaskManager {
    /// Create a manager over the given ports and registry
    #[must_use]
    pub fn new(
        chat: Arc<dyn ChatCompletion>,
        images: Arc<dyn ImageGeneration>,
        blobs: Arc<dyn BlobStore>,
        registry: Arc<TaskRegistry>,
        config: GenerationConfig,
    ) -> Self {
        let worker = Arc::new(GenerationWorker {
            text_agent: Agent::new(AgentName::TextContent, Arc::clone(&chat)),
            image_agent: Agent::new(AgentName::ImageContent, Arc::clone(&chat)),
            compliance_agent: Agent::new(AgentName::Compliance, chat),
            images,
            blobs,
            config,
        });
        Self { registry, worker }
    }

    /// The shared task registry
    #[must_use]
    pub fn registry(&self) -> &Arc<TaskRegistry> {
        &self.registry
    }

    /// Allocate a task for the brief and schedule its generation.
    ///
    /// Returns immediately with the task id; the generation runs as an
    /// independent unit of work.
    ///
    /// # Errors
    /// `Validation` when the brief is incomplete - rejected before any task
    /// is created.
    pub async fn start(
        &self,
        brief: CreativeBrief,
        product_context: Option<String>,
        generate_images: bool,
    ) -> Result<Uuid> {
        let missing = brief.missing_critical_fields();
        if !missing.is_empty() {
            return Err(Error::Validation(format!(
                "brief is missing critical fields: {}",
                missing.join(", ")
            )));
        }

        let (id, cancel) = self.registry.create().await;
        let registry = Arc::clone(&self.registry);
        let worker = Arc::clone(&self.worker);

        tokio::spawn(async move {
            registry.mark_running(id).await;
            let outcome = tokio::select! {
                () = cancel.cancelled() => Err("generation cancelled".to_string()),
                result = worker.execute(&brief, product_context.as_deref(), generate_images) => {
                    result.map_err(|e| e.to_string())
                }
            };
            match outcome {
                Ok(result) => {
                    info!(task_id = %id, "Generation completed");
                    registry.complete(id, result).await;
                }
                Err(error) => {
                    warn!(task_id = %id, %error, "Generation failed");
                    registry.fail(id, error).await;
                }
            }
        });

        Ok(id)
    }

    /// Snapshot a task's status. Never blocks on the unit of work.
    ///
    /// # Errors
    /// `TaskNotFound` on an unknown id.
    pub async fn status(&self, id: Uuid) -> Result<GenerationTask> {
        self.registry.get(id).await
    }

    /// Signal cancellation; returns false when already terminal.
    ///
    /// # Errors
    /// `TaskNotFound` on an unknown id.
    pub async fn cancel(&self, id: Uuid) -> Result<bool> {
        self.registry.cancel(id).await
    }
}

/// The per-task unit of work. Steps run in a fixed sequential order so
/// compliance always sees the final text and the final image prompt.
struct GenerationWorker {
    text_agent: Agent,
    image_agent: Agent,
    compliance_agent: Agent,
    images: Arc<dyn ImageGeneration>,
    blobs: Arc<dyn BlobStore>,
    config: GenerationConfig,
}

impl GenerationWorker {
    async fn execute(
        &self,
        brief: &CreativeBrief,
        product_context: Option<&str>,
        generate_images: bool,
    ) -> Result<GenerationResult> {
        // Step 1: text content. This is the only step whose failure fails
        // the whole task.
        let text_content = self.generate_text(brief, product_context).await?;

        // Steps 2-3: image prompt, generation, persistence. Failures here
        // yield a partial result with `image_error` populated.
        let mut image_url = None;
        let mut image_prompt = None;
        let mut image_error = None;
        if generate_images {
            match self.generate_image(brief, product_context).await {
                Ok((url, prompt)) => {
                    image_url = Some(url);
                    image_prompt = Some(prompt);
                }
                Err(e) => {
                    warn!(error = %e, "Image generation failed, returning partial result");
                    image_error = Some(e.to_string());
                }
            }
        }

        // Step 4: compliance review over the final text and image prompt.
        let violations = match self.review(&text_content, image_prompt.as_deref()).await {
            Ok(violations) => violations,
            Err(e) => {
                warn!(error = %e, "Compliance review unavailable");
                vec![Violation {
                    severity: Severity::Warning,
                    message: format!("compliance review unavailable: {e}"),
                    suggestion: "re-run the review before publishing".to_string(),
                }]
            }
        };

        Ok(GenerationResult::new(
            text_content,
            image_url,
            image_prompt,
            image_error,
            violations,
        ))
    }

    async fn generate_text(
        &self,
        brief: &CreativeBrief,
        product_context: Option<&str>,
    ) -> Result<String> {
        let mut request = format!("Write the marketing copy for this brief:\n{}", brief.render());
        if let Some(context) = product_context {
            request.push_str("\nProduct context:\n");
            request.push_str(context);
        }
        let raw = self.text_agent.invoke(&[Message::user(request)]).await?;
        Ok(SpecialistReply::decode(&raw).content)
    }

    async fn generate_image(
        &self,
        brief: &CreativeBrief,
        product_context: Option<&str>,
    ) -> Result<(String, String)> {
        let mut request = format!(
            "Design an image prompt for this brief:\n{}",
            brief.render()
        );
        if let Some(context) = product_context {
            // Product descriptions can dwarf the image model's prompt
            // budget; reduce them to their visually relevant lines first.
            let condensed = condense_product_context(context, self.config.image_prompt_budget);
            request.push_str("\nProduct context:\n");
            request.push_str(&condensed);
        }

        let raw = self.image_agent.invoke(&[Message::user(request)]).await?;
        let prompt = enforce_budget(
            &SpecialistReply::decode(&raw).content,
            self.config.image_prompt_budget,
        );

        let bytes = self
            .images
            .generate(&prompt, self.config.image_size, self.config.image_quality)
            .await?;

        // The stored result carries a reference, never the bytes.
        let url = self.blobs.put(bytes, "image/png").await?;
        Ok((url, prompt))
    }

    async fn review(&self, text: &str, image_prompt: Option<&str>) -> Result<Vec<Violation>> {
        let mut request = format!("Review this marketing copy:\n{text}");
        if let Some(prompt) = image_prompt {
            request.push_str("\nImage prompt:\n");
            request.push_str(prompt);
        }
        let raw = self.compliance_agent.invoke(&[Message::user(request)]).await?;
        let report = ComplianceReport::decode(&raw)
            .map_err(|e| Error::Internal(format!("compliance output not parseable: {e}")))?;
        Ok(report.violations)
    }
}
