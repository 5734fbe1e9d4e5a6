//! Brief clarification loop
//!
//! Two-phase extraction: the planning agent proposes a structured analysis,
//! then the wrapper independently re-checks the critical fields before
//! trusting the claimed status. The upstream model is not guaranteed to honor
//! its no-hallucination instruction, so a claimed `complete` with an empty
//! critical field is downgraded to incomplete here.

use super::CreativeBrief;
use crate::agents::{Agent, AgentName, BriefAnalysis, BriefStatus};
use crate::error::{Error, Result};
use brandforge_llm::{ChatCompletion, Message};
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of parsing a free-text brief
#[derive(Debug, Clone)]
pub struct BriefParse {
    /// Extracted draft; unusable when `blocked`
    pub draft: CreativeBrief,
    /// Question to send back to the caller, or the refusal explanation when
    /// `blocked`
    pub clarifying_question: Option<String>,
    /// True when the upstream safety layer refused the request outright
    pub blocked: bool,
}

impl BriefParse {
    fn blocked(explanation: String) -> Self {
        Self {
            draft: CreativeBrief::default(),
            clarifying_question: Some(explanation),
            blocked: true,
        }
    }
}

/// Turns free text into a `CreativeBrief`, asking follow-up questions rather
/// than inventing missing information.
pub struct BriefClarifier {
    planning: Agent,
}

impl BriefClarifier {
    /// Create a clarifier backed by the given chat port
    #[must_use]
    pub fn new(chat: Arc<dyn ChatCompletion>) -> Self {
        Self {
            planning: Agent::new(AgentName::Planning, chat),
        }
    }

    /// Parse a free-text brief.
    ///
    /// Clarification questions are normal output, not errors. Only transport
    /// failures propagate as `Err`; a safety refusal comes back as
    /// `blocked: true` with the refusal text in place of the question.
    ///
    /// # Errors
    /// Transient upstream failures (`Unavailable`, `RateLimited`, timeouts).
    pub async fn parse(&self, brief_text: &str) -> Result<BriefParse> {
        let raw = match self
            .planning
            .invoke(&[Message::user(brief_text)])
            .await
        {
            Ok(raw) => raw,
            Err(Error::Capability(brandforge_llm::Error::SafetyRefused(msg))) => {
                return Ok(BriefParse::blocked(msg));
            }
            Err(e) => return Err(e),
        };

        let analysis = match BriefAnalysis::decode(&raw) {
            Ok(analysis) => analysis,
            Err(e) => {
                // Degrade path: fill fields from recognized labels only.
                // Never asks a question; fields the text does not label stay
                // empty, which keeps the no-hallucination property.
                warn!(error = %e, "Planning output not parseable, using label-scan extraction");
                return Ok(BriefParse {
                    draft: CreativeBrief::from_labeled_text(brief_text),
                    clarifying_question: None,
                    blocked: false,
                });
            }
        };

        let draft = analysis.extracted_fields;
        let missing = draft.missing_critical_fields();

        if missing.is_empty() {
            debug!("Brief complete, all critical fields stated");
            return Ok(BriefParse {
                draft,
                clarifying_question: None,
                blocked: false,
            });
        }

        let question = if analysis.status == BriefStatus::Complete {
            // The agent claimed complete but a critical field is empty.
            // Its clarifying message (if any) was written for a different
            // conclusion, so use the independent check's result instead.
            warn!(
                missing = ?missing,
                "Planning claimed complete with empty critical fields, downgrading"
            );
            clarifying_fallback(&missing)
        } else {
            analysis
                .clarifying_message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| clarifying_fallback(&missing))
        };

        Ok(BriefParse {
            draft,
            clarifying_question: Some(question),
            blocked: false,
        })
    }
}

/// Generic clarifying question listing the missing critical fields.
fn clarifying_fallback(missing: &[&'static str]) -> String {
    let fields = missing
        .iter()
        .map(|f| f.replace('_', " "))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "To produce content that matches your intent, please also provide: {fields}."
    )
}
