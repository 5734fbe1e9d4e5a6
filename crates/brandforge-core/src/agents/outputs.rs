//! Structured output contracts
//!
//! Every agent emits JSON with a defined shape. Decoding is strict where the
//! output carries authority (routing decisions) and lenient where free text
//! is an acceptable degrade (specialist replies).

use super::AgentName;
use crate::brief::CreativeBrief;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// Where the coordinator sends control next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    /// Return control to the external caller
    User,
    /// Hand off to a named agent
    Agent(AgentName),
}

impl RouteTarget {
    /// The target agent, if control stays inside the graph
    #[must_use]
    pub fn agent(&self) -> Option<AgentName> {
        match self {
            Self::User => None,
            Self::Agent(name) => Some(*name),
        }
    }
}

impl<'de> Deserialize<'de> for RouteTarget {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw == "user" {
            return Ok(Self::User);
        }
        AgentName::from_str(&raw)
            .map(Self::Agent)
            .map_err(|e| D::Error::custom(e.to_string()))
    }
}

/// The coordinator's routing decision, decoded from its JSON output.
///
/// Decoding is strict: unknown fields or an unrecognized target are decode
/// errors, which the router maps to the illegal-handoff path rather than
/// guessing.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingDecision {
    /// Next hop: an agent name or "user"
    pub route_to: RouteTarget,
    /// Message for the target: a work request for an agent, or the final
    /// reply when returning to the user
    #[serde(default)]
    pub message: String,
}

impl RoutingDecision {
    /// Decode a coordinator output.
    ///
    /// # Errors
    /// Returns the serde error when the output is not the expected schema.
    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(extract_json(raw))
    }
}

/// A specialist's reply
#[derive(Debug, Clone, Deserialize)]
pub struct SpecialistReply {
    /// The produced content
    #[serde(default)]
    pub content: String,
    /// True when the specialist cannot proceed without the caller
    #[serde(default)]
    pub needs_user_input: bool,
}

impl SpecialistReply {
    /// Decode a specialist output, degrading to plain text.
    ///
    /// Specialists carry no routing authority, so a malformed reply is kept
    /// as free-form content rather than failing the turn.
    #[must_use]
    pub fn decode(raw: &str) -> Self {
        match serde_json::from_str::<Self>(extract_json(raw)) {
            Ok(reply) if !reply.content.trim().is_empty() => reply,
            _ => Self {
                content: raw.trim().to_string(),
                needs_user_input: false,
            },
        }
    }
}

/// Completeness status claimed by the planning agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BriefStatus {
    /// All critical fields stated
    Complete,
    /// At least one critical field missing
    Incomplete,
}

/// The planning agent's brief analysis.
///
/// The claimed `status` is advisory; the clarification loop re-checks the
/// critical fields independently before trusting it.
#[derive(Debug, Clone, Deserialize)]
pub struct BriefAnalysis {
    /// Claimed completeness
    pub status: BriefStatus,
    /// Fields extracted verbatim from the caller's text
    #[serde(default)]
    pub extracted_fields: CreativeBrief,
    /// Fields the agent reports as missing
    #[serde(default)]
    pub missing_fields: Vec<String>,
    /// Question to send back to the caller when incomplete
    #[serde(default)]
    pub clarifying_message: Option<String>,
}

impl BriefAnalysis {
    /// Decode a planning output.
    ///
    /// # Errors
    /// Returns the serde error when the output is not the expected schema;
    /// the caller falls back to label-scan extraction.
    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(extract_json(raw))
    }
}

/// Severity of a compliance violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational note
    Info,
    /// Should be reviewed
    Warning,
    /// Blocks publication; content requires modification
    Error,
}

/// One compliance finding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// How serious the finding is
    pub severity: Severity,
    /// What was found
    pub message: String,
    /// How to address it
    #[serde(default)]
    pub suggestion: String,
}

/// The compliance agent's review
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComplianceReport {
    /// Findings over the final text and image prompt
    #[serde(default)]
    pub violations: Vec<Violation>,
}

impl ComplianceReport {
    /// Decode a compliance output.
    ///
    /// # Errors
    /// Returns the serde error when the output is not the expected schema.
    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(extract_json(raw))
    }
}

/// Strip code fences and surrounding prose, keeping the outermost JSON
/// object. Models wrap JSON in markdown often enough that decoding the raw
/// text directly would reject valid answers.
fn extract_json(raw: &str) -> &str {
    let trimmed = raw.trim();
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}
