//! Creative brief model and free-text extraction
//!
//! A brief is the immutable input to generation. Five fields are critical:
//! a brief is complete iff all of them are non-empty after trimming. The
//! extraction path never invents values - a field the caller did not state
//! stays empty.

mod clarify;
#[cfg(test)]
mod tests;

pub use clarify::{BriefClarifier, BriefParse};

use serde::{Deserialize, Serialize};

/// Critical brief fields; generation may not proceed until all are stated.
pub const CRITICAL_FIELDS: &[&str] = &[
    "objectives",
    "target_audience",
    "key_message",
    "deliverable",
    "tone_and_style",
];

/// A marketing creative brief.
///
/// All fields are free text; an empty string means the caller has not stated
/// the field. Confirmed briefs are treated as immutable by everything
/// downstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreativeBrief {
    /// Campaign background
    #[serde(default)]
    pub overview: String,
    /// What the campaign should achieve (critical)
    #[serde(default)]
    pub objectives: String,
    /// Who the content speaks to (critical)
    #[serde(default)]
    pub target_audience: String,
    /// The single message to land (critical)
    #[serde(default)]
    pub key_message: String,
    /// Voice and register (critical)
    #[serde(default)]
    pub tone_and_style: String,
    /// What is being produced, e.g. "social post", "banner" (critical)
    #[serde(default)]
    pub deliverable: String,
    /// Schedule constraints
    #[serde(default)]
    pub timelines: String,
    /// Imagery direction, brand colors
    #[serde(default)]
    pub visual_guidelines: String,
    /// Call to action
    #[serde(default)]
    pub cta: String,
}

impl CreativeBrief {
    /// A brief is complete iff every critical field is non-empty after trim.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_critical_fields().is_empty()
    }

    /// Names of critical fields that are still empty.
    #[must_use]
    pub fn missing_critical_fields(&self) -> Vec<&'static str> {
        CRITICAL_FIELDS
            .iter()
            .copied()
            .filter(|name| self.field(name).is_none_or(|v| v.trim().is_empty()))
            .collect()
    }

    /// Look up a field by its snake_case name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "overview" => &self.overview,
            "objectives" => &self.objectives,
            "target_audience" => &self.target_audience,
            "key_message" => &self.key_message,
            "tone_and_style" => &self.tone_and_style,
            "deliverable" => &self.deliverable,
            "timelines" => &self.timelines,
            "visual_guidelines" => &self.visual_guidelines,
            "cta" => &self.cta,
            _ => return None,
        };
        Some(value.as_str())
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut String> {
        let value = match name {
            "overview" => &mut self.overview,
            "objectives" => &mut self.objectives,
            "target_audience" => &mut self.target_audience,
            "key_message" => &mut self.key_message,
            "tone_and_style" => &mut self.tone_and_style,
            "deliverable" => &mut self.deliverable,
            "timelines" => &mut self.timelines,
            "visual_guidelines" => &mut self.visual_guidelines,
            "cta" => &mut self.cta,
            _ => return None,
        };
        Some(value)
    }

    /// Render the brief as a labeled text block for agent prompts.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (label, value) in [
            ("Overview", &self.overview),
            ("Objectives", &self.objectives),
            ("Target audience", &self.target_audience),
            ("Key message", &self.key_message),
            ("Tone and style", &self.tone_and_style),
            ("Deliverable", &self.deliverable),
            ("Timelines", &self.timelines),
            ("Visual guidelines", &self.visual_guidelines),
            ("Call to action", &self.cta),
        ] {
            if !value.trim().is_empty() {
                out.push_str(label);
                out.push_str(": ");
                out.push_str(value.trim());
                out.push('\n');
            }
        }
        out
    }

    /// Best-effort label-scan extraction from free text.
    ///
    /// Degrade path for malformed structured output: recognized labels
    /// (case-insensitive, tolerant of synonyms) fill fields positionally,
    /// continuation lines attach to the current field, and unlabeled leading
    /// text goes to `overview`. Fields the text never labels stay empty.
    #[must_use]
    pub fn from_labeled_text(text: &str) -> Self {
        let mut brief = Self::default();
        let mut current: Option<&'static str> = None;

        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if let Some((field, rest)) = match_label(trimmed) {
                append_field(&mut brief, field, rest);
                current = Some(field);
            } else if let Some(field) = current {
                append_field(&mut brief, field, trimmed);
            } else {
                append_field(&mut brief, "overview", trimmed);
            }
        }

        brief
    }
}

/// Recognized labels and their synonyms, checked in order.
const LABEL_SYNONYMS: &[(&str, &[&str])] = &[
    ("overview", &["overview", "background", "summary", "context"]),
    ("objectives", &["objectives", "objective", "goals", "goal"]),
    ("target_audience", &["target audience", "audience", "demographic"]),
    ("key_message", &["key message", "key messages", "main message", "message"]),
    ("tone_and_style", &["tone and style", "tone & style", "tone", "style", "voice"]),
    ("deliverable", &["deliverable", "deliverables", "format", "asset"]),
    ("timelines", &["timelines", "timeline", "deadline", "schedule", "timing"]),
    (
        "visual_guidelines",
        &["visual guidelines", "visuals", "imagery", "visual direction"],
    ),
    ("cta", &["cta", "call to action", "call-to-action"]),
];

/// Match a `Label: value` line against the synonym table.
fn match_label(line: &str) -> Option<(&'static str, &str)> {
    let (head, rest) = line.split_once(':')?;
    let head = head.trim().to_lowercase();
    // Labels are short; a long head is prose that happens to contain a colon.
    if head.len() > 24 {
        return None;
    }
    for (field, synonyms) in LABEL_SYNONYMS {
        if synonyms.contains(&head.as_str()) {
            return Some((field, rest.trim()));
        }
    }
    None
}

fn append_field(brief: &mut CreativeBrief, field: &str, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(value) = brief.field_mut(field) {
        if !value.is_empty() {
            value.push(' ');
        }
        value.push_str(text);
    }
}
