//! Image prompt budgeting
//!
//! Keeps an image-generation prompt within the target model's character
//! budget while preserving the most visually relevant information. The
//! reduction is lossy but deterministic for the same input and budget.

use regex::Regex;
use std::sync::OnceLock;

/// Marker appended when a hard truncation occurred
pub const TRUNCATION_MARKER: &str = " [truncated]";

/// Finish and material keywords worth keeping for image prompts
const MATERIAL_KEYWORDS: &[&str] = &[
    "matte", "gloss", "glossy", "satin", "metallic", "brushed", "polished", "leather", "suede",
    "wood", "wooden", "ceramic", "glass", "fabric", "cotton", "linen", "wool", "steel",
    "aluminum", "aluminium", "chrome", "finish", "texture",
];

fn color_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)#[0-9a-f]{3,8}\b|\brgb\s*\(|\bcolou?rs?\b|\bpalette\b")
            .expect("color pattern is valid")
    })
}

/// Reduce a product-description block to its visually relevant lines.
///
/// Keeps section-intro lines, color references, finish/material mentions,
/// and the first two sentences of every remaining descriptive paragraph.
/// If the reduction still exceeds `budget`, the text is hard-truncated with
/// an explicit marker.
#[must_use]
pub fn condense_product_context(text: &str, budget: usize) -> String {
    let mut kept: Vec<String> = Vec::new();

    for paragraph in text.split("\n\n") {
        let mut kept_from_paragraph = false;
        for line in paragraph.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if is_section_heading(trimmed)
                || color_pattern().is_match(trimmed)
                || has_material_keyword(trimmed)
            {
                kept.push(trimmed.to_string());
                kept_from_paragraph = true;
            }
        }
        if !kept_from_paragraph {
            let lead = first_sentences(paragraph, 2);
            if !lead.is_empty() {
                kept.push(lead);
            }
        }
    }

    enforce_budget(&kept.join("\n"), budget)
}

/// Hard-truncate to the budget with an explicit marker, never mid-codepoint.
#[must_use]
pub fn enforce_budget(text: &str, budget: usize) -> String {
    if text.len() <= budget {
        return text.to_string();
    }
    let mut end = budget.saturating_sub(TRUNCATION_MARKER.len());
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{}", text[..end].trim_end(), TRUNCATION_MARKER)
}

/// A line that introduces a product section: markdown heading, short
/// colon-terminated label, or a short all-caps title.
fn is_section_heading(line: &str) -> bool {
    if line.starts_with('#') {
        return true;
    }
    if line.len() <= 60 && line.ends_with(':') {
        return true;
    }
    line.len() <= 40
        && line.chars().any(|c| c.is_alphabetic())
        && !line.chars().any(|c| c.is_lowercase())
}

fn has_material_keyword(line: &str) -> bool {
    let lower = line.to_lowercase();
    MATERIAL_KEYWORDS
        .iter()
        .any(|kw| lower.split(|c: char| !c.is_alphanumeric()).any(|w| w == *kw))
}

/// First `count` sentences of a paragraph, whitespace-normalized.
fn first_sentences(paragraph: &str, count: usize) -> String {
    let flat = paragraph.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut taken = 0usize;
    let mut end = flat.len();
    for (i, c) in flat.char_indices() {
        if matches!(c, '.' | '!' | '?') {
            taken += 1;
            if taken == count {
                end = i + c.len_utf8();
                break;
            }
        }
    }
    flat[..end].trim().to_string()
}
