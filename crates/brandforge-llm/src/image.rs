//! Image-generation capability port

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Output dimensions for a generated image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSize {
    /// 1024x1024
    Square,
    /// 1792x1024
    Landscape,
    /// 1024x1792
    Portrait,
}

impl ImageSize {
    /// Provider wire format, e.g. "1024x1024"
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "1024x1024",
            Self::Landscape => "1792x1024",
            Self::Portrait => "1024x1792",
        }
    }
}

/// Rendering quality for a generated image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageQuality {
    /// Standard quality
    Standard,
    /// High-detail rendering
    Hd,
}

/// Image-generation port
///
/// Returns raw image bytes; callers are responsible for persisting them and
/// must never carry the bytes in a stored result.
#[async_trait::async_trait]
pub trait ImageGeneration: Send + Sync {
    /// Provider name, for logging
    fn name(&self) -> &str;

    /// Generate an image for the given prompt.
    ///
    /// # Errors
    /// `Unavailable` or `SafetyRefused` per the port contract.
    async fn generate(&self, prompt: &str, size: ImageSize, quality: ImageQuality)
        -> Result<Vec<u8>>;
}
