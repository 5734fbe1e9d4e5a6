//! Chat-completion capability port
//!
//! A single-purpose interface: fixed instructions plus a message history in,
//! generated text out. Orchestration logic never lives behind this trait.

use crate::error::Result;
use crate::message::Message;

/// Chat-completion port
///
/// Implementations own their own deadline; the orchestration core does not
/// impose a timeout on top.
#[async_trait::async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Provider name, for logging
    fn name(&self) -> &str;

    /// Complete a conversation under the given system instructions.
    ///
    /// # Errors
    /// `Unavailable`, `RateLimited`, or `SafetyRefused` per the port contract.
    async fn complete(&self, instructions: &str, history: &[Message]) -> Result<String>;
}
