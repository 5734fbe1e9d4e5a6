//! Test doubles for the capability ports

use brandforge_llm::{
    ChatCompletion, Error as LlmError, ImageGeneration, ImageQuality, ImageSize, Message,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Chat port returning a fixed script of replies in invocation order.
/// Exhausting the script yields `Unavailable`, which fails any test that
/// invoked an agent it did not expect to run.
pub(crate) struct ScriptedChat {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedChat {
    pub(crate) fn new(
        replies: impl IntoIterator<Item = Result<String, LlmError>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn replies<S: AsRef<str>>(texts: &[S]) -> Arc<Self> {
        Self::new(texts.iter().map(|t| Ok(t.as_ref().to_string())))
    }

    /// Instructions each invocation was made with, in order.
    pub(crate) fn instructions_seen(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub(crate) fn remaining(&self) -> usize {
        self.replies.lock().expect("replies lock").len()
    }
}

#[async_trait::async_trait]
impl ChatCompletion for ScriptedChat {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        instructions: &str,
        _history: &[Message],
    ) -> brandforge_llm::Result<String> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(instructions.to_string());
        self.replies
            .lock()
            .expect("replies lock")
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Unavailable("script exhausted".to_string())))
    }
}

/// Chat port that never completes; for cancellation tests.
pub(crate) struct BlockingChat;

#[async_trait::async_trait]
impl ChatCompletion for BlockingChat {
    fn name(&self) -> &str {
        "blocking"
    }

    async fn complete(
        &self,
        _instructions: &str,
        _history: &[Message],
    ) -> brandforge_llm::Result<String> {
        futures::future::pending::<()>().await;
        unreachable!()
    }
}

/// Image port returning fixed bytes.
pub(crate) struct FixedImage(pub(crate) Vec<u8>);

#[async_trait::async_trait]
impl ImageGeneration for FixedImage {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn generate(
        &self,
        _prompt: &str,
        _size: ImageSize,
        _quality: ImageQuality,
    ) -> brandforge_llm::Result<Vec<u8>> {
        Ok(self.0.clone())
    }
}

/// Image port that always fails with `Unavailable`.
pub(crate) struct FailingImage;

#[async_trait::async_trait]
impl ImageGeneration for FailingImage {
    fn name(&self) -> &str {
        "failing"
    }

    async fn generate(
        &self,
        _prompt: &str,
        _size: ImageSize,
        _quality: ImageQuality,
    ) -> brandforge_llm::Result<Vec<u8>> {
        Err(LlmError::Unavailable("image backend offline".to_string()))
    }
}
