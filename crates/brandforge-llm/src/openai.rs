//! OpenAI - async-openai adapter
//!
//! Implements both capability ports (chat completion and image generation)
//! against the OpenAI API using async-openai 0.32+.

use crate::chat::ChatCompletion;
use crate::error::{Error, Result};
use crate::image::{ImageGeneration, ImageQuality, ImageSize};
use crate::message::{Message, MessageRole};
use crate::util::{mask_api_key, truncate_safe};
use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
        ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
    },
    types::images::{
        CreateImageRequest, Image, ImageModel, ImageQuality as OpenAiImageQuality,
        ImageResponseFormat, ImageSize as OpenAiImageSize,
    },
    Client,
};
use base64::Engine;
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};

/// Default chat model
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o";

/// Default image model
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

/// Classify an upstream error into the port taxonomy.
///
/// Content-safety blocks must come out as `SafetyRefused` so callers can
/// distinguish them from transient failures; everything else network-shaped
/// maps to `Unavailable`.
fn map_api_error(error: &OpenAIError) -> Error {
    if let OpenAIError::ApiError(api) = error {
        let mut haystack = api.message.to_lowercase();
        if let Some(t) = &api.r#type {
            haystack.push(' ');
            haystack.push_str(&t.to_lowercase());
        }

        if haystack.contains("content_policy")
            || haystack.contains("content policy")
            || haystack.contains("safety system")
            || haystack.contains("moderation")
        {
            return Error::SafetyRefused(sanitize_api_error(&api.message));
        }
        if haystack.contains("rate limit")
            || haystack.contains("rate_limit")
            || haystack.contains("quota")
        {
            return Error::RateLimited;
        }
        return Error::Unavailable(sanitize_api_error(&api.message));
    }
    Error::Unavailable(sanitize_api_error(&error.to_string()))
}

fn sanitize_api_error(error: &str) -> String {
    let lower = error.to_lowercase();

    if lower.contains("api key")
        || lower.contains("apikey")
        || lower.contains("unauthorized")
        || lower.contains("authentication")
    {
        return "API authentication error. Please check your API key configuration.".to_string();
    }

    // Truncate overly long messages but preserve useful error info
    if error.len() > 300 {
        format!("{}...(truncated)", truncate_safe(error, 300))
    } else {
        error.to_string()
    }
}

/// Configuration for the OpenAI adapter
#[derive(Clone)]
pub struct OpenAiPortConfig {
    /// API key for authentication
    pub api_key: String,
    /// Optional custom base URL (for Azure OpenAI or proxies)
    pub base_url: Option<String>,
    /// Optional organization ID
    pub org_id: Option<String>,
    /// Chat model
    pub chat_model: String,
    /// Image model
    pub image_model: String,
    /// Request timeout duration (the port's own deadline)
    pub timeout: Duration,
}

impl fmt::Debug for OpenAiPortConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiPortConfig")
            .field("api_key", &mask_api_key(&self.api_key))
            .field("base_url", &self.base_url)
            .field("org_id", &self.org_id.as_ref().map(|_| "[REDACTED]"))
            .field("chat_model", &self.chat_model)
            .field("image_model", &self.image_model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAiPortConfig {
    /// Creates a new configuration with the given API key
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            org_id: None,
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    /// Creates configuration from environment variables.
    ///
    /// # Errors
    /// Returns `NotConfigured` if `OPENAI_API_KEY` is not set.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| Error::NotConfigured("OPENAI_API_KEY not set".to_string()))?;

        let mut config = Self::new(api_key);
        if let Ok(url) = std::env::var("OPENAI_BASE_URL") {
            config.base_url = Some(url);
        }
        if let Ok(org) = std::env::var("OPENAI_ORG_ID") {
            config.org_id = Some(org);
        }
        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            config.chat_model = model;
        }
        if let Ok(model) = std::env::var("OPENAI_IMAGE_MODEL") {
            config.image_model = model;
        }
        Ok(config)
    }

    /// Sets the chat model
    #[must_use]
    pub fn with_chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = model.into();
        self
    }

    /// Sets the image model
    #[must_use]
    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    /// Sets the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// OpenAI adapter for the chat-completion and image-generation ports
pub struct OpenAiPort {
    client: Client<OpenAIConfig>,
    chat_model: String,
    image_model: String,
    timeout: Duration,
}

impl OpenAiPort {
    /// Creates a new adapter with the given configuration
    #[must_use]
    pub fn new(config: OpenAiPortConfig) -> Self {
        let mut openai_config = OpenAIConfig::new().with_api_key(&config.api_key);

        if let Some(base_url) = &config.base_url {
            openai_config = openai_config.with_api_base(base_url);
        }
        if let Some(org_id) = &config.org_id {
            openai_config = openai_config.with_org_id(org_id);
        }

        Self {
            client: Client::with_config(openai_config),
            chat_model: config.chat_model,
            image_model: config.image_model,
            timeout: config.timeout,
        }
    }

    /// Apply the port's own deadline to an upstream call.
    async fn with_deadline<T>(
        &self,
        call: impl std::future::Future<Output = std::result::Result<T, OpenAIError>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(|e| map_api_error(&e)),
            Err(_) => Err(Error::Timeout(self.timeout.as_millis() as u64)),
        }
    }

    /// Creates an adapter from environment variables
    ///
    /// # Errors
    /// Returns `NotConfigured` if `OPENAI_API_KEY` is not set.
    pub fn from_env() -> Result<Self> {
        let config = OpenAiPortConfig::from_env()?;
        Ok(Self::new(config))
    }

    fn convert_message(msg: &Message) -> ChatCompletionRequestMessage {
        match msg.role {
            MessageRole::System => ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(msg.content.clone()),
                name: None,
            }
            .into(),
            MessageRole::User => ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(msg.content.clone()),
                name: None,
            }
            .into(),
            MessageRole::Assistant =>
            {
                #[allow(deprecated)]
                ChatCompletionRequestAssistantMessage {
                    content: Some(ChatCompletionRequestAssistantMessageContent::Text(
                        msg.content.clone(),
                    )),
                    name: None,
                    tool_calls: None,
                    function_call: None,
                    refusal: None,
                    audio: None,
                }
                .into()
            }
        }
    }

    fn convert_size(size: ImageSize) -> OpenAiImageSize {
        match size {
            ImageSize::Square => OpenAiImageSize::S1024x1024,
            ImageSize::Landscape => OpenAiImageSize::S1792x1024,
            ImageSize::Portrait => OpenAiImageSize::S1024x1792,
        }
    }

    fn convert_quality(quality: ImageQuality) -> OpenAiImageQuality {
        match quality {
            ImageQuality::Standard => OpenAiImageQuality::Standard,
            ImageQuality::Hd => OpenAiImageQuality::HD,
        }
    }
}

#[async_trait::async_trait]
impl ChatCompletion for OpenAiPort {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(skip(self, instructions, history), fields(model = %self.chat_model, turns = history.len()))]
    async fn complete(&self, instructions: &str, history: &[Message]) -> Result<String> {
        let mut messages: Vec<ChatCompletionRequestMessage> =
            Vec::with_capacity(history.len() + 1);
        messages.push(Self::convert_message(&Message::system(instructions)));
        messages.extend(history.iter().map(Self::convert_message));

        let request = CreateChatCompletionRequest {
            model: self.chat_model.clone(),
            messages,
            ..Default::default()
        };

        debug!("Sending chat request to OpenAI");

        let response = self.with_deadline(self.client.chat().create(request)).await?;

        let choice = response
            .choices
            .first()
            .ok_or_else(|| Error::InvalidResponse("No choices in response".to_string()))?;

        if let Some(refusal) = &choice.message.refusal {
            return Err(Error::SafetyRefused(refusal.clone()));
        }

        Ok(choice.message.content.clone().unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl ImageGeneration for OpenAiPort {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(skip(self, prompt), fields(model = %self.image_model, prompt_len = prompt.len()))]
    async fn generate(
        &self,
        prompt: &str,
        size: ImageSize,
        quality: ImageQuality,
    ) -> Result<Vec<u8>> {
        let request = CreateImageRequest {
            prompt: prompt.to_string(),
            model: Some(ImageModel::Other(self.image_model.clone())),
            size: Some(Self::convert_size(size)),
            quality: Some(Self::convert_quality(quality)),
            response_format: Some(ImageResponseFormat::B64Json),
            ..Default::default()
        };

        debug!("Sending image request to OpenAI");

        let response = self.with_deadline(self.client.images().generate(request)).await?;

        let image = response
            .data
            .first()
            .ok_or_else(|| Error::InvalidResponse("No image in response".to_string()))?;

        match image.as_ref() {
            Image::B64Json { b64_json, .. } => base64::engine::general_purpose::STANDARD
                .decode(b64_json.as_str())
                .map_err(|e| Error::InvalidResponse(format!("Invalid base64 image: {e}"))),
            Image::Url { .. } => Err(Error::InvalidResponse(
                "Expected inline image data, got URL".to_string(),
            )),
        }
    }
}
