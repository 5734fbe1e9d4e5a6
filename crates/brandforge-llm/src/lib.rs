//! Brandforge LLM - Capability Port Abstraction
//!
//! This crate provides the external-capability ports for brandforge:
//! - Chat: chat-completion port trait
//! - Image: image-generation port trait
//! - OpenAI: one concrete adapter implementing both ports
//!
//! The ports are deliberately narrow: fixed instructions plus history in,
//! text or bytes out, with an explicit error taxonomy (`Unavailable`,
//! `RateLimited`, `SafetyRefused`). Deadlines belong to the adapters.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod chat;
pub mod error;
pub mod image;
pub mod message;
pub mod openai;
pub mod util;

pub use chat::ChatCompletion;
pub use error::{Error, Result};
pub use image::{ImageGeneration, ImageQuality, ImageSize};
pub use message::{Message, MessageRole};
pub use openai::{OpenAiPort, OpenAiPortConfig, DEFAULT_CHAT_MODEL, DEFAULT_IMAGE_MODEL};
