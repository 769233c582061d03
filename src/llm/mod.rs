//! Chat completion collaborators
//!
//! Generation, paraphrasing and format checking only need "messages in,
//! text out", so they depend on `CompletionClient` rather than a concrete
//! HTTP client.

pub mod client;

pub use client::{OpenAiClient, DEFAULT_BASE_URL, DEFAULT_MODEL};

use crate::errors::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Text completion over a chat transcript
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Return the assistant reply for `messages`
    ///
    /// An empty string means the model produced no content; transport or
    /// protocol failures are errors.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}
