#[cfg(test)]
#[path = "provider_test.rs"]
mod tests;

use async_trait::async_trait;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use thiserror::Error;

use super::Role;

/// Token cap of a regular chat turn.
pub const CHAT_MAX_TOKENS: u32 = 2000;

/// Fallback used whenever the provider's own message can't be shown.
pub const GENERIC_SERVER_ERROR: &str = "An error occurred on the server.";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: ChatContent,
}

impl ChatMessage {
    pub fn text(role: Role, text: &str) -> ChatMessage {
        return ChatMessage {
            role,
            content: ChatContent::Text(text.to_string()),
        };
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The provider answered with an error body.
    #[error("provider returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("provider unreachable: {0}")]
    Transport(String),
    #[error("provider response could not be decoded: {0}")]
    Decode(String),
}

impl ProviderError {
    /// Message safe to hand back to clients: the provider's own text when it
    /// sent one, otherwise [`GENERIC_SERVER_ERROR`].
    pub fn public_message(&self) -> String {
        if let ProviderError::Api { message, .. } = self {
            if !message.trim().is_empty() {
                return message.to_string();
            }
        }

        return GENERIC_SERVER_ERROR.to_string();
    }
}

/// Upstream language-model provider used by the proxy endpoint.
#[async_trait]
pub trait Provider {
    /// Runs a single non-streaming chat completion capped at `max_tokens`.
    /// `Ok(None)` means the provider answered but produced no text.
    async fn complete(
        &self,
        conversation: Vec<ChatMessage>,
        max_tokens: u32,
    ) -> Result<Option<String>, ProviderError>;

    #[allow(clippy::implicit_return)]
    async fn chat(&self, conversation: Vec<ChatMessage>) -> Result<Option<String>, ProviderError> {
        return self.complete(conversation, CHAT_MAX_TOKENS).await;
    }
}

pub type ProviderBox = Box<dyn Provider + Send + Sync>;
