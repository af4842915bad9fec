#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;

use std::time::Duration;

use async_trait::async_trait;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::ChatMessage;
use crate::domain::models::Provider;
use crate::domain::models::ProviderError;

pub const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionMessageResponse {
    content: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionChoiceResponse {
    message: CompletionMessageResponse,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoiceResponse>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ErrorDetail {
    message: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

pub struct OpenAI {
    url: String,
    token: String,
    model: String,
    timeout: Duration,
}

impl Default for OpenAI {
    fn default() -> OpenAI {
        return OpenAI {
            url: Config::get(ConfigKey::OpenAiURL),
            token: Config::get(ConfigKey::OpenAiToken),
            model: Config::get(ConfigKey::Model),
            timeout: Config::request_timeout(),
        };
    }
}

impl OpenAI {
    pub fn has_token(&self) -> bool {
        return !self.token.is_empty();
    }
}

#[async_trait]
impl Provider for OpenAI {
    #[allow(clippy::implicit_return)]
    async fn complete(
        &self,
        conversation: Vec<ChatMessage>,
        max_tokens: u32,
    ) -> Result<Option<String>, ProviderError> {
        let req = CompletionRequest {
            model: self.model.to_string(),
            messages: conversation,
            max_tokens,
            temperature: TEMPERATURE,
        };

        let res = reqwest::Client::new()
            .post(format!("{url}/v1/chat/completions", url = self.url))
            .header("Authorization", format!("Bearer {}", self.token))
            .timeout(self.timeout)
            .json(&req)
            .send()
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, "OpenAI is not reachable");
                return ProviderError::Transport(err.to_string());
            })?;

        let status = res.status().as_u16();
        let text = res
            .text()
            .await
            .map_err(|err| return ProviderError::Transport(err.to_string()))?;

        if !(200..300).contains(&status) {
            tracing::error!(status = status, "Failed to make completion request to OpenAI");
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|body| return body.error.message)
                .unwrap_or_default();
            return Err(ProviderError::Api { status, message });
        }

        let ores: CompletionResponse = serde_json::from_str(&text)
            .map_err(|err| return ProviderError::Decode(err.to_string()))?;
        tracing::debug!(choices = ores.choices.len(), "Completion response");

        let content = ores
            .choices
            .into_iter()
            .next()
            .and_then(|choice| return choice.message.content)
            .filter(|content| return !content.is_empty());

        return Ok(content);
    }
}
