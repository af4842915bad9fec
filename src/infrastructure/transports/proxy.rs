#[cfg(test)]
#[path = "proxy_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::ChatError;
use crate::domain::models::CompletionRequest;
use crate::domain::models::CompletionResult;
use crate::domain::models::HistoryEntry;
use crate::domain::models::Transport;
use crate::domain::models::TransportName;
use crate::infrastructure::payload::error_message;
use crate::infrastructure::payload::Payload;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ChatRequest {
    messages: Vec<HistoryEntry>,
    current_message: String,
    image_base64: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ChatResponse {
    content: Option<String>,
    success: Option<bool>,
    error: Option<String>,
}

/// Talks to `POST /api/chat` on a `pocketchat serve` instance.
pub struct Proxy {
    url: String,
    timeout: Duration,
}

impl Default for Proxy {
    fn default() -> Proxy {
        return Proxy {
            url: Config::get(ConfigKey::ProxyURL),
            timeout: Config::request_timeout(),
        };
    }
}

#[async_trait]
impl Transport for Proxy {
    fn name(&self) -> TransportName {
        return TransportName::Proxy;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if self.url.is_empty() {
            bail!("Proxy URL is not defined");
        }

        let res = reqwest::Client::new()
            .get(format!("{url}/api/health", url = self.url))
            .timeout(self.timeout)
            .send()
            .await;

        let res = match res {
            Ok(res) => res,
            Err(err) => {
                tracing::error!(error = ?err, "Proxy is not reachable");
                bail!("Proxy is not reachable at {}", self.url);
            }
        };

        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), "Proxy health check failed");
            bail!("Proxy health check failed");
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn send(&self, request: CompletionRequest) -> Result<CompletionResult, ChatError> {
        let req = ChatRequest {
            messages: request.history,
            current_message: request.input,
            image_base64: request.image_base64,
        };

        tracing::debug!(
            history = req.messages.len(),
            has_image = req.image_base64.is_some(),
            "Sending chat request to proxy"
        );

        let res = reqwest::Client::new()
            .post(format!("{url}/api/chat", url = self.url))
            .timeout(self.timeout)
            .json(&req)
            .send()
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, url = %self.url, "Failed to reach proxy");
                return ChatError::Network(format!("{err} ({})", self.url));
            })?;

        let status = res.status().as_u16();
        let text = res.text().await.map_err(|err| {
            return ChatError::Network(err.to_string());
        })?;

        if !(200..300).contains(&status) {
            tracing::error!(status = status, "Failed to make completion request to proxy");
            return Err(ChatError::Server {
                status,
                message: error_message(status, &text),
            });
        }

        let body = Payload::<ChatResponse>::parse(&text)?;
        if body.success != Some(true) {
            return Err(ChatError::Protocol(
                body.error
                    .unwrap_or_else(|| return "proxy did not report success".to_string()),
            ));
        }

        let content = match body.content {
            Some(content) => content,
            None => {
                return Err(ChatError::Protocol(
                    "proxy response did not contain content".to_string(),
                ))
            }
        };

        return Ok(CompletionResult {
            text: content,
            session_id: None,
        });
    }
}
