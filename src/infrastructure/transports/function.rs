#[cfg(test)]
#[path = "function_test.rs"]
mod tests;

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
use crate::domain::models::Transport;
use crate::domain::models::TransportName;
use crate::infrastructure::functions::Functions;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct MessageRequest {
    message: String,
    session_id: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct MessageResponse {
    response: Option<String>,
    session_id: Option<String>,
}

/// Sends completions through a managed function. The function keeps history
/// server side keyed by `session_id`, so only the current input travels.
pub struct Function {
    functions: Functions,
    name: String,
}

impl Default for Function {
    fn default() -> Function {
        return Function {
            functions: Functions::default(),
            name: Config::get(ConfigKey::FunctionName),
        };
    }
}

#[async_trait]
impl Transport for Function {
    fn name(&self) -> TransportName {
        return TransportName::Function;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if !self.functions.is_configured() {
            bail!("Functions URL is not defined");
        }
        if self.name.is_empty() {
            bail!("Function name is not defined");
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn send(&self, request: CompletionRequest) -> Result<CompletionResult, ChatError> {
        if request.image_base64.is_some() {
            tracing::warn!(
                function = %self.name,
                "Managed function does not accept images, dropping attachment"
            );
        }

        let req = MessageRequest {
            message: request.input,
            session_id: request.session_id.unwrap_or_default(),
        };

        let res: MessageResponse = self.functions.invoke(&self.name, &req).await?;
        tracing::debug!(
            has_response = res.response.is_some(),
            has_session = res.session_id.is_some(),
            "Function response"
        );

        return Ok(CompletionResult {
            text: res.response.unwrap_or_default(),
            session_id: res.session_id.filter(|id| return !id.is_empty()),
        });
    }
}
