#[cfg(test)]
#[path = "completion_client_test.rs"]
mod tests;

use crate::domain::models::history_entries;
use crate::domain::models::ChatError;
use crate::domain::models::CompletionRequest;
use crate::domain::models::CompletionResult;
use crate::domain::models::ImagePayload;
use crate::domain::models::Message;
use crate::domain::models::TransportBox;

/// Turns a conversation and a new turn into a transport request.
pub struct CompletionClient {
    transport: TransportBox,
}

impl CompletionClient {
    pub fn new(transport: TransportBox) -> CompletionClient {
        return CompletionClient { transport };
    }

    pub fn transport(&self) -> &TransportBox {
        return &self.transport;
    }

    /// `history` is every message prior to the current turn. Image references
    /// never leave the client; only the current turn's image is sent, and it
    /// is encoded before any network call is made.
    pub async fn complete(
        &self,
        history: &[Message],
        input: &str,
        image: Option<&ImagePayload>,
        session_id: Option<&str>,
    ) -> Result<CompletionResult, ChatError> {
        let image_base64 = match image {
            Some(image) => Some(image.encode().await.map_err(|err| {
                tracing::warn!(error = ?err, reference = image.reference(), "Failed to encode image");
                return err;
            })?),
            None => None,
        };

        let request = CompletionRequest {
            history: history_entries(history),
            input: input.to_string(),
            image_base64,
            session_id: session_id.map(|id| return id.to_string()),
        };

        tracing::debug!(
            transport = %self.transport.name(),
            history = request.history.len(),
            has_image = request.image_base64.is_some(),
            "Sending completion"
        );

        return self.transport.send(request).await;
    }
}
