#[cfg(test)]
#[path = "image_test.rs"]
mod tests;

use std::path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tokio::fs;

use super::ChatError;

/// An image attached to the current turn. The reference is kept verbatim on
/// the user message; the bytes are only read when the turn is sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImagePayload {
    reference: String,
}

impl ImagePayload {
    pub fn new(reference: &str) -> ImagePayload {
        return ImagePayload {
            reference: reference.trim().to_string(),
        };
    }

    pub fn reference(&self) -> &str {
        return &self.reference;
    }

    /// Returns the image as bare base64, without a `data:` prefix.
    pub async fn encode(&self) -> Result<String, ChatError> {
        if self.reference.is_empty() {
            return Err(ChatError::Encoding("image reference is empty".to_string()));
        }

        if self.reference.starts_with("data:") {
            return decode_data_uri(&self.reference);
        }

        let file_path = path::PathBuf::from(
            self.reference
                .strip_prefix("file://")
                .unwrap_or(&self.reference),
        );

        let bytes = fs::read(&file_path).await.map_err(|err| {
            return ChatError::Encoding(format!(
                "failed to read image {}: {err}",
                file_path.display()
            ));
        })?;

        if bytes.is_empty() {
            return Err(ChatError::Encoding(format!(
                "image {} is empty",
                file_path.display()
            )));
        }

        return Ok(STANDARD.encode(bytes));
    }
}

fn decode_data_uri(uri: &str) -> Result<String, ChatError> {
    let (header, payload) = match uri.split_once(',') {
        Some(parts) => parts,
        None => {
            return Err(ChatError::Encoding(
                "data URI has no payload separator".to_string(),
            ))
        }
    };

    if !header.ends_with(";base64") {
        return Err(ChatError::Encoding(
            "data URI is not base64 encoded".to_string(),
        ));
    }

    let payload = payload.trim();
    if payload.is_empty() {
        return Err(ChatError::Encoding("data URI payload is empty".to_string()));
    }

    if let Err(err) = STANDARD.decode(payload) {
        return Err(ChatError::Encoding(format!(
            "data URI payload is not valid base64: {err}"
        )));
    }

    return Ok(payload.to_string());
}
