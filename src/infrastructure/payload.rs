#[cfg(test)]
#[path = "payload_test.rs"]
mod tests;

use serde::de::DeserializeOwned;
use serde_derive::Deserialize;

use crate::domain::models::ChatError;

/// Managed functions sometimes answer with a JSON object and sometimes with a
/// JSON string that itself contains the object. Both are resolved here so
/// nothing past the transport boundary sees an untyped value.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Payload<T> {
    Object(T),
    Encoded(String),
}

impl<T: DeserializeOwned> Payload<T> {
    pub fn parse(body: &str) -> Result<T, ChatError> {
        let payload: Payload<T> = serde_json::from_str(body).map_err(|err| {
            tracing::debug!(body = body, "Unparsable response payload");
            return ChatError::Protocol(format!("response body is not valid JSON: {err}"));
        })?;

        return payload.resolve();
    }

    pub fn resolve(self) -> Result<T, ChatError> {
        match self {
            Payload::Object(value) => {
                tracing::debug!("Response payload arrived as an object");
                return Ok(value);
            }
            Payload::Encoded(text) => {
                tracing::debug!("Response payload arrived as an encoded string");
                return serde_json::from_str(&text).map_err(|err| {
                    return ChatError::Protocol(format!(
                        "response string does not contain the expected JSON: {err}"
                    ));
                });
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// Best effort extraction of a human readable error from a non-2xx body.
pub fn error_message(status: u16, body: &str) -> String {
    if let Ok(parsed) = Payload::<ErrorBody>::parse(body) {
        if let Some(msg) = parsed.error.or(parsed.message) {
            if !msg.trim().is_empty() {
                return msg;
            }
        }
    }

    if !body.trim().is_empty() {
        return body.trim().to_string();
    }

    return format!("request failed with status {status}");
}
