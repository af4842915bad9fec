#[cfg(test)]
#[path = "error_test.rs"]
mod tests;

use thiserror::Error;

/// Failures of the chat flow. Each variant gets its own guidance when shown to
/// the user, so callers must be able to tell them apart.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ChatError {
    /// Transport level failure: unreachable host, refused connection, timeout.
    #[error("network error: {0}")]
    Network(String),
    /// Non-2xx response.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    /// 2xx response with a body that could not be understood.
    #[error("protocol error: {0}")]
    Protocol(String),
    /// The attached image could not be transcoded.
    #[error("encoding error: {0}")]
    Encoding(String),
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl ChatError {
    pub fn user_message(&self) -> String {
        let guidance = match self {
            ChatError::Network(detail) => format!(
                "I couldn't reach the chat server. Check that the server is running and reachable.\n\n{detail}"
            ),
            ChatError::Server { status, message } => {
                format!("The chat server failed with status {status}.\n\n{message}")
            }
            ChatError::Protocol(detail) => {
                format!("The chat server sent a response I couldn't understand.\n\n{detail}")
            }
            ChatError::Encoding(detail) => {
                format!("The attached image couldn't be prepared for sending.\n\n{detail}")
            }
            ChatError::Persistence(detail) => {
                format!("The conversation couldn't be saved.\n\n{detail}")
            }
        };

        return format!("Sorry, something went wrong.\n\n{guidance}");
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> ChatError {
        if err.is_decode() {
            return ChatError::Protocol(err.to_string());
        }

        return ChatError::Network(err.to_string());
    }
}
