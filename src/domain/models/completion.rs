use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::Role;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

/// Everything a transport needs to run one completion.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompletionRequest {
    pub history: Vec<HistoryEntry>,
    pub input: String,
    /// Raw base64, without any data-URI prefix.
    pub image_base64: Option<String>,
    pub session_id: Option<String>,
}

/// Normalized result of either deployment shape.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompletionResult {
    pub text: String,
    pub session_id: Option<String>,
}
