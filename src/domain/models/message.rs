#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::Role;

/// Caption used for a user turn that only carries an image.
pub const IMAGE_PLACEHOLDER_TEXT: &str = "Please analyze this image.";

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Normal,
    Error,
}

impl MessageKind {
    fn is_normal(&self) -> bool {
        return *self == MessageKind::Normal;
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(rename = "imageRef", default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    #[serde(default, skip_serializing_if = "MessageKind::is_normal")]
    kind: MessageKind,
}

impl Message {
    pub fn new(id: &str, role: Role, content: &str) -> Message {
        return Message {
            id: id.to_string(),
            role,
            content: content.to_string(),
            image_ref: None,
            kind: MessageKind::Normal,
        };
    }

    pub fn new_with_kind(id: &str, role: Role, kind: MessageKind, content: &str) -> Message {
        return Message {
            id: id.to_string(),
            role,
            content: content.to_string(),
            image_ref: None,
            kind,
        };
    }

    /// Builds a user turn. An empty caption next to an image is replaced with
    /// [`IMAGE_PLACEHOLDER_TEXT`].
    pub fn user(id: &str, text: &str, image_ref: Option<String>) -> Message {
        let mut content = text.trim().to_string();
        if content.is_empty() && image_ref.is_some() {
            content = IMAGE_PLACEHOLDER_TEXT.to_string();
        }

        return Message {
            id: id.to_string(),
            role: Role::User,
            content,
            image_ref,
            kind: MessageKind::Normal,
        };
    }

    pub fn message_kind(&self) -> MessageKind {
        return self.kind;
    }

    pub fn is_error(&self) -> bool {
        return self.kind == MessageKind::Error;
    }
}
