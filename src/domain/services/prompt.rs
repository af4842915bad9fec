#[cfg(test)]
#[path = "prompt_test.rs"]
mod tests;

use crate::domain::models::ChatContent;
use crate::domain::models::ChatMessage;
use crate::domain::models::ContentPart;
use crate::domain::models::HistoryEntry;
use crate::domain::models::ImageUrl;
use crate::domain::models::Role;

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant. Answer clearly and concisely. When an image is provided, describe and analyze it in the context of the user's question.";

/// Upstream conversation: system instruction, prior turns verbatim, then the
/// current turn. The current turn becomes multi-part when an image is given.
pub fn build_conversation(
    system_prompt: &str,
    history: &[HistoryEntry],
    current_message: &str,
    image_base64: Option<&str>,
) -> Vec<ChatMessage> {
    let mut conversation = vec![ChatMessage::text(Role::System, system_prompt)];

    for entry in history {
        conversation.push(ChatMessage::text(entry.role, &entry.content));
    }

    let current = match image_base64 {
        Some(image) => ChatMessage {
            role: Role::User,
            content: ChatContent::Parts(vec![
                ContentPart::Text {
                    text: current_message.to_string(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: format!("data:image/jpeg;base64,{image}"),
                    },
                },
            ]),
        },
        None => ChatMessage::text(Role::User, current_message),
    };
    conversation.push(current);

    return conversation;
}
