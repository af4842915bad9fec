#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::HistoryEntry;
use super::Message;
use super::Role;

/// Ordered, append-only list of messages for a single chat session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationLog {
    messages: Vec<Message>,
}

impl ConversationLog {
    pub fn new(messages: Vec<Message>) -> ConversationLog {
        return ConversationLog { messages };
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> &[Message] {
        return &self.messages;
    }

    pub fn last(&self) -> Option<&Message> {
        return self.messages.last();
    }

    pub fn len(&self) -> usize {
        return self.messages.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.messages.is_empty();
    }

    /// Copy of the log without system messages, which are never kept on the
    /// client.
    pub fn without_system(&self) -> ConversationLog {
        let messages = self
            .messages
            .iter()
            .filter(|message| return message.role != Role::System)
            .cloned()
            .collect::<Vec<Message>>();

        return ConversationLog { messages };
    }

    /// Highest numeric message id, used to keep new ids increasing after the
    /// log is hydrated from disk.
    pub fn last_numeric_id(&self) -> i64 {
        return self
            .messages
            .iter()
            .filter_map(|message| return message.id.parse::<i64>().ok())
            .max()
            .unwrap_or(0);
    }
}

/// Role and content of previous turns as replayed to the completion
/// endpoint. There is no image field, so attachments are never resent.
pub fn history_entries(messages: &[Message]) -> Vec<HistoryEntry> {
    return messages
        .iter()
        .filter(|message| return message.role != Role::System)
        .map(|message| {
            return HistoryEntry {
                role: message.role,
                content: message.content.to_string(),
            };
        })
        .collect();
}
