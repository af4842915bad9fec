#[cfg(test)]
#[path = "chat_session_test.rs"]
mod tests;

use super::CompletionClient;
use super::ConversationStore;
use crate::domain::models::ChatError;
use crate::domain::models::CompletionResult;
use crate::domain::models::ConversationLog;
use crate::domain::models::ImagePayload;
use crate::domain::models::Message;
use crate::domain::models::MessageKind;
use crate::domain::models::Role;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Sending,
}

/// A turn accepted by [`ChatSession::submit`] and waiting on its completion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingTurn {
    /// Number of messages before the optimistic user message.
    pub history_len: usize,
    pub input: String,
    pub image: Option<ImagePayload>,
}

/// In-memory conversation for one process, mirrored to the store after every
/// completed turn.
pub struct ChatSession {
    log: ConversationLog,
    state: SessionState,
    session_id: Option<String>,
    store: ConversationStore,
    client: CompletionClient,
    last_id: i64,
}

impl ChatSession {
    pub fn new(log: ConversationLog, store: ConversationStore, client: CompletionClient) -> ChatSession {
        let last_id = log.last_numeric_id();

        return ChatSession {
            log,
            state: SessionState::Idle,
            session_id: None,
            store,
            client,
            last_id,
        };
    }

    pub async fn hydrate(store: ConversationStore, client: CompletionClient) -> ChatSession {
        let log = store.load().await;
        tracing::info!(messages = log.len(), "Hydrated conversation");

        return ChatSession::new(log, store, client);
    }

    pub fn log(&self) -> &ConversationLog {
        return &self.log;
    }

    pub fn state(&self) -> SessionState {
        return self.state;
    }

    pub fn is_sending(&self) -> bool {
        return self.state == SessionState::Sending;
    }

    pub fn session_id(&self) -> Option<&str> {
        return self.session_id.as_deref();
    }

    pub fn client(&self) -> &CompletionClient {
        return &self.client;
    }

    fn next_id(&mut self) -> String {
        let now = chrono::Utc::now().timestamp_millis();
        self.last_id = now.max(self.last_id.saturating_add(1));

        return self.last_id.to_string();
    }

    /// Appends the user message, persists the log and enters `Sending`.
    /// Returns `None`, leaving the session untouched, when a turn is already in
    /// flight or there is nothing to send.
    pub async fn submit(&mut self, input: &str, image: Option<ImagePayload>) -> Option<PendingTurn> {
        if self.is_sending() {
            tracing::warn!("Ignoring submit while a turn is in flight");
            return None;
        }

        if input.trim().is_empty() && image.is_none() {
            return None;
        }

        let history_len = self.log.len();
        let id = self.next_id();
        let image_ref = image
            .as_ref()
            .map(|image| return image.reference().to_string());
        let message = Message::user(&id, input, image_ref);
        let input = message.content.to_string();

        self.log.push(message);
        self.state = SessionState::Sending;
        self.persist().await;

        return Some(PendingTurn {
            history_len,
            input,
            image,
        });
    }

    pub async fn resolve(&mut self, result: CompletionResult) -> Option<Message> {
        if !self.is_sending() {
            tracing::warn!("Ignoring completion result while idle");
            return None;
        }

        if let Some(session_id) = result.session_id {
            if !session_id.is_empty() {
                self.session_id = Some(session_id);
            }
        }

        let id = self.next_id();
        let reply = Message::new(&id, Role::Assistant, &result.text);

        return Some(self.settle(reply).await);
    }

    pub async fn reject(&mut self, err: ChatError) -> Option<Message> {
        if !self.is_sending() {
            tracing::warn!(error = ?err, "Ignoring completion failure while idle");
            return None;
        }

        tracing::error!(error = ?err, "Completion failed");
        let id = self.next_id();
        let reply = Message::new_with_kind(&id, Role::Assistant, MessageKind::Error, &err.user_message());

        return Some(self.settle(reply).await);
    }

    async fn persist(&self) {
        if let Err(err) = self.store.save(&self.log).await {
            tracing::error!(error = ?err, "Failed to persist conversation");
        }
    }

    /// Shared tail of `resolve` and `reject`: append, persist, back to idle.
    async fn settle(&mut self, reply: Message) -> Message {
        self.log.push(reply.clone());
        self.persist().await;

        self.state = SessionState::Idle;
        return reply;
    }

    /// Runs a whole turn. Returns the appended assistant message, or `None`
    /// when the submit was ignored.
    pub async fn send(&mut self, input: &str, image: Option<ImagePayload>) -> Option<Message> {
        let turn = self.submit(input, image).await?;

        let res = self
            .client
            .complete(
                &self.log.messages()[..turn.history_len],
                &turn.input,
                turn.image.as_ref(),
                self.session_id.as_deref(),
            )
            .await;

        match res {
            Ok(result) => return self.resolve(result).await,
            Err(err) => return self.reject(err).await,
        }
    }

    /// Empties the conversation and the store. Returns false when ignored
    /// because a turn is in flight.
    pub async fn clear(&mut self) -> bool {
        if self.is_sending() {
            tracing::warn!("Ignoring clear while a turn is in flight");
            return false;
        }

        self.log.clear();
        self.session_id = None;

        if let Err(err) = self.store.clear().await {
            tracing::error!(error = ?err, "Failed to clear stored conversation");
        }

        return true;
    }
}
