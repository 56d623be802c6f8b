//! Conversation state
//!
//! An append-only message log plus the loading/recording flags the
//! front end renders. Owned exclusively by the orchestrator; the audio
//! and speech clients never touch it.

pub mod query;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

pub use query::{NO_VALID_RESPONSE, QueryClient};

/// Unique, time-ordered message identifier
///
/// Millisecond wall-clock timestamp with a monotonic bump so ids issued
/// in the same millisecond (or across a clock step backwards) still
/// strictly increase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(u64);

static LAST_ID: AtomicU64 = AtomicU64::new(0);

impl MessageId {
    /// Issue the next id
    #[must_use]
    pub fn next() -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let prev = LAST_ID
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(last.max(now.saturating_sub(1)) + 1)
            })
            .unwrap_or(now);

        Self(prev.max(now.saturating_sub(1)) + 1)
    }

    /// Raw id value (milliseconds since the epoch, possibly bumped)
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

/// One chat message, immutable once appended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Unique time-ordered id
    pub id: MessageId,
    /// Message text
    pub content: String,
    /// True for user input, false for bot replies
    pub is_user: bool,
}

impl ChatMessage {
    fn new(content: String, is_user: bool) -> Self {
        Self {
            id: MessageId::next(),
            content,
            is_user,
        }
    }
}

/// Append-only conversation log with view-state flags
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    /// A query is in flight
    pub loading: bool,
    /// The microphone is capturing
    pub recording: bool,
}

impl Conversation {
    /// Create an empty conversation
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user message, returning its id
    pub fn push_user(&mut self, content: impl Into<String>) -> MessageId {
        self.push(ChatMessage::new(content.into(), true))
    }

    /// Append a bot message, returning its id
    pub fn push_bot(&mut self, content: impl Into<String>) -> MessageId {
        self.push(ChatMessage::new(content.into(), false))
    }

    fn push(&mut self, message: ChatMessage) -> MessageId {
        let id = message.id;
        self.messages.push(message);
        id
    }

    /// Messages in insertion (display) order
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Most recent bot reply, if any
    #[must_use]
    pub fn last_bot_message(&self) -> Option<&ChatMessage> {
        self.messages.iter().rev().find(|m| !m.is_user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_strictly_increase() {
        let ids: Vec<MessageId> = (0..100).map(|_| MessageId::next()).collect();
        for pair in ids.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn messages_keep_insertion_order() {
        let mut convo = Conversation::new();
        convo.push_user("hello");
        convo.push_bot("hi there");
        convo.push_user("how are you");

        let contents: Vec<&str> = convo.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["hello", "hi there", "how are you"]);
        assert!(convo.messages()[0].is_user);
        assert!(!convo.messages()[1].is_user);
    }

    #[test]
    fn last_bot_message_skips_user_messages() {
        let mut convo = Conversation::new();
        assert!(convo.last_bot_message().is_none());

        convo.push_bot("greeting");
        convo.push_user("question");
        assert_eq!(convo.last_bot_message().unwrap().content, "greeting");
    }
}
