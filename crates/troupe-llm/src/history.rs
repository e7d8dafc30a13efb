//! Bounded chat history.
//!
//! A message log with an optional maximum length. When full, the oldest
//! message is evicted, except that a history created with a pinned first
//! message (usually the system prompt) evicts the oldest message *after* it.

use std::ops::Deref;

use crate::types::{Message, Role};

/// An ordered message log with an optional capacity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatHistory {
    inner: Vec<Message>,
    capacity: Option<usize>,
    pin_first: bool,
}

impl ChatHistory {
    /// Create an unbounded history from initial messages.
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            inner: messages,
            capacity: None,
            pin_first: false,
        }
    }

    /// Create a history holding at most `capacity` messages.
    ///
    /// If the initial messages already exceed the capacity, only the most
    /// recent ones are kept.
    ///
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn bounded(messages: Vec<Message>, capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be greater than 0");
        let skip = messages.len().saturating_sub(capacity);
        Self {
            inner: messages.into_iter().skip(skip).collect(),
            capacity: Some(capacity),
            pin_first: false,
        }
    }

    /// Create a bounded history whose first message is never evicted.
    ///
    /// The pinned message counts toward the capacity. With a capacity of 1
    /// the pinned message is the only one ever held and appends are dropped.
    ///
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn pinned(messages: Vec<Message>, capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be greater than 0");
        let mut inner = messages;
        if inner.len() > capacity {
            let excess = inner.len() - capacity;
            inner.drain(1..1 + excess);
        }
        Self {
            inner,
            capacity: Some(capacity),
            pin_first: true,
        }
    }

    /// Append a message, evicting as needed to stay within capacity.
    pub fn push(&mut self, message: Message) {
        if let Some(capacity) = self.capacity
            && self.inner.len() >= capacity
        {
            if self.pin_first {
                if capacity == 1 {
                    return;
                }
                self.inner.remove(1);
            } else {
                self.inner.remove(0);
            }
        }
        self.inner.push(message);
    }

    /// Append a message built from a role and text.
    pub fn push_text(&mut self, role: Role, content: impl Into<String>) {
        self.push(Message::new(role, content));
    }

    /// Maximum number of messages, if bounded.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Whether the first message is protected from eviction.
    pub fn is_pinned(&self) -> bool {
        self.pin_first
    }

    /// Borrow the messages as a slice.
    pub fn messages(&self) -> &[Message] {
        &self.inner
    }

    /// Consume the history, returning the messages.
    pub fn into_messages(self) -> Vec<Message> {
        self.inner
    }
}

// Read-only slice access; mutation goes through `push` so capacity holds.
impl Deref for ChatHistory {
    type Target = [Message];

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Extend<Message> for ChatHistory {
    fn extend<I: IntoIterator<Item = Message>>(&mut self, iter: I) {
        for message in iter {
            self.push(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> Message {
        Message::user(format!("msg {n}"))
    }

    #[test]
    fn test_unbounded_keeps_everything() {
        let mut history = ChatHistory::new(vec![]);
        for i in 0..50 {
            history.push(numbered(i));
        }
        assert_eq!(history.len(), 50);
        assert_eq!(history.capacity(), None);
    }

    #[test]
    fn test_eviction_at_capacity() {
        let mut history = ChatHistory::bounded(vec![], 3);
        for i in 0..4 {
            history.push(numbered(i));
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history[0], numbered(1)); // 0 was evicted
        assert_eq!(history[2], numbered(3));
    }

    #[test]
    fn test_pinned_first_survives_overflow() {
        let system = Message::system("You are a poet.");
        let mut history = ChatHistory::pinned(vec![system.clone()], 3);

        for i in 0..5 {
            history.push(numbered(i));
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history[0], system);
        assert_eq!(history[1], numbered(3));
        assert_eq!(history[2], numbered(4));
    }

    #[test]
    fn test_pinned_capacity_one_drops_appends() {
        let system = Message::system("rules");
        let mut history = ChatHistory::pinned(vec![system.clone()], 1);
        history.push(numbered(0));

        assert_eq!(history.messages(), &[system]);
    }

    #[test]
    fn test_bounded_trims_initial_messages() {
        let history = ChatHistory::bounded((0..5).map(numbered).collect(), 2);
        assert_eq!(history.messages(), &[numbered(3), numbered(4)]);
    }

    #[test]
    fn test_pinned_trims_initial_messages_after_head() {
        let mut initial = vec![Message::system("head")];
        initial.extend((0..4).map(numbered));

        let history = ChatHistory::pinned(initial, 3);
        assert_eq!(history.len(), 3);
        assert_eq!(history[0], Message::system("head"));
        assert_eq!(history[2], numbered(3));
    }

    #[test]
    fn test_extend_respects_capacity() {
        let mut history = ChatHistory::bounded(vec![], 2);
        history.extend((0..10).map(numbered));
        assert_eq!(history.len(), 2);
        assert_eq!(history.last(), Some(&numbered(9)));
    }

    #[test]
    #[should_panic(expected = "capacity must be greater than 0")]
    fn test_zero_capacity_panics() {
        let _history = ChatHistory::bounded(vec![], 0);
    }
}
