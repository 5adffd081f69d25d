//! Conversational AI backend
//!
//! The [`Agent`] trait is the narrow contract the main loop relies on:
//! availability, one question at a time, a resettable bounded history.
//! [`OllamaAgent`] is the real implementation backed by a local `ollama`
//! subprocess; tests substitute scripted agents.

mod ollama;

pub use ollama::OllamaAgent;

use std::collections::VecDeque;

use async_trait::async_trait;

use crate::Result;

/// Who said a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The human operator
    User,
    /// The model's reply
    Assistant,
}

/// One role-tagged history entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Speaker role
    pub role: Role,
    /// Message text
    pub content: String,
}

/// Conversational AI contract
///
/// `ask` always yields a user-presentable string: implementations translate
/// internal failures (runner missing, timeout, bad exit) into apologetic
/// text rather than propagating them. The `Result` exists for the seam —
/// the loop treats an `Err` like any other per-turn failure.
#[async_trait]
pub trait Agent {
    /// Whether the backend can answer questions
    fn is_available(&self) -> bool;

    /// Ask one question and get a spoken-ready reply
    ///
    /// # Errors
    ///
    /// Real backends fold failures into the returned text; test doubles may
    /// return errors to exercise the loop's recovery path.
    async fn ask(&mut self, text: &str) -> Result<String>;

    /// Drop all retained exchanges
    fn clear_history(&mut self);

    /// The retained conversation window
    fn history(&self) -> &ConversationHistory;
}

/// Bounded rolling window of user/assistant exchanges
///
/// Capped at `2 * max_exchanges` entries. Eviction runs after every append:
/// oldest pairs go first, so the window always holds the most recent
/// complete exchanges.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    entries: VecDeque<Message>,
    max_exchanges: usize,
}

impl ConversationHistory {
    /// Create an empty history retaining at most `max_exchanges` exchanges
    #[must_use]
    pub fn new(max_exchanges: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_exchanges * 2),
            max_exchanges,
        }
    }

    /// Append one user/assistant exchange, then evict oldest pairs until
    /// the entry count is back within the cap
    pub fn push_exchange(&mut self, user: &str, assistant: &str) {
        self.entries.push_back(Message {
            role: Role::User,
            content: user.to_string(),
        });
        self.entries.push_back(Message {
            role: Role::Assistant,
            content: assistant.to_string(),
        });

        while self.entries.len() > self.max_exchanges * 2 {
            self.entries.pop_front();
            self.entries.pop_front();
        }
    }

    /// Remove all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of retained entries (two per exchange)
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no exchanges are retained
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries oldest first
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a ConversationHistory {
    type Item = &'a Message;
    type IntoIter = std::collections::vec_deque::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
