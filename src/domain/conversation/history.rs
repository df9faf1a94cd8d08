//! Bounded dialogue history sent to the dialogue model.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of messages forwarded with each request.
pub const DEFAULT_MAX_HISTORY_MESSAGES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueMessage {
    pub role: MessageRole,
    pub content: String,
}

impl DialogueMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Last `capacity` messages of the conversation, oldest first.
#[derive(Debug, Clone)]
pub struct DialogueHistory {
    messages: VecDeque<DialogueMessage>,
    capacity: usize,
}

impl DialogueHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, message: DialogueMessage) {
        if self.capacity == 0 {
            return;
        }
        while self.messages.len() >= self.capacity {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
    }

    /// Records a completed exchange.
    pub fn push_exchange(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.push(DialogueMessage::user(user));
        self.push(DialogueMessage::assistant(assistant));
    }

    pub fn to_vec(&self) -> Vec<DialogueMessage> {
        self.messages.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl Default for DialogueHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY_MESSAGES)
    }
}
