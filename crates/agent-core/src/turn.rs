//! Conversation Turns
//!
//! The unit of conversation history exchanged with the model: user text,
//! model text, a tool-call request, or a tool-call result. Turns are
//! immutable once appended.

use serde::{Deserialize, Serialize};

use crate::tool::{ToolCallRequest, ToolCallResult};

/// A single turn in a conversation
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Turn {
    /// Text entered by the user
    User { text: String },

    /// Terminal text produced by the model
    Model { text: String },

    /// A model request to invoke a tool
    ToolCallRequest(ToolCallRequest),

    /// The outcome of a tool invocation, matched to its request by call id
    ToolCallResult(ToolCallResult),
}

impl Turn {
    /// Create a user turn
    pub fn user(text: impl Into<String>) -> Self {
        Turn::User { text: text.into() }
    }

    /// Create a model turn
    pub fn model(text: impl Into<String>) -> Self {
        Turn::Model { text: text.into() }
    }

    /// Text content, if this is a textual turn
    pub fn text(&self) -> Option<&str> {
        match self {
            Turn::User { text } | Turn::Model { text } => Some(text),
            _ => None,
        }
    }
}

/// Append-only conversation history
///
/// The full ordered sequence is sent to the model on every invocation;
/// turns are never edited, reordered, or dropped.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a turn
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// The full ordered sequence, for transmission to the model
    pub fn snapshot(&self) -> &[Turn] {
        &self.turns
    }

    /// Get the last turn
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Number of turns
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
