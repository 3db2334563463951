//! Conversation items exchanged with the agent runtime.
//!
//! A conversation is an ordered `Vec<ConversationItem>`. Guardrail functions
//! take slices and hand back new vectors; they never edit a caller's history
//! in place.

use crate::error::{GuardError, GuardResult};
use serde::{Deserialize, Serialize};

/// A single role-tagged entry of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationItem {
    /// Role of the item author
    pub role: ItemRole,

    /// Text content of the item
    pub content: String,
}

impl ConversationItem {
    /// Create an item with the given role.
    #[must_use]
    pub fn new(role: ItemRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system item
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ItemRole::System, content)
    }

    /// Create a user item
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ItemRole::User, content)
    }

    /// Create an assistant item
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ItemRole::Assistant, content)
    }

    /// Create a tool item
    #[must_use]
    pub fn tool(content: impl Into<String>) -> Self {
        Self::new(ItemRole::Tool, content)
    }

    /// Whether the item carries any content at all.
    #[must_use]
    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }

    /// Copy of this item with different content and the same role.
    #[must_use]
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        Self::new(self.role, content)
    }

    /// Decode a list of items from the runtime's dynamic JSON representation.
    ///
    /// # Errors
    /// Returns [`GuardError::MalformedItem`] if the value is not an array of
    /// `{ "role": ..., "content": ... }` objects with a known role.
    pub fn list_from_value(value: &serde_json::Value) -> GuardResult<Vec<Self>> {
        serde_json::from_value(value.clone()).map_err(|e| GuardError::malformed(e.to_string()))
    }
}

/// Item role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemRole {
    /// System instruction
    System,
    /// End-user message
    User,
    /// Agent reply
    Assistant,
    /// Tool call or tool output
    Tool,
}

impl ItemRole {
    /// Roles whose content is conversational text subject to content filtering.
    #[must_use]
    pub fn is_dialogue(self) -> bool {
        matches!(self, Self::User | Self::Assistant)
    }
}

impl std::fmt::Display for ItemRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
            Self::Tool => write!(f, "tool"),
        }
    }
}
