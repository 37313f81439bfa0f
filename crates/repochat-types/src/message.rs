use serde::{Deserialize, Serialize};

/// Role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single turn in a project conversation.
///
/// History entries from the backend carry only `role`, `content` and
/// optionally `sources`; the remaining fields are client-local.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Stable key for the UI, never sent to the backend
    #[serde(skip, default = "new_message_id")]
    pub id: String,
    pub role: Role,
    pub content: String,
    /// File paths cited by the assistant for this turn
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "nullable_sources")]
    pub sources: Vec<String>,
    /// Locally synthesised failure notice, not model output
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_error: bool,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: new_message_id(),
            role: Role::User,
            content: text.into(),
            sources: Vec::new(),
            is_error: false,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            id: new_message_id(),
            role: Role::Assistant,
            content: text.into(),
            sources: Vec::new(),
            is_error: false,
        }
    }

    /// Empty assistant message that stream chunks are appended to.
    pub fn placeholder(sources: Vec<String>) -> Self {
        Self {
            sources,
            ..Self::assistant(String::new())
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::assistant(text)
        }
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}

fn new_message_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn is_false(b: &bool) -> bool {
    !*b
}

// The history endpoint sends `sources: null` for user turns.
fn nullable_sources<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
