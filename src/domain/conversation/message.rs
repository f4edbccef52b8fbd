//! Message entity for conversations.
//!
//! Messages are append-only records of user and assistant turns. Their
//! creation order is what the model sees as history, so `created_at` is
//! load-bearing.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{ConversationId, MessageId, Timestamp, ValidationError};

/// Maximum characters accepted in one user message.
pub const MAX_MESSAGE_CHARS: usize = 1000;

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl std::str::FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("unknown message role: {}", other)),
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit data attached to assistant messages: the raw slots the model
/// emitted that turn and its completion flag. Not read back by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageMetadata {
    pub collected: serde_json::Value,
    pub is_complete: bool,
}

/// An immutable message within a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    conversation_id: ConversationId,
    role: MessageRole,
    content: String,
    metadata: Option<MessageMetadata>,
    created_at: Timestamp,
}

impl Message {
    pub fn user(conversation_id: ConversationId, content: impl Into<String>) -> Self {
        Self::new(conversation_id, MessageRole::User, content.into(), None)
    }

    pub fn assistant(
        conversation_id: ConversationId,
        content: impl Into<String>,
        metadata: Option<MessageMetadata>,
    ) -> Self {
        Self::new(conversation_id, MessageRole::Assistant, content.into(), metadata)
    }

    fn new(
        conversation_id: ConversationId,
        role: MessageRole,
        content: String,
        metadata: Option<MessageMetadata>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            conversation_id,
            role,
            content,
            metadata,
            created_at: Timestamp::now(),
        }
    }

    /// Reconstitutes a message from persistence (no validation).
    pub fn reconstitute(
        id: MessageId,
        conversation_id: ConversationId,
        role: MessageRole,
        content: String,
        metadata: Option<MessageMetadata>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            conversation_id,
            role,
            content,
            metadata,
            created_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn conversation_id(&self) -> &ConversationId {
        &self.conversation_id
    }

    pub fn role(&self) -> MessageRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn metadata(&self) -> Option<&MessageMetadata> {
        self.metadata.as_ref()
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn is_assistant(&self) -> bool {
        self.role == MessageRole::Assistant
    }
}

/// Validates raw user input and returns the trimmed text.
///
/// # Errors
///
/// - `EmptyField` when nothing but whitespace was sent
/// - `TooLong` when the trimmed text exceeds [`MAX_MESSAGE_CHARS`]
pub fn validate_user_message(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty_field("message"));
    }
    let chars = trimmed.chars().count();
    if chars > MAX_MESSAGE_CHARS {
        return Err(ValidationError::too_long("message", MAX_MESSAGE_CHARS, chars));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_has_no_metadata() {
        let msg = Message::user(ConversationId::new(), "안녕하세요");
        assert_eq!(msg.role(), MessageRole::User);
        assert!(msg.metadata().is_none());
        assert!(!msg.is_assistant());
    }

    #[test]
    fn assistant_message_keeps_metadata() {
        let metadata = MessageMetadata {
            collected: serde_json::json!({"target_name": "카페"}),
            is_complete: false,
        };
        let msg = Message::assistant(ConversationId::new(), "네!", Some(metadata.clone()));
        assert_eq!(msg.metadata(), Some(&metadata));
    }

    #[test]
    fn validation_trims_input() {
        assert_eq!(validate_user_message("  예약해줘 \n").unwrap(), "예약해줘");
    }

    #[test]
    fn validation_rejects_blank_input() {
        assert_eq!(
            validate_user_message("   "),
            Err(ValidationError::empty_field("message"))
        );
    }

    #[test]
    fn validation_counts_characters_not_bytes() {
        let at_limit = "가".repeat(MAX_MESSAGE_CHARS);
        assert!(validate_user_message(&at_limit).is_ok());

        let over = "가".repeat(MAX_MESSAGE_CHARS + 1);
        assert_eq!(
            validate_user_message(&over),
            Err(ValidationError::too_long("message", MAX_MESSAGE_CHARS, MAX_MESSAGE_CHARS + 1))
        );
    }

    #[test]
    fn role_parses_from_storage_form() {
        assert_eq!("assistant".parse::<MessageRole>(), Ok(MessageRole::Assistant));
        assert!("system".parse::<MessageRole>().is_err());
    }
}
