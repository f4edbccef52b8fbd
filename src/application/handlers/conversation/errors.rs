//! Conversation handler error types.

use thiserror::Error;

use crate::domain::foundation::{ConversationId, DomainError, ErrorCode, ValidationError};

/// Errors surfaced by the conversation handlers.
///
/// Upstream failures (LLM, place search) never appear here: the turn engine
/// recovers from them locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversationError {
    /// Missing, or owned by someone else. The two are indistinguishable.
    #[error("Conversation not found: {0}")]
    NotFound(ConversationId),

    #[error("{message}")]
    InvalidInput { field: String, message: String },

    /// The conversation is past the point where the operation applies.
    #[error("{0}")]
    InvalidState(String),

    #[error("Repository error: {0}")]
    Repository(String),
}

impl ConversationError {
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::ConversationNotFound,
            Self::InvalidInput { .. } => ErrorCode::ValidationFailed,
            Self::InvalidState(_) => ErrorCode::ConversationClosed,
            Self::Repository(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<DomainError> for ConversationError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed | ErrorCode::EmptyField | ErrorCode::InvalidFormat => {
                let field = err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "request".to_string());
                Self::InvalidInput {
                    field,
                    message: err.message,
                }
            }
            ErrorCode::ConversationClosed
            | ErrorCode::ConversationNotReady
            | ErrorCode::InvalidStateTransition => Self::InvalidState(err.message),
            _ => Self::Repository(err.to_string()),
        }
    }
}

impl From<ValidationError> for ConversationError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::EmptyField { field } => {
                Self::invalid_input(field, "메시지를 입력해주세요.")
            }
            ValidationError::TooLong { field, max, .. } => {
                Self::invalid_input(field, format!("메시지는 {}자 이내로 입력해주세요.", max))
            }
            ValidationError::InvalidFormat { field, reason } => Self::invalid_input(field, reason),
            ValidationError::InvalidTransition { from, to } => {
                Self::InvalidState(format!("Cannot transition from {} to {}", from, to))
            }
        }
    }
}
