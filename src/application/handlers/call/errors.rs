//! Call handler error types.

use thiserror::Error;

use crate::domain::foundation::{CallId, ConversationId, DomainError, ErrorCode};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// Missing, or owned by someone else.
    #[error("Call not found: {0}")]
    NotFound(CallId),

    #[error("Conversation not found: {0}")]
    ConversationNotFound(ConversationId),

    #[error("{message}")]
    InvalidInput { field: String, message: String },

    /// A start request for a call that already left `PENDING`.
    #[error("{0}")]
    NotPending(String),

    /// The conversation is not `READY` for a call.
    #[error("{0}")]
    ConversationNotReady(String),

    #[error("Repository error: {0}")]
    Repository(String),
}

impl CallError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::CallNotFound,
            Self::ConversationNotFound(_) => ErrorCode::ConversationNotFound,
            Self::InvalidInput { .. } => ErrorCode::ValidationFailed,
            Self::NotPending(_) => ErrorCode::CallNotPending,
            Self::ConversationNotReady(_) => ErrorCode::ConversationNotReady,
            Self::Repository(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<DomainError> for CallError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed | ErrorCode::EmptyField | ErrorCode::InvalidFormat => {
                Self::InvalidInput {
                    field: err
                        .details
                        .get("field")
                        .cloned()
                        .unwrap_or_else(|| "target_phone".to_string()),
                    message: err.message,
                }
            }
            ErrorCode::CallNotPending => Self::NotPending(err.message),
            ErrorCode::ConversationNotReady | ErrorCode::ConversationClosed => {
                Self::ConversationNotReady(err.message)
            }
            _ => Self::Repository(err.to_string()),
        }
    }
}
