//! Foundation module - Shared domain primitives.
//!
//! Identifiers, timestamps, the state-machine trait, authentication identity
//! and error types used by the conversation and call domains.

mod auth;
mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{CallId, ConversationId, MessageId, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
