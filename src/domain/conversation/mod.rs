//! Conversation domain module.
//!
//! A conversation is the chat in which call details are gathered. This
//! module holds the aggregate, its messages, and the pure pieces of a turn:
//! parsing model replies, correcting them, and building the instruction.

mod aggregate;
pub mod corrections;
mod message;
pub mod parser;
pub mod place;
pub mod prompts;
mod status;

pub use aggregate::Conversation;
pub use corrections::{apply_corrections, AppliedCorrection, CorrectionContext};
pub use message::{
    validate_user_message, Message, MessageMetadata, MessageRole, MAX_MESSAGE_CHARS,
};
pub use parser::{parse_response, ParseOutcome, ParsedResponse};
pub use place::{GeoPoint, Place};
pub use status::ConversationStatus;
