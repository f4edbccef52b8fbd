//! Conversation command and query handlers.
//!
//! Opening a conversation, running chat turns against the model, reading
//! the transcript back, and cancelling.

mod cancel_conversation;
mod create_conversation;
mod errors;
mod get_conversation;
mod send_message;
mod turn_lock;

pub use cancel_conversation::{CancelConversationCommand, CancelConversationHandler};
pub use create_conversation::{
    CreateConversationCommand, CreateConversationHandler, CreateConversationResult,
};
pub use errors::ConversationError;
pub use get_conversation::{ConversationView, GetConversationHandler, GetConversationQuery};
pub use send_message::{
    SendMessageCommand, SendMessageHandler, TurnConfig, TurnResult, SEARCH_TOOL_NAME,
};
pub use turn_lock::TurnLocks;
