//! Conversation HTTP adapter.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ChatRequest, ChatResponse, ConversationDetailResponse, ConversationResponse,
    CreateConversationRequest, CreateConversationResponse, MessageResponse,
};
pub use handlers::ConversationHandlers;
pub use routes::{chat_routes, conversation_routes};
