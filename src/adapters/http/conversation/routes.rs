//! HTTP routes for conversation and chat endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    cancel_conversation, chat, create_conversation, get_conversation, ConversationHandlers,
};

/// Routes mounted under `/api/conversations`.
pub fn conversation_routes(handlers: ConversationHandlers) -> Router {
    Router::new()
        .route("/", post(create_conversation))
        .route("/:id", get(get_conversation))
        .route("/:id/cancel", post(cancel_conversation))
        .with_state(handlers)
}

/// `POST /chat`, mounted under `/api`.
pub fn chat_routes(handlers: ConversationHandlers) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .with_state(handlers)
}
