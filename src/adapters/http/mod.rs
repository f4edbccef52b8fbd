//! HTTP adapters - REST API implementations.
//!
//! Each domain module has its own HTTP adapter for endpoint exposure;
//! `router` stitches them together behind auth and the tower-http layers.

pub mod call;
pub mod conversation;
pub mod dto;
pub mod middleware;
pub mod router;

pub use call::{call_routes, CallHandlers};
pub use conversation::{chat_routes, conversation_routes, ConversationHandlers};
pub use dto::ErrorResponse;
pub use router::{app_router, RouterConfig};
