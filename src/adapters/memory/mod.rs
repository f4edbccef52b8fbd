//! In-memory repositories for tests and single-process development.
//!
//! State lives behind `tokio::sync::RwLock`s and is lost on restart.

mod call_repository;
mod conversation_repository;

pub use call_repository::InMemoryCallRepository;
pub use conversation_repository::InMemoryConversationRepository;
