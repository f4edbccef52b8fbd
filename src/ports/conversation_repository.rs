//! Conversation repository port.
//!
//! Defines the contract for persisting Conversation aggregates and their
//! append-only message log.
//!
//! # Design
//!
//! - **Single-record writes**: every call touches one conversation row or
//!   inserts one message row; nothing is composed into a transaction
//! - **Owner scoping**: `find_owned` hides records of other users, so
//!   "not yours" and "does not exist" look the same to callers

use crate::domain::conversation::{Conversation, Message};
use crate::domain::foundation::{ConversationId, DomainError, UserId};
use async_trait::async_trait;

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Save a new conversation.
    async fn save(&self, conversation: &Conversation) -> Result<(), DomainError>;

    /// Update status, collected data and search results of an existing
    /// conversation. Messages are not touched.
    ///
    /// # Errors
    ///
    /// - `ConversationNotFound` if the conversation doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update(&self, conversation: &Conversation) -> Result<(), DomainError>;

    /// Find a conversation by its ID, regardless of owner.
    async fn find_by_id(&self, id: &ConversationId) -> Result<Option<Conversation>, DomainError>;

    /// Find a conversation by ID only if `user_id` owns it.
    async fn find_owned(
        &self,
        id: &ConversationId,
        user_id: &UserId,
    ) -> Result<Option<Conversation>, DomainError> {
        Ok(self
            .find_by_id(id)
            .await?
            .filter(|conversation| conversation.is_owner(user_id)))
    }

    /// Append a message. The conversation must exist.
    async fn add_message(&self, message: &Message) -> Result<(), DomainError>;

    /// All messages of a conversation, oldest first.
    async fn messages(&self, id: &ConversationId) -> Result<Vec<Message>, DomainError>;

    /// The newest `limit` messages of a conversation, oldest first.
    async fn recent_messages(
        &self,
        id: &ConversationId,
        limit: usize,
    ) -> Result<Vec<Message>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn ConversationRepository) {}
    }
}
