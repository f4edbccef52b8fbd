//! In-memory ConversationRepository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::conversation::{Conversation, Message};
use crate::domain::foundation::{ConversationId, DomainError, ErrorCode};
use crate::ports::ConversationRepository;

#[derive(Debug, Clone, Default)]
pub struct InMemoryConversationRepository {
    conversations: Arc<RwLock<HashMap<ConversationId, Conversation>>>,
    messages: Arc<RwLock<HashMap<ConversationId, Vec<Message>>>>,
    /// When set, `update` fails with a database error (partial-failure tests).
    fail_updates: Arc<RwLock<bool>>,
}

impl InMemoryConversationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `update` fail until reset.
    pub async fn set_fail_updates(&self, fail: bool) {
        *self.fail_updates.write().await = fail;
    }

    pub async fn len(&self) -> usize {
        self.conversations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.conversations.read().await.is_empty()
    }
}

fn not_found(id: &ConversationId) -> DomainError {
    DomainError::new(
        ErrorCode::ConversationNotFound,
        format!("Conversation not found: {}", id),
    )
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn save(&self, conversation: &Conversation) -> Result<(), DomainError> {
        self.conversations
            .write()
            .await
            .insert(*conversation.id(), conversation.clone());
        Ok(())
    }

    async fn update(&self, conversation: &Conversation) -> Result<(), DomainError> {
        if *self.fail_updates.read().await {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "Simulated conversation update failure",
            ));
        }

        let mut conversations = self.conversations.write().await;
        match conversations.get_mut(conversation.id()) {
            Some(stored) => {
                *stored = conversation.clone();
                Ok(())
            }
            None => Err(not_found(conversation.id())),
        }
    }

    async fn find_by_id(&self, id: &ConversationId) -> Result<Option<Conversation>, DomainError> {
        Ok(self.conversations.read().await.get(id).cloned())
    }

    async fn add_message(&self, message: &Message) -> Result<(), DomainError> {
        if !self
            .conversations
            .read()
            .await
            .contains_key(message.conversation_id())
        {
            return Err(not_found(message.conversation_id()));
        }

        self.messages
            .write()
            .await
            .entry(*message.conversation_id())
            .or_default()
            .push(message.clone());
        Ok(())
    }

    async fn messages(&self, id: &ConversationId) -> Result<Vec<Message>, DomainError> {
        Ok(self.messages.read().await.get(id).cloned().unwrap_or_default())
    }

    async fn recent_messages(
        &self,
        id: &ConversationId,
        limit: usize,
    ) -> Result<Vec<Message>, DomainError> {
        let messages = self.messages.read().await;
        let all = messages.get(id).map(Vec::as_slice).unwrap_or_default();
        let start = all.len().saturating_sub(limit);
        Ok(all[start..].to_vec())
    }
}
