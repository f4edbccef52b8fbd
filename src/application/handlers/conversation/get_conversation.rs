//! GetConversationHandler - query handler for a conversation and its messages.

use std::sync::Arc;

use crate::domain::conversation::{Conversation, Message};
use crate::domain::foundation::{ConversationId, UserId};
use crate::ports::ConversationRepository;

use super::ConversationError;

#[derive(Debug, Clone)]
pub struct GetConversationQuery {
    pub conversation_id: ConversationId,
    pub user_id: UserId,
}

/// A conversation with its full message history, oldest first.
#[derive(Debug, Clone)]
pub struct ConversationView {
    pub conversation: Conversation,
    pub messages: Vec<Message>,
}

pub struct GetConversationHandler {
    repository: Arc<dyn ConversationRepository>,
}

impl GetConversationHandler {
    pub fn new(repository: Arc<dyn ConversationRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        query: GetConversationQuery,
    ) -> Result<ConversationView, ConversationError> {
        let conversation = self
            .repository
            .find_owned(&query.conversation_id, &query.user_id)
            .await?
            .ok_or(ConversationError::NotFound(query.conversation_id))?;

        let messages = self.repository.messages(&query.conversation_id).await?;

        Ok(ConversationView {
            conversation,
            messages,
        })
    }
}
