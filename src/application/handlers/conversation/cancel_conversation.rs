//! CancelConversationHandler - abandons a conversation before any call.

use std::sync::Arc;

use crate::domain::conversation::Conversation;
use crate::domain::foundation::{ConversationId, UserId};
use crate::ports::ConversationRepository;

use super::{ConversationError, TurnLocks};

#[derive(Debug, Clone)]
pub struct CancelConversationCommand {
    pub conversation_id: ConversationId,
    pub user_id: UserId,
}

pub struct CancelConversationHandler {
    repository: Arc<dyn ConversationRepository>,
    locks: TurnLocks,
}

impl CancelConversationHandler {
    /// `locks` must be the registry shared with the turn engine so a cancel
    /// never interleaves with an in-flight turn.
    pub fn new(repository: Arc<dyn ConversationRepository>, locks: TurnLocks) -> Self {
        Self { repository, locks }
    }

    /// Moves a `COLLECTING` or `READY` conversation to `CANCELLED`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if missing or not owned
    /// - `InvalidState` once calling has begun or the conversation ended
    pub async fn handle(
        &self,
        cmd: CancelConversationCommand,
    ) -> Result<Conversation, ConversationError> {
        let _turn = self.locks.acquire(cmd.conversation_id).await;

        let mut conversation = self
            .repository
            .find_owned(&cmd.conversation_id, &cmd.user_id)
            .await?
            .ok_or(ConversationError::NotFound(cmd.conversation_id))?;

        conversation.cancel()?;
        self.repository.update(&conversation).await?;

        tracing::info!(conversation_id = %cmd.conversation_id, "Conversation cancelled");
        Ok(conversation)
    }
}
