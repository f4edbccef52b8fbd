//! CreateCallHandler - freezes a READY conversation into a PENDING call.

use std::sync::Arc;

use crate::application::handlers::conversation::TurnLocks;
use crate::domain::call::{Call, CallStatus};
use crate::domain::conversation::ConversationStatus;
use crate::domain::foundation::{ConversationId, UserId};
use crate::ports::{CallRepository, ConversationRepository};

use super::CallError;

#[derive(Debug, Clone)]
pub struct CreateCallCommand {
    pub user_id: UserId,
    pub conversation_id: ConversationId,
}

pub struct CreateCallHandler {
    calls: Arc<dyn CallRepository>,
    conversations: Arc<dyn ConversationRepository>,
    locks: TurnLocks,
}

impl CreateCallHandler {
    pub fn new(
        calls: Arc<dyn CallRepository>,
        conversations: Arc<dyn ConversationRepository>,
        locks: TurnLocks,
    ) -> Self {
        Self {
            calls,
            conversations,
            locks,
        }
    }

    /// Creates a call from the conversation's current CollectedData.
    ///
    /// Later turns cannot change what the call will say: the details are
    /// copied, not referenced.
    ///
    /// # Errors
    ///
    /// - `ConversationNotFound` if missing or not owned
    /// - `ConversationNotReady` unless the conversation is `READY`, or when
    ///   it already has a call waiting to be started
    /// - `InvalidInput` without a dialable target phone number
    pub async fn handle(&self, cmd: CreateCallCommand) -> Result<Call, CallError> {
        let _guard = self.locks.acquire(cmd.conversation_id).await;

        let conversation = self
            .conversations
            .find_owned(&cmd.conversation_id, &cmd.user_id)
            .await?
            .ok_or(CallError::ConversationNotFound(cmd.conversation_id))?;

        if conversation.status() != ConversationStatus::Ready {
            return Err(CallError::ConversationNotReady(format!(
                "Conversation is {}, expected READY",
                conversation.status()
            )));
        }

        if let Some(pending) = self
            .calls
            .list_for_conversation(&cmd.conversation_id)
            .await?
            .into_iter()
            .find(|call| call.status() == CallStatus::Pending)
        {
            return Err(CallError::ConversationNotReady(format!(
                "Conversation already has a pending call: {}",
                pending.id()
            )));
        }

        let call = Call::new(
            cmd.user_id,
            Some(cmd.conversation_id),
            conversation.collected_data().clone(),
        )?;
        self.calls.save(&call).await?;

        tracing::info!(
            call_id = %call.id(),
            conversation_id = %cmd.conversation_id,
            "Call created"
        );
        Ok(call)
    }
}
