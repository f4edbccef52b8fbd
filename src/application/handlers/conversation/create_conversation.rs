//! CreateConversationHandler - opens a chat and posts the greeting.

use std::sync::Arc;

use crate::domain::collection::{ScenarioSubType, ScenarioType};
use crate::domain::conversation::{prompts::GREETING_MESSAGE, Conversation, Message};
use crate::domain::foundation::UserId;
use crate::ports::ConversationRepository;

use super::ConversationError;

/// Command to start a conversation.
#[derive(Debug, Clone)]
pub struct CreateConversationCommand {
    pub user_id: UserId,
    pub scenario_type: Option<ScenarioType>,
    pub scenario_sub_type: Option<ScenarioSubType>,
}

/// The new conversation and its first assistant message.
#[derive(Debug, Clone)]
pub struct CreateConversationResult {
    pub conversation: Conversation,
    pub greeting: Message,
}

pub struct CreateConversationHandler {
    repository: Arc<dyn ConversationRepository>,
}

impl CreateConversationHandler {
    pub fn new(repository: Arc<dyn ConversationRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        cmd: CreateConversationCommand,
    ) -> Result<CreateConversationResult, ConversationError> {
        let conversation =
            Conversation::start(cmd.user_id, cmd.scenario_type, cmd.scenario_sub_type)?;
        self.repository.save(&conversation).await?;

        let greeting = Message::assistant(*conversation.id(), GREETING_MESSAGE, None);
        self.repository.add_message(&greeting).await?;

        tracing::info!(
            conversation_id = %conversation.id(),
            scenario_type = ?cmd.scenario_type,
            "Conversation created"
        );

        Ok(CreateConversationResult {
            conversation,
            greeting,
        })
    }
}
