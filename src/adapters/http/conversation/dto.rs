//! HTTP DTOs for conversation and chat endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::conversation::{
    ConversationView, CreateConversationResult, TurnResult,
};
use crate::domain::collection::{CollectedData, ScenarioSubType, ScenarioType};
use crate::domain::conversation::{Conversation, ConversationStatus, GeoPoint, Message, MessageRole, Place};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to open a conversation, optionally with a scenario already picked.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateConversationRequest {
    pub scenario_type: Option<ScenarioType>,
    pub scenario_sub_type: Option<ScenarioSubType>,
}

/// One chat turn.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub conversation_id: String,
    pub message: String,
    #[serde(default)]
    pub location: Option<GeoPoint>,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct ConversationResponse {
    pub id: String,
    pub status: ConversationStatus,
    pub collected_data: CollectedData,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub search_results: Vec<Place>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Conversation> for ConversationResponse {
    fn from(conversation: &Conversation) -> Self {
        Self {
            id: conversation.id().to_string(),
            status: conversation.status(),
            collected_data: conversation.collected_data().clone(),
            search_results: conversation.search_results().to_vec(),
            created_at: conversation.created_at().to_rfc3339(),
            updated_at: conversation.updated_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub created_at: String,
}

impl From<&Message> for MessageResponse {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id().to_string(),
            role: message.role(),
            content: message.content().to_string(),
            created_at: message.created_at().to_rfc3339(),
        }
    }
}

/// Response to `POST /api/conversations`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateConversationResponse {
    pub conversation: ConversationResponse,
    pub greeting: MessageResponse,
}

impl From<CreateConversationResult> for CreateConversationResponse {
    fn from(result: CreateConversationResult) -> Self {
        Self {
            conversation: (&result.conversation).into(),
            greeting: (&result.greeting).into(),
        }
    }
}

/// Conversation with its transcript, oldest message first.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationDetailResponse {
    #[serde(flatten)]
    pub conversation: ConversationResponse,
    pub messages: Vec<MessageResponse>,
}

impl From<ConversationView> for ConversationDetailResponse {
    fn from(view: ConversationView) -> Self {
        Self {
            conversation: (&view.conversation).into(),
            messages: view.messages.iter().map(Into::into).collect(),
        }
    }
}

/// Response to `POST /api/chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub message: String,
    pub collected: CollectedData,
    pub is_complete: bool,
    pub conversation_status: ConversationStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub search_results: Vec<Place>,
}

impl From<TurnResult> for ChatResponse {
    fn from(turn: TurnResult) -> Self {
        Self {
            message: turn.message,
            collected: turn.collected,
            is_complete: turn.is_complete,
            conversation_status: turn.status,
            search_results: turn.search_results,
        }
    }
}
