//! HTTP handlers for conversation and chat endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::dto::ErrorResponse;
use crate::adapters::http::middleware::RequireAuth;
use crate::application::handlers::conversation::{
    CancelConversationCommand, CancelConversationHandler, ConversationError,
    CreateConversationCommand, CreateConversationHandler, GetConversationHandler,
    GetConversationQuery, SendMessageCommand, SendMessageHandler,
};
use crate::domain::foundation::{ConversationId, ErrorCode};

use super::dto::{
    ChatRequest, ChatResponse, ConversationDetailResponse, ConversationResponse,
    CreateConversationRequest, CreateConversationResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct ConversationHandlers {
    create_handler: Arc<CreateConversationHandler>,
    get_handler: Arc<GetConversationHandler>,
    cancel_handler: Arc<CancelConversationHandler>,
    send_handler: Arc<SendMessageHandler>,
}

impl ConversationHandlers {
    pub fn new(
        create_handler: Arc<CreateConversationHandler>,
        get_handler: Arc<GetConversationHandler>,
        cancel_handler: Arc<CancelConversationHandler>,
        send_handler: Arc<SendMessageHandler>,
    ) -> Self {
        Self {
            create_handler,
            get_handler,
            cancel_handler,
            send_handler,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/conversations - Open a conversation and get the greeting
pub async fn create_conversation(
    State(handlers): State<ConversationHandlers>,
    RequireAuth(user): RequireAuth,
    body: Option<Json<CreateConversationRequest>>,
) -> Response {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let cmd = CreateConversationCommand {
        user_id: user.id,
        scenario_type: req.scenario_type,
        scenario_sub_type: req.scenario_sub_type,
    };

    match handlers.create_handler.handle(cmd).await {
        Ok(result) => {
            let response: CreateConversationResponse = result.into();
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => handle_conversation_error(e),
    }
}

/// GET /api/conversations/:id - Conversation with its messages
pub async fn get_conversation(
    State(handlers): State<ConversationHandlers>,
    RequireAuth(user): RequireAuth,
    Path(conversation_id): Path<String>,
) -> Response {
    let conversation_id = match parse_conversation_id(&conversation_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let query = GetConversationQuery {
        conversation_id,
        user_id: user.id,
    };

    match handlers.get_handler.handle(query).await {
        Ok(view) => {
            let response: ConversationDetailResponse = view.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_conversation_error(e),
    }
}

/// POST /api/conversations/:id/cancel - Abandon a conversation
pub async fn cancel_conversation(
    State(handlers): State<ConversationHandlers>,
    RequireAuth(user): RequireAuth,
    Path(conversation_id): Path<String>,
) -> Response {
    let conversation_id = match parse_conversation_id(&conversation_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let cmd = CancelConversationCommand {
        conversation_id,
        user_id: user.id,
    };

    match handlers.cancel_handler.handle(cmd).await {
        Ok(conversation) => {
            let response = ConversationResponse::from(&conversation);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_conversation_error(e),
    }
}

/// POST /api/chat - One chat turn
pub async fn chat(
    State(handlers): State<ConversationHandlers>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<ChatRequest>,
) -> Response {
    let conversation_id = match parse_conversation_id(&req.conversation_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let cmd = SendMessageCommand {
        user_id: user.id,
        conversation_id,
        message: req.message,
        location: req.location,
    };

    match handlers.send_handler.handle(cmd).await {
        Ok(turn) => {
            let response: ChatResponse = turn.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_conversation_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn parse_conversation_id(raw: &str) -> Result<ConversationId, Response> {
    raw.parse::<ConversationId>().map_err(|_| {
        ErrorResponse::bad_request("Invalid conversation ID")
            .with_field("conversation_id")
            .into_response_with(StatusCode::BAD_REQUEST)
    })
}

fn handle_conversation_error(error: ConversationError) -> Response {
    let code = error.code();
    match error {
        ConversationError::NotFound(id) => {
            ErrorResponse::not_found(code, "Conversation", &id.to_string())
                .into_response_with(StatusCode::NOT_FOUND)
        }
        ConversationError::InvalidInput { field, message } => {
            ErrorResponse::new(code, message)
                .with_field(&field)
                .into_response_with(StatusCode::BAD_REQUEST)
        }
        ConversationError::InvalidState(message) => {
            ErrorResponse::new(code, message).into_response_with(StatusCode::CONFLICT)
        }
        ConversationError::Repository(message) => {
            tracing::error!(error = %message, "Conversation storage failure");
            ErrorResponse::new(ErrorCode::DatabaseError, "Internal storage error")
                .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let response = handle_conversation_error(ConversationError::NotFound(ConversationId::new()));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn invalid_input_maps_to_400() {
        let response =
            handle_conversation_error(ConversationError::invalid_input("message", "메시지를 입력해주세요."));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn closed_conversation_maps_to_409() {
        let response =
            handle_conversation_error(ConversationError::InvalidState("closed".to_string()));
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn repository_failure_maps_to_500() {
        let response = handle_conversation_error(ConversationError::Repository("down".to_string()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn malformed_id_is_bad_request() {
        let response = parse_conversation_id("not-a-uuid").unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
