//! HTTP handlers for call endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::dto::ErrorResponse;
use crate::adapters::http::middleware::RequireAuth;
use crate::application::handlers::call::{
    CallError, CreateCallCommand, CreateCallHandler, GetCallHandler, GetCallQuery,
    ListCallsHandler, ListCallsQuery, StartCallCommand, StartCallHandler,
};
use crate::domain::foundation::{CallId, ConversationId, ErrorCode};

use super::dto::{CallListResponse, CallResponse, CreateCallRequest, StartCallResponse};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct CallHandlers {
    create_handler: Arc<CreateCallHandler>,
    start_handler: Arc<StartCallHandler>,
    get_handler: Arc<GetCallHandler>,
    list_handler: Arc<ListCallsHandler>,
}

impl CallHandlers {
    pub fn new(
        create_handler: Arc<CreateCallHandler>,
        start_handler: Arc<StartCallHandler>,
        get_handler: Arc<GetCallHandler>,
        list_handler: Arc<ListCallsHandler>,
    ) -> Self {
        Self {
            create_handler,
            start_handler,
            get_handler,
            list_handler,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/calls - Create a PENDING call from a READY conversation
pub async fn create_call(
    State(handlers): State<CallHandlers>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<CreateCallRequest>,
) -> Response {
    let conversation_id = match req.conversation_id.parse::<ConversationId>() {
        Ok(id) => id,
        Err(_) => {
            return ErrorResponse::bad_request("Invalid conversation ID")
                .with_field("conversation_id")
                .into_response_with(StatusCode::BAD_REQUEST)
        }
    };

    let cmd = CreateCallCommand {
        user_id: user.id,
        conversation_id,
    };

    match handlers.create_handler.handle(cmd).await {
        Ok(call) => (StatusCode::CREATED, Json(CallResponse::from(&call))).into_response(),
        Err(e) => handle_call_error(e),
    }
}

/// GET /api/calls - The user's calls, newest first
pub async fn list_calls(
    State(handlers): State<CallHandlers>,
    RequireAuth(user): RequireAuth,
) -> Response {
    match handlers.list_handler.handle(ListCallsQuery { user_id: user.id }).await {
        Ok(calls) => (StatusCode::OK, Json(CallListResponse::from(calls))).into_response(),
        Err(e) => handle_call_error(e),
    }
}

/// GET /api/calls/:id - Call details
pub async fn get_call(
    State(handlers): State<CallHandlers>,
    RequireAuth(user): RequireAuth,
    Path(call_id): Path<String>,
) -> Response {
    let call_id = match parse_call_id(&call_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let query = GetCallQuery {
        user_id: user.id,
        call_id,
    };

    match handlers.get_handler.handle(query).await {
        Ok(call) => (StatusCode::OK, Json(CallResponse::from(&call))).into_response(),
        Err(e) => handle_call_error(e),
    }
}

/// POST /api/calls/:id/start - Dial a PENDING call
///
/// Returns as soon as the provider accepted the call; the outcome is
/// reconciled in the background. A refused origination answers 502 with
/// the now `FAILED` call.
pub async fn start_call(
    State(handlers): State<CallHandlers>,
    RequireAuth(user): RequireAuth,
    Path(call_id): Path<String>,
) -> Response {
    let call_id = match parse_call_id(&call_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let cmd = StartCallCommand {
        user_id: user.id,
        call_id,
    };

    match handlers.start_handler.handle(cmd).await {
        Ok(result) => {
            let status = if result.originated {
                StatusCode::OK
            } else {
                StatusCode::BAD_GATEWAY
            };
            (status, Json(StartCallResponse::from(&result))).into_response()
        }
        Err(e) => handle_call_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn parse_call_id(raw: &str) -> Result<CallId, Response> {
    raw.parse::<CallId>().map_err(|_| {
        ErrorResponse::bad_request("Invalid call ID")
            .with_field("call_id")
            .into_response_with(StatusCode::BAD_REQUEST)
    })
}

fn handle_call_error(error: CallError) -> Response {
    let code = error.code();
    match error {
        CallError::NotFound(id) => ErrorResponse::not_found(code, "Call", &id.to_string())
            .into_response_with(StatusCode::NOT_FOUND),
        CallError::ConversationNotFound(id) => {
            ErrorResponse::not_found(code, "Conversation", &id.to_string())
                .into_response_with(StatusCode::NOT_FOUND)
        }
        CallError::InvalidInput { field, message } => ErrorResponse::new(code, message)
            .with_field(&field)
            .into_response_with(StatusCode::BAD_REQUEST),
        CallError::NotPending(message) | CallError::ConversationNotReady(message) => {
            ErrorResponse::new(code, message).into_response_with(StatusCode::CONFLICT)
        }
        CallError::Repository(message) => {
            tracing::error!(error = %message, "Call storage failure");
            ErrorResponse::new(ErrorCode::DatabaseError, "Internal storage error")
                .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_pending_maps_to_409() {
        let response =
            handle_call_error(CallError::NotPending("Call is already in status: CALLING".into()));
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn conversation_not_ready_maps_to_409() {
        let response = handle_call_error(CallError::ConversationNotReady("COLLECTING".into()));
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn missing_call_maps_to_404() {
        let response = handle_call_error(CallError::NotFound(CallId::new()));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn invalid_phone_maps_to_400() {
        let response = handle_call_error(CallError::InvalidInput {
            field: "target_phone".into(),
            message: "bad".into(),
        });
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
