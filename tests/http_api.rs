//! HTTP API integration tests.
//!
//! Drives the full router (auth middleware, JSON extraction, error mapping)
//! with in-memory repositories, a scripted model and a simulated voice
//! provider.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use wigvo::adapters::ai::MockAIProvider;
use wigvo::adapters::auth::MockSessionValidator;
use wigvo::adapters::http::{app_router, CallHandlers, ConversationHandlers, RouterConfig};
use wigvo::adapters::memory::{InMemoryCallRepository, InMemoryConversationRepository};
use wigvo::adapters::search::StaticPlaceSearch;
use wigvo::adapters::voice::SimulatedVoiceProvider;
use wigvo::application::handlers::call::{
    CallReconciler, CreateCallHandler, GetCallHandler, ListCallsHandler, ReconcileMode,
    StartCallHandler,
};
use wigvo::application::handlers::conversation::{
    CancelConversationHandler, CreateConversationHandler, GetConversationHandler,
    SendMessageHandler, TurnLocks,
};
use wigvo::ports::VoiceError;

// =============================================================================
// Test Infrastructure
// =============================================================================

const ALICE: &str = "alice-token";
const BOB: &str = "bob-token";

const READY_REPLY: &str = r#"OO식당에 영업시간을 문의해드릴게요.
```json
{"collected": {"target_name": "OO식당", "target_phone": "02-123-4567", "scenario_type": "INQUIRY", "special_request": "영업시간 문의"}, "is_complete": true}
```"#;

const PARTIAL_REPLY: &str = r#"어느 가게에 전화할까요?
```json
{"collected": {"scenario_type": "INQUIRY"}, "is_complete": false}
```"#;

fn app(ai: MockAIProvider, voice: SimulatedVoiceProvider) -> Router {
    let conversations = Arc::new(InMemoryConversationRepository::new());
    let calls = Arc::new(InMemoryCallRepository::new());
    let voice = Arc::new(voice);
    let locks = TurnLocks::new();

    let conversation_handlers = ConversationHandlers::new(
        Arc::new(CreateConversationHandler::new(conversations.clone())),
        Arc::new(GetConversationHandler::new(conversations.clone())),
        Arc::new(CancelConversationHandler::new(conversations.clone(), locks.clone())),
        Arc::new(SendMessageHandler::new(
            conversations.clone(),
            Arc::new(ai),
            Arc::new(StaticPlaceSearch::new(Vec::new())),
            locks.clone(),
        )),
    );

    let reconciler = Arc::new(CallReconciler::new(
        calls.clone(),
        conversations.clone(),
        voice.clone(),
        ReconcileMode::Simulated {
            delay: Duration::from_secs(60),
        },
    ));
    let call_handlers = CallHandlers::new(
        Arc::new(CreateCallHandler::new(
            calls.clone(),
            conversations.clone(),
            locks.clone(),
        )),
        Arc::new(StartCallHandler::new(
            calls.clone(),
            conversations,
            voice,
            reconciler,
            locks,
        )),
        Arc::new(GetCallHandler::new(calls.clone())),
        Arc::new(ListCallsHandler::new(calls)),
    );

    let validator = MockSessionValidator::new()
        .with_test_user(ALICE, "alice")
        .with_test_user(BOB, "bob");

    app_router(
        conversation_handlers,
        call_handlers,
        Arc::new(validator),
        &RouterConfig::default(),
    )
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

/// Creates a conversation as Alice and returns its id.
async fn open_conversation(app: &Router) -> String {
    let (status, body) = send(app, "POST", "/api/conversations", Some(ALICE), Some(json!({}))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["conversation"]["id"].as_str().unwrap().to_string()
}

async fn chat(app: &Router, conversation_id: &str, message: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/api/chat",
        Some(ALICE),
        Some(json!({ "conversation_id": conversation_id, "message": message })),
    )
    .await
}

// =============================================================================
// Health and auth
// =============================================================================

#[tokio::test]
async fn health_is_public() {
    let app = app(MockAIProvider::new(), SimulatedVoiceProvider::new());

    let (status, body) = send(&app, "GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "wigvo");
}

#[tokio::test]
async fn api_requires_bearer_token() {
    let app = app(MockAIProvider::new(), SimulatedVoiceProvider::new());

    let (missing, _) = send(&app, "POST", "/api/conversations", None, Some(json!({}))).await;
    let (invalid, body) =
        send(&app, "POST", "/api/conversations", Some("nope"), Some(json!({}))).await;

    assert_eq!(missing, StatusCode::UNAUTHORIZED);
    assert_eq!(invalid, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

// =============================================================================
// Conversations
// =============================================================================

#[tokio::test]
async fn create_returns_collecting_conversation_with_greeting() {
    let app = app(MockAIProvider::new(), SimulatedVoiceProvider::new());

    let (status, body) = send(
        &app,
        "POST",
        "/api/conversations",
        Some(ALICE),
        Some(json!({ "scenario_type": "RESERVATION", "scenario_sub_type": "SALON" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["conversation"]["status"], "COLLECTING");
    assert_eq!(body["conversation"]["collected_data"]["scenario_type"], "RESERVATION");
    assert_eq!(body["greeting"]["role"], "assistant");
    assert!(!body["greeting"]["content"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn chat_turn_updates_conversation_and_history() {
    let app = app(
        MockAIProvider::new().with_response(READY_REPLY),
        SimulatedVoiceProvider::new(),
    );
    let id = open_conversation(&app).await;

    let (status, body) = chat(&app, &id, "OO식당 02-123-4567 영업시간 물어봐줘").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["conversation_status"], "READY");
    assert_eq!(body["is_complete"], true);
    assert_eq!(body["collected"]["target_phone"], "02-123-4567");
    assert!(!body["message"].as_str().unwrap().contains("```"));

    let (status, detail) = send(&app, "GET", &format!("/api/conversations/{}", id), Some(ALICE), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["status"], "READY");
    assert_eq!(detail["messages"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn empty_chat_message_is_rejected() {
    let app = app(MockAIProvider::new(), SimulatedVoiceProvider::new());
    let id = open_conversation(&app).await;

    let (status, body) = chat(&app, &id, "   ").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "message");
}

#[tokio::test]
async fn other_users_conversation_is_not_found() {
    let app = app(MockAIProvider::new(), SimulatedVoiceProvider::new());
    let id = open_conversation(&app).await;

    let (status, _) = send(&app, "GET", &format!("/api/conversations/{}", id), Some(BOB), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_id_is_bad_request() {
    let app = app(MockAIProvider::new(), SimulatedVoiceProvider::new());

    let (status, _) = send(&app, "GET", "/api/conversations/not-a-uuid", Some(ALICE), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cancelled_conversation_refuses_turns() {
    let app = app(MockAIProvider::new(), SimulatedVoiceProvider::new());
    let id = open_conversation(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/conversations/{}/cancel", id),
        Some(ALICE),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CANCELLED");

    let (status, _) = chat(&app, &id, "안녕하세요").await;
    assert_eq!(status, StatusCode::CONFLICT);
}

// =============================================================================
// Calls
// =============================================================================

#[tokio::test]
async fn call_from_collecting_conversation_conflicts() {
    let app = app(
        MockAIProvider::new().with_response(PARTIAL_REPLY),
        SimulatedVoiceProvider::new(),
    );
    let id = open_conversation(&app).await;
    chat(&app, &id, "문의 전화 좀 해줘").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/calls",
        Some(ALICE),
        Some(json!({ "conversation_id": id })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONVERSATION_NOT_READY");
}

#[tokio::test]
async fn call_is_created_started_and_listed() {
    let app = app(
        MockAIProvider::new().with_response(READY_REPLY),
        SimulatedVoiceProvider::new(),
    );
    let id = open_conversation(&app).await;
    chat(&app, &id, "OO식당 02-123-4567 영업시간 물어봐줘").await;

    let (status, call) = send(
        &app,
        "POST",
        "/api/calls",
        Some(ALICE),
        Some(json!({ "conversation_id": id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(call["status"], "PENDING");
    assert_eq!(call["target_name"], "OO식당");
    let call_id = call["id"].as_str().unwrap().to_string();

    let (status, started) = send(
        &app,
        "POST",
        &format!("/api/calls/{}/start", call_id),
        Some(ALICE),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(started["success"], true);
    assert_eq!(started["status"], "IN_PROGRESS");
    assert!(started["session_handle"].as_str().unwrap().starts_with("sim_"));

    let (status, again) = send(
        &app,
        "POST",
        &format!("/api/calls/{}/start", call_id),
        Some(ALICE),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(again["code"], "CALL_NOT_PENDING");

    let (status, list) = send(&app, "GET", "/api/calls", Some(ALICE), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["calls"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "GET", &format!("/api/calls/{}", call_id), Some(BOB), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn failed_origination_answers_bad_gateway() {
    let app = app(
        MockAIProvider::new().with_response(READY_REPLY),
        SimulatedVoiceProvider::failing(VoiceError::Network("connection refused".to_string())),
    );
    let id = open_conversation(&app).await;
    chat(&app, &id, "OO식당 02-123-4567 영업시간 물어봐줘").await;
    let (_, call) = send(
        &app,
        "POST",
        "/api/calls",
        Some(ALICE),
        Some(json!({ "conversation_id": id })),
    )
    .await;
    let call_id = call["id"].as_str().unwrap().to_string();

    let (status, started) = send(
        &app,
        "POST",
        &format!("/api/calls/{}/start", call_id),
        Some(ALICE),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(started["success"], false);
    assert_eq!(started["status"], "FAILED");
    assert!(started["session_handle"].is_null());

    let (_, stored) = send(&app, "GET", &format!("/api/calls/{}", call_id), Some(ALICE), None).await;
    assert_eq!(stored["result"], "ERROR");
    assert!(stored["failure_hint"].is_string());

    let (_, conversation) =
        send(&app, "GET", &format!("/api/conversations/{}", id), Some(ALICE), None).await;
    assert_eq!(conversation["status"], "COMPLETED");
}
