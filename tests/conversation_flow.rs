//! End-to-end chat turns through the handlers with in-memory adapters.
//!
//! The model is scripted with `MockAIProvider`; everything else is the real
//! turn engine: parsing, corrections, merge, completion and persistence.

use std::sync::Arc;

use wigvo::adapters::ai::{MockAIProvider, MockError};
use wigvo::adapters::memory::InMemoryConversationRepository;
use wigvo::adapters::search::StaticPlaceSearch;
use wigvo::application::handlers::conversation::{
    CreateConversationCommand, CreateConversationHandler, GetConversationHandler,
    GetConversationQuery, SendMessageCommand, SendMessageHandler, TurnLocks, TurnResult,
};
use wigvo::domain::collection::ScenarioType;
use wigvo::domain::conversation::{ConversationStatus, MessageRole, Place};
use wigvo::domain::foundation::{ConversationId, UserId};
use wigvo::ports::ConversationRepository;

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Harness {
    repo: Arc<InMemoryConversationRepository>,
    ai: Arc<MockAIProvider>,
    search: Arc<StaticPlaceSearch>,
    turns: SendMessageHandler,
    user: UserId,
}

impl Harness {
    fn new(ai: MockAIProvider, search: StaticPlaceSearch) -> Self {
        let repo = Arc::new(InMemoryConversationRepository::new());
        let ai = Arc::new(ai);
        let search = Arc::new(search);
        let turns = SendMessageHandler::new(repo.clone(), ai.clone(), search.clone(), TurnLocks::new());
        Self {
            repo,
            ai,
            search,
            turns,
            user: UserId::new("user-1").unwrap(),
        }
    }

    async fn open(&self) -> ConversationId {
        let result = CreateConversationHandler::new(self.repo.clone())
            .handle(CreateConversationCommand {
                user_id: self.user.clone(),
                scenario_type: None,
                scenario_sub_type: None,
            })
            .await
            .unwrap();
        *result.conversation.id()
    }

    async fn say(&self, conversation_id: ConversationId, message: &str) -> TurnResult {
        self.turns
            .handle(SendMessageCommand {
                user_id: self.user.clone(),
                conversation_id,
                message: message.to_string(),
                location: None,
            })
            .await
            .unwrap()
    }
}

const SALON_REPLY: &str = r#"네, 내일 오후 3시에 OO미용실 커트 예약 도와드릴게요. 미용실 전화번호를 알려주시겠어요?
```json
{"collected": {"target_name": "OO미용실", "scenario_type": "RESERVATION", "primary_datetime": "내일 오후 3시", "service": "커트", "target_phone": null}, "is_complete": false, "next_question": "전화번호"}
```"#;

/// Model reply that forgot to put the phone number into the block.
const PHONE_ACK_REPLY: &str = r#"감사합니다! 이제 전화를 걸 준비가 되었어요.
```json
{"collected": {"target_name": null, "target_phone": null}, "is_complete": false}
```"#;

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn reservation_request_collects_slots_and_asks_for_phone() {
    let h = Harness::new(
        MockAIProvider::new().with_response(SALON_REPLY),
        StaticPlaceSearch::new(Vec::new()),
    );
    let id = h.open().await;

    let turn = h.say(id, "내일 오후 3시에 OO미용실 커트 예약해줘").await;

    assert_eq!(turn.collected.target_name.as_deref(), Some("OO미용실"));
    assert_eq!(turn.collected.scenario_type, Some(ScenarioType::Reservation));
    assert_eq!(turn.collected.primary_datetime.as_deref(), Some("내일 오후 3시"));
    assert_eq!(turn.collected.service.as_deref(), Some("커트"));
    assert!(turn.collected.target_phone.is_none());
    assert_eq!(turn.status, ConversationStatus::Collecting);
    assert!(turn.message.contains("전화번호"));
    assert!(!turn.message.contains("```"));
    assert!(h.search.queries().is_empty());
}

#[tokio::test]
async fn phone_in_user_message_makes_conversation_ready() {
    let h = Harness::new(
        MockAIProvider::new()
            .with_response(SALON_REPLY)
            .with_response(PHONE_ACK_REPLY),
        StaticPlaceSearch::new(Vec::new()),
    );
    let id = h.open().await;
    h.say(id, "내일 오후 3시에 OO미용실 커트 예약해줘").await;

    let turn = h.say(id, "010-1234-5678").await;

    assert_eq!(turn.collected.target_phone.as_deref(), Some("010-1234-5678"));
    assert_eq!(turn.collected.target_name.as_deref(), Some("OO미용실"));
    assert_eq!(turn.status, ConversationStatus::Ready);

    let stored = h.repo.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(stored.status(), ConversationStatus::Ready);
    assert_eq!(stored.collected_data(), &turn.collected);
}

#[tokio::test]
async fn model_outage_keeps_state_and_transcript_readable() {
    let h = Harness::new(
        MockAIProvider::new()
            .with_response(SALON_REPLY)
            .with_error(MockError::Unavailable {
                message: "overloaded".to_string(),
            }),
        StaticPlaceSearch::new(Vec::new()),
    );
    let id = h.open().await;
    let before = h.say(id, "내일 오후 3시에 OO미용실 커트 예약해줘").await;

    let turn = h.say(id, "010-1234-5678").await;

    assert_eq!(turn.message, "죄송합니다, 잠시 오류가 발생했어요. 다시 말씀해주세요.");
    assert_eq!(turn.collected, before.collected);
    assert_eq!(turn.status, ConversationStatus::Collecting);

    let view = GetConversationHandler::new(h.repo.clone())
        .handle(GetConversationQuery {
            conversation_id: id,
            user_id: h.user.clone(),
        })
        .await
        .unwrap();
    let roles: Vec<MessageRole> = view.messages.iter().map(|m| m.role()).collect();
    assert_eq!(
        roles,
        vec![
            MessageRole::Assistant,
            MessageRole::User,
            MessageRole::Assistant,
            MessageRole::User,
        ]
    );
    assert!(view.conversation.collected_data().target_phone.is_none());
}

#[tokio::test]
async fn model_search_tool_results_feed_a_numbered_choice() {
    let salons = vec![
        Place {
            name: "가나다 미용실".to_string(),
            telephone: Some("02-111-2222".to_string()),
            address: "서울 강남구 역삼동 1".to_string(),
            road_address: None,
            category: "미용실".to_string(),
            location: None,
        },
        Place {
            name: "라마바 헤어".to_string(),
            telephone: Some("02-333-4444".to_string()),
            address: "서울 강남구 역삼동 2".to_string(),
            road_address: None,
            category: "미용실".to_string(),
            location: None,
        },
    ];
    let h = Harness::new(
        MockAIProvider::new()
            .with_tool_call("search_place", r#"{"query": "역삼동 미용실"}"#)
            .with_response(
                "두 곳을 찾았어요. 몇 번으로 할까요?\n```json\n{\"collected\": {\"scenario_type\": \"RESERVATION\"}, \"is_complete\": false}\n```",
            )
            .with_response(
                "2번 라마바 헤어로 할게요. 언제 방문하실까요?\n```json\n{\"collected\": {}, \"is_complete\": false}\n```",
            ),
        StaticPlaceSearch::new(salons),
    );
    let id = h.open().await;

    let first = h.say(id, "미용실 예약하고 싶어요").await;
    assert_eq!(first.search_results.len(), 2);
    assert_eq!(h.search.queries(), vec!["역삼동 미용실".to_string()]);

    let second = h.say(id, "2번").await;

    assert_eq!(second.collected.target_name.as_deref(), Some("라마바 헤어"));
    assert_eq!(second.collected.target_phone.as_deref(), Some("02-333-4444"));
    assert_eq!(h.ai.call_count(), 3);
}
