//! SendMessageHandler - one chat turn of the slot-filling conversation.
//!
//! A turn:
//! 1. validates the message, then loads the caller's conversation
//! 2. appends the user message
//! 3. optionally searches for the venue the user named
//! 4. asks the model, letting it call `search_place` a bounded number of times
//! 5. parses the reply, patches slots the model missed, merges
//! 6. appends the assistant message and stores the merged data and status
//!
//! Model failures leave the conversation untouched and return an apology
//! as a normal reply.

use std::sync::Arc;

use serde_json::json;

use crate::domain::collection::{CollectedData, MergePolicy};
use crate::domain::conversation::{
    apply_corrections, parse_response,
    place::{extract_search_query, format_places_for_model, should_search_places},
    prompts::{build_system_instruction, SEARCH_TOOL_DESCRIPTION, UPSTREAM_FAILURE_MESSAGE},
    validate_user_message, Conversation, ConversationStatus, CorrectionContext, GeoPoint, Message,
    MessageMetadata, MessageRole, Place,
};
use crate::domain::foundation::{ConversationId, UserId};
use crate::ports::{
    AIError, AIProvider, ChatMessage, CompletionRequest, ConversationRepository, PlaceSearch,
    ToolCall, ToolDefinition,
};

use super::{ConversationError, TurnLocks};

/// Name of the venue search tool offered to the model.
pub const SEARCH_TOOL_NAME: &str = "search_place";

/// Tunables for a turn.
#[derive(Debug, Clone)]
pub struct TurnConfig {
    /// Most recent messages sent to the model.
    pub history_window: usize,
    /// Tool invocations allowed per turn before the model must answer.
    pub max_tool_iterations: usize,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            history_window: 10,
            max_tool_iterations: 3,
            temperature: 0.7,
            max_tokens: 1024,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SendMessageCommand {
    pub user_id: UserId,
    pub conversation_id: ConversationId,
    pub message: String,
    /// Biases venue search towards the user's position.
    pub location: Option<GeoPoint>,
}

/// What the caller shows after a turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnResult {
    pub message: String,
    pub collected: CollectedData,
    pub is_complete: bool,
    pub status: ConversationStatus,
    /// Candidates the user can pick from, newest search first.
    pub search_results: Vec<Place>,
}

pub struct SendMessageHandler {
    repository: Arc<dyn ConversationRepository>,
    ai: Arc<dyn AIProvider>,
    search: Arc<dyn PlaceSearch>,
    locks: TurnLocks,
    config: TurnConfig,
}

impl SendMessageHandler {
    pub fn new(
        repository: Arc<dyn ConversationRepository>,
        ai: Arc<dyn AIProvider>,
        search: Arc<dyn PlaceSearch>,
        locks: TurnLocks,
    ) -> Self {
        Self {
            repository,
            ai,
            search,
            locks,
            config: TurnConfig::default(),
        }
    }

    pub fn with_config(mut self, config: TurnConfig) -> Self {
        self.config = config;
        self
    }

    /// Runs one turn.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for an empty or oversized message (nothing is written)
    /// - `NotFound` if the conversation is missing or not owned
    /// - `InvalidState` once the conversation no longer accepts turns
    /// - `Repository` on persistence failure
    pub async fn handle(&self, cmd: SendMessageCommand) -> Result<TurnResult, ConversationError> {
        let text = validate_user_message(&cmd.message)?;

        let _turn = self.locks.acquire(cmd.conversation_id).await;

        let mut conversation = self
            .repository
            .find_owned(&cmd.conversation_id, &cmd.user_id)
            .await?
            .ok_or(ConversationError::NotFound(cmd.conversation_id))?;
        conversation.ensure_accepts_turns()?;

        self.repository
            .add_message(&Message::user(cmd.conversation_id, text.clone()))
            .await?;

        let has_phone = conversation.collected_data().target_phone.is_some();
        if should_search_places(&text, has_phone) {
            let found = self.search_places(&extract_search_query(&text), cmd.location).await;
            if !found.is_empty() {
                conversation.remember_search_results(found);
            }
        }

        let history = self
            .repository
            .recent_messages(&cmd.conversation_id, self.config.history_window)
            .await?;

        let raw = match self.complete(&mut conversation, &history, cmd.location).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(
                    conversation_id = %cmd.conversation_id,
                    error = %e,
                    "Model call failed, keeping conversation unchanged"
                );
                return Ok(unchanged_turn(&conversation));
            }
        };

        let mut parsed = parse_response(&raw);
        let emitted = parsed.collected.to_json();

        let previous_assistant = history
            .iter()
            .rev()
            .find(|m| m.role() == MessageRole::Assistant)
            .map(|m| m.content());
        let applied = apply_corrections(
            &CorrectionContext {
                user_message: &text,
                candidates: conversation.search_results(),
                existing: conversation.collected_data(),
                previous_assistant_message: previous_assistant,
            },
            &mut parsed.collected,
        );
        for correction in &applied {
            tracing::debug!(
                conversation_id = %cmd.conversation_id,
                rule = correction.rule,
                field = correction.field,
                "Slot corrected"
            );
        }

        let merged = conversation
            .collected_data()
            .merge(&parsed.collected, MergePolicy::PreserveExisting);

        self.repository
            .add_message(&Message::assistant(
                cmd.conversation_id,
                parsed.message.clone(),
                Some(MessageMetadata {
                    collected: emitted,
                    is_complete: parsed.is_complete,
                }),
            ))
            .await?;

        let ready = (parsed.is_complete && merged.target_phone.is_some())
            || merged.is_minimally_actionable();
        conversation.record_turn(merged, ready)?;
        self.repository.update(&conversation).await?;

        tracing::info!(
            conversation_id = %cmd.conversation_id,
            status = %conversation.status(),
            parse_outcome = ?parsed.outcome,
            corrections = applied.len(),
            "Turn processed"
        );

        Ok(TurnResult {
            message: parsed.message,
            collected: conversation.collected_data().clone(),
            is_complete: parsed.is_complete,
            status: conversation.status(),
            search_results: conversation.search_results().to_vec(),
        })
    }

    /// Calls the model, executing `search_place` tool calls until it answers
    /// in text or the tool budget is spent.
    async fn complete(
        &self,
        conversation: &mut Conversation,
        history: &[Message],
        location: Option<GeoPoint>,
    ) -> Result<String, AIError> {
        let mut messages: Vec<ChatMessage> = history.iter().map(to_chat_message).collect();
        let mut invocations = 0;

        loop {
            let system_prompt = build_system_instruction(
                conversation.collected_data(),
                conversation.search_results(),
            );
            let mut request = CompletionRequest::new()
                .with_system_prompt(system_prompt)
                .with_messages(messages.clone())
                .with_temperature(self.config.temperature)
                .with_max_tokens(self.config.max_tokens);
            if invocations < self.config.max_tool_iterations {
                request = request.with_tool(search_tool());
            }

            let response = self.ai.complete(request).await?;
            if !response.has_tool_calls() || invocations >= self.config.max_tool_iterations {
                return Ok(response.content);
            }

            messages.push(ChatMessage::assistant_tool_calls(
                response.content.clone(),
                response.tool_calls.clone(),
            ));
            for call in &response.tool_calls {
                let output = if invocations < self.config.max_tool_iterations {
                    invocations += 1;
                    self.run_tool(conversation, call, location).await
                } else {
                    "검색 횟수 제한에 도달했습니다. 지금까지의 결과로 답하세요.".to_string()
                };
                messages.push(ChatMessage::tool_result(call.id.clone(), output));
            }
        }
    }

    async fn run_tool(
        &self,
        conversation: &mut Conversation,
        call: &ToolCall,
        location: Option<GeoPoint>,
    ) -> String {
        if call.name != SEARCH_TOOL_NAME {
            tracing::warn!(tool = %call.name, "Model requested an unknown tool");
            return format!("알 수 없는 도구입니다: {}", call.name);
        }
        let Some(query) = call.string_argument("query").filter(|q| !q.trim().is_empty()) else {
            return "검색어(query)가 필요합니다.".to_string();
        };

        let places = self.search_places(&query, location).await;
        let output = format_places_for_model(&places);
        if !places.is_empty() {
            conversation.remember_search_results(places);
        }
        output
    }

    /// Search that never fails the turn: errors become an empty list.
    async fn search_places(&self, query: &str, location: Option<GeoPoint>) -> Vec<Place> {
        if query.is_empty() {
            return Vec::new();
        }
        match self.search.search(query, location).await {
            Ok(places) => places,
            Err(e) => {
                tracing::warn!(query, error = %e, "Place search failed");
                Vec::new()
            }
        }
    }
}

fn search_tool() -> ToolDefinition {
    ToolDefinition::new(
        SEARCH_TOOL_NAME,
        SEARCH_TOOL_DESCRIPTION,
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "검색할 장소 (예: \"강남역 미용실\")"
                }
            },
            "required": ["query"]
        }),
    )
}

fn to_chat_message(message: &Message) -> ChatMessage {
    match message.role() {
        MessageRole::User => ChatMessage::user(message.content()),
        MessageRole::Assistant => ChatMessage::assistant(message.content()),
    }
}

fn unchanged_turn(conversation: &Conversation) -> TurnResult {
    TurnResult {
        message: UPSTREAM_FAILURE_MESSAGE.to_string(),
        collected: conversation.collected_data().clone(),
        is_complete: false,
        status: conversation.status(),
        search_results: conversation.search_results().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::adapters::memory::InMemoryConversationRepository;
    use crate::adapters::search::StaticPlaceSearch;
    use crate::domain::collection::ScenarioType;
    use crate::domain::conversation::place::test_support::place;
    use crate::ports::SearchError;

    const COMPLETE_REPLY: &str = r#"예약 정보를 모두 확인했어요!
```json
{"collected": {"target_name": "OO미용실", "target_phone": "010-1234-5678", "scenario_type": "RESERVATION", "primary_datetime": "내일 오후 3시", "service": "커트"}, "is_complete": true}
```"#;

    fn owner() -> UserId {
        UserId::new("owner").unwrap()
    }

    struct Fixture {
        repo: Arc<InMemoryConversationRepository>,
        ai: Arc<MockAIProvider>,
        search: Arc<StaticPlaceSearch>,
        id: ConversationId,
    }

    impl Fixture {
        async fn new(ai: MockAIProvider, search: StaticPlaceSearch) -> Self {
            let repo = Arc::new(InMemoryConversationRepository::new());
            let conversation = Conversation::start(owner(), None, None).unwrap();
            let id = *conversation.id();
            repo.save(&conversation).await.unwrap();
            Self {
                repo,
                ai: Arc::new(ai),
                search: Arc::new(search),
                id,
            }
        }

        fn handler(&self) -> SendMessageHandler {
            SendMessageHandler::new(
                self.repo.clone(),
                self.ai.clone(),
                self.search.clone(),
                TurnLocks::new(),
            )
        }

        fn command(&self, message: &str) -> SendMessageCommand {
            SendMessageCommand {
                user_id: owner(),
                conversation_id: self.id,
                message: message.to_string(),
                location: None,
            }
        }

        async fn stored(&self) -> Conversation {
            self.repo.find_by_id(&self.id).await.unwrap().unwrap()
        }
    }

    #[tokio::test]
    async fn complete_reply_moves_conversation_to_ready() {
        let fx = Fixture::new(
            MockAIProvider::new().with_response(COMPLETE_REPLY),
            StaticPlaceSearch::new(vec![]),
        )
        .await;

        let result = fx
            .handler()
            .handle(fx.command("OO미용실 010-1234-5678 내일 오후 3시 커트 예약해줘"))
            .await
            .unwrap();

        assert_eq!(result.message, "예약 정보를 모두 확인했어요!");
        assert!(result.is_complete);
        assert_eq!(result.status, ConversationStatus::Ready);
        assert_eq!(result.collected.scenario_type, Some(ScenarioType::Reservation));

        let stored = fx.stored().await;
        assert_eq!(stored.status(), ConversationStatus::Ready);
        assert_eq!(stored.collected_data().service.as_deref(), Some("커트"));

        let messages = fx.repo.messages(&fx.id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].metadata().map(|m| m.is_complete), Some(true));
    }

    #[tokio::test]
    async fn model_failure_leaves_state_unchanged() {
        let fx = Fixture::new(
            MockAIProvider::new().with_error(MockError::Unavailable {
                message: "down".to_string(),
            }),
            StaticPlaceSearch::new(vec![]),
        )
        .await;
        let before = fx.stored().await;

        let result = fx.handler().handle(fx.command("예약하고 싶어요")).await.unwrap();

        assert_eq!(result.message, UPSTREAM_FAILURE_MESSAGE);
        assert!(!result.is_complete);
        assert_eq!(result.status, ConversationStatus::Collecting);
        assert_eq!(fx.stored().await, before);
        // Only the user message was written.
        assert_eq!(fx.repo.messages(&fx.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_message_is_rejected_before_any_write() {
        let fx = Fixture::new(MockAIProvider::new(), StaticPlaceSearch::new(vec![])).await;

        let result = fx.handler().handle(fx.command("   ")).await;

        assert!(matches!(result, Err(ConversationError::InvalidInput { .. })));
        assert!(fx.repo.messages(&fx.id).await.unwrap().is_empty());
        assert_eq!(fx.ai.call_count(), 0);
    }

    #[tokio::test]
    async fn oversized_message_is_rejected() {
        let fx = Fixture::new(MockAIProvider::new(), StaticPlaceSearch::new(vec![])).await;

        let result = fx.handler().handle(fx.command(&"가".repeat(1001))).await;

        assert!(matches!(result, Err(ConversationError::InvalidInput { .. })));
    }

    #[tokio::test]
    async fn non_owner_gets_not_found() {
        let fx = Fixture::new(MockAIProvider::new(), StaticPlaceSearch::new(vec![])).await;
        let mut cmd = fx.command("안녕하세요");
        cmd.user_id = UserId::new("intruder").unwrap();

        let result = fx.handler().handle(cmd).await;

        assert_eq!(result.unwrap_err(), ConversationError::NotFound(fx.id));
    }

    #[tokio::test]
    async fn plain_reply_keeps_collecting() {
        let fx = Fixture::new(
            MockAIProvider::new().with_response("어디에 전화할까요?"),
            StaticPlaceSearch::new(vec![]),
        )
        .await;

        let result = fx.handler().handle(fx.command("전화 좀 걸어줘")).await.unwrap();

        assert_eq!(result.message, "어디에 전화할까요?");
        assert_eq!(result.status, ConversationStatus::Collecting);
    }

    #[tokio::test]
    async fn venue_mention_triggers_search_and_feeds_instruction() {
        let fx = Fixture::new(
            MockAIProvider::new().with_response("어느 곳으로 할까요?"),
            StaticPlaceSearch::new(vec![place("강남헤어 미용실", Some("02-555-1234"))]),
        )
        .await;

        let result = fx
            .handler()
            .handle(fx.command("강남역 근처 미용실 찾아줘"))
            .await
            .unwrap();

        assert_eq!(fx.search.queries(), vec!["강남역 미용실 줘".to_string()]);
        assert_eq!(result.search_results.len(), 1);
        let prompt = fx.ai.last_call().unwrap().system_prompt.unwrap();
        assert!(prompt.contains("강남헤어 미용실"));
    }

    #[tokio::test]
    async fn search_failure_does_not_fail_turn() {
        let fx = Fixture::new(
            MockAIProvider::new().with_response("가게 이름을 알려주세요."),
            StaticPlaceSearch::failing(SearchError::Network("timeout".to_string())),
        )
        .await;

        let result = fx.handler().handle(fx.command("근처 식당 찾아줘")).await.unwrap();

        assert_eq!(result.message, "가게 이름을 알려주세요.");
        assert!(result.search_results.is_empty());
    }

    #[tokio::test]
    async fn tool_call_results_are_fed_back_to_model() {
        let fx = Fixture::new(
            MockAIProvider::new()
                .with_tool_call(SEARCH_TOOL_NAME, r#"{"query": "홍대 카페"}"#)
                .with_response("1번 OO카페 어떠세요?"),
            StaticPlaceSearch::new(vec![place("OO카페", Some("02-333-4444"))]),
        )
        .await;

        let result = fx.handler().handle(fx.command("카페 예약할래")).await.unwrap();

        assert_eq!(result.message, "1번 OO카페 어떠세요?");
        assert_eq!(fx.ai.call_count(), 2);
        let second = fx.ai.last_call().unwrap();
        let tool_message = second.messages.last().unwrap();
        assert!(tool_message.content.contains("OO카페"));
        assert_eq!(result.search_results[0].name, "OO카페");
    }

    #[tokio::test]
    async fn tool_loop_is_capped() {
        let args = r#"{"query": "미용실"}"#;
        let fx = Fixture::new(
            MockAIProvider::new()
                .with_tool_call(SEARCH_TOOL_NAME, args)
                .with_tool_call(SEARCH_TOOL_NAME, args)
                .with_tool_call(SEARCH_TOOL_NAME, args)
                .with_response("검색 결과를 정리했어요."),
            StaticPlaceSearch::new(vec![place("OO미용실", None)]),
        )
        .await;

        let result = fx.handler().handle(fx.command("예약할래요")).await.unwrap();

        assert_eq!(result.message, "검색 결과를 정리했어요.");
        assert_eq!(fx.search.queries().len(), 3);
        assert_eq!(fx.ai.call_count(), 4);
        assert!(fx.ai.last_call().unwrap().tools.is_empty());
    }

    #[tokio::test]
    async fn ordinal_selection_fills_target_from_previous_results() {
        let fx = Fixture::new(
            MockAIProvider::new()
                .with_response("어느 곳으로 할까요?")
                .with_response(
                    "좋아요!\n```json\n{\"collected\": {\"scenario_type\": \"RESERVATION\"}, \"is_complete\": false}\n```",
                ),
            StaticPlaceSearch::new(vec![
                place("A미용실", Some("02-111-1111")),
                place("B미용실", Some("02-222-2222")),
            ]),
        )
        .await;
        let handler = fx.handler();

        handler.handle(fx.command("근처 미용실 찾아줘")).await.unwrap();
        let result = handler.handle(fx.command("2번")).await.unwrap();

        assert_eq!(result.collected.target_name.as_deref(), Some("B미용실"));
        assert_eq!(result.collected.target_phone.as_deref(), Some("02-222-2222"));
    }

    #[tokio::test]
    async fn closed_conversation_rejects_turns() {
        let fx = Fixture::new(MockAIProvider::new(), StaticPlaceSearch::new(vec![])).await;
        let mut conversation = fx.stored().await;
        conversation.cancel().unwrap();
        fx.repo.update(&conversation).await.unwrap();

        let result = fx.handler().handle(fx.command("안녕하세요")).await;

        assert!(matches!(result, Err(ConversationError::InvalidState(_))));
        assert_eq!(fx.ai.call_count(), 0);
    }

    #[tokio::test]
    async fn later_turn_does_not_erase_confirmed_slots() {
        let fx = Fixture::new(
            MockAIProvider::new()
                .with_response(
                    "확인했어요.\n```json\n{\"collected\": {\"target_name\": \"OO식당\", \"target_phone\": \"02-123-4567\"}}\n```",
                )
                .with_response(
                    "몇 명이세요?\n```json\n{\"collected\": {\"target_name\": null, \"target_phone\": null, \"party_size\": 4}}\n```",
                ),
            StaticPlaceSearch::new(vec![]),
        )
        .await;
        let handler = fx.handler();

        handler.handle(fx.command("OO식당 02-123-4567")).await.unwrap();
        let result = handler.handle(fx.command("4명이요")).await.unwrap();

        assert_eq!(result.collected.target_name.as_deref(), Some("OO식당"));
        assert_eq!(result.collected.target_phone.as_deref(), Some("02-123-4567"));
        assert_eq!(result.collected.party_size, Some(4));
    }
}
