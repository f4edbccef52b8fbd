//! Mock AI Provider for testing and offline development.
//!
//! Replies are consumed from a queue in order; each can be plain text, a set
//! of tool calls, or an injected error. Every request is recorded so tests
//! can inspect the context the turn engine built.
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_tool_call("search_place", r#"{"query":"강남 미용실"}"#)
//!     .with_response("어느 지점으로 할까요?");
//!
//! let first = provider.complete(request.clone()).await?;
//! assert!(first.has_tool_calls());
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, ProviderInfo, ToolCall,
};

/// Reply used when the queue is empty.
const DEFAULT_REPLY: &str = "네, 말씀해주세요.";

/// Mock AI provider.
#[derive(Debug, Clone)]
pub struct MockAIProvider {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Text(String),
    ToolCalls(Vec<ToolCall>),
    Error(MockError),
}

/// Mock error types for testing error handling.
#[derive(Debug, Clone)]
pub enum MockError {
    RateLimited { retry_after_secs: u32 },
    Unavailable { message: String },
    AuthenticationFailed,
    Network { message: String },
    Timeout { timeout_secs: u32 },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after_secs } => AIError::rate_limited(retry_after_secs),
            MockError::Unavailable { message } => AIError::unavailable(message),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Network { message } => AIError::network(message),
            MockError::Timeout { timeout_secs } => AIError::Timeout { timeout_secs },
        }
    }
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockAIProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a plain text reply.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        lock(&self.responses).push_back(MockResponse::Text(content.into()));
        self
    }

    /// Queues a reply that requests a single tool call.
    pub fn with_tool_call(self, name: &str, arguments: &str) -> Self {
        let id = format!("call_{}", lock(&self.responses).len() + 1);
        lock(&self.responses).push_back(MockResponse::ToolCalls(vec![ToolCall::new(
            id, name, arguments,
        )]));
        self
    }

    /// Queues an error.
    pub fn with_error(self, error: MockError) -> Self {
        lock(&self.responses).push_back(MockResponse::Error(error));
        self
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// The most recent request, if any.
    pub fn last_call(&self) -> Option<CompletionRequest> {
        lock(&self.calls).last().cloned()
    }

    fn next_response(&self) -> MockResponse {
        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| MockResponse::Text(DEFAULT_REPLY.to_string()))
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        lock(&self.calls).push(request);

        match self.next_response() {
            MockResponse::Text(content) => Ok(CompletionResponse {
                model: "mock-model-1".to_string(),
                ..CompletionResponse::text(content)
            }),
            MockResponse::ToolCalls(calls) => Ok(CompletionResponse {
                model: "mock-model-1".to_string(),
                ..CompletionResponse::tool_calls(calls)
            }),
            MockResponse::Error(err) => Err(err.into()),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("mock", "mock-model-1")
    }
}
