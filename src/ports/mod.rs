//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Upstream services
//!
//! - `AIProvider` - chat completion with an optional tool-call protocol
//! - `PlaceSearch` - keyword venue search
//! - `SearchCache` - query-keyed cache of venue search results
//! - `VoiceProvider` - outbound call origination and session polling
//!
//! ## Persistence
//!
//! - `ConversationRepository` - conversations and their append-only messages
//! - `CallRepository` - calls, including the guarded terminal write
//!
//! ## Identity
//!
//! - `SessionValidator` - bearer token validation

pub mod ai_provider;
mod call_repository;
mod conversation_repository;
mod place_search;
mod search_cache;
mod session_validator;
mod voice_provider;

pub use ai_provider::{
    AIError, AIProvider, ChatMessage, ChatRole, CompletionRequest, CompletionResponse,
    FinishReason, ProviderInfo, TokenUsage, ToolCall, ToolDefinition,
};
pub use call_repository::CallRepository;
pub use conversation_repository::ConversationRepository;
pub use place_search::{PlaceSearch, SearchError};
pub use search_cache::{SearchCache, SearchCacheError};
pub use session_validator::SessionValidator;
pub use voice_provider::{OutboundCallRequest, OutboundCallSession, VoiceError, VoiceProvider};
