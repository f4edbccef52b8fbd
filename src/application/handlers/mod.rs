//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod call;
pub mod conversation;

pub use call::{
    CallError, CallReconciler, CreateCallCommand, CreateCallHandler, GetCallHandler, GetCallQuery,
    ListCallsHandler, ListCallsQuery, ReconcileMode, StartCallCommand, StartCallHandler,
    StartCallResult,
};
pub use conversation::{
    CancelConversationCommand, CancelConversationHandler, ConversationError, ConversationView,
    CreateConversationCommand, CreateConversationHandler, CreateConversationResult,
    GetConversationHandler, GetConversationQuery, SendMessageCommand, SendMessageHandler,
    TurnConfig, TurnLocks, TurnResult,
};
