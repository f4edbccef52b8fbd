//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers (write) and query handlers (read) are kept separate.

pub mod handlers;

pub use handlers::{
    // Conversation handlers
    CancelConversationCommand, CancelConversationHandler, ConversationError, ConversationView,
    CreateConversationCommand, CreateConversationHandler, CreateConversationResult,
    GetConversationHandler, GetConversationQuery, SendMessageCommand, SendMessageHandler,
    TurnConfig, TurnLocks, TurnResult,
    // Call handlers
    CallError, CallReconciler, CreateCallCommand, CreateCallHandler, GetCallHandler, GetCallQuery,
    ListCallsHandler, ListCallsQuery, ReconcileMode, StartCallCommand, StartCallHandler,
    StartCallResult,
};
