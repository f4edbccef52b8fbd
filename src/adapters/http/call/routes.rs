//! HTTP routes for call endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{create_call, get_call, list_calls, start_call, CallHandlers};

/// Routes mounted under `/api/calls`.
pub fn call_routes(handlers: CallHandlers) -> Router {
    Router::new()
        .route("/", post(create_call).get(list_calls))
        .route("/:id", get(get_call))
        .route("/:id/start", post(start_call))
        .with_state(handlers)
}
