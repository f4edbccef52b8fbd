//! Application router: API routes, auth, and cross-cutting layers.

use std::time::Duration;

use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use super::call::{call_routes, CallHandlers};
use super::conversation::{chat_routes, conversation_routes, ConversationHandlers};
use super::middleware::{auth_middleware, AuthState};

/// Settings for the outer layers of the router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Allowed browser origins; empty allows any.
    pub cors_origins: Vec<String>,
    pub request_timeout: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Builds the full application router.
///
/// - `GET /health` is public
/// - everything under `/api` passes through `auth_middleware`; each handler
///   demands a user with `RequireAuth`
pub fn app_router(
    conversations: ConversationHandlers,
    calls: CallHandlers,
    auth: AuthState,
    config: &RouterConfig,
) -> Router {
    let api = Router::new()
        .nest("/conversations", conversation_routes(conversations.clone()))
        .nest("/calls", call_routes(calls))
        .merge(chat_routes(conversations))
        .layer(middleware::from_fn_with_state(auth, auth_middleware));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(allowed))
    }
}
