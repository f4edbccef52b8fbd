//! WIGVO server bootstrap.
//!
//! Loads configuration, picks adapters (PostgreSQL or in-memory storage,
//! live or simulated calling, Naver search with a Redis or in-process
//! cache), wires the handlers and serves the HTTP API.

use std::sync::Arc;

use secrecy::ExposeSecret;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use wigvo::adapters::ai::{OpenAIConfig, OpenAIProvider};
use wigvo::adapters::auth::{JwtConfig, JwtSessionValidator, MockSessionValidator};
use wigvo::adapters::http::{app_router, CallHandlers, ConversationHandlers, RouterConfig};
use wigvo::adapters::memory::{InMemoryCallRepository, InMemoryConversationRepository};
use wigvo::adapters::postgres::{self, PostgresCallRepository, PostgresConversationRepository};
use wigvo::adapters::search::{
    CachedPlaceSearch, InMemorySearchCache, NaverPlaceSearch, NaverSearchConfig,
    RedisSearchCache, StaticPlaceSearch,
};
use wigvo::adapters::voice::{ElevenLabsConfig, ElevenLabsVoiceProvider, SimulatedVoiceProvider};
use wigvo::application::handlers::call::{
    CallReconciler, CreateCallHandler, GetCallHandler, ListCallsHandler, ReconcileMode,
    StartCallHandler,
};
use wigvo::application::handlers::conversation::{
    CancelConversationHandler, CreateConversationHandler, GetConversationHandler,
    SendMessageHandler, TurnConfig, TurnLocks,
};
use wigvo::config::{AppConfig, SearchConfig, ServerConfig, VoiceConfig};
use wigvo::ports::{
    AIProvider, CallRepository, ConversationRepository, PlaceSearch, SearchCache,
    SessionValidator, VoiceProvider,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    tracing::info!(
        environment = ?config.server.environment,
        voice_mode = ?config.voice.mode,
        "Starting wigvo"
    );

    let (conversations, calls) = build_repositories(&config).await?;
    let ai = build_ai_provider(&config);
    let search = build_place_search(&config.search).await;
    let (voice, mode) = build_voice(&config.voice);
    let validator = build_session_validator(&config);

    let locks = TurnLocks::new();
    let turn_config = TurnConfig {
        history_window: config.ai.history_window,
        max_tool_iterations: config.ai.max_tool_iterations,
        temperature: config.ai.temperature,
        max_tokens: config.ai.max_tokens,
    };

    let conversation_handlers = ConversationHandlers::new(
        Arc::new(CreateConversationHandler::new(conversations.clone())),
        Arc::new(GetConversationHandler::new(conversations.clone())),
        Arc::new(CancelConversationHandler::new(conversations.clone(), locks.clone())),
        Arc::new(
            SendMessageHandler::new(conversations.clone(), ai, search, locks.clone())
                .with_config(turn_config),
        ),
    );

    let reconciler = Arc::new(CallReconciler::new(
        calls.clone(),
        conversations.clone(),
        voice.clone(),
        mode,
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

    let router_config = RouterConfig {
        cors_origins: config.server.cors_origins_list(),
        request_timeout: config.server.request_timeout(),
    };
    let app = app_router(conversation_handlers, call_handlers, validator, &router_config);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// JSON logs in production, human-readable otherwise. `RUST_LOG` wins over
/// the configured filter.
fn init_tracing(server: &ServerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    if server.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }
}

async fn build_repositories(
    config: &AppConfig,
) -> Result<(Arc<dyn ConversationRepository>, Arc<dyn CallRepository>), BoxError> {
    if !config.database.is_configured() {
        tracing::warn!("No database configured; using in-memory repositories");
        return Ok((
            Arc::new(InMemoryConversationRepository::new()),
            Arc::new(InMemoryCallRepository::new()),
        ));
    }

    let pool = postgres::connect(&config.database.url, config.database.max_connections).await?;
    if config.database.run_migrations {
        postgres::run_migrations(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    Ok((
        Arc::new(PostgresConversationRepository::new(pool.clone())),
        Arc::new(PostgresCallRepository::new(pool)),
    ))
}

fn build_ai_provider(config: &AppConfig) -> Arc<dyn AIProvider> {
    let api_key = config
        .ai
        .api_key
        .as_ref()
        .map(|k| k.expose_secret().clone())
        .unwrap_or_default();

    let openai = OpenAIConfig::new(api_key)
        .with_model(config.ai.model.clone())
        .with_base_url(config.ai.base_url.clone())
        .with_timeout(config.ai.timeout())
        .with_max_retries(config.ai.max_retries);

    Arc::new(OpenAIProvider::new(openai))
}

async fn build_place_search(config: &SearchConfig) -> Arc<dyn PlaceSearch> {
    let (Some(client_id), Some(client_secret)) =
        (config.naver_client_id.as_ref(), config.naver_client_secret.as_ref())
    else {
        tracing::warn!("Naver credentials missing; place search disabled");
        return Arc::new(StaticPlaceSearch::new(Vec::new()));
    };
    if !config.is_configured() {
        tracing::warn!("Naver credentials empty; place search disabled");
        return Arc::new(StaticPlaceSearch::new(Vec::new()));
    }

    let naver = NaverPlaceSearch::new(
        NaverSearchConfig::new(client_id.clone(), client_secret.expose_secret().clone())
            .with_base_url(config.base_url.clone())
            .with_display(config.result_limit)
            .with_timeout(config.timeout()),
    );

    let cache: Arc<dyn SearchCache> = match config.redis_url.as_deref().filter(|u| !u.is_empty()) {
        Some(url) => match RedisSearchCache::connect(url, config.cache_ttl()).await {
            Ok(cache) => Arc::new(cache),
            Err(e) => {
                tracing::warn!(error = %e, "Redis unavailable; using in-process search cache");
                Arc::new(InMemorySearchCache::new(config.cache_ttl()))
            }
        },
        None => Arc::new(InMemorySearchCache::new(config.cache_ttl())),
    };

    Arc::new(CachedPlaceSearch::new(Arc::new(naver), cache))
}

fn build_voice(config: &VoiceConfig) -> (Arc<dyn VoiceProvider>, ReconcileMode) {
    if !config.is_live() {
        return (
            Arc::new(SimulatedVoiceProvider::new()),
            ReconcileMode::Simulated {
                delay: config.simulated_delay(),
            },
        );
    }

    let api_key = config
        .api_key
        .as_ref()
        .map(|k| k.expose_secret().clone())
        .unwrap_or_default();
    let provider = ElevenLabsVoiceProvider::new(
        ElevenLabsConfig::new(
            api_key,
            config.agent_id.clone().unwrap_or_default(),
            config.phone_number_id.clone().unwrap_or_default(),
        )
        .with_base_url(config.base_url.clone())
        .with_timeout(config.request_timeout()),
    );

    (
        Arc::new(provider),
        ReconcileMode::Live {
            poll_interval: config.poll_interval(),
            timeout: config.poll_timeout(),
        },
    )
}

fn build_session_validator(config: &AppConfig) -> Arc<dyn SessionValidator> {
    match config.auth.jwt_secret.as_ref().filter(|_| config.auth.has_secret()) {
        Some(secret) => {
            let mut jwt = JwtConfig::new(secret.expose_secret().clone())
                .with_leeway(config.auth.leeway_secs);
            if let Some(audience) = config.auth.audience.as_deref().filter(|a| !a.is_empty()) {
                jwt = jwt.with_audience(audience);
            }
            Arc::new(JwtSessionValidator::new(jwt))
        }
        None => {
            // Only reachable outside production; validate() rejects it there.
            tracing::warn!("No JWT secret configured; accepting bearer token `dev` as user `dev-user`");
            Arc::new(MockSessionValidator::new().with_test_user("dev", "dev-user"))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
