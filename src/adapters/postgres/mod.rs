//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresConversationRepository` - conversations and their messages
//! - `PostgresCallRepository` - calls, with a guarded terminal write
//!
//! `run_migrations` applies the SQL files under `migrations/`.

mod call_repository;
mod conversation_repository;

pub use call_repository::PostgresCallRepository;
pub use conversation_repository::PostgresConversationRepository;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// Opens a connection pool.
pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(url)
        .await
}

/// Applies pending migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
