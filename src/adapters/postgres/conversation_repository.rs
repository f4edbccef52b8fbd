//! PostgreSQL implementation of ConversationRepository.
//!
//! Collected data and search results are stored as JSONB; messages live in
//! their own append-only table ordered by a serial column.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::collection::CollectedData;
use crate::domain::conversation::{Conversation, Message, MessageMetadata, MessageRole, Place};
use crate::domain::foundation::{
    ConversationId, DomainError, ErrorCode, MessageId, Timestamp, UserId,
};
use crate::ports::ConversationRepository;

/// PostgreSQL implementation of ConversationRepository.
#[derive(Clone)]
pub struct PostgresConversationRepository {
    pool: PgPool,
}

impl PostgresConversationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(context: &str, e: impl std::fmt::Display) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

fn to_json<T: serde::Serialize>(value: &T, what: &str) -> Result<serde_json::Value, DomainError> {
    serde_json::to_value(value).map_err(|e| db_error(&format!("Failed to encode {}", what), e))
}

#[async_trait]
impl ConversationRepository for PostgresConversationRepository {
    async fn save(&self, conversation: &Conversation) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO conversations (
                id, user_id, status, collected_data, search_results, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(conversation.id().as_uuid())
        .bind(conversation.user_id().as_str())
        .bind(conversation.status().as_str())
        .bind(to_json(conversation.collected_data(), "collected data")?)
        .bind(to_json(&conversation.search_results(), "search results")?)
        .bind(conversation.created_at().as_datetime())
        .bind(conversation.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to insert conversation", e))?;

        Ok(())
    }

    async fn update(&self, conversation: &Conversation) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE conversations SET
                status = $2,
                collected_data = $3,
                search_results = $4,
                updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(conversation.id().as_uuid())
        .bind(conversation.status().as_str())
        .bind(to_json(conversation.collected_data(), "collected data")?)
        .bind(to_json(&conversation.search_results(), "search results")?)
        .bind(conversation.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update conversation", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::ConversationNotFound,
                format!("Conversation not found: {}", conversation.id()),
            ));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &ConversationId) -> Result<Option<Conversation>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, status, collected_data, search_results, created_at, updated_at
            FROM conversations
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch conversation", e))?;

        row.map(row_to_conversation).transpose()
    }

    async fn find_owned(
        &self,
        id: &ConversationId,
        user_id: &UserId,
    ) -> Result<Option<Conversation>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, status, collected_data, search_results, created_at, updated_at
            FROM conversations
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch conversation", e))?;

        row.map(row_to_conversation).transpose()
    }

    async fn add_message(&self, message: &Message) -> Result<(), DomainError> {
        let metadata = message
            .metadata()
            .map(|m| to_json(m, "message metadata"))
            .transpose()?;

        sqlx::query(
            r#"
            INSERT INTO messages (id, conversation_id, role, content, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(message.id().as_uuid())
        .bind(message.conversation_id().as_uuid())
        .bind(message.role().as_str())
        .bind(message.content())
        .bind(metadata)
        .bind(message.created_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to insert message", e))?;

        Ok(())
    }

    async fn messages(&self, id: &ConversationId) -> Result<Vec<Message>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, conversation_id, role, content, metadata, created_at
            FROM messages
            WHERE conversation_id = $1
            ORDER BY seq ASC
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch messages", e))?;

        rows.into_iter().map(row_to_message).collect()
    }

    async fn recent_messages(
        &self,
        id: &ConversationId,
        limit: usize,
    ) -> Result<Vec<Message>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, conversation_id, role, content, metadata, created_at
            FROM (
                SELECT seq, id, conversation_id, role, content, metadata, created_at
                FROM messages
                WHERE conversation_id = $1
                ORDER BY seq DESC
                LIMIT $2
            ) newest
            ORDER BY seq ASC
            "#,
        )
        .bind(id.as_uuid())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch recent messages", e))?;

        rows.into_iter().map(row_to_message).collect()
    }
}

fn row_to_conversation(row: PgRow) -> Result<Conversation, DomainError> {
    let id: uuid::Uuid = row.try_get("id").map_err(|e| db_error("Failed to get id", e))?;
    let user_id: String = row
        .try_get("user_id")
        .map_err(|e| db_error("Failed to get user_id", e))?;
    let status: String = row
        .try_get("status")
        .map_err(|e| db_error("Failed to get status", e))?;
    let collected: serde_json::Value = row
        .try_get("collected_data")
        .map_err(|e| db_error("Failed to get collected_data", e))?;
    let search_results: serde_json::Value = row
        .try_get("search_results")
        .map_err(|e| db_error("Failed to get search_results", e))?;
    let created_at: chrono::DateTime<chrono::Utc> = row
        .try_get("created_at")
        .map_err(|e| db_error("Failed to get created_at", e))?;
    let updated_at: chrono::DateTime<chrono::Utc> = row
        .try_get("updated_at")
        .map_err(|e| db_error("Failed to get updated_at", e))?;

    let collected_data: CollectedData = serde_json::from_value(collected)
        .map_err(|e| db_error("Invalid collected_data", e))?;
    let search_results: Vec<Place> = serde_json::from_value(search_results)
        .map_err(|e| db_error("Invalid search_results", e))?;

    Ok(Conversation::reconstitute(
        ConversationId::from_uuid(id),
        UserId::new(user_id).map_err(|e| db_error("Invalid user_id", e))?,
        status.parse().map_err(|e: String| db_error("Invalid status", e))?,
        collected_data,
        search_results,
        Timestamp::from_datetime(created_at),
        Timestamp::from_datetime(updated_at),
    ))
}

fn row_to_message(row: PgRow) -> Result<Message, DomainError> {
    let id: uuid::Uuid = row.try_get("id").map_err(|e| db_error("Failed to get id", e))?;
    let conversation_id: uuid::Uuid = row
        .try_get("conversation_id")
        .map_err(|e| db_error("Failed to get conversation_id", e))?;
    let role: String = row.try_get("role").map_err(|e| db_error("Failed to get role", e))?;
    let content: String = row
        .try_get("content")
        .map_err(|e| db_error("Failed to get content", e))?;
    let metadata: Option<serde_json::Value> = row
        .try_get("metadata")
        .map_err(|e| db_error("Failed to get metadata", e))?;
    let created_at: chrono::DateTime<chrono::Utc> = row
        .try_get("created_at")
        .map_err(|e| db_error("Failed to get created_at", e))?;

    let metadata: Option<MessageMetadata> = metadata
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| db_error("Invalid message metadata", e))?;

    Ok(Message::reconstitute(
        MessageId::from_uuid(id),
        ConversationId::from_uuid(conversation_id),
        role.parse::<MessageRole>()
            .map_err(|e| db_error("Invalid role", e))?,
        content,
        metadata,
        Timestamp::from_datetime(created_at),
    ))
}
