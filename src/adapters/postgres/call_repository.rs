//! PostgreSQL implementation of CallRepository.
//!
//! The frozen details are stored as JSONB next to a few denormalized columns
//! (request type, target name and phone) used by history listings.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::call::{Call, CallResult, CallStatus};
use crate::domain::collection::CollectedData;
use crate::domain::foundation::{
    CallId, ConversationId, DomainError, ErrorCode, Timestamp, UserId,
};
use crate::ports::CallRepository;

const SELECT_COLUMNS: &str = r#"
    SELECT id, user_id, conversation_id, details, status, result, summary,
           session_handle, created_at, completed_at
    FROM calls
"#;

/// PostgreSQL implementation of CallRepository.
#[derive(Clone)]
pub struct PostgresCallRepository {
    pool: PgPool,
}

impl PostgresCallRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(context: &str, e: impl std::fmt::Display) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

fn call_not_found(id: &CallId) -> DomainError {
    DomainError::new(ErrorCode::CallNotFound, format!("Call not found: {}", id))
}

#[async_trait]
impl CallRepository for PostgresCallRepository {
    async fn save(&self, call: &Call) -> Result<(), DomainError> {
        let details = serde_json::to_value(call.details())
            .map_err(|e| db_error("Failed to encode call details", e))?;

        sqlx::query(
            r#"
            INSERT INTO calls (
                id, user_id, conversation_id, request_type, target_name, target_phone,
                details, status, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(call.id().as_uuid())
        .bind(call.user_id().as_str())
        .bind(call.conversation_id().map(|id| *id.as_uuid()))
        .bind(call.request_type().map(|t| t.as_str()))
        .bind(call.target_name())
        .bind(call.target_phone())
        .bind(details)
        .bind(call.status().as_str())
        .bind(call.created_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to insert call", e))?;

        Ok(())
    }

    async fn update(&self, call: &Call) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE calls SET
                status = $2,
                session_handle = $3
            WHERE id = $1
            "#,
        )
        .bind(call.id().as_uuid())
        .bind(call.status().as_str())
        .bind(call.session_handle())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update call", e))?;

        if result.rows_affected() == 0 {
            return Err(call_not_found(call.id()));
        }

        Ok(())
    }

    async fn finalize(&self, call: &Call) -> Result<bool, DomainError> {
        // Guarded on the stored status so only the first terminal write lands.
        let result = sqlx::query(
            r#"
            UPDATE calls SET
                status = $2,
                result = $3,
                summary = $4,
                session_handle = $5,
                completed_at = $6
            WHERE id = $1 AND status NOT IN ('COMPLETED', 'FAILED')
            "#,
        )
        .bind(call.id().as_uuid())
        .bind(call.status().as_str())
        .bind(call.result().map(|r| r.as_str()))
        .bind(call.summary())
        .bind(call.session_handle())
        .bind(call.completed_at().map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to finalize call", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: &CallId) -> Result<Option<Call>, DomainError> {
        let row = sqlx::query(&format!("{} WHERE id = $1", SELECT_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to fetch call", e))?;

        row.map(row_to_call).transpose()
    }

    async fn find_owned(&self, id: &CallId, user_id: &UserId) -> Result<Option<Call>, DomainError> {
        let row = sqlx::query(&format!("{} WHERE id = $1 AND user_id = $2", SELECT_COLUMNS))
            .bind(id.as_uuid())
            .bind(user_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to fetch call", e))?;

        row.map(row_to_call).transpose()
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Call>, DomainError> {
        let rows = sqlx::query(&format!(
            "{} WHERE user_id = $1 ORDER BY created_at DESC",
            SELECT_COLUMNS
        ))
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list calls", e))?;

        rows.into_iter().map(row_to_call).collect()
    }

    async fn list_for_conversation(&self, id: &ConversationId) -> Result<Vec<Call>, DomainError> {
        let rows = sqlx::query(&format!(
            "{} WHERE conversation_id = $1 ORDER BY created_at DESC",
            SELECT_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list conversation calls", e))?;

        rows.into_iter().map(row_to_call).collect()
    }
}

fn row_to_call(row: PgRow) -> Result<Call, DomainError> {
    let id: uuid::Uuid = row.try_get("id").map_err(|e| db_error("Failed to get id", e))?;
    let user_id: String = row
        .try_get("user_id")
        .map_err(|e| db_error("Failed to get user_id", e))?;
    let conversation_id: Option<uuid::Uuid> = row
        .try_get("conversation_id")
        .map_err(|e| db_error("Failed to get conversation_id", e))?;
    let details: serde_json::Value = row
        .try_get("details")
        .map_err(|e| db_error("Failed to get details", e))?;
    let status: String = row
        .try_get("status")
        .map_err(|e| db_error("Failed to get status", e))?;
    let result: Option<String> = row
        .try_get("result")
        .map_err(|e| db_error("Failed to get result", e))?;
    let summary: Option<String> = row
        .try_get("summary")
        .map_err(|e| db_error("Failed to get summary", e))?;
    let session_handle: Option<String> = row
        .try_get("session_handle")
        .map_err(|e| db_error("Failed to get session_handle", e))?;
    let created_at: chrono::DateTime<chrono::Utc> = row
        .try_get("created_at")
        .map_err(|e| db_error("Failed to get created_at", e))?;
    let completed_at: Option<chrono::DateTime<chrono::Utc>> = row
        .try_get("completed_at")
        .map_err(|e| db_error("Failed to get completed_at", e))?;

    let details: CollectedData =
        serde_json::from_value(details).map_err(|e| db_error("Invalid call details", e))?;
    let status: CallStatus = status.parse().map_err(|e: String| db_error("Invalid status", e))?;
    let result: Option<CallResult> = result
        .map(|r| r.parse())
        .transpose()
        .map_err(|e: String| db_error("Invalid result", e))?;

    Ok(Call::reconstitute(
        CallId::from_uuid(id),
        UserId::new(user_id).map_err(|e| db_error("Invalid user_id", e))?,
        conversation_id.map(ConversationId::from_uuid),
        details,
        status,
        result,
        summary,
        session_handle,
        Timestamp::from_datetime(created_at),
        completed_at.map(Timestamp::from_datetime),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_round_trip_through_column_text() {
        for status in [
            CallStatus::Pending,
            CallStatus::Calling,
            CallStatus::InProgress,
            CallStatus::Completed,
            CallStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<CallStatus>().unwrap(), status);
        }
    }

    #[test]
    fn unknown_result_text_is_rejected() {
        assert!("MAYBE".parse::<CallResult>().is_err());
    }

    #[test]
    fn not_found_error_names_the_call() {
        let id = CallId::new();
        let err = call_not_found(&id);
        assert_eq!(err.code, ErrorCode::CallNotFound);
        assert!(err.message.contains(&id.to_string()));
    }
}
