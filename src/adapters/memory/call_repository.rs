//! In-memory CallRepository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::call::Call;
use crate::domain::foundation::{CallId, ConversationId, DomainError, ErrorCode, UserId};
use crate::ports::CallRepository;

#[derive(Debug, Clone, Default)]
pub struct InMemoryCallRepository {
    calls: Arc<RwLock<HashMap<CallId, Call>>>,
    /// Updates still allowed before `update` starts failing; `None` never fails.
    update_budget: Arc<RwLock<Option<usize>>>,
}

impl InMemoryCallRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lets `allowed` more `update` calls succeed, then fails each one with
    /// a database error until reset with `None`. `finalize` keeps working.
    pub async fn fail_updates_after(&self, allowed: Option<usize>) {
        *self.update_budget.write().await = allowed;
    }

    async fn spend_update(&self) -> Result<(), DomainError> {
        let mut budget = self.update_budget.write().await;
        match budget.as_mut() {
            Some(0) => Err(DomainError::new(
                ErrorCode::DatabaseError,
                "Simulated call update failure",
            )),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CallRepository for InMemoryCallRepository {
    async fn save(&self, call: &Call) -> Result<(), DomainError> {
        self.calls.write().await.insert(*call.id(), call.clone());
        Ok(())
    }

    async fn update(&self, call: &Call) -> Result<(), DomainError> {
        self.spend_update().await?;
        let mut calls = self.calls.write().await;
        match calls.get_mut(call.id()) {
            Some(stored) => {
                *stored = call.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::CallNotFound,
                format!("Call not found: {}", call.id()),
            )),
        }
    }

    async fn finalize(&self, call: &Call) -> Result<bool, DomainError> {
        // Check and write under one lock, like the conditional UPDATE.
        let mut calls = self.calls.write().await;
        match calls.get_mut(call.id()) {
            Some(stored) if stored.is_terminal() => Ok(false),
            Some(stored) => {
                *stored = call.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_by_id(&self, id: &CallId) -> Result<Option<Call>, DomainError> {
        Ok(self.calls.read().await.get(id).cloned())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Call>, DomainError> {
        let mut calls: Vec<Call> = self
            .calls
            .read()
            .await
            .values()
            .filter(|call| call.is_owner(user_id))
            .cloned()
            .collect();
        calls.sort_by(|a, b| b.created_at().cmp(a.created_at()));
        Ok(calls)
    }

    async fn list_for_conversation(&self, id: &ConversationId) -> Result<Vec<Call>, DomainError> {
        let mut calls: Vec<Call> = self
            .calls
            .read()
            .await
            .values()
            .filter(|call| call.conversation_id() == Some(id))
            .cloned()
            .collect();
        calls.sort_by(|a, b| b.created_at().cmp(a.created_at()));
        Ok(calls)
    }
}
