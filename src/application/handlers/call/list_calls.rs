//! ListCallsHandler - a user's call history, newest first.

use std::sync::Arc;

use crate::domain::call::Call;
use crate::domain::foundation::UserId;
use crate::ports::CallRepository;

use super::CallError;

#[derive(Debug, Clone)]
pub struct ListCallsQuery {
    pub user_id: UserId,
}

pub struct ListCallsHandler {
    calls: Arc<dyn CallRepository>,
}

impl ListCallsHandler {
    pub fn new(calls: Arc<dyn CallRepository>) -> Self {
        Self { calls }
    }

    pub async fn handle(&self, query: ListCallsQuery) -> Result<Vec<Call>, CallError> {
        Ok(self.calls.list_for_user(&query.user_id).await?)
    }
}
