//! GetCallHandler - owner-scoped call lookup.

use std::sync::Arc;

use crate::domain::call::Call;
use crate::domain::foundation::{CallId, UserId};
use crate::ports::CallRepository;

use super::CallError;

#[derive(Debug, Clone)]
pub struct GetCallQuery {
    pub user_id: UserId,
    pub call_id: CallId,
}

pub struct GetCallHandler {
    calls: Arc<dyn CallRepository>,
}

impl GetCallHandler {
    pub fn new(calls: Arc<dyn CallRepository>) -> Self {
        Self { calls }
    }

    pub async fn handle(&self, query: GetCallQuery) -> Result<Call, CallError> {
        self.calls
            .find_owned(&query.call_id, &query.user_id)
            .await?
            .ok_or(CallError::NotFound(query.call_id))
    }
}
