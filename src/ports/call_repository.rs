//! Call repository port.

use crate::domain::call::Call;
use crate::domain::foundation::{CallId, ConversationId, DomainError, UserId};
use async_trait::async_trait;

/// Repository port for Call aggregate persistence.
///
/// Implementations must ensure `finalize` is a conditional write: a call
/// whose stored status is already terminal is never overwritten, so two
/// racing reconciliations produce exactly one outcome.
#[async_trait]
pub trait CallRepository: Send + Sync {
    /// Save a new call.
    async fn save(&self, call: &Call) -> Result<(), DomainError>;

    /// Update a non-terminal transition (status, session handle).
    ///
    /// # Errors
    ///
    /// - `CallNotFound` if the call doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update(&self, call: &Call) -> Result<(), DomainError>;

    /// Write the terminal status, result, summary and completion time.
    ///
    /// Returns `false` without writing when the stored call is already
    /// terminal.
    async fn finalize(&self, call: &Call) -> Result<bool, DomainError>;

    /// Find a call by its ID, regardless of owner.
    async fn find_by_id(&self, id: &CallId) -> Result<Option<Call>, DomainError>;

    /// Find a call by ID only if `user_id` owns it.
    async fn find_owned(&self, id: &CallId, user_id: &UserId) -> Result<Option<Call>, DomainError> {
        Ok(self.find_by_id(id).await?.filter(|call| call.is_owner(user_id)))
    }

    /// All calls of a user, newest first.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Call>, DomainError>;

    /// Calls placed from one conversation, newest first.
    async fn list_for_conversation(&self, id: &ConversationId) -> Result<Vec<Call>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn CallRepository) {}
    }
}
