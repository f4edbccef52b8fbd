//! Bearer token validation.
//!
//! Sign-in happens elsewhere; WIGVO only needs to know which user a token
//! belongs to so it can scope conversations and calls to their owner.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

/// Resolves an access token to its user.
///
/// Errors: `InvalidToken` for anything malformed or wrongly signed,
/// `TokenExpired`, and `ServiceUnavailable` when the check itself could not
/// run. The middleware answers 401 for the first two and 503 for the last.
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// `token` is the raw value after `Bearer `.
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn validator_is_shareable_behind_arc() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn SessionValidator>();
        let _: Option<Arc<dyn SessionValidator>> = None;
    }
}
