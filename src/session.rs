//! Session identity seam.
//!
//! Authentication is an external collaborator: some other system logs users
//! in, verifies their email addresses and issues bearer tokens. This crate
//! only needs to resolve a presented token back to an identity, so the seam
//! is a single-method repository trait.
//!
//! The `mocks` feature ships an in-memory implementation for tests, and the
//! `sqlx_sqlite` feature ships a table-backed one for the demo server.

use async_trait::async_trait;

use crate::WorkspaceError;

/// The identity an upstream session provider vouches for.
///
/// `email` is the user's verified address. Invitation ownership checks
/// compare against it case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Unique user identifier, owned by the external identity provider.
    pub id: i64,
    /// Verified email address.
    pub email: String,
}

/// Resolves bearer session tokens to authenticated users.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Returns the user a valid, unexpired session token belongs to.
    ///
    /// `Ok(None)` means the token is unknown or expired; the API layer turns
    /// that into a 401 without distinguishing the two cases.
    async fn resolve(&self, token: &str) -> Result<Option<AuthenticatedUser>, WorkspaceError>;
}

#[cfg(feature = "mocks")]
pub use mock::MockSessionRepository;

#[cfg(feature = "mocks")]
mod mock {
    use std::collections::HashMap;
    use std::sync::{Arc, RwLock};

    use async_trait::async_trait;

    use super::{AuthenticatedUser, SessionRepository};
    use crate::WorkspaceError;

    /// In-memory session store for tests.
    #[derive(Clone, Default)]
    pub struct MockSessionRepository {
        sessions: Arc<RwLock<HashMap<String, AuthenticatedUser>>>,
    }

    impl MockSessionRepository {
        pub fn new() -> Self {
            Self::default()
        }

        /// Registers a token for a user.
        pub fn insert(&self, token: &str, user_id: i64, email: &str) {
            let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
            sessions.insert(
                token.to_owned(),
                AuthenticatedUser {
                    id: user_id,
                    email: email.to_owned(),
                },
            );
        }
    }

    #[async_trait]
    impl SessionRepository for MockSessionRepository {
        async fn resolve(
            &self,
            token: &str,
        ) -> Result<Option<AuthenticatedUser>, WorkspaceError> {
            let sessions = self
                .sessions
                .read()
                .map_err(|_| WorkspaceError::Internal("lock poisoned".into()))?;
            Ok(sessions.get(token).cloned())
        }
    }
}
