//! Session extraction for the workspace routes.

use std::marker::PhantomData;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use super::error::AppError;
use super::routes::AppState;
use crate::session::{AuthenticatedUser, SessionRepository};
use crate::WorkspaceError;

/// Pulls the token out of an `Authorization: Bearer <token>` header.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_owned)
}

/// Extractor that resolves the caller's session.
///
/// Rejects with 401 when the header is missing or the token is unknown or
/// expired, without distinguishing the cases.
#[derive(Debug, Clone)]
pub struct CurrentUser<S>
where
    S: SessionRepository,
{
    user: AuthenticatedUser,
    _marker: PhantomData<S>,
}

impl<S> CurrentUser<S>
where
    S: SessionRepository,
{
    /// Returns a reference to the authenticated user.
    pub fn user(&self) -> &AuthenticatedUser {
        &self.user
    }

    /// Returns the inner user, consuming the wrapper.
    pub fn into_inner(self) -> AuthenticatedUser {
        self.user
    }
}

#[axum::async_trait]
impl<S, W, M, I> FromRequestParts<AppState<S, W, M, I>> for CurrentUser<S>
where
    S: SessionRepository + Clone + Send + Sync + 'static,
    W: Clone + Send + Sync + 'static,
    M: Clone + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S, W, M, I>,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)
            .ok_or(AppError(WorkspaceError::Unauthenticated))?;

        let user = state
            .session_repo
            .resolve(&token)
            .await
            .map_err(AppError)?
            .ok_or(AppError(WorkspaceError::Unauthenticated))?;

        Ok(CurrentUser {
            user,
            _marker: PhantomData,
        })
    }
}
