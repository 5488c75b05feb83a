//! `SQLite` database backend implementations.
//!
//! This module provides `SQLite`-backed implementations for all repository
//! traits. Enable the `sqlx_sqlite` feature to use these implementations.

pub mod migrations;
mod session;
mod workspaces;

pub use session::SqliteSessionRepository;
use sqlx::SqlitePool;
pub use workspaces::{
    SqliteInvitationRepository, SqliteMembershipRepository, SqliteWorkspaceRepository,
};

/// Creates all `SQLite` repository instances from a connection pool.
pub fn create_repositories(
    pool: SqlitePool,
) -> (
    SqliteWorkspaceRepository,
    SqliteMembershipRepository,
    SqliteInvitationRepository,
    SqliteSessionRepository,
) {
    (
        SqliteWorkspaceRepository::new(pool.clone()),
        SqliteMembershipRepository::new(pool.clone()),
        SqliteInvitationRepository::new(pool.clone()),
        SqliteSessionRepository::new(pool),
    )
}
