#![allow(
    clippy::print_stdout,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::str_to_string,
    clippy::missing_docs_in_private_items
)]

//! Axum SQLite Workspace Server Example
//!
//! A complete example showing how to wire the workspace membership API
//! with SQLite storage.
//!
//! Run with: `cargo run --example axum_sqlite_server --features "axum_api sqlx_sqlite"`
//!
//! Environment variables:
//!   DATABASE_URL=sqlite:./anteroom.db (optional, defaults to in-memory)
//!
//! Session issuance is owned by an external identity provider in a real
//! deployment; this demo seeds two sessions so the endpoints can be
//! exercised with curl:
//!
//!   curl -X POST http://localhost:8080/workspaces \
//!     -H "Authorization: Bearer owner-token" \
//!     -H "Content-Type: application/json" \
//!     -d '{"name": "Acme Corp"}'

use axum::Router;
use chrono::{Duration, Utc};
use tokio::net::TcpListener;

use anteroom::api::axum::{invitation_routes, workspace_routes, AppState};
use anteroom::sqlite::{
    create_repositories, migrations, SqliteInvitationRepository, SqliteMembershipRepository,
    SqliteSessionRepository, SqliteWorkspaceRepository,
};
use anteroom::WorkspaceConfig;
use sqlx::sqlite::SqlitePoolOptions;

#[tokio::main]
async fn main() {
    // Load database URL from environment, default to in-memory
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());

    // Create connection pool
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to create pool");

    // Run migrations
    migrations::run(&pool)
        .await
        .expect("Failed to run migrations");

    let (workspace_repo, membership_repo, invitation_repo, session_repo) =
        create_repositories(pool);

    // Stand in for the external identity provider: two users, two sessions
    let expires_at = Utc::now() + Duration::days(1);
    session_repo
        .insert("owner-token", 1, "owner@example.com", expires_at)
        .await
        .expect("Failed to seed session");
    session_repo
        .insert("carol-token", 2, "carol@example.com", expires_at)
        .await
        .expect("Failed to seed session");

    let state = AppState {
        session_repo,
        workspace_repo,
        membership_repo,
        invitation_repo,
        config: WorkspaceConfig::default(),
    };

    // Build the router
    let app = Router::new()
        .nest(
            "/workspaces",
            workspace_routes::<
                SqliteSessionRepository,
                SqliteWorkspaceRepository,
                SqliteMembershipRepository,
                SqliteInvitationRepository,
            >(),
        )
        .nest(
            "/invitations",
            invitation_routes::<
                SqliteSessionRepository,
                SqliteWorkspaceRepository,
                SqliteMembershipRepository,
                SqliteInvitationRepository,
            >(),
        )
        .with_state(state);

    println!("Starting Axum SQLite workspace server on http://localhost:8080");
    println!("Database: {database_url}");
    println!("Seeded sessions: owner-token (owner@example.com), carol-token (carol@example.com)");
    println!("Endpoints:");
    println!("  POST   /workspaces                        - Create workspace");
    println!("  GET    /workspaces                        - List your workspaces");
    println!("  POST   /workspaces/:id/invites            - Invite an email");
    println!("  GET    /workspaces/:id/invites            - List pending invitations");
    println!("  DELETE /workspaces/:id/invites/:invite_id - Cancel invitation");
    println!("  GET    /invitations                       - Your pending invitations");
    println!("  POST   /invitations/:id/accept            - Accept invitation");
    println!("  POST   /invitations/:id/decline           - Decline invitation");

    let listener = TcpListener::bind("127.0.0.1:8080").await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
