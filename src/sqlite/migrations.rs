//! Embedded database migrations for `SQLite`.
//!
//! Migrations are embedded at compile time and run programmatically, so an
//! embedding application needs no external migration tooling.
//!
//! # Example
//!
//! ```rust,ignore
//! use anteroom::sqlite::migrations;
//! use sqlx::SqlitePool;
//!
//! async fn setup_database(pool: &SqlitePool) -> Result<(), sqlx::Error> {
//!     migrations::run(pool).await?;
//!     Ok(())
//! }
//! ```

use sqlx::{Executor, SqlitePool};

/// Core migrations, in application order.
const CORE_MIGRATIONS: &[(&str, &str)] = &[
    (
        "20250710000001_create_workspaces_table",
        include_str!("../../migrations_sqlite/core/20250710000001_create_workspaces_table.sql"),
    ),
    (
        "20250710000002_create_workspace_members_table",
        include_str!(
            "../../migrations_sqlite/core/20250710000002_create_workspace_members_table.sql"
        ),
    ),
    (
        "20250710000003_create_workspace_invitations_table",
        include_str!(
            "../../migrations_sqlite/core/20250710000003_create_workspace_invitations_table.sql"
        ),
    ),
    (
        "20250710000004_create_sessions_table",
        include_str!("../../migrations_sqlite/core/20250710000004_create_sessions_table.sql"),
    ),
];

/// Runs all database migrations.
///
/// Migrations are executed in order and tracked in the
/// `_anteroom_migrations` table; already-applied migrations are skipped.
pub async fn run(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    pool.execute(
        r"
        CREATE TABLE IF NOT EXISTS _anteroom_migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        )
        ",
    )
    .await?;

    run_migrations(pool, CORE_MIGRATIONS).await
}

/// Runs a set of migrations against the database.
///
/// # Limitations
///
/// SQL statements are split by semicolons (`;`), so migrations containing
/// semicolons inside string literals will not run correctly. The bundled
/// migrations avoid this.
async fn run_migrations(pool: &SqlitePool, migrations: &[(&str, &str)]) -> Result<(), sqlx::Error> {
    for (name, sql) in migrations {
        let applied: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM _anteroom_migrations WHERE name = ?)")
                .bind(*name)
                .fetch_one(pool)
                .await?;

        if !applied {
            // SQLite doesn't support multiple statements in one execute, so
            // split by semicolons and run each statement.
            for statement in sql.split(';') {
                let trimmed = statement.trim();
                if !trimmed.is_empty() {
                    pool.execute(trimmed).await?;
                }
            }

            sqlx::query("INSERT INTO _anteroom_migrations (name) VALUES (?)")
                .bind(*name)
                .execute(pool)
                .await?;
        }
    }
    Ok(())
}
