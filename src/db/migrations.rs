//! Database initialization and schema migrations.

use sqlx::sqlite::{SqliteConnection, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::info;

/// Initialize the SQLite database with schema and pragmas.
pub async fn init_db(db_path: &str) -> Result<SqlitePool, sqlx::Error> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).ok();
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .after_connect(|conn, _meta| Box::pin(async move { configure_pragmas_conn(conn).await }))
        .connect(&format!("sqlite:{}?mode=rwc", db_path))
        .await?;

    run_migrations(&pool).await?;

    info!("Database initialized at {}", db_path);
    Ok(pool)
}

/// Apply the embedded schema. Statements are IF NOT EXISTS, so this is safe
/// to run on every startup.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let schema_sql = include_str!("schema.sql");

    for statement in schema_sql.split(';') {
        let trimmed = statement.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }

    Ok(())
}

async fn configure_pragmas_conn(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&mut *conn)
        .await?;

    // journal_mode returns the mode actually set; must fetch the row
    sqlx::query("PRAGMA journal_mode = WAL")
        .fetch_one(&mut *conn)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&mut *conn)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&mut *conn)
        .await?;

    Ok(())
}
