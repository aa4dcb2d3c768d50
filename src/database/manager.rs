use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::info;

/// Open the connection pool for the configured database URL.
///
/// SQLite connections are local and cheap, so pooled connections are kept
/// alive for the lifetime of the process. The sqlx SQLite driver enables
/// `PRAGMA foreign_keys` on every connection, which the schema's cascade
/// deletes rely on.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect(database_url)
        .await?;

    info!("Connected database pool: {}", database_url);
    Ok(pool)
}

/// Pings the pool to ensure connectivity
pub async fn health_check(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
