//! Shared helpers for unit tests: in-memory databases and fixture users.

use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::database::{manager, migrate};

/// Fresh migrated in-memory database, one per test
pub async fn memory_pool() -> SqlitePool {
    let pool = manager::connect("sqlite::memory:", 1)
        .await
        .expect("failed to open in-memory database");
    migrate::run(&pool).await.expect("migration failed");
    pool
}

pub fn test_config() -> AppConfig {
    AppConfig {
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        max_connections: 1,
        jwt_secret: "test-secret".to_string(),
        jwt_expiry_days: 7,
        // Minimum bcrypt cost keeps the test suite fast
        bcrypt_cost: 4,
        default_page_size: 10,
        max_page_size: 100,
    }
}

/// Insert a user directly, bypassing registration. The stored hash is not a
/// real bcrypt digest, so only use this where login is not exercised.
pub async fn insert_user(pool: &SqlitePool, name: &str, email: &str) -> i64 {
    let result = sqlx::query("INSERT INTO users (name, email, password_hash) VALUES (?1, ?2, ?3)")
        .bind(name)
        .bind(email)
        .bind("x")
        .execute(pool)
        .await
        .expect("failed to insert fixture user");
    result.last_insert_rowid()
}
