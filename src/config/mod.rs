use std::env;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set; refusing to start with no signing secret")]
    MissingJwtSecret,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub jwt_secret: String,
    pub jwt_expiry_days: i64,
    pub bcrypt_cost: u32,
    pub default_page_size: i64,
    pub max_page_size: i64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        // The signing secret is the one setting with no default. Starting
        // without it would silently issue forgeable tokens.
        let jwt_secret = env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingJwtSecret)?;

        Ok(Self {
            port: env_or("PORT", 3001),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:movieshelf.db?mode=rwc".to_string()),
            max_connections: env_or("DATABASE_MAX_CONNECTIONS", 5),
            jwt_secret,
            jwt_expiry_days: env_or("JWT_EXPIRY_DAYS", 7),
            bcrypt_cost: env_or("BCRYPT_COST", 10),
            default_page_size: env_or("PAGINATION_DEFAULT_LIMIT", 10),
            max_page_size: env_or("PAGINATION_MAX_LIMIT", 100),
        })
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_falls_back_on_missing_or_garbage() {
        env::remove_var("MOVIESHELF_TEST_UNSET");
        assert_eq!(env_or("MOVIESHELF_TEST_UNSET", 42u32), 42);

        env::set_var("MOVIESHELF_TEST_GARBAGE", "not-a-number");
        assert_eq!(env_or("MOVIESHELF_TEST_GARBAGE", 7i64), 7);

        env::set_var("MOVIESHELF_TEST_PORT", "8080");
        assert_eq!(env_or("MOVIESHELF_TEST_PORT", 3001u16), 8080);
    }
}
