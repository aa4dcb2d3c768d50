use std::sync::Arc;

use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;

use crate::auth::{self, TokenError};
use crate::config::AppConfig;
use crate::database::models::{PublicUser, User};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing required fields: {0:?}")]
    MissingFields(Vec<&'static str>),

    #[error("Password must be at least 6 characters")]
    PasswordTooShort,

    #[error("Email already registered")]
    EmailTaken,

    // One variant for unknown email and wrong password, so clients cannot
    // probe which accounts exist.
    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Issued on successful registration or login
#[derive(Debug, Serialize)]
pub struct Session {
    pub token: String,
    pub user: PublicUser,
}

pub struct AuthService {
    pool: SqlitePool,
    config: Arc<AppConfig>,
}

impl AuthService {
    pub fn new(pool: SqlitePool, config: Arc<AppConfig>) -> Self {
        Self { pool, config }
    }

    pub async fn register(
        &self,
        name: Option<&str>,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<Session, AuthError> {
        let mut missing = Vec::new();
        if name.map_or(true, str::is_empty) {
            missing.push("name");
        }
        if email.map_or(true, str::is_empty) {
            missing.push("email");
        }
        if password.map_or(true, str::is_empty) {
            missing.push("password");
        }
        if !missing.is_empty() {
            return Err(AuthError::MissingFields(missing));
        }

        let (name, email, password) = (name.unwrap(), email.unwrap(), password.unwrap());

        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::PasswordTooShort);
        }

        // Pre-check for a friendly error; the UNIQUE constraint on email
        // backstops the race between concurrent registrations.
        let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = bcrypt::hash(password, self.config.bcrypt_cost)?;

        let result = match sqlx::query(
            "INSERT INTO users (name, email, password_hash) VALUES (?1, ?2, ?3)",
        )
        .bind(name)
        .bind(email)
        .bind(&password_hash)
        .execute(&self.pool)
        .await
        {
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(AuthError::EmailTaken)
            }
            other => other?,
        };

        let user_id = result.last_insert_rowid();
        let token = auth::generate_token(
            user_id,
            &self.config.jwt_secret,
            self.config.jwt_expiry_days,
        )?;
        let user = self
            .find_public_user(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        tracing::info!(user_id, "registered new user");
        Ok(Session { token, user })
    }

    pub async fn login(
        &self,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<Session, AuthError> {
        let mut missing = Vec::new();
        if email.map_or(true, str::is_empty) {
            missing.push("email");
        }
        if password.map_or(true, str::is_empty) {
            missing.push("password");
        }
        if !missing.is_empty() {
            return Err(AuthError::MissingFields(missing));
        }

        let (email, password) = (email.unwrap(), password.unwrap());

        let user: User = sqlx::query_as("SELECT * FROM users WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !bcrypt::verify(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let token = auth::generate_token(
            user.id,
            &self.config.jwt_secret,
            self.config.jwt_expiry_days,
        )?;

        Ok(Session {
            token,
            user: PublicUser::from(user),
        })
    }

    /// Decode a bearer token and re-resolve its subject to a live user row.
    pub async fn verify(&self, token: &str) -> Result<PublicUser, AuthError> {
        let claims = auth::validate_token(token, &self.config.jwt_secret)?;
        self.find_public_user(claims.sub)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    pub async fn find_public_user(&self, user_id: i64) -> Result<Option<PublicUser>, sqlx::Error> {
        sqlx::query_as::<_, PublicUser>("SELECT id, name, email FROM users WHERE id = ?1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    async fn service() -> AuthService {
        let pool = testing::memory_pool().await;
        AuthService::new(pool, Arc::new(testing::test_config()))
    }

    #[tokio::test]
    async fn register_then_verify_round_trips() {
        let svc = service().await;
        let session = svc
            .register(Some("Alice"), Some("alice@example.com"), Some("secret1"))
            .await
            .unwrap();

        assert_eq!(session.user.email, "alice@example.com");

        let verified = svc.verify(&session.token).await.unwrap();
        assert_eq!(verified.id, session.user.id);
    }

    #[tokio::test]
    async fn register_rejects_missing_fields() {
        let svc = service().await;
        let err = svc.register(Some("Alice"), None, Some("secret1")).await;
        assert!(matches!(err, Err(AuthError::MissingFields(f)) if f == vec!["email"]));

        let err = svc.register(None, Some(""), None).await;
        assert!(matches!(
            err,
            Err(AuthError::MissingFields(f)) if f == vec!["name", "email", "password"]
        ));
    }

    #[tokio::test]
    async fn register_rejects_short_password() {
        let svc = service().await;
        let err = svc
            .register(Some("Alice"), Some("alice@example.com"), Some("12345"))
            .await;
        assert!(matches!(err, Err(AuthError::PasswordTooShort)));
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let svc = service().await;
        svc.register(Some("Alice"), Some("alice@example.com"), Some("secret1"))
            .await
            .unwrap();

        let err = svc
            .register(Some("Alice Again"), Some("alice@example.com"), Some("secret2"))
            .await;
        assert!(matches!(err, Err(AuthError::EmailTaken)));
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let svc = service().await;
        svc.register(Some("Alice"), Some("alice@example.com"), Some("secret1"))
            .await
            .unwrap();

        let unknown = svc
            .login(Some("nobody@example.com"), Some("secret1"))
            .await
            .unwrap_err();
        let wrong_pw = svc
            .login(Some("alice@example.com"), Some("wrong-password"))
            .await
            .unwrap_err();

        assert_eq!(unknown.to_string(), wrong_pw.to_string());
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(wrong_pw, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_with_correct_credentials_resolves_same_user() {
        let svc = service().await;
        let registered = svc
            .register(Some("Alice"), Some("alice@example.com"), Some("secret1"))
            .await
            .unwrap();

        let session = svc
            .login(Some("alice@example.com"), Some("secret1"))
            .await
            .unwrap();
        assert_eq!(session.user.id, registered.user.id);

        let verified = svc.verify(&session.token).await.unwrap();
        assert_eq!(verified.id, registered.user.id);
    }

    #[tokio::test]
    async fn verify_fails_for_deleted_user() {
        let svc = service().await;
        let session = svc
            .register(Some("Alice"), Some("alice@example.com"), Some("secret1"))
            .await
            .unwrap();

        sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(session.user.id)
            .execute(&svc.pool)
            .await
            .unwrap();

        assert!(matches!(
            svc.verify(&session.token).await,
            Err(AuthError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn verify_rejects_tampered_token() {
        let svc = service().await;
        let session = svc
            .register(Some("Alice"), Some("alice@example.com"), Some("secret1"))
            .await
            .unwrap();

        let mut tampered = session.token.clone();
        tampered.push('x');
        assert!(matches!(
            svc.verify(&tampered).await,
            Err(AuthError::Token(TokenError::Invalid(_)))
        ));
    }
}
