use anyhow::{Context, Result};

use movieshelf::config::AppConfig;
use movieshelf::database::{manager, migrate};
use movieshelf::{app, AppState};

pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        max_connections: 1,
        jwt_secret: "integration-test-secret".to_string(),
        jwt_expiry_days: 7,
        // Minimum bcrypt cost keeps the suite fast
        bcrypt_cost: 4,
        default_page_size: 10,
        max_page_size: 100,
    }
}

/// Spawn the full router on an ephemeral port with a fresh in-memory
/// database, one per test for isolation.
pub async fn spawn_app() -> Result<TestApp> {
    let config = test_config();

    let pool = manager::connect(&config.database_url, config.max_connections)
        .await
        .context("failed to open in-memory database")?;
    migrate::run(&pool).await.context("migration failed")?;

    let state = AppState::new(pool, config);
    let router = app(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind test listener")?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });

    Ok(TestApp {
        base_url: format!("http://{}", addr),
        client: reqwest::Client::new(),
    })
}

/// Register a user and return (token, user id)
pub async fn register(app: &TestApp, name: &str, email: &str) -> Result<(String, i64)> {
    let res = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&serde_json::json!({
            "name": name,
            "email": email,
            "password": "secret1",
        }))
        .send()
        .await?;

    anyhow::ensure!(
        res.status() == reqwest::StatusCode::CREATED,
        "registration failed with status {}",
        res.status()
    );

    let body: serde_json::Value = res.json().await?;
    let token = body["token"]
        .as_str()
        .context("missing token in registration response")?
        .to_string();
    let user_id = body["user"]["id"]
        .as_i64()
        .context("missing user id in registration response")?;

    Ok((token, user_id))
}
