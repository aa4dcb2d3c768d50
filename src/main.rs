use movieshelf::config::AppConfig;
use movieshelf::database::{manager, migrate};
use movieshelf::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Fails fast when JWT_SECRET is missing; there is no fallback secret.
    let config = AppConfig::from_env()?;

    let pool = manager::connect(&config.database_url, config.max_connections).await?;
    migrate::run(&pool).await?;

    let port = config.port;
    let state = AppState::new(pool, config);
    let app = app(state);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("movieshelf API listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
