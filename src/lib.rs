use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;

#[cfg(test)]
pub mod testing;

use config::AppConfig;

/// Shared application state: the connection pool and the loaded config.
/// Opened once at startup and injected into every handler and service.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: AppConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .merge(auth_routes())
        .merge(movie_routes(state.clone()))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use handlers::auth;

    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/verify", get(auth::verify))
        .route("/api/auth/logout", post(auth::logout))
}

fn movie_routes(state: AppState) -> Router<AppState> {
    use handlers::movies;

    Router::new()
        // Collection-level operations
        .route("/api/movies", get(movies::list).post(movies::create))
        // Record-level operations
        .route(
            "/api/movies/:id",
            get(movies::get).put(movies::update).delete(movies::delete),
        )
        // Genre reference vocabulary
        .route("/api/movies/utils/genres", get(movies::genres))
        // Every movie route requires a valid bearer token
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
}
