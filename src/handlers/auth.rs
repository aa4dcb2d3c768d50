use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::middleware::auth::extract_bearer;
use crate::services::auth_service::AuthService;
use crate::AppState;

// Fields are optional so that missing input surfaces as a 400 with
// field-level errors instead of a body-rejection.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

fn auth_service(state: &AppState) -> AuthService {
    AuthService::new(state.pool.clone(), state.config.clone())
}

/// POST /api/auth/register - create an account and issue a token
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = auth_service(&state)
        .register(
            payload.name.as_deref(),
            payload.email.as_deref(),
            payload.password.as_deref(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "token": session.token,
            "user": session.user,
        })),
    ))
}

/// POST /api/auth/login - authenticate and issue a token
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = auth_service(&state)
        .login(payload.email.as_deref(), payload.password.as_deref())
        .await?;

    Ok(Json(json!({
        "message": "Login successful",
        "token": session.token,
        "user": session.user,
    })))
}

/// GET /api/auth/verify - resolve a bearer token back to its user
pub async fn verify(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = extract_bearer(&headers).map_err(ApiError::unauthorized)?;
    let user = auth_service(&state).verify(&token).await?;

    Ok(Json(json!({ "user": user })))
}

/// POST /api/auth/logout - stateless acknowledgment; clients discard the token
pub async fn logout() -> impl IntoResponse {
    Json(json!({ "message": "Logout successful" }))
}
