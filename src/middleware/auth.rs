use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::database::models::PublicUser;
use crate::error::ApiError;
use crate::services::auth_service::AuthService;
use crate::AppState;

/// Authenticated user context resolved from the bearer token, injected into
/// request extensions for handlers behind this middleware.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<PublicUser> for AuthUser {
    fn from(user: PublicUser) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

/// Bearer-token authentication: validates the token and re-resolves its
/// subject to a live user row before letting the request through.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(request.headers()).map_err(ApiError::unauthorized)?;

    let service = AuthService::new(state.pool.clone(), state.config.clone());
    let user = service.verify(&token).await?;

    request.extensions_mut().insert(AuthUser::from(user));
    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn extract_bearer(headers: &HeaderMap) -> Result<String, &'static str> {
    let auth_header = headers
        .get("authorization")
        .ok_or("Missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or("Authorization header must use Bearer token format")?;

    if token.trim().is_empty() {
        return Err("Empty bearer token");
    }
    Ok(token.to_string())
}
