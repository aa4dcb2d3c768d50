use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::services::movie_service::{MovieFilters, MovieInput, MovieService, PageRequest};
use crate::AppState;

/// Raw query string for the listing endpoint. Everything arrives as text so
/// that garbage values map to a 400 instead of a framework rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub genre: Option<String>,
    pub release_from: Option<String>,
    pub release_to: Option<String>,
    pub min_rating: Option<String>,
    pub max_rating: Option<String>,
}

impl ListQuery {
    fn into_parts(self, state: &AppState) -> Result<(MovieFilters, PageRequest), ApiError> {
        let page = parse_param::<i64>("page", self.page)?
            .unwrap_or(1);
        let limit = parse_param::<i64>("limit", self.limit)?
            .unwrap_or(state.config.default_page_size);

        let filters = MovieFilters {
            search: non_empty(self.search),
            genre: parse_param("genre", self.genre)?,
            release_from: non_empty(self.release_from),
            release_to: non_empty(self.release_to),
            min_rating: parse_param("minRating", self.min_rating)?,
            max_rating: parse_param("maxRating", self.max_rating)?,
        };

        Ok((
            filters,
            PageRequest::clamped(page, limit, state.config.max_page_size),
        ))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_param<T: FromStr>(name: &str, value: Option<String>) -> Result<Option<T>, ApiError> {
    match non_empty(value) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| ApiError::validation(format!("Invalid value for '{}'", name))),
    }
}

fn movie_service(state: &AppState) -> MovieService {
    MovieService::new(state.pool.clone())
}

/// GET /api/movies - filtered, paginated listing scoped to the caller
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (filters, page) = query.into_parts(&state)?;
    let result = movie_service(&state).list(user.id, &filters, page).await?;
    Ok(Json(result))
}

/// GET /api/movies/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let movie = movie_service(&state).get(user.id, id).await?;
    Ok(Json(movie))
}

/// POST /api/movies
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<MovieInput>,
) -> Result<impl IntoResponse, ApiError> {
    let movie = movie_service(&state).create(user.id, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Movie created successfully",
            "movie": movie,
        })),
    ))
}

/// PUT /api/movies/:id - full replace of fields and genre links
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(input): Json<MovieInput>,
) -> Result<impl IntoResponse, ApiError> {
    let movie = movie_service(&state).update(user.id, id, input).await?;
    Ok(Json(json!({
        "message": "Movie updated successfully",
        "movie": movie,
    })))
}

/// DELETE /api/movies/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    movie_service(&state).delete(user.id, id).await?;
    Ok(Json(json!({ "message": "Movie deleted successfully" })))
}

/// GET /api/movies/utils/genres - fixed genre vocabulary
pub async fn genres(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let genres = movie_service(&state).list_genres().await?;
    Ok(Json(json!({ "genres": genres })))
}
