use std::collections::HashMap;

use serde::Deserialize;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use thiserror::Error;

use crate::database::models::{Genre, Movie, MoviePage, MovieWithGenres, Pagination};

#[derive(Debug, Error)]
pub enum MovieError {
    #[error("Title is required")]
    TitleRequired,

    #[error("Unknown genre ids: {0:?}")]
    UnknownGenres(Vec<i64>),

    #[error("Movie not found")]
    NotFound,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Optional, conjunctive listing filters
#[derive(Debug, Default, Clone)]
pub struct MovieFilters {
    pub search: Option<String>,
    pub genre: Option<i64>,
    pub release_from: Option<String>,
    pub release_to: Option<String>,
    pub min_rating: Option<f64>,
    pub max_rating: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Out-of-range values are clamped rather than propagated into the query.
    pub fn clamped(page: i64, limit: i64, max_limit: i64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, max_limit),
        }
    }
}

/// Scalar movie fields plus genre tags, as accepted on create and update
#[derive(Debug, Default, Deserialize)]
pub struct MovieInput {
    pub title: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f64>,
    pub popularity: Option<f64>,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
}

pub struct MovieService {
    pool: SqlitePool,
}

impl MovieService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Filtered, paginated listing of a user's movies, newest first.
    pub async fn list(
        &self,
        user_id: i64,
        filters: &MovieFilters,
        page: PageRequest,
    ) -> Result<MoviePage, MovieError> {
        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM movies m");
        apply_filters(&mut count_query, user_id, filters);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        // Saturating arithmetic: page is only clamped from below, so an
        // enormous page number must not overflow the offset multiply.
        let offset = page.page.saturating_sub(1).saturating_mul(page.limit);
        let mut page_query = QueryBuilder::<Sqlite>::new("SELECT m.* FROM movies m");
        apply_filters(&mut page_query, user_id, filters);
        page_query.push(" ORDER BY m.created_at DESC, m.id DESC LIMIT ");
        page_query.push_bind(page.limit);
        page_query.push(" OFFSET ");
        page_query.push_bind(offset);

        let movies: Vec<Movie> = page_query
            .build_query_as()
            .fetch_all(&self.pool)
            .await?;

        let ids: Vec<i64> = movies.iter().map(|m| m.id).collect();
        let mut genre_map = self.genres_for(&ids).await?;

        let movies = movies
            .into_iter()
            .map(|m| {
                let genres = genre_map.remove(&m.id).unwrap_or_default();
                MovieWithGenres::new(m, genres)
            })
            .collect();

        let total_pages = (total + page.limit - 1) / page.limit;

        Ok(MoviePage {
            movies,
            pagination: Pagination {
                current_page: page.page,
                total_pages,
                total_items: total,
                items_per_page: page.limit,
            },
        })
    }

    /// Single movie with genre tags, scoped to the owning user
    pub async fn get(&self, user_id: i64, movie_id: i64) -> Result<MovieWithGenres, MovieError> {
        let movie: Movie =
            sqlx::query_as("SELECT * FROM movies WHERE id = ?1 AND user_id = ?2")
                .bind(movie_id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or(MovieError::NotFound)?;

        let mut genre_map = self.genres_for(&[movie.id]).await?;
        let genres = genre_map.remove(&movie.id).unwrap_or_default();
        Ok(MovieWithGenres::new(movie, genres))
    }

    pub async fn create(
        &self,
        user_id: i64,
        input: MovieInput,
    ) -> Result<MovieWithGenres, MovieError> {
        let title = required_title(&input)?;
        let genre_ids = normalize_genre_ids(&input.genre_ids);
        self.ensure_genres_exist(&genre_ids).await?;

        // Movie row and genre links commit or roll back together
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO movies
                (title, overview, poster_path, backdrop_path, release_date,
                 vote_average, popularity, user_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(title)
        .bind(&input.overview)
        .bind(&input.poster_path)
        .bind(&input.backdrop_path)
        .bind(&input.release_date)
        .bind(input.vote_average.unwrap_or(0.0))
        .bind(input.popularity.unwrap_or(0.0))
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        let movie_id = result.last_insert_rowid();

        for genre_id in &genre_ids {
            sqlx::query("INSERT INTO movie_genres (movie_id, genre_id) VALUES (?1, ?2)")
                .bind(movie_id)
                .bind(genre_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::debug!(user_id, movie_id, "created movie");
        self.get(user_id, movie_id).await
    }

    /// Full replacement of scalar fields and of the genre-link set.
    pub async fn update(
        &self,
        user_id: i64,
        movie_id: i64,
        input: MovieInput,
    ) -> Result<MovieWithGenres, MovieError> {
        let title = required_title(&input)?;

        let genre_ids = normalize_genre_ids(&input.genre_ids);
        self.ensure_genres_exist(&genre_ids).await?;

        let mut tx = self.pool.begin().await?;

        // Ownership is checked by the UPDATE itself, inside the transaction,
        // so a concurrent delete cannot strand the genre-link re-insert.
        let result = sqlx::query(
            r#"
            UPDATE movies
            SET title = ?1, overview = ?2, poster_path = ?3, backdrop_path = ?4,
                release_date = ?5, vote_average = ?6, popularity = ?7,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?8 AND user_id = ?9
            "#,
        )
        .bind(title)
        .bind(&input.overview)
        .bind(&input.poster_path)
        .bind(&input.backdrop_path)
        .bind(&input.release_date)
        .bind(input.vote_average.unwrap_or(0.0))
        .bind(input.popularity.unwrap_or(0.0))
        .bind(movie_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Dropping the transaction rolls it back
            return Err(MovieError::NotFound);
        }

        // Genre links are replaced wholesale, never patched
        sqlx::query("DELETE FROM movie_genres WHERE movie_id = ?1")
            .bind(movie_id)
            .execute(&mut *tx)
            .await?;

        for genre_id in &genre_ids {
            sqlx::query("INSERT INTO movie_genres (movie_id, genre_id) VALUES (?1, ?2)")
                .bind(movie_id)
                .bind(genre_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.get(user_id, movie_id).await
    }

    pub async fn delete(&self, user_id: i64, movie_id: i64) -> Result<(), MovieError> {
        let result = sqlx::query("DELETE FROM movies WHERE id = ?1 AND user_id = ?2")
            .bind(movie_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(MovieError::NotFound);
        }

        tracing::debug!(user_id, movie_id, "deleted movie");
        Ok(())
    }

    /// Full fixed genre vocabulary, ordered by name
    pub async fn list_genres(&self) -> Result<Vec<Genre>, MovieError> {
        let genres = sqlx::query_as("SELECT id, name FROM genres ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(genres)
    }

    /// Genre tags for a batch of movies, grouped per movie id
    async fn genres_for(
        &self,
        movie_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<Genre>>, sqlx::Error> {
        let mut map: HashMap<i64, Vec<Genre>> = HashMap::new();
        if movie_ids.is_empty() {
            return Ok(map);
        }

        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT mg.movie_id, g.id, g.name \
             FROM movie_genres mg \
             JOIN genres g ON g.id = mg.genre_id \
             WHERE mg.movie_id IN (",
        );
        let mut separated = query.separated(", ");
        for id in movie_ids {
            separated.push_bind(*id);
        }
        query.push(") ORDER BY g.name");

        let rows = query.build().fetch_all(&self.pool).await?;
        for row in rows {
            let movie_id: i64 = row.get(0);
            let genre = Genre {
                id: row.get(1),
                name: row.get(2),
            };
            map.entry(movie_id).or_default().push(genre);
        }

        Ok(map)
    }

    async fn ensure_genres_exist(&self, genre_ids: &[i64]) -> Result<(), MovieError> {
        if genre_ids.is_empty() {
            return Ok(());
        }

        let mut query = QueryBuilder::<Sqlite>::new("SELECT id FROM genres WHERE id IN (");
        let mut separated = query.separated(", ");
        for id in genre_ids {
            separated.push_bind(*id);
        }
        query.push(")");

        let known: Vec<i64> = query.build_query_scalar().fetch_all(&self.pool).await?;
        let unknown: Vec<i64> = genre_ids
            .iter()
            .filter(|id| !known.contains(id))
            .copied()
            .collect();

        if unknown.is_empty() {
            Ok(())
        } else {
            Err(MovieError::UnknownGenres(unknown))
        }
    }
}

fn required_title(input: &MovieInput) -> Result<&str, MovieError> {
    input
        .title
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or(MovieError::TitleRequired)
}

fn normalize_genre_ids(genre_ids: &[i64]) -> Vec<i64> {
    let mut ids = genre_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}

fn apply_filters(query: &mut QueryBuilder<'_, Sqlite>, user_id: i64, filters: &MovieFilters) {
    query.push(" WHERE m.user_id = ");
    query.push_bind(user_id);

    if let Some(search) = &filters.search {
        query.push(" AND m.title LIKE ");
        query.push_bind(format!("%{}%", search));
    }

    if let Some(genre) = filters.genre {
        query.push(
            " AND EXISTS (SELECT 1 FROM movie_genres mg \
             WHERE mg.movie_id = m.id AND mg.genre_id = ",
        );
        query.push_bind(genre);
        query.push(")");
    }

    if let Some(from) = &filters.release_from {
        query.push(" AND m.release_date >= ");
        query.push_bind(from.clone());
    }
    if let Some(to) = &filters.release_to {
        query.push(" AND m.release_date <= ");
        query.push_bind(to.clone());
    }

    if let Some(min) = filters.min_rating {
        query.push(" AND m.vote_average >= ");
        query.push_bind(min);
    }
    if let Some(max) = filters.max_rating {
        query.push(" AND m.vote_average <= ");
        query.push_bind(max);
    }
}
