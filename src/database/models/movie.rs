use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

use super::genre::Genre;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: f64,
    pub popularity: f64,
    pub user_id: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Movie annotated with its genre tags, assembled by joining movie_genres
/// against the genre vocabulary and grouping in the service layer.
#[derive(Debug, Clone, Serialize)]
pub struct MovieWithGenres {
    #[serde(flatten)]
    pub movie: Movie,
    pub genre_list: Vec<Genre>,
    pub genre_names: Vec<String>,
}

impl MovieWithGenres {
    pub fn new(movie: Movie, genres: Vec<Genre>) -> Self {
        let genre_names = genres.iter().map(|g| g.name.clone()).collect();
        Self {
            movie,
            genre_list: genres,
            genre_names,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
    pub items_per_page: i64,
}

#[derive(Debug, Serialize)]
pub struct MoviePage {
    pub movies: Vec<MovieWithGenres>,
    pub pagination: Pagination,
}
