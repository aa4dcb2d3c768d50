use sqlx::SqlitePool;
use tracing::info;

/// Fixed genre vocabulary (TMDB ids). Genres are reference data: seeded at
/// migration time and never created through the API.
pub const GENRES: &[(i64, &str)] = &[
    (28, "Action"),
    (12, "Adventure"),
    (16, "Animation"),
    (35, "Comedy"),
    (80, "Crime"),
    (99, "Documentary"),
    (18, "Drama"),
    (10751, "Family"),
    (14, "Fantasy"),
    (36, "History"),
    (27, "Horror"),
    (10402, "Music"),
    (9648, "Mystery"),
    (10749, "Romance"),
    (878, "Science Fiction"),
    (10770, "TV Movie"),
    (53, "Thriller"),
    (10752, "War"),
    (37, "Western"),
];

/// Idempotent schema creation plus genre seeding. Runs on every startup.
pub async fn run(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT UNIQUE NOT NULL,
            password_hash TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS movies (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            overview TEXT,
            poster_path TEXT,
            backdrop_path TEXT,
            release_date DATE,
            vote_average REAL DEFAULT 0,
            popularity REAL DEFAULT 0,
            user_id INTEGER NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS genres (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS movie_genres (
            movie_id INTEGER,
            genre_id INTEGER,
            PRIMARY KEY (movie_id, genre_id),
            FOREIGN KEY (movie_id) REFERENCES movies (id) ON DELETE CASCADE,
            FOREIGN KEY (genre_id) REFERENCES genres (id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    for (id, name) in GENRES {
        sqlx::query("INSERT OR IGNORE INTO genres (id, name) VALUES (?1, ?2)")
            .bind(id)
            .bind(name)
            .execute(pool)
            .await?;
    }

    info!("Database migration complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::manager;

    #[tokio::test]
    async fn migration_is_idempotent() {
        let pool = manager::connect("sqlite::memory:", 1).await.unwrap();
        run(&pool).await.unwrap();
        run(&pool).await.unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM genres")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, GENRES.len() as i64);
    }

    #[tokio::test]
    async fn seeds_full_genre_vocabulary() {
        let pool = manager::connect("sqlite::memory:", 1).await.unwrap();
        run(&pool).await.unwrap();

        let (name,): (String,) = sqlx::query_as("SELECT name FROM genres WHERE id = 878")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(name, "Science Fiction");
    }
}
