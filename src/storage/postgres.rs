use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::models::{Film, FriendshipEntry, FriendshipStatus, Genre, MpaRating, User};
use crate::storage::{FilmStore, UserStore};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    login: String,
    name: String,
    birthday: NaiveDate,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: Some(row.id),
            email: row.email,
            login: row.login,
            name: row.name,
            birthday: row.birthday,
        }
    }
}

/// Durable user store over PostgreSQL.
///
/// Single-statement operations rely on per-statement atomicity; the
/// friendship reconciliation runs in a transaction so a concurrent remove
/// and request on the same pair cannot strand a one-sided confirmed edge.
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn get_all(&self) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, login, name, birthday FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn add(&self, user: User) -> AppResult<User> {
        let (duplicate,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM users \
             WHERE email = $1 AND login = $2 AND name = $3 AND birthday = $4)",
        )
        .bind(&user.email)
        .bind(&user.login)
        .bind(&user.name)
        .bind(user.birthday)
        .fetch_one(&self.pool)
        .await?;

        if duplicate {
            return Err(AppError::Duplicate(
                "such a user is already added".to_string(),
            ));
        }

        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (email, login, name, birthday) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, email, login, name, birthday",
        )
        .bind(&user.email)
        .bind(&user.login)
        .bind(&user.name)
        .bind(user.birthday)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(user_id = row.id, "user added");

        Ok(row.into())
    }

    async fn update(&self, user: User) -> AppResult<User> {
        let id = user.id.ok_or_else(|| {
            AppError::InvalidArgument("user id is required for update".to_string())
        })?;

        let row = sqlx::query_as::<_, UserRow>(
            "UPDATE users SET email = $2, login = $3, name = $4, birthday = $5 \
             WHERE id = $1 \
             RETURNING id, email, login, name, birthday",
        )
        .bind(id)
        .bind(&user.email)
        .bind(&user.login)
        .bind(&user.name)
        .bind(user.birthday)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::user_not_found(id))?;

        tracing::info!(user_id = id, "user record changed");

        Ok(row.into())
    }

    async fn get_by_id(&self, id: i64) -> AppResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, login, name, birthday FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::user_not_found(id))?;

        Ok(row.into())
    }

    async fn ensure_exists(&self, id: i64) -> AppResult<()> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        if exists {
            Ok(())
        } else {
            Err(AppError::user_not_found(id))
        }
    }

    async fn add_friend(&self, owner_id: i64, target_id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<(String,)> = sqlx::query_as(
            "SELECT status FROM friendships WHERE user_id = $1 AND friend_id = $2",
        )
        .bind(owner_id)
        .bind(target_id)
        .fetch_optional(&mut *tx)
        .await?;

        if existing.is_some() {
            tx.commit().await?;
            return Ok(());
        }

        let reciprocal: Option<(String,)> = sqlx::query_as(
            "SELECT status FROM friendships WHERE user_id = $1 AND friend_id = $2",
        )
        .bind(target_id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await?;

        let status = if reciprocal.is_some() {
            FriendshipStatus::Confirmed
        } else {
            FriendshipStatus::Pending
        };

        sqlx::query(
            "INSERT INTO friendships (user_id, friend_id, status) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, friend_id) DO NOTHING",
        )
        .bind(owner_id)
        .bind(target_id)
        .bind(status.as_str())
        .execute(&mut *tx)
        .await?;

        if reciprocal.is_some() {
            sqlx::query("UPDATE friendships SET status = $3 WHERE user_id = $1 AND friend_id = $2")
                .bind(target_id)
                .bind(owner_id)
                .bind(FriendshipStatus::Confirmed.as_str())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(
            owner_id,
            target_id,
            status = status.as_str(),
            "friendship edge recorded"
        );

        Ok(())
    }

    async fn remove_friend(&self, owner_id: i64, target_id: i64) -> AppResult<()> {
        sqlx::query(
            "DELETE FROM friendships \
             WHERE (user_id = $1 AND friend_id = $2) OR (user_id = $2 AND friend_id = $1)",
        )
        .bind(owner_id)
        .bind(target_id)
        .execute(&self.pool)
        .await?;

        tracing::info!(owner_id, target_id, "friendship torn down");

        Ok(())
    }

    async fn friends_of(&self, user_id: i64) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT u.id, u.email, u.login, u.name, u.birthday \
             FROM users u \
             INNER JOIN friendships f ON f.friend_id = u.id \
             WHERE f.user_id = $1 \
             ORDER BY u.id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn friendship_entries(&self, user_id: i64) -> AppResult<Vec<FriendshipEntry>> {
        let rows: Vec<(i64, String)> = sqlx::query_as(
            "SELECT friend_id, status FROM friendships WHERE user_id = $1 ORDER BY friend_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(friend_id, status)| {
                let status = FriendshipStatus::from_str(&status).ok_or_else(|| {
                    AppError::Internal(format!("unknown friendship status {status}"))
                })?;
                Ok(FriendshipEntry {
                    user_id: friend_id,
                    status,
                })
            })
            .collect()
    }
}

#[derive(sqlx::FromRow)]
struct FilmRow {
    id: i64,
    name: String,
    description: String,
    release_date: NaiveDate,
    duration: i32,
    mpa_id: i64,
    mpa_name: String,
}

impl FilmRow {
    fn into_film(self, genres: Vec<Genre>) -> Film {
        Film {
            id: Some(self.id),
            name: self.name,
            description: self.description,
            release_date: self.release_date,
            duration: self.duration,
            mpa: MpaRating {
                id: self.mpa_id,
                name: self.mpa_name,
            },
            genres,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CatalogueRow {
    id: i64,
    name: String,
}

const FILM_SELECT: &str = "SELECT f.id, f.name, f.description, f.release_date, f.duration, \
     m.id AS mpa_id, m.name AS mpa_name \
     FROM films f \
     INNER JOIN mpa_ratings m ON m.id = f.mpa_id";

/// Durable film store over PostgreSQL. Likes live in a composite-key table,
/// so a duplicate like is swallowed by `ON CONFLICT DO NOTHING` and counting
/// distinct likers cannot overcount.
pub struct PgFilmStore {
    pool: PgPool,
}

impl PgFilmStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn genres_for_film(&self, film_id: i64) -> AppResult<Vec<Genre>> {
        let rows = sqlx::query_as::<_, CatalogueRow>(
            "SELECT g.id, g.name FROM genres g \
             INNER JOIN film_genres fg ON fg.genre_id = g.id \
             WHERE fg.film_id = $1 \
             ORDER BY g.id",
        )
        .bind(film_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Genre {
                id: row.id,
                name: row.name,
            })
            .collect())
    }

    /// Finds a stored film equal to the candidate on every field (genres
    /// included), ignoring identifiers.
    async fn find_duplicate(&self, film: &Film) -> AppResult<bool> {
        let candidate_ids: Vec<(i64,)> = sqlx::query_as(
            "SELECT id FROM films \
             WHERE name = $1 AND description = $2 AND release_date = $3 \
             AND duration = $4 AND mpa_id = $5",
        )
        .bind(&film.name)
        .bind(&film.description)
        .bind(film.release_date)
        .bind(film.duration)
        .bind(film.mpa.id)
        .fetch_all(&self.pool)
        .await?;

        let genre_ids: Vec<i64> = film.genres.iter().map(|g| g.id).collect();

        for (id,) in candidate_ids {
            let stored: Vec<i64> = self
                .genres_for_film(id)
                .await?
                .iter()
                .map(|g| g.id)
                .collect();
            if stored == genre_ids {
                return Ok(true);
            }
        }

        Ok(false)
    }
}

#[async_trait]
impl FilmStore for PgFilmStore {
    async fn get_all(&self) -> AppResult<Vec<Film>> {
        let rows =
            sqlx::query_as::<_, FilmRow>(&format!("{FILM_SELECT} ORDER BY f.id"))
                .fetch_all(&self.pool)
                .await?;

        let assignments: Vec<(i64, i64, String)> = sqlx::query_as(
            "SELECT fg.film_id, g.id, g.name FROM film_genres fg \
             INNER JOIN genres g ON g.id = fg.genre_id \
             ORDER BY fg.film_id, g.id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut genres_by_film: HashMap<i64, Vec<Genre>> = HashMap::new();
        for (film_id, id, name) in assignments {
            genres_by_film
                .entry(film_id)
                .or_default()
                .push(Genre { id, name });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let genres = genres_by_film.remove(&row.id).unwrap_or_default();
                row.into_film(genres)
            })
            .collect())
    }

    async fn add(&self, mut film: Film) -> AppResult<Film> {
        if self.find_duplicate(&film).await? {
            return Err(AppError::Duplicate(
                "such a film is already added".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO films (name, description, release_date, duration, mpa_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id",
        )
        .bind(&film.name)
        .bind(&film.description)
        .bind(film.release_date)
        .bind(film.duration)
        .bind(film.mpa.id)
        .fetch_one(&mut *tx)
        .await?;

        for genre in &film.genres {
            sqlx::query("INSERT INTO film_genres (film_id, genre_id) VALUES ($1, $2)")
                .bind(id)
                .bind(genre.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        film.id = Some(id);
        tracing::info!(film_id = id, "film added");

        Ok(film)
    }

    async fn update(&self, film: Film) -> AppResult<Film> {
        let id = film.id.ok_or_else(|| {
            AppError::InvalidArgument("film id is required for update".to_string())
        })?;

        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE films SET name = $2, description = $3, release_date = $4, \
             duration = $5, mpa_id = $6 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&film.name)
        .bind(&film.description)
        .bind(film.release_date)
        .bind(film.duration)
        .bind(film.mpa.id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AppError::film_not_found(id));
        }

        sqlx::query("DELETE FROM film_genres WHERE film_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        for genre in &film.genres {
            sqlx::query("INSERT INTO film_genres (film_id, genre_id) VALUES ($1, $2)")
                .bind(id)
                .bind(genre.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(film_id = id, "film record changed");

        Ok(film)
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Film> {
        let row = sqlx::query_as::<_, FilmRow>(&format!("{FILM_SELECT} WHERE f.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::film_not_found(id))?;

        let genres = self.genres_for_film(id).await?;

        Ok(row.into_film(genres))
    }

    async fn all_genres(&self) -> AppResult<Vec<Genre>> {
        let rows = sqlx::query_as::<_, CatalogueRow>("SELECT id, name FROM genres ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| Genre {
                id: row.id,
                name: row.name,
            })
            .collect())
    }

    async fn genre_by_id(&self, id: i64) -> AppResult<Genre> {
        let row = sqlx::query_as::<_, CatalogueRow>("SELECT id, name FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::genre_not_found(id))?;

        Ok(Genre {
            id: row.id,
            name: row.name,
        })
    }

    async fn all_mpa(&self) -> AppResult<Vec<MpaRating>> {
        let rows =
            sqlx::query_as::<_, CatalogueRow>("SELECT id, name FROM mpa_ratings ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|row| MpaRating {
                id: row.id,
                name: row.name,
            })
            .collect())
    }

    async fn mpa_by_id(&self, id: i64) -> AppResult<MpaRating> {
        let row =
            sqlx::query_as::<_, CatalogueRow>("SELECT id, name FROM mpa_ratings WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| AppError::mpa_not_found(id))?;

        Ok(MpaRating {
            id: row.id,
            name: row.name,
        })
    }

    async fn add_like(&self, film_id: i64, user_id: i64) -> AppResult<()> {
        let inserted = sqlx::query(
            "INSERT INTO film_likes (film_id, user_id) VALUES ($1, $2) \
             ON CONFLICT (film_id, user_id) DO NOTHING",
        )
        .bind(film_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if inserted > 0 {
            tracing::info!(film_id, user_id, "like recorded");
        }

        Ok(())
    }

    async fn remove_like(&self, film_id: i64, user_id: i64) -> AppResult<()> {
        let removed = sqlx::query("DELETE FROM film_likes WHERE film_id = $1 AND user_id = $2")
            .bind(film_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if removed > 0 {
            tracing::info!(film_id, user_id, "like removed");
        }

        Ok(())
    }

    async fn like_count(&self, film_id: i64) -> AppResult<usize> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(DISTINCT user_id) FROM film_likes WHERE film_id = $1")
                .bind(film_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count as usize)
    }

    async fn likers(&self, film_id: i64) -> AppResult<BTreeSet<i64>> {
        let rows: Vec<(i64,)> =
            sqlx::query_as("SELECT user_id FROM film_likes WHERE film_id = $1")
                .bind(film_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|(user_id,)| user_id).collect())
    }
}
