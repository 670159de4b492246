use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::error::AppResult;
use crate::models::{Film, Genre, MpaRating};
use crate::services::ranking;
use crate::storage::{FilmStore, UserStore};
use crate::validation;

/// Catalogue service: film records, genre/MPA lookups, the like index, and
/// the popularity ranking.
///
/// Existence checks always run before a mutation is attempted; the stores
/// themselves only manage records.
#[derive(Clone)]
pub struct FilmService {
    films: Arc<dyn FilmStore>,
    users: Arc<dyn UserStore>,
}

impl FilmService {
    pub fn new(films: Arc<dyn FilmStore>, users: Arc<dyn UserStore>) -> Self {
        Self { films, users }
    }

    pub async fn get_all(&self) -> AppResult<Vec<Film>> {
        self.films.get_all().await
    }

    pub async fn add(&self, mut film: Film) -> AppResult<Film> {
        validation::film(&film)?;
        self.resolve_references(&mut film).await?;
        self.films.add(film).await
    }

    pub async fn update(&self, mut film: Film) -> AppResult<Film> {
        validation::film(&film)?;
        self.resolve_references(&mut film).await?;
        self.films.update(film).await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Film> {
        self.films.get_by_id(id).await
    }

    pub async fn all_genres(&self) -> AppResult<Vec<Genre>> {
        self.films.all_genres().await
    }

    pub async fn genre_by_id(&self, id: i64) -> AppResult<Genre> {
        self.films.genre_by_id(id).await
    }

    pub async fn all_mpa(&self) -> AppResult<Vec<MpaRating>> {
        self.films.all_mpa().await
    }

    pub async fn mpa_by_id(&self, id: i64) -> AppResult<MpaRating> {
        self.films.mpa_by_id(id).await
    }

    pub async fn like(&self, film_id: i64, user_id: i64) -> AppResult<()> {
        self.users.ensure_exists(user_id).await?;
        self.films.get_by_id(film_id).await?;
        self.films.add_like(film_id, user_id).await
    }

    pub async fn unlike(&self, film_id: i64, user_id: i64) -> AppResult<()> {
        self.users.ensure_exists(user_id).await?;
        self.films.get_by_id(film_id).await?;
        self.films.remove_like(film_id, user_id).await
    }

    pub async fn like_count(&self, film_id: i64) -> AppResult<usize> {
        self.films.get_by_id(film_id).await?;
        self.films.like_count(film_id).await
    }

    pub async fn likers(&self, film_id: i64) -> AppResult<BTreeSet<i64>> {
        self.films.get_by_id(film_id).await?;
        self.films.likers(film_id).await
    }

    /// The `count` most-liked films. Like counts are gathered from the store
    /// at call time and handed to the pure ranking function.
    pub async fn top_liked(&self, count: Option<i64>) -> AppResult<Vec<Film>> {
        let films = self.films.get_all().await?;

        let mut counts = HashMap::with_capacity(films.len());
        for film in &films {
            if let Some(id) = film.id {
                counts.insert(id, self.films.like_count(id).await?);
            }
        }

        ranking::top_liked(films, |id| counts.get(&id).copied().unwrap_or(0), count)
    }

    /// Canonicalizes the film's MPA and genre references against the
    /// catalogues: unknown ids fail before any write, known ids get their
    /// names filled in, and the genre list is deduplicated and ordered.
    async fn resolve_references(&self, film: &mut Film) -> AppResult<()> {
        film.mpa = self.films.mpa_by_id(film.mpa.id).await?;

        let mut resolved = Vec::with_capacity(film.genres.len());
        for genre in &film.genres {
            resolved.push(self.films.genre_by_id(genre.id).await?);
        }
        film.set_genres(resolved);

        Ok(())
    }
}
