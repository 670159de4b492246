use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};
use crate::models::{Film, FriendshipEntry, FriendshipStatus, Genre, MpaRating, User};
use crate::storage::{FilmStore, UserStore};

/// In-memory user store: records and the friendship graph behind one lock.
pub struct MemoryUserStore {
    inner: Arc<RwLock<UserState>>,
}

struct UserState {
    users: BTreeMap<i64, User>,
    /// owner id → (target id → edge status); BTreeMap keeps targets ordered
    friendships: HashMap<i64, BTreeMap<i64, FriendshipStatus>>,
    next_id: i64,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(UserState {
                users: BTreeMap::new(),
                friendships: HashMap::new(),
                next_id: 1,
            })),
        }
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get_all(&self) -> AppResult<Vec<User>> {
        let state = self.inner.read().await;
        Ok(state.users.values().cloned().collect())
    }

    async fn add(&self, mut user: User) -> AppResult<User> {
        let mut state = self.inner.write().await;

        if state.users.values().any(|stored| stored.same_record(&user)) {
            return Err(AppError::Duplicate(
                "such a user is already added".to_string(),
            ));
        }

        let id = state.next_id;
        state.next_id += 1;
        user.id = Some(id);
        state.users.insert(id, user.clone());
        tracing::info!(user_id = id, "user added");

        Ok(user)
    }

    async fn update(&self, user: User) -> AppResult<User> {
        let id = user.id.ok_or_else(|| {
            AppError::InvalidArgument("user id is required for update".to_string())
        })?;

        let mut state = self.inner.write().await;
        let stored = state
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::user_not_found(id))?;

        stored.email = user.email;
        stored.login = user.login;
        stored.name = user.name;
        stored.birthday = user.birthday;
        tracing::info!(user_id = id, "user record changed");

        Ok(stored.clone())
    }

    async fn get_by_id(&self, id: i64) -> AppResult<User> {
        let state = self.inner.read().await;
        state
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::user_not_found(id))
    }

    async fn ensure_exists(&self, id: i64) -> AppResult<()> {
        let state = self.inner.read().await;
        if state.users.contains_key(&id) {
            Ok(())
        } else {
            Err(AppError::user_not_found(id))
        }
    }

    async fn add_friend(&self, owner_id: i64, target_id: i64) -> AppResult<()> {
        let mut state = self.inner.write().await;

        let already_present = state
            .friendships
            .get(&owner_id)
            .is_some_and(|edges| edges.contains_key(&target_id));
        if already_present {
            return Ok(());
        }

        let reciprocal = state
            .friendships
            .get(&target_id)
            .is_some_and(|edges| edges.contains_key(&owner_id));
        let status = if reciprocal {
            FriendshipStatus::Confirmed
        } else {
            FriendshipStatus::Pending
        };

        state
            .friendships
            .entry(owner_id)
            .or_default()
            .insert(target_id, status);

        if reciprocal {
            if let Some(edges) = state.friendships.get_mut(&target_id) {
                edges.insert(owner_id, FriendshipStatus::Confirmed);
            }
        }

        tracing::info!(
            owner_id,
            target_id,
            status = status.as_str(),
            "friendship edge recorded"
        );

        Ok(())
    }

    async fn remove_friend(&self, owner_id: i64, target_id: i64) -> AppResult<()> {
        let mut state = self.inner.write().await;

        if let Some(edges) = state.friendships.get_mut(&owner_id) {
            edges.remove(&target_id);
        }
        if let Some(edges) = state.friendships.get_mut(&target_id) {
            edges.remove(&owner_id);
        }
        tracing::info!(owner_id, target_id, "friendship torn down");

        Ok(())
    }

    async fn friends_of(&self, user_id: i64) -> AppResult<Vec<User>> {
        let state = self.inner.read().await;
        let Some(edges) = state.friendships.get(&user_id) else {
            return Ok(Vec::new());
        };

        Ok(edges
            .keys()
            .filter_map(|target| state.users.get(target).cloned())
            .collect())
    }

    async fn friendship_entries(&self, user_id: i64) -> AppResult<Vec<FriendshipEntry>> {
        let state = self.inner.read().await;
        let Some(edges) = state.friendships.get(&user_id) else {
            return Ok(Vec::new());
        };

        Ok(edges
            .iter()
            .map(|(target, status)| FriendshipEntry {
                user_id: *target,
                status: *status,
            })
            .collect())
    }
}

/// In-memory film store: the catalogue, genre/MPA reference data, and the
/// like index behind one lock.
pub struct MemoryFilmStore {
    inner: Arc<RwLock<FilmState>>,
}

struct FilmState {
    films: BTreeMap<i64, Film>,
    genres: BTreeMap<i64, Genre>,
    mpa_ratings: BTreeMap<i64, MpaRating>,
    /// film id → distinct liker ids
    likes: HashMap<i64, HashSet<i64>>,
    next_id: i64,
}

impl MemoryFilmStore {
    pub fn new() -> Self {
        let genres = [
            "Comedy",
            "Drama",
            "Cartoon",
            "Thriller",
            "Documentary",
            "Action",
        ]
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let id = index as i64 + 1;
            (
                id,
                Genre {
                    id,
                    name: name.to_string(),
                },
            )
        })
        .collect();

        let mpa_ratings = ["G", "PG", "PG-13", "R", "NC-17"]
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let id = index as i64 + 1;
                (
                    id,
                    MpaRating {
                        id,
                        name: name.to_string(),
                    },
                )
            })
            .collect();

        Self {
            inner: Arc::new(RwLock::new(FilmState {
                films: BTreeMap::new(),
                genres,
                mpa_ratings,
                likes: HashMap::new(),
                next_id: 1,
            })),
        }
    }
}

impl Default for MemoryFilmStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FilmStore for MemoryFilmStore {
    async fn get_all(&self) -> AppResult<Vec<Film>> {
        let state = self.inner.read().await;
        Ok(state.films.values().cloned().collect())
    }

    async fn add(&self, mut film: Film) -> AppResult<Film> {
        let mut state = self.inner.write().await;

        if state.films.values().any(|stored| stored.same_record(&film)) {
            return Err(AppError::Duplicate(
                "such a film is already added".to_string(),
            ));
        }

        let id = state.next_id;
        state.next_id += 1;
        film.id = Some(id);
        state.films.insert(id, film.clone());
        tracing::info!(film_id = id, "film added");

        Ok(film)
    }

    async fn update(&self, film: Film) -> AppResult<Film> {
        let id = film.id.ok_or_else(|| {
            AppError::InvalidArgument("film id is required for update".to_string())
        })?;

        let mut state = self.inner.write().await;
        let stored = state
            .films
            .get_mut(&id)
            .ok_or_else(|| AppError::film_not_found(id))?;

        stored.name = film.name;
        stored.description = film.description;
        stored.release_date = film.release_date;
        stored.duration = film.duration;
        stored.mpa = film.mpa;
        stored.genres = film.genres;
        tracing::info!(film_id = id, "film record changed");

        Ok(stored.clone())
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Film> {
        let state = self.inner.read().await;
        state
            .films
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::film_not_found(id))
    }

    async fn all_genres(&self) -> AppResult<Vec<Genre>> {
        let state = self.inner.read().await;
        Ok(state.genres.values().cloned().collect())
    }

    async fn genre_by_id(&self, id: i64) -> AppResult<Genre> {
        let state = self.inner.read().await;
        state
            .genres
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::genre_not_found(id))
    }

    async fn all_mpa(&self) -> AppResult<Vec<MpaRating>> {
        let state = self.inner.read().await;
        Ok(state.mpa_ratings.values().cloned().collect())
    }

    async fn mpa_by_id(&self, id: i64) -> AppResult<MpaRating> {
        let state = self.inner.read().await;
        state
            .mpa_ratings
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::mpa_not_found(id))
    }

    async fn add_like(&self, film_id: i64, user_id: i64) -> AppResult<()> {
        let mut state = self.inner.write().await;
        if state.likes.entry(film_id).or_default().insert(user_id) {
            tracing::info!(film_id, user_id, "like recorded");
        }
        Ok(())
    }

    async fn remove_like(&self, film_id: i64, user_id: i64) -> AppResult<()> {
        let mut state = self.inner.write().await;
        if let Some(likers) = state.likes.get_mut(&film_id) {
            if likers.remove(&user_id) {
                tracing::info!(film_id, user_id, "like removed");
            }
        }
        Ok(())
    }

    async fn like_count(&self, film_id: i64) -> AppResult<usize> {
        let state = self.inner.read().await;
        Ok(state.likes.get(&film_id).map_or(0, HashSet::len))
    }

    async fn likers(&self, film_id: i64) -> AppResult<BTreeSet<i64>> {
        let state = self.inner.read().await;
        Ok(state
            .likes
            .get(&film_id)
            .map(|likers| likers.iter().copied().collect())
            .unwrap_or_default())
    }
}
