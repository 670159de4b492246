use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{Film, FriendshipEntry, Genre, MpaRating, User};

pub mod memory;
pub mod postgres;

pub use memory::{MemoryFilmStore, MemoryUserStore};
pub use postgres::{PgFilmStore, PgUserStore};

/// Store contract for users and the friendship graph.
///
/// Implementations only manage records; referential existence checks are the
/// calling service's responsibility and always precede graph mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Every user, ordered by ascending identifier.
    async fn get_all(&self) -> AppResult<Vec<User>>;

    /// Stores a new user, assigning the next identifier.
    /// Rejects a value-equal duplicate of an already stored record.
    async fn add(&self, user: User) -> AppResult<User>;

    /// Rewrites the mutable fields of an existing user record.
    async fn update(&self, user: User) -> AppResult<User>;

    async fn get_by_id(&self, id: i64) -> AppResult<User>;

    /// Succeeds iff the id resolves; `NotFound` otherwise.
    async fn ensure_exists(&self, id: i64) -> AppResult<()>;

    /// Records a directed friendship edge owner → target.
    ///
    /// A fresh edge starts `PENDING`; when the reverse edge already exists,
    /// both directions become `CONFIRMED`. Re-adding an existing edge is a
    /// no-op, never a downgrade.
    async fn add_friend(&self, owner_id: i64, target_id: i64) -> AppResult<()>;

    /// Deletes the edge owner → target and its reverse, regardless of status.
    async fn remove_friend(&self, owner_id: i64, target_id: i64) -> AppResult<()>;

    /// Users reachable via any outgoing edge, ordered by ascending id.
    async fn friends_of(&self, user_id: i64) -> AppResult<Vec<User>>;

    /// Raw outgoing edges of a user, ordered by ascending target id.
    async fn friendship_entries(&self, user_id: i64) -> AppResult<Vec<FriendshipEntry>>;
}

/// Store contract for films, the genre/MPA catalogues, and the like index.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FilmStore: Send + Sync {
    /// Every film, ordered by ascending identifier (re-established per read).
    async fn get_all(&self) -> AppResult<Vec<Film>>;

    /// Stores a new film, assigning the next identifier.
    /// Rejects a value-equal duplicate of an already stored record.
    async fn add(&self, film: Film) -> AppResult<Film>;

    /// Rewrites the mutable fields of an existing film record.
    async fn update(&self, film: Film) -> AppResult<Film>;

    async fn get_by_id(&self, id: i64) -> AppResult<Film>;

    async fn all_genres(&self) -> AppResult<Vec<Genre>>;

    async fn genre_by_id(&self, id: i64) -> AppResult<Genre>;

    async fn all_mpa(&self) -> AppResult<Vec<MpaRating>>;

    async fn mpa_by_id(&self, id: i64) -> AppResult<MpaRating>;

    /// Records a like; at most one per (film, user) pair, re-liking is a no-op.
    async fn add_like(&self, film_id: i64, user_id: i64) -> AppResult<()>;

    /// Removes a like if present; a no-op when absent.
    async fn remove_like(&self, film_id: i64, user_id: i64) -> AppResult<()>;

    /// Number of distinct users who liked the film; 0 when none.
    async fn like_count(&self, film_id: i64) -> AppResult<usize>;

    /// The set of liker ids for a film.
    async fn likers(&self, film_id: i64) -> AppResult<BTreeSet<i64>>;
}
