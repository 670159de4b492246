use std::sync::Arc;

use sqlx::PgPool;

use crate::services::{FilmService, UserService};
use crate::storage::{
    FilmStore, MemoryFilmStore, MemoryUserStore, PgFilmStore, PgUserStore, UserStore,
};

/// Shared application state: cloneable service handles over the composed
/// storage backend.
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub films: FilmService,
}

impl AppState {
    /// Composes the services over the in-memory backend.
    pub fn in_memory() -> Self {
        let users: Arc<dyn UserStore> = Arc::new(MemoryUserStore::new());
        let films: Arc<dyn FilmStore> = Arc::new(MemoryFilmStore::new());
        Self::from_stores(users, films)
    }

    /// Composes the services over the PostgreSQL backend.
    pub fn with_postgres(pool: PgPool) -> Self {
        let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool.clone()));
        let films: Arc<dyn FilmStore> = Arc::new(PgFilmStore::new(pool));
        Self::from_stores(users, films)
    }

    pub fn from_stores(users: Arc<dyn UserStore>, films: Arc<dyn FilmStore>) -> Self {
        Self {
            users: UserService::new(users.clone()),
            films: FilmService::new(films, users),
        }
    }
}
