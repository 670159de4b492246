use axum::{
    routing::{get, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Films
        .route(
            "/films",
            get(handlers::get_films)
                .post(handlers::create_film)
                .put(handlers::update_film),
        )
        .route("/films/popular", get(handlers::popular_films))
        .route("/films/:id", get(handlers::get_film))
        .route(
            "/films/:id/like/:user_id",
            put(handlers::like_film).delete(handlers::unlike_film),
        )
        // Users and friendships
        .route(
            "/users",
            get(handlers::get_users)
                .post(handlers::create_user)
                .put(handlers::update_user),
        )
        .route("/users/:id", get(handlers::get_user))
        .route("/users/:id/friends", get(handlers::get_friends))
        .route(
            "/users/:id/friends/common/:other_id",
            get(handlers::get_common_friends),
        )
        .route(
            "/users/:id/friends/:friend_id",
            put(handlers::add_friend).delete(handlers::remove_friend),
        )
        // Reference catalogues
        .route("/genres", get(handlers::get_genres))
        .route("/genres/:id", get(handlers::get_genre))
        .route("/mpa", get(handlers::get_mpa_ratings))
        .route("/mpa/:id", get(handlers::get_mpa_rating))
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
