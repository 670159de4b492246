use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::models::{Film, Genre, MpaRating, User};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    pub count: Option<i64>,
}

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

// Films

pub async fn get_films(State(state): State<AppState>) -> AppResult<Json<Vec<Film>>> {
    Ok(Json(state.films.get_all().await?))
}

pub async fn create_film(
    State(state): State<AppState>,
    Json(film): Json<Film>,
) -> AppResult<(StatusCode, Json<Film>)> {
    let film = state.films.add(film).await?;
    Ok((StatusCode::CREATED, Json(film)))
}

/// Updates the film identified by the body id
pub async fn update_film(
    State(state): State<AppState>,
    Json(film): Json<Film>,
) -> AppResult<Json<Film>> {
    Ok(Json(state.films.update(film).await?))
}

pub async fn get_film(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Film>> {
    Ok(Json(state.films.get_by_id(id).await?))
}

pub async fn like_film(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    state.films.like(id, user_id).await?;
    Ok(StatusCode::OK)
}

pub async fn unlike_film(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    state.films.unlike(id, user_id).await?;
    Ok(StatusCode::OK)
}

pub async fn popular_films(
    State(state): State<AppState>,
    Query(query): Query<PopularQuery>,
) -> AppResult<Json<Vec<Film>>> {
    Ok(Json(state.films.top_liked(query.count).await?))
}

// Users and friendships

pub async fn get_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.users.get_all().await?))
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(user): Json<User>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = state.users.add(user).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Updates the user identified by the body id
pub async fn update_user(
    State(state): State<AppState>,
    Json(user): Json<User>,
) -> AppResult<Json<User>> {
    Ok(Json(state.users.update(user).await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<User>> {
    Ok(Json(state.users.get_by_id(id).await?))
}

pub async fn add_friend(
    State(state): State<AppState>,
    Path((id, friend_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    state.users.make_friends(id, friend_id).await?;
    Ok(StatusCode::OK)
}

pub async fn remove_friend(
    State(state): State<AppState>,
    Path((id, friend_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    state.users.remove_friends(id, friend_id).await?;
    Ok(StatusCode::OK)
}

pub async fn get_friends(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.users.friend_list(id).await?))
}

pub async fn get_common_friends(
    State(state): State<AppState>,
    Path((id, other_id)): Path<(i64, i64)>,
) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.users.common_friends(id, other_id).await?))
}

// Reference catalogues

pub async fn get_genres(State(state): State<AppState>) -> AppResult<Json<Vec<Genre>>> {
    Ok(Json(state.films.all_genres().await?))
}

pub async fn get_genre(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Genre>> {
    Ok(Json(state.films.genre_by_id(id).await?))
}

pub async fn get_mpa_ratings(State(state): State<AppState>) -> AppResult<Json<Vec<MpaRating>>> {
    Ok(Json(state.films.all_mpa().await?))
}

pub async fn get_mpa_rating(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MpaRating>> {
    Ok(Json(state.films.mpa_by_id(id).await?))
}
