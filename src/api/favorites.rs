use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;

use crate::infrastructure::auth::AuthUser;
use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::services::favorite_service;

#[utoipa::path(
    get,
    path = "/api/favorite",
    responses((status = 200, description = "Favorite books, most recent first"))
)]
pub async fn list_favorites(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<impl IntoResponse, DomainError> {
    Ok(Json(
        favorite_service::list_favorites(state.db(), caller.id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/favorite/toggle/{id}",
    params(("id" = i32, Path, description = "Book id")),
    responses(
        (status = 200, description = "New membership state"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn toggle_favorite(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(book_id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    let is_favorite = favorite_service::toggle_favorite(state.db(), caller.id, book_id).await?;
    Ok(Json(json!({
        "book_id": book_id,
        "is_favorite": is_favorite
    })))
}

#[utoipa::path(
    post,
    path = "/api/favorite/add/{id}",
    params(("id" = i32, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book is a favorite"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn add_favorite(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(book_id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    favorite_service::add_favorite(state.db(), caller.id, book_id).await?;
    Ok(Json(json!({
        "book_id": book_id,
        "is_favorite": true
    })))
}

#[utoipa::path(
    delete,
    path = "/api/favorite/remove/{id}",
    params(("id" = i32, Path, description = "Book id")),
    responses((status = 200, description = "Book is not a favorite"))
)]
pub async fn remove_favorite(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(book_id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    favorite_service::remove_favorite(state.db(), caller.id, book_id).await?;
    Ok(Json(json!({
        "book_id": book_id,
        "is_favorite": false
    })))
}

#[utoipa::path(
    get,
    path = "/api/favorite/check/{id}",
    params(("id" = i32, Path, description = "Book id")),
    responses((status = 200, description = "Favorite flag for the book"))
)]
pub async fn check_favorite(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(book_id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    let is_favorite = favorite_service::is_favorite(state.db(), caller.id, book_id).await?;
    Ok(Json(json!({
        "book_id": book_id,
        "is_favorite": is_favorite
    })))
}
