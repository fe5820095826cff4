use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::infrastructure::auth::AuthUser;
use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::services::cart_service;

#[derive(Debug, Deserialize)]
pub struct CartLineRequest {
    pub book_id: i32,
    #[serde(default = "one")]
    pub quantity: i32,
}

fn one() -> i32 {
    1
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Cart lines, total and item count"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_cart(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<impl IntoResponse, DomainError> {
    Ok(Json(cart_service::get_cart(state.db(), caller.id).await?))
}

#[utoipa::path(
    post,
    path = "/api/cart/add",
    responses(
        (status = 200, description = "Updated cart"),
        (status = 400, description = "Invalid quantity or insufficient stock"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(payload): Json<CartLineRequest>,
) -> Result<impl IntoResponse, DomainError> {
    let cart =
        cart_service::add_to_cart(state.db(), caller.id, payload.book_id, payload.quantity).await?;
    Ok(Json(cart))
}

#[utoipa::path(
    put,
    path = "/api/cart/update",
    responses(
        (status = 200, description = "Updated cart"),
        (status = 400, description = "Quantity exceeds stock"),
        (status = 404, description = "Item not in cart")
    )
)]
pub async fn update_cart_item(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(payload): Json<CartLineRequest>,
) -> Result<impl IntoResponse, DomainError> {
    let cart =
        cart_service::update_cart_item(state.db(), caller.id, payload.book_id, payload.quantity)
            .await?;
    Ok(Json(cart))
}

#[utoipa::path(
    delete,
    path = "/api/cart/remove/{id}",
    params(("id" = i32, Path, description = "Book id")),
    responses(
        (status = 200, description = "Updated cart"),
        (status = 404, description = "Item not in cart")
    )
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(book_id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    Ok(Json(
        cart_service::remove_from_cart(state.db(), caller.id, book_id).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/cart/clear",
    responses(
        (status = 200, description = "Empty cart"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<impl IntoResponse, DomainError> {
    Ok(Json(cart_service::clear_cart(state.db(), caller.id).await?))
}
