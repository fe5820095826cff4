use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::infrastructure::auth::AuthUser;
use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::services::order_service::{self, CreateOrderInput};

#[utoipa::path(
    post,
    path = "/api/order/create",
    responses(
        (status = 201, description = "Order placed, cart emptied"),
        (status = 400, description = "Empty cart, invalid address or insufficient stock")
    )
)]
pub async fn create_order(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(payload): Json<CreateOrderInput>,
) -> Result<impl IntoResponse, DomainError> {
    let order =
        order_service::create_order(state.db(), &state.config.pricing, caller.id, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Order placed successfully",
            "order": order
        })),
    ))
}

#[utoipa::path(
    get,
    path = "/api/order",
    responses((status = 200, description = "Caller's orders, newest first"))
)]
pub async fn list_orders(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<impl IntoResponse, DomainError> {
    Ok(Json(
        order_service::list_user_orders(state.db(), caller.id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/order/{id}",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order with its items"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn get_order(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    Ok(Json(
        order_service::get_user_order(state.db(), caller.id, id).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/api/order/cancel/{id}",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order cancelled, stock restored"),
        (status = 400, description = "Order already shipped, delivered or cancelled"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    let order = order_service::cancel_order(state.db(), caller.id, id).await?;
    Ok(Json(json!({
        "message": "Order cancelled successfully",
        "order": order
    })))
}
