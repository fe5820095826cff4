//! Admin-only routes. Every handler takes `AdminUser`, which rejects
//! non-admins with 403 before the body is read.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::infrastructure::auth::AdminUser;
use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::models::book::{BookPatch, NewBook};
use crate::models::{OrderStatus, Role};
use crate::services::order_service::{self, OrderFilter};
use crate::services::user_service::{self, UserFilter};
use crate::services::analytics_service;

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub search: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct RoleUpdate {
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

#[utoipa::path(
    get,
    path = "/api/admin/analytics",
    responses(
        (status = 200, description = "Dashboard aggregates"),
        (status = 403, description = "Admins only")
    )
)]
pub async fn analytics(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, DomainError> {
    let stats = analytics_service::dashboard(state.db(), state.config.low_stock_threshold).await?;
    Ok(Json(stats))
}

// --- Users ---

#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "Page of users"),
        (status = 403, description = "Admins only")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(params): Query<UserListQuery>,
) -> Result<impl IntoResponse, DomainError> {
    let filter = UserFilter {
        search: params.search,
        page: params.page,
        limit: params.limit,
    };
    Ok(Json(user_service::list_users(state.db(), filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/users/{id}",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "User found"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    Ok(Json(user_service::get_user(state.db(), id).await?))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "Role updated"),
        (status = 400, description = "Cannot change own role"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user_role(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i32>,
    Json(payload): Json<RoleUpdate>,
) -> Result<impl IntoResponse, DomainError> {
    let user = user_service::update_role(state.db(), admin.id, id, payload.role).await?;
    Ok(Json(json!({
        "message": "User role updated successfully",
        "user": user
    })))
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted; orders are kept"),
        (status = 403, description = "Target is an admin"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    user_service::delete_user(state.db(), id).await?;
    tracing::info!("Admin {} deleted user {}", admin.id, id);
    Ok(Json(json!({ "message": "User deleted successfully" })))
}

// --- Books ---

#[utoipa::path(
    post,
    path = "/api/admin/books",
    responses(
        (status = 201, description = "Book created"),
        (status = 400, description = "Invalid book")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<NewBook>,
) -> Result<impl IntoResponse, DomainError> {
    let book = state.book_repo.create(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Book created successfully",
            "book": book
        })),
    ))
}

#[utoipa::path(
    put,
    path = "/api/admin/books/{id}",
    params(("id" = i32, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book updated"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
    Json(patch): Json<BookPatch>,
) -> Result<impl IntoResponse, DomainError> {
    let existing = state
        .book_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Book"))?;

    let book = state.book_repo.update(patch.apply(existing)?).await?;
    Ok(Json(json!({
        "message": "Book updated successfully",
        "book": book
    })))
}

#[utoipa::path(
    delete,
    path = "/api/admin/books/{id}",
    params(("id" = i32, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book deleted"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    state.book_repo.delete(id).await?;
    Ok(Json(json!({ "message": "Book deleted successfully" })))
}

// --- Orders ---

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    responses(
        (status = 200, description = "Page of orders"),
        (status = 403, description = "Admins only")
    )
)]
pub async fn list_orders(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(params): Query<OrderListQuery>,
) -> Result<impl IntoResponse, DomainError> {
    let filter = OrderFilter {
        status: params.status,
        page: params.page,
        limit: params.limit,
    };
    Ok(Json(order_service::list_all_orders(state.db(), filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders/{id}",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order with its items"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn get_order(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    Ok(Json(order_service::get_order(state.db(), id).await?))
}

#[utoipa::path(
    put,
    path = "/api/admin/orders/{id}/status",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Status changed"),
        (status = 400, description = "Transition not allowed"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
    Json(payload): Json<StatusUpdate>,
) -> Result<impl IntoResponse, DomainError> {
    let order = order_service::update_order_status(state.db(), id, payload.status).await?;
    Ok(Json(json!({
        "message": "Order status updated successfully",
        "order": order
    })))
}
