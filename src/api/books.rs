use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::domain::{BookFilter, DomainError};
use crate::infrastructure::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BookFilterQuery {
    pub search: Option<String>,
    pub genre: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub in_stock: Option<bool>,
    pub sort: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl From<BookFilterQuery> for BookFilter {
    fn from(q: BookFilterQuery) -> Self {
        BookFilter {
            search: q.search,
            genre: q.genre,
            category: q.category,
            min_price: q.min_price,
            max_price: q.max_price,
            in_stock: q.in_stock.unwrap_or(false),
            sort: q.sort,
            page: q.page,
            limit: q.limit,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/book",
    responses((status = 200, description = "Paginated catalog, newest first"))
)]
pub async fn list_books(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
) -> Result<impl IntoResponse, DomainError> {
    let filter = BookFilter {
        page: params.page,
        limit: params.limit,
        ..Default::default()
    };
    Ok(Json(state.book_repo.find_all(filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/book/filter",
    responses((status = 200, description = "Filtered, sorted and paginated catalog"))
)]
pub async fn filter_books(
    State(state): State<AppState>,
    Query(params): Query<BookFilterQuery>,
) -> Result<impl IntoResponse, DomainError> {
    if let (Some(min), Some(max)) = (params.min_price, params.max_price)
        && min > max
    {
        return Err(DomainError::Validation(
            "min_price cannot exceed max_price".into(),
        ));
    }
    Ok(Json(state.book_repo.find_all(params.into()).await?))
}

#[utoipa::path(
    get,
    path = "/api/book/genres",
    responses((status = 200, description = "Distinct genres, sorted"))
)]
pub async fn list_genres(State(state): State<AppState>) -> Result<impl IntoResponse, DomainError> {
    Ok(Json(state.book_repo.genres().await?))
}

#[utoipa::path(
    get,
    path = "/api/book/categories",
    responses((status = 200, description = "Distinct categories, sorted"))
)]
pub async fn list_categories(State(state): State<AppState>) -> Result<impl IntoResponse, DomainError> {
    Ok(Json(state.book_repo.categories().await?))
}

#[utoipa::path(
    get,
    path = "/api/book/{id}",
    params(("id" = i32, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book found"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    let book = state
        .book_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Book"))?;
    Ok(Json(book))
}
