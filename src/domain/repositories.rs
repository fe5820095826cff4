//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;
use serde::Serialize;

use super::DomainError;
use crate::models::book::{self, NewBook};

pub const DEFAULT_PAGE_SIZE: u64 = 12;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Filter criteria for catalog queries
#[derive(Debug, Default, Clone)]
pub struct BookFilter {
    /// Matches title, author or ISBN
    pub search: Option<String>,
    pub genre: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub in_stock: bool,
    /// `price_asc`, `price_desc`, `title_asc`, `title_desc`, `rating`, `newest` (default)
    pub sort: Option<String>,
    /// 1-based page number
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl BookFilter {
    /// Page and page size after defaults and clamping. The page is 1-based.
    pub fn page_window(&self) -> (u64, u64) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        (page, limit)
    }
}

/// Paginated result with total count
#[derive(Debug, Serialize)]
pub struct PaginatedBooks {
    pub books: Vec<book::Model>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

/// Repository trait for Book entity
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Find all books matching the filter criteria with pagination
    async fn find_all(&self, filter: BookFilter) -> Result<PaginatedBooks, DomainError>;

    /// Find a single book by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<book::Model>, DomainError>;

    /// Distinct, sorted genre names
    async fn genres(&self) -> Result<Vec<String>, DomainError>;

    /// Distinct, sorted category names
    async fn categories(&self) -> Result<Vec<String>, DomainError>;

    /// Create a new book
    async fn create(&self, book: NewBook) -> Result<book::Model, DomainError>;

    /// Apply an already-merged model as an update
    async fn update(&self, book: book::Model) -> Result<book::Model, DomainError>;

    /// Delete a book and detach it from carts and favorites
    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_window_defaults_and_clamps() {
        assert_eq!(BookFilter::default().page_window(), (1, DEFAULT_PAGE_SIZE));

        let filter = BookFilter {
            page: Some(0),
            limit: Some(10_000),
            ..Default::default()
        };
        assert_eq!(filter.page_window(), (1, MAX_PAGE_SIZE));
    }
}
