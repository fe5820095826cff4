//! SeaORM implementation of BookRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Unchanged, ColumnTrait, Condition, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::domain::{BookFilter, BookRepository, DomainError, PaginatedBooks};
use crate::models::book::{self, ActiveModel, Column, DEFAULT_CATEGORY, Entity as BookEntity, NewBook};
use crate::models::{cart_item, favorite};
use crate::services::cart_service;

/// SeaORM-based implementation of BookRepository
pub struct SeaOrmBookRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn distinct_values(&self, column: Column) -> Result<Vec<String>, DomainError> {
        let values: Vec<String> = BookEntity::find()
            .select_only()
            .column(column)
            .distinct()
            .order_by_asc(column)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(values.into_iter().filter(|v| !v.is_empty()).collect())
    }
}

#[async_trait]
impl BookRepository for SeaOrmBookRepository {
    async fn find_all(&self, filter: BookFilter) -> Result<PaginatedBooks, DomainError> {
        let mut query = BookEntity::find();

        // Apply filters
        if let Some(q) = &filter.search
            && !q.trim().is_empty()
        {
            let q = q.trim();
            let cond = Condition::any()
                .add(Column::Title.contains(q))
                .add(Column::Author.contains(q))
                .add(Column::Isbn.contains(q));
            query = query.filter(cond);
        }

        if let Some(genre) = &filter.genre
            && !genre.is_empty()
        {
            query = query.filter(Column::Genre.eq(genre.as_str()));
        }

        if let Some(category) = &filter.category
            && !category.is_empty()
        {
            query = query.filter(Column::Category.eq(category.as_str()));
        }

        if let Some(min) = filter.min_price {
            query = query.filter(Column::Price.gte(min));
        }

        if let Some(max) = filter.max_price {
            query = query.filter(Column::Price.lte(max));
        }

        if filter.in_stock {
            query = query.filter(Column::Stock.gt(0));
        }

        // Apply sorting
        query = match filter.sort.as_deref() {
            Some("price_asc") => query.order_by_asc(Column::Price),
            Some("price_desc") => query.order_by_desc(Column::Price),
            Some("title_asc") => query.order_by_asc(Column::Title),
            Some("title_desc") => query.order_by_desc(Column::Title),
            Some("rating") => query.order_by_desc(Column::Rating),
            _ => query.order_by_desc(Column::CreatedAt),
        }
        .order_by_asc(Column::Id);

        let (page, limit) = filter.page_window();
        let paginator = query.paginate(&self.db, limit);
        let total = paginator.num_items().await?;
        let books = paginator.fetch_page(page - 1).await?;

        Ok(PaginatedBooks {
            books,
            total,
            page,
            limit,
            total_pages: total.div_ceil(limit),
        })
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<book::Model>, DomainError> {
        Ok(BookEntity::find_by_id(id).one(&self.db).await?)
    }

    async fn genres(&self) -> Result<Vec<String>, DomainError> {
        self.distinct_values(Column::Genre).await
    }

    async fn categories(&self) -> Result<Vec<String>, DomainError> {
        self.distinct_values(Column::Category).await
    }

    async fn create(&self, book: NewBook) -> Result<book::Model, DomainError> {
        book.validate()?;
        let now = chrono::Utc::now().to_rfc3339();

        let new_book = ActiveModel {
            title: Set(book.title.trim().to_string()),
            author: Set(book.author.trim().to_string()),
            description: Set(book.description),
            isbn: Set(book.isbn),
            genre: Set(book.genre.trim().to_string()),
            category: Set(book
                .category
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string())),
            price: Set(book.price),
            stock: Set(book.stock),
            cover_image: Set(book.cover_image),
            publisher: Set(book.publisher),
            published_year: Set(book.published_year),
            pages: Set(book.pages),
            language: Set(book.language),
            rating: Set(book.rating.unwrap_or(0.0)),
            review_count: Set(book.review_count.unwrap_or(0)),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        Ok(new_book.insert(&self.db).await?)
    }

    async fn update(&self, book: book::Model) -> Result<book::Model, DomainError> {
        let active = ActiveModel {
            id: Unchanged(book.id),
            title: Set(book.title),
            author: Set(book.author),
            description: Set(book.description),
            isbn: Set(book.isbn),
            genre: Set(book.genre),
            category: Set(book.category),
            price: Set(book.price),
            stock: Set(book.stock),
            cover_image: Set(book.cover_image),
            publisher: Set(book.publisher),
            published_year: Set(book.published_year),
            pages: Set(book.pages),
            language: Set(book.language),
            rating: Set(book.rating),
            review_count: Set(book.review_count),
            created_at: Unchanged(book.created_at),
            updated_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        Ok(active.update(&self.db).await?)
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let txn = self.db.begin().await?;

        BookEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| DomainError::not_found("Book"))?;

        let cart_ids: Vec<i32> = cart_item::Entity::find()
            .select_only()
            .column(cart_item::Column::CartId)
            .filter(cart_item::Column::BookId.eq(id))
            .into_tuple()
            .all(&txn)
            .await?;

        cart_item::Entity::delete_many()
            .filter(cart_item::Column::BookId.eq(id))
            .exec(&txn)
            .await?;

        for cart_id in cart_ids {
            cart_service::recompute_total(&txn, cart_id).await?;
        }

        favorite::Entity::delete_many()
            .filter(favorite::Column::BookId.eq(id))
            .exec(&txn)
            .await?;

        BookEntity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!("Deleted book {}", id);
        Ok(())
    }
}
