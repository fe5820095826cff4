//! Favorite Service - per-user set of bookmarked books

use sea_orm::*;

use crate::domain::{DomainError, DomainResult};
use crate::models::{book, favorite};

/// Favorite books, most recently added first
pub async fn list_favorites(db: &DatabaseConnection, user_id: i32) -> DomainResult<Vec<book::Model>> {
    let rows = favorite::Entity::find()
        .filter(favorite::Column::UserId.eq(user_id))
        .order_by_desc(favorite::Column::CreatedAt)
        .order_by_desc(favorite::Column::Id)
        .find_also_related(book::Entity)
        .all(db)
        .await?;

    Ok(rows.into_iter().filter_map(|(_, book)| book).collect())
}

pub async fn is_favorite(db: &DatabaseConnection, user_id: i32, book_id: i32) -> DomainResult<bool> {
    let count = favorite::Entity::find()
        .filter(favorite::Column::UserId.eq(user_id))
        .filter(favorite::Column::BookId.eq(book_id))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Idempotent: adding a book twice keeps a single membership.
pub async fn add_favorite(db: &DatabaseConnection, user_id: i32, book_id: i32) -> DomainResult<()> {
    book::Entity::find_by_id(book_id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("Book"))?;

    let entry = favorite::ActiveModel {
        user_id: Set(user_id),
        book_id: Set(book_id),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    };

    favorite::Entity::insert(entry)
        .on_conflict(
            sea_query::OnConflict::columns([favorite::Column::UserId, favorite::Column::BookId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    Ok(())
}

/// Returns whether a membership was actually removed.
pub async fn remove_favorite(db: &DatabaseConnection, user_id: i32, book_id: i32) -> DomainResult<bool> {
    let result = favorite::Entity::delete_many()
        .filter(favorite::Column::UserId.eq(user_id))
        .filter(favorite::Column::BookId.eq(book_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Flip membership. Returns `true` when the book is now a favorite.
pub async fn toggle_favorite(db: &DatabaseConnection, user_id: i32, book_id: i32) -> DomainResult<bool> {
    if remove_favorite(db, user_id, book_id).await? {
        tracing::debug!("User {} unfavorited book {}", user_id, book_id);
        return Ok(false);
    }

    add_favorite(db, user_id, book_id).await?;
    tracing::debug!("User {} favorited book {}", user_id, book_id);
    Ok(true)
}
