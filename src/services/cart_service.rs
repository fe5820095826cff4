//! Cart Service - one cart per user with a denormalized total
//!
//! Every mutation runs in a transaction that also recomputes `total_price`,
//! so the stored total always matches the stored items.

use sea_orm::sea_query::Expr;
use sea_orm::*;
use serde::Serialize;

use super::pricing::round_money;
use crate::domain::{DomainError, DomainResult};
use crate::models::{book, cart, cart_item};

#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub book_id: i32,
    pub title: String,
    pub author: String,
    pub cover_image: Option<String>,
    /// Unit price captured when the line was added
    pub price: f64,
    pub quantity: i32,
    /// Current stock, so the client can warn before checkout
    pub stock: i32,
    pub line_total: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub id: Option<i32>,
    pub items: Vec<CartLine>,
    pub total_price: f64,
    pub item_count: i32,
}

impl CartView {
    fn empty() -> Self {
        Self {
            id: None,
            items: Vec::new(),
            total_price: 0.0,
            item_count: 0,
        }
    }
}

pub(crate) async fn find_cart<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> Result<Option<cart::Model>, DbErr> {
    cart::Entity::find()
        .filter(cart::Column::UserId.eq(user_id))
        .one(conn)
        .await
}

async fn find_or_create_cart<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> Result<cart::Model, DbErr> {
    if let Some(existing) = find_cart(conn, user_id).await? {
        return Ok(existing);
    }

    let now = chrono::Utc::now().to_rfc3339();
    cart::ActiveModel {
        user_id: Set(user_id),
        total_price: Set(0.0),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await
}

async fn find_line<C: ConnectionTrait>(
    conn: &C,
    cart_id: i32,
    book_id: i32,
) -> Result<Option<cart_item::Model>, DbErr> {
    cart_item::Entity::find()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .filter(cart_item::Column::BookId.eq(book_id))
        .one(conn)
        .await
}

/// Recompute and store the cart total from its items. Returns the new total.
pub(crate) async fn recompute_total<C: ConnectionTrait>(conn: &C, cart_id: i32) -> Result<f64, DbErr> {
    let items = cart_item::Entity::find()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .all(conn)
        .await?;

    let total = round_money(
        items
            .iter()
            .map(|item| item.price * f64::from(item.quantity))
            .sum(),
    );

    cart::Entity::update_many()
        .col_expr(cart::Column::TotalPrice, Expr::value(total))
        .col_expr(
            cart::Column::UpdatedAt,
            Expr::value(chrono::Utc::now().to_rfc3339()),
        )
        .filter(cart::Column::Id.eq(cart_id))
        .exec(conn)
        .await?;

    Ok(total)
}

/// Remove every line and zero the total.
pub(crate) async fn clear_items<C: ConnectionTrait>(conn: &C, cart_id: i32) -> Result<(), DbErr> {
    cart_item::Entity::delete_many()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .exec(conn)
        .await?;
    recompute_total(conn, cart_id).await?;
    Ok(())
}

/// Current cart with book details. A user without a cart gets an empty view.
pub async fn get_cart(db: &DatabaseConnection, user_id: i32) -> DomainResult<CartView> {
    let Some(cart) = find_cart(db, user_id).await? else {
        return Ok(CartView::empty());
    };

    let rows = cart_item::Entity::find()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .order_by_asc(cart_item::Column::Id)
        .find_also_related(book::Entity)
        .all(db)
        .await?;

    let items: Vec<CartLine> = rows
        .into_iter()
        .filter_map(|(item, book)| {
            let book = book?;
            Some(CartLine {
                book_id: item.book_id,
                title: book.title,
                author: book.author,
                cover_image: book.cover_image,
                price: item.price,
                quantity: item.quantity,
                stock: book.stock,
                line_total: round_money(item.price * f64::from(item.quantity)),
            })
        })
        .collect();

    Ok(CartView {
        id: Some(cart.id),
        item_count: items.iter().map(|line| line.quantity).sum(),
        items,
        total_price: cart.total_price,
    })
}

fn check_quantity(quantity: i32) -> DomainResult<()> {
    if quantity < 1 {
        return Err(DomainError::Validation(
            "Quantity must be at least 1".into(),
        ));
    }
    Ok(())
}

/// Add `quantity` copies of a book, merging with an existing line.
pub async fn add_to_cart(
    db: &DatabaseConnection,
    user_id: i32,
    book_id: i32,
    quantity: i32,
) -> DomainResult<CartView> {
    check_quantity(quantity)?;

    let txn = db.begin().await?;

    let book = book::Entity::find_by_id(book_id)
        .one(&txn)
        .await?
        .ok_or_else(|| DomainError::not_found("Book"))?;

    let cart = find_or_create_cart(&txn, user_id).await?;
    let existing = find_line(&txn, cart.id, book_id).await?;

    let new_quantity = existing
        .as_ref()
        .map_or(0, |line| line.quantity)
        .saturating_add(quantity);

    if new_quantity > book.stock {
        return Err(DomainError::InsufficientStock {
            title: book.title,
            available: book.stock,
        });
    }

    match existing {
        Some(line) => {
            let mut active: cart_item::ActiveModel = line.into();
            active.quantity = Set(new_quantity);
            active.price = Set(book.price);
            active.update(&txn).await?;
        }
        None => {
            cart_item::ActiveModel {
                cart_id: Set(cart.id),
                book_id: Set(book_id),
                quantity: Set(new_quantity),
                price: Set(book.price),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }
    }

    recompute_total(&txn, cart.id).await?;
    txn.commit().await?;

    tracing::debug!(
        "User {} added {} x book {} to cart",
        user_id,
        quantity,
        book_id
    );
    get_cart(db, user_id).await
}

/// Set the quantity of a line that is already in the cart.
pub async fn update_cart_item(
    db: &DatabaseConnection,
    user_id: i32,
    book_id: i32,
    quantity: i32,
) -> DomainResult<CartView> {
    check_quantity(quantity)?;

    let txn = db.begin().await?;

    let cart = find_cart(&txn, user_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Cart"))?;
    let line = find_line(&txn, cart.id, book_id)
        .await?
        .ok_or_else(|| DomainError::NotFound("Item not found in cart".into()))?;
    let book = book::Entity::find_by_id(book_id)
        .one(&txn)
        .await?
        .ok_or_else(|| DomainError::not_found("Book"))?;

    if quantity > book.stock {
        return Err(DomainError::InsufficientStock {
            title: book.title,
            available: book.stock,
        });
    }

    let mut active: cart_item::ActiveModel = line.into();
    active.quantity = Set(quantity);
    active.update(&txn).await?;

    recompute_total(&txn, cart.id).await?;
    txn.commit().await?;

    get_cart(db, user_id).await
}

pub async fn remove_from_cart(
    db: &DatabaseConnection,
    user_id: i32,
    book_id: i32,
) -> DomainResult<CartView> {
    let txn = db.begin().await?;

    let cart = find_cart(&txn, user_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Cart"))?;

    let result = cart_item::Entity::delete_many()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .filter(cart_item::Column::BookId.eq(book_id))
        .exec(&txn)
        .await?;

    if result.rows_affected == 0 {
        return Err(DomainError::NotFound("Item not found in cart".into()));
    }

    recompute_total(&txn, cart.id).await?;
    txn.commit().await?;

    get_cart(db, user_id).await
}

pub async fn clear_cart(db: &DatabaseConnection, user_id: i32) -> DomainResult<CartView> {
    let txn = db.begin().await?;
    if let Some(cart) = find_cart(&txn, user_id).await? {
        clear_items(&txn, cart.id).await?;
    }
    txn.commit().await?;

    get_cart(db, user_id).await
}
