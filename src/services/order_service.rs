//! Order Service - checkout, order history and cancellation
//!
//! Checkout converts the cart into an order snapshot and decrements stock in
//! one transaction. Each decrement is conditional on `stock >= quantity`, so
//! two checkouts racing for the last copy cannot both succeed.

use sea_orm::sea_query::Expr;
use sea_orm::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::cart_service;
use super::pricing::PricingPolicy;
use crate::domain::{DomainError, DomainResult};
use crate::models::order::{self, OrderStatus, PaymentMethod, PaymentStatus, ShippingAddress};
use crate::models::{book, cart_item, order_item, user};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderInput {
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
}

/// An order together with its line items
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: order::Model,
    pub items: Vec<order_item::Model>,
}

/// Admin view: the order plus who placed it
#[derive(Debug, Clone, Serialize)]
pub struct AdminOrderView {
    #[serde(flatten)]
    pub details: OrderDetails,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// 1-based page number
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct AdminOrderPage {
    pub orders: Vec<AdminOrderView>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

async fn attach_items<C: ConnectionTrait>(
    conn: &C,
    orders: Vec<order::Model>,
) -> Result<Vec<OrderDetails>, DbErr> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = orders.iter().map(|o| o.id).collect();
    let mut by_order: HashMap<i32, Vec<order_item::Model>> = HashMap::new();

    for item in order_item::Entity::find()
        .filter(order_item::Column::OrderId.is_in(ids))
        .order_by_asc(order_item::Column::Id)
        .all(conn)
        .await?
    {
        by_order.entry(item.order_id).or_default().push(item);
    }

    Ok(orders
        .into_iter()
        .map(|order| OrderDetails {
            items: by_order.remove(&order.id).unwrap_or_default(),
            order,
        })
        .collect())
}

async fn details<C: ConnectionTrait>(conn: &C, order: order::Model) -> Result<OrderDetails, DbErr> {
    let mut all = attach_items(conn, vec![order]).await?;
    all.pop().ok_or_else(|| DbErr::Custom("order vanished while loading items".into()))
}

/// Place an order from the caller's cart.
pub async fn create_order(
    db: &DatabaseConnection,
    pricing: &PricingPolicy,
    user_id: i32,
    input: CreateOrderInput,
) -> DomainResult<OrderDetails> {
    input.shipping_address.validate()?;

    let txn = db.begin().await?;

    let cart = cart_service::find_cart(&txn, user_id)
        .await?
        .ok_or_else(|| DomainError::Validation("Cart is empty".into()))?;

    let lines = cart_item::Entity::find()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .order_by_asc(cart_item::Column::Id)
        .find_also_related(book::Entity)
        .all(&txn)
        .await?;

    if lines.is_empty() {
        return Err(DomainError::Validation("Cart is empty".into()));
    }

    // 1. Validate every line against current stock
    let mut priced = Vec::with_capacity(lines.len());
    for (line, book) in lines {
        let book = book.ok_or_else(|| {
            DomainError::NotFound("A book in your cart is no longer available".into())
        })?;
        if line.quantity > book.stock {
            return Err(DomainError::InsufficientStock {
                title: book.title,
                available: book.stock,
            });
        }
        priced.push((line, book));
    }

    let subtotal: f64 = priced
        .iter()
        .map(|(line, _)| line.price * f64::from(line.quantity))
        .sum();
    let totals = pricing.quote(subtotal);
    let now = chrono::Utc::now().to_rfc3339();
    let address = input.shipping_address;

    // 2. Persist the snapshot
    let order = order::ActiveModel {
        user_id: Set(user_id),
        subtotal: Set(totals.subtotal),
        shipping_cost: Set(totals.shipping_cost),
        tax: Set(totals.tax),
        total: Set(totals.total),
        status: Set(OrderStatus::Pending),
        payment_method: Set(input.payment_method),
        payment_status: Set(PaymentStatus::Pending),
        shipping_full_name: Set(address.full_name),
        shipping_street: Set(address.street),
        shipping_city: Set(address.city),
        shipping_state: Set(address.state),
        shipping_postal_code: Set(address.postal_code),
        shipping_country: Set(address.country),
        shipping_phone: Set(address.phone),
        delivered_at: Set(None),
        cancelled_at: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    // 3. Line items and conditional stock decrement
    for (line, book) in &priced {
        order_item::ActiveModel {
            order_id: Set(order.id),
            book_id: Set(book.id),
            title: Set(book.title.clone()),
            cover_image: Set(book.cover_image.clone()),
            quantity: Set(line.quantity),
            price: Set(line.price),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let result = book::Entity::update_many()
            .col_expr(
                book::Column::Stock,
                Expr::col(book::Column::Stock).sub(line.quantity),
            )
            .col_expr(book::Column::UpdatedAt, Expr::value(now.clone()))
            .filter(book::Column::Id.eq(book.id))
            .filter(book::Column::Stock.gte(line.quantity))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            tracing::warn!(
                "Stock for book {} changed during checkout, rolling back order",
                book.id
            );
            return Err(DomainError::InsufficientStock {
                title: book.title.clone(),
                available: 0,
            });
        }
    }

    // 4. Empty the cart
    cart_service::clear_items(&txn, cart.id).await?;

    let placed = details(&txn, order).await?;
    txn.commit().await?;

    tracing::info!(
        "Order {} placed by user {}: {} line(s), total {:.2}",
        placed.order.id,
        user_id,
        placed.items.len(),
        placed.order.total
    );
    Ok(placed)
}

/// The caller's orders, newest first
pub async fn list_user_orders(db: &DatabaseConnection, user_id: i32) -> DomainResult<Vec<OrderDetails>> {
    let orders = order::Entity::find()
        .filter(order::Column::UserId.eq(user_id))
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await?;

    Ok(attach_items(db, orders).await?)
}

async fn find_owned<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    order_id: i32,
) -> DomainResult<order::Model> {
    order::Entity::find_by_id(order_id)
        .filter(order::Column::UserId.eq(user_id))
        .one(conn)
        .await?
        .ok_or_else(|| DomainError::not_found("Order"))
}

/// An order owned by the caller. Other users' orders read as not found.
pub async fn get_user_order(
    db: &DatabaseConnection,
    user_id: i32,
    order_id: i32,
) -> DomainResult<OrderDetails> {
    let order = find_owned(db, user_id, order_id).await?;
    Ok(details(db, order).await?)
}

/// Mark cancelled and put every line's quantity back on the shelf.
async fn apply_cancellation<C: ConnectionTrait>(
    conn: &C,
    order: order::Model,
) -> DomainResult<order::Model> {
    let now = chrono::Utc::now().to_rfc3339();

    let items = order_item::Entity::find()
        .filter(order_item::Column::OrderId.eq(order.id))
        .all(conn)
        .await?;

    for item in &items {
        let result = book::Entity::update_many()
            .col_expr(
                book::Column::Stock,
                Expr::col(book::Column::Stock).add(item.quantity),
            )
            .col_expr(book::Column::UpdatedAt, Expr::value(now.clone()))
            .filter(book::Column::Id.eq(item.book_id))
            .exec(conn)
            .await?;

        if result.rows_affected == 0 {
            tracing::warn!(
                "Book {} from order {} no longer exists, stock not restored",
                item.book_id,
                order.id
            );
        }
    }

    let refund = order.payment_status == PaymentStatus::Paid;
    let mut active: order::ActiveModel = order.into();
    active.status = Set(OrderStatus::Cancelled);
    active.cancelled_at = Set(Some(now.clone()));
    active.updated_at = Set(now);
    if refund {
        active.payment_status = Set(PaymentStatus::Refunded);
    }

    Ok(active.update(conn).await?)
}

fn cancellation_error(status: OrderStatus) -> DomainError {
    match status {
        OrderStatus::Cancelled => DomainError::InvalidState("Order is already cancelled".into()),
        _ => DomainError::InvalidState(format!(
            "Cannot cancel an order that has been {}",
            status.to_string().to_lowercase()
        )),
    }
}

/// Customer-initiated cancellation
pub async fn cancel_order(
    db: &DatabaseConnection,
    user_id: i32,
    order_id: i32,
) -> DomainResult<OrderDetails> {
    let txn = db.begin().await?;

    let order = find_owned(&txn, user_id, order_id).await?;
    if !order.status.is_cancellable() {
        return Err(cancellation_error(order.status));
    }

    let cancelled = apply_cancellation(&txn, order).await?;
    let result = details(&txn, cancelled).await?;
    txn.commit().await?;

    tracing::info!("Order {} cancelled by user {}", order_id, user_id);
    Ok(result)
}

async fn with_customers(
    db: &DatabaseConnection,
    orders: Vec<order::Model>,
) -> DomainResult<Vec<AdminOrderView>> {
    let user_ids: Vec<i32> = orders.iter().map(|o| o.user_id).collect();
    let customers: HashMap<i32, user::Model> = if user_ids.is_empty() {
        HashMap::new()
    } else {
        user::Entity::find()
            .filter(user::Column::Id.is_in(user_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect()
    };

    Ok(attach_items(db, orders)
        .await?
        .into_iter()
        .map(|details| {
            let customer = customers.get(&details.order.user_id);
            AdminOrderView {
                customer_name: customer.map(|c| c.name.clone()),
                customer_email: customer.map(|c| c.email.clone()),
                details,
            }
        })
        .collect())
}

/// All orders, newest first, optionally narrowed to one status
pub async fn list_all_orders(db: &DatabaseConnection, filter: OrderFilter) -> DomainResult<AdminOrderPage> {
    let mut query = order::Entity::find();
    if let Some(status) = filter.status {
        query = query.filter(order::Column::Status.eq(status));
    }

    let page = filter.page.unwrap_or(1).max(1);
    let limit = filter.limit.unwrap_or(20).clamp(1, 100);

    let paginator = query
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .paginate(db, limit);
    let total = paginator.num_items().await?;
    let orders = paginator.fetch_page(page - 1).await?;

    Ok(AdminOrderPage {
        orders: with_customers(db, orders).await?,
        total,
        page,
        limit,
        total_pages: total.div_ceil(limit),
    })
}

pub async fn get_order(db: &DatabaseConnection, order_id: i32) -> DomainResult<AdminOrderView> {
    let order = order::Entity::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("Order"))?;

    with_customers(db, vec![order])
        .await?
        .pop()
        .ok_or_else(|| DomainError::not_found("Order"))
}

/// Admin status change along the forward progression.
pub async fn update_order_status(
    db: &DatabaseConnection,
    order_id: i32,
    next: OrderStatus,
) -> DomainResult<OrderDetails> {
    let txn = db.begin().await?;

    let order = order::Entity::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or_else(|| DomainError::not_found("Order"))?;

    let current = order.status;
    if current == next {
        return Err(DomainError::InvalidState(format!(
            "Order is already {}",
            current
        )));
    }
    if !current.can_transition_to(next) {
        return Err(DomainError::InvalidState(format!(
            "Cannot change order status from {} to {}",
            current, next
        )));
    }

    let updated = if next == OrderStatus::Cancelled {
        apply_cancellation(&txn, order).await?
    } else {
        let now = chrono::Utc::now().to_rfc3339();
        let cash_on_delivery = order.payment_method == PaymentMethod::CashOnDelivery
            && order.payment_status == PaymentStatus::Pending;

        let mut active: order::ActiveModel = order.into();
        active.status = Set(next);
        active.updated_at = Set(now.clone());
        if next == OrderStatus::Delivered {
            active.delivered_at = Set(Some(now));
            if cash_on_delivery {
                active.payment_status = Set(PaymentStatus::Paid);
            }
        }
        active.update(&txn).await?
    };

    let result = details(&txn, updated).await?;
    txn.commit().await?;

    tracing::info!("Order {} moved from {} to {}", order_id, current, next);
    Ok(result)
}
