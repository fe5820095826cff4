//! Admin dashboard aggregates

use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::*;
use serde::Serialize;
use std::collections::HashMap;

use super::order_service::{self, OrderFilter};
use super::pricing::round_money;
use crate::domain::DomainResult;
use crate::models::order::{self, OrderStatus};
use crate::models::{book, order_item, user};

const MONTHS_SHOWN: usize = 6;
const TOP_SELLERS: usize = 5;
const RECENT_ORDERS: u64 = 5;

#[derive(Debug, Serialize)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: u64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct MonthlyRevenue {
    /// `YYYY-MM`
    pub month: String,
    pub revenue: f64,
    pub orders: u64,
}

#[derive(Debug, Serialize)]
pub struct TopSeller {
    pub book_id: i32,
    pub title: String,
    pub units_sold: i64,
    pub revenue: f64,
}

#[derive(Debug, Serialize)]
pub struct LowStockBook {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub stock: i32,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_books: u64,
    pub total_orders: u64,
    pub total_revenue: f64,
    pub pending_orders: u64,
    pub orders_by_status: Vec<StatusCount>,
    pub monthly_revenue: Vec<MonthlyRevenue>,
    pub top_selling_books: Vec<TopSeller>,
    pub low_stock_books: Vec<LowStockBook>,
    pub recent_orders: Vec<order_service::AdminOrderView>,
}

/// `YYYY-MM` keys for the `n` calendar months ending with `today`'s month,
/// oldest first.
pub fn last_n_months(today: NaiveDate, n: usize) -> Vec<String> {
    let mut year = today.year();
    let mut month = today.month();
    let mut keys = Vec::with_capacity(n);

    for _ in 0..n {
        keys.push(format!("{:04}-{:02}", year, month));
        if month == 1 {
            month = 12;
            year -= 1;
        } else {
            month -= 1;
        }
    }

    keys.reverse();
    keys
}

/// Bucket `(created_at, total)` pairs of non-cancelled orders by month.
/// Months without orders are reported with zero revenue.
fn monthly_buckets(today: NaiveDate, orders: &[(String, f64)]) -> Vec<MonthlyRevenue> {
    let mut buckets: Vec<MonthlyRevenue> = last_n_months(today, MONTHS_SHOWN)
        .into_iter()
        .map(|month| MonthlyRevenue {
            month,
            revenue: 0.0,
            orders: 0,
        })
        .collect();

    for (created_at, total) in orders {
        let Some(key) = created_at.get(..7) else {
            continue;
        };
        if let Some(bucket) = buckets.iter_mut().find(|b| b.month == key) {
            bucket.revenue += total;
            bucket.orders += 1;
        }
    }

    for bucket in &mut buckets {
        bucket.revenue = round_money(bucket.revenue);
    }
    buckets
}

async fn top_sellers(db: &DatabaseConnection) -> DomainResult<Vec<TopSeller>> {
    let rows: Vec<(i32, String, i32, f64)> = order_item::Entity::find()
        .select_only()
        .column(order_item::Column::BookId)
        .column(order_item::Column::Title)
        .column(order_item::Column::Quantity)
        .column(order_item::Column::Price)
        .inner_join(order::Entity)
        .filter(order::Column::Status.ne(OrderStatus::Cancelled))
        .into_tuple()
        .all(db)
        .await?;

    let mut by_book: HashMap<i32, TopSeller> = HashMap::new();
    for (book_id, title, quantity, price) in rows {
        let entry = by_book.entry(book_id).or_insert_with(|| TopSeller {
            book_id,
            title,
            units_sold: 0,
            revenue: 0.0,
        });
        entry.units_sold += i64::from(quantity);
        entry.revenue += price * f64::from(quantity);
    }

    let mut sellers: Vec<TopSeller> = by_book.into_values().collect();
    sellers.sort_by(|a, b| {
        b.units_sold
            .cmp(&a.units_sold)
            .then_with(|| a.book_id.cmp(&b.book_id))
    });
    sellers.truncate(TOP_SELLERS);
    for seller in &mut sellers {
        seller.revenue = round_money(seller.revenue);
    }
    Ok(sellers)
}

pub async fn dashboard(db: &DatabaseConnection, low_stock_threshold: i32) -> DomainResult<DashboardStats> {
    let total_users = user::Entity::find().count(db).await?;
    let total_books = book::Entity::find().count(db).await?;
    let total_orders = order::Entity::find().count(db).await?;

    let statuses: Vec<OrderStatus> = order::Entity::find()
        .select_only()
        .column(order::Column::Status)
        .into_tuple()
        .all(db)
        .await?;

    let mut counts: HashMap<OrderStatus, u64> = HashMap::new();
    for status in statuses {
        *counts.entry(status).or_default() += 1;
    }
    let orders_by_status: Vec<StatusCount> = OrderStatus::iter()
        .map(|status| StatusCount {
            status,
            count: counts.get(&status).copied().unwrap_or(0),
        })
        .collect();
    let pending_orders = counts.get(&OrderStatus::Pending).copied().unwrap_or(0);

    let revenue_rows: Vec<(String, f64)> = order::Entity::find()
        .select_only()
        .column(order::Column::CreatedAt)
        .column(order::Column::Total)
        .filter(order::Column::Status.ne(OrderStatus::Cancelled))
        .into_tuple()
        .all(db)
        .await?;

    let total_revenue = round_money(revenue_rows.iter().map(|(_, total)| total).sum());
    let monthly_revenue = monthly_buckets(Utc::now().date_naive(), &revenue_rows);

    let low_stock_books = book::Entity::find()
        .filter(book::Column::Stock.lt(low_stock_threshold))
        .order_by_asc(book::Column::Stock)
        .order_by_asc(book::Column::Title)
        .all(db)
        .await?
        .into_iter()
        .map(|b| LowStockBook {
            id: b.id,
            title: b.title,
            author: b.author,
            stock: b.stock,
        })
        .collect();

    let recent_orders = order_service::list_all_orders(
        db,
        OrderFilter {
            status: None,
            page: Some(1),
            limit: Some(RECENT_ORDERS),
        },
    )
    .await?
    .orders;

    Ok(DashboardStats {
        total_users,
        total_books,
        total_orders,
        total_revenue,
        pending_orders,
        orders_by_status,
        monthly_revenue,
        top_selling_books: top_sellers(db).await?,
        low_stock_books,
        recent_orders,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn months_wrap_across_year_boundary() {
        assert_eq!(
            last_n_months(date(2024, 2, 15), 6),
            vec!["2023-09", "2023-10", "2023-11", "2023-12", "2024-01", "2024-02"]
        );
    }

    #[test]
    fn empty_months_are_zero_filled() {
        let orders = vec![
            ("2024-02-03T10:00:00+00:00".to_string(), 20.0),
            ("2024-02-20T10:00:00+00:00".to_string(), 5.5),
            ("2023-11-01T00:00:00+00:00".to_string(), 12.25),
            // outside the window
            ("2023-01-01T00:00:00+00:00".to_string(), 99.0),
        ];
        let buckets = monthly_buckets(date(2024, 2, 28), &orders);

        assert_eq!(buckets.len(), 6);
        assert_eq!(buckets[0].month, "2023-09");
        assert_eq!(buckets[0].revenue, 0.0);
        assert_eq!(buckets[2].revenue, 12.25);
        assert_eq!(buckets[5].revenue, 25.5);
        assert_eq!(buckets[5].orders, 2);
    }
}
