//! Services Layer
//!
//! Business logic behind the HTTP handlers. Services take a database
//! connection and return `DomainResult`, so they can be tested without axum.

pub mod analytics_service;
pub mod cart_service;
pub mod favorite_service;
pub mod order_service;
pub mod pricing;
pub mod user_service;

pub use pricing::{OrderTotals, PricingPolicy};
