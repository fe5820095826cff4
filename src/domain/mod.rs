//! Domain layer - Business abstractions
//!
//! Trait definitions, filter types and the domain error type. Persistence
//! implementations live in the infrastructure layer.

pub mod errors;
pub mod repositories;

pub use errors::{DomainError, DomainResult};
pub use repositories::*;
