pub mod book;
pub mod cart;
pub mod cart_item;
pub mod favorite;
pub mod order;
pub mod order_item;
pub mod user;

pub use order::{OrderStatus, PaymentMethod, PaymentStatus};
pub use user::Role;
