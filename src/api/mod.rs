pub mod admin;
pub mod books;
pub mod cart;
pub mod error;
pub mod favorites;
pub mod health;
pub mod oauth;
pub mod orders;
pub mod user;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::infrastructure::AppState;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Accounts
        .route("/user/signup", post(user::signup))
        .route("/user/login", post(user::login))
        .route("/user/logout", post(user::logout))
        .route("/user/me", get(user::me))
        .route(
            "/user/profile",
            get(user::get_profile).put(user::update_profile),
        )
        .route("/user/password", put(user::change_password))
        // Google sign-in
        .route("/google", get(oauth::google_login))
        .route("/google/callback", get(oauth::google_callback))
        // Catalog
        .route("/book", get(books::list_books))
        .route("/book/filter", get(books::filter_books))
        .route("/book/genres", get(books::list_genres))
        .route("/book/categories", get(books::list_categories))
        .route("/book/:id", get(books::get_book))
        // Cart
        .route("/cart", get(cart::get_cart))
        .route("/cart/add", post(cart::add_to_cart))
        .route("/cart/update", put(cart::update_cart_item))
        .route("/cart/remove/:id", delete(cart::remove_from_cart))
        .route("/cart/clear", delete(cart::clear_cart))
        // Orders
        .route("/order", get(orders::list_orders))
        .route("/order/create", post(orders::create_order))
        .route("/order/:id", get(orders::get_order))
        .route("/order/cancel/:id", put(orders::cancel_order))
        // Favorites
        .route("/favorite", get(favorites::list_favorites))
        .route("/favorite/toggle/:id", post(favorites::toggle_favorite))
        .route("/favorite/add/:id", post(favorites::add_favorite))
        .route("/favorite/remove/:id", delete(favorites::remove_favorite))
        .route("/favorite/check/:id", get(favorites::check_favorite))
        // Admin
        .route("/admin/analytics", get(admin::analytics))
        .route("/admin/users", get(admin::list_users))
        .route(
            "/admin/users/:id",
            get(admin::get_user)
                .put(admin::update_user_role)
                .delete(admin::delete_user),
        )
        .route("/admin/books", post(admin::create_book))
        .route(
            "/admin/books/:id",
            put(admin::update_book).delete(admin::delete_book),
        )
        .route("/admin/orders", get(admin::list_orders))
        .route("/admin/orders/:id", get(admin::get_order))
        .route("/admin/orders/:id/status", put(admin::update_order_status))
        .with_state(state)
}
