use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::user::signup,
        api::user::login,
        api::user::logout,
        api::user::me,
        api::user::get_profile,
        api::user::update_profile,
        api::user::change_password,
        api::oauth::google_login,
        api::oauth::google_callback,
        api::books::list_books,
        api::books::filter_books,
        api::books::list_genres,
        api::books::list_categories,
        api::books::get_book,
        api::cart::get_cart,
        api::cart::add_to_cart,
        api::cart::update_cart_item,
        api::cart::remove_from_cart,
        api::cart::clear_cart,
        api::orders::create_order,
        api::orders::list_orders,
        api::orders::get_order,
        api::orders::cancel_order,
        api::favorites::list_favorites,
        api::favorites::toggle_favorite,
        api::favorites::add_favorite,
        api::favorites::remove_favorite,
        api::favorites::check_favorite,
        api::admin::analytics,
        api::admin::list_users,
        api::admin::get_user,
        api::admin::update_user_role,
        api::admin::delete_user,
        api::admin::create_book,
        api::admin::update_book,
        api::admin::delete_book,
        api::admin::list_orders,
        api::admin::get_order,
        api::admin::update_order_status,
    ),
    tags(
        (name = "bookstore", description = "Bookstore API")
    )
)]
pub struct ApiDoc;
