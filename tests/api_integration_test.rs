mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::{Value, json};

fn money(v: &Value) -> f64 {
    v.as_f64().expect("numeric amount")
}

// --- Catalog ---

#[tokio::test]
async fn test_catalog_pagination_and_detail() {
    let state = setup_state().await;
    let app = app(&state);
    for i in 0..15 {
        create_book(state.db(), &format!("Book {:02}", i), "Fantasy", 10.0, 3).await;
    }

    let page1 = send(&app, "GET", "/api/book", None, None).await;
    assert_eq!(page1.status, StatusCode::OK);
    assert_eq!(page1.body["total"], 15);
    assert_eq!(page1.body["books"].as_array().unwrap().len(), 12);
    assert_eq!(page1.body["total_pages"], 2);

    let page2 = send(&app, "GET", "/api/book?page=2", None, None).await;
    assert_eq!(page2.body["books"].as_array().unwrap().len(), 3);

    let id = page1.body["books"][0]["id"].as_i64().unwrap();
    let detail = send(&app, "GET", &format!("/api/book/{}", id), None, None).await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.body["id"], id);

    let missing = send(&app, "GET", "/api/book/9999", None, None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["error"], "Book not found");
}

#[tokio::test]
async fn test_catalog_filters() {
    let state = setup_state().await;
    let app = app(&state);
    create_book(state.db(), "Dune", "Science Fiction", 9.99, 4).await;
    create_book(state.db(), "Foundation", "Science Fiction", 25.0, 0).await;
    create_book(state.db(), "The Hobbit", "Fantasy", 12.0, 7).await;

    let scifi = send(&app, "GET", "/api/book/filter?genre=Science%20Fiction", None, None).await;
    assert_eq!(scifi.body["total"], 2);

    let in_stock = send(
        &app,
        "GET",
        "/api/book/filter?genre=Science%20Fiction&in_stock=true",
        None,
        None,
    )
    .await;
    assert_eq!(in_stock.body["total"], 1);
    assert_eq!(in_stock.body["books"][0]["title"], "Dune");

    let priced = send(
        &app,
        "GET",
        "/api/book/filter?min_price=10&max_price=30&sort=price_desc",
        None,
        None,
    )
    .await;
    let titles: Vec<&str> = priced.body["books"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Foundation", "The Hobbit"]);

    let search = send(&app, "GET", "/api/book/filter?search=hobb", None, None).await;
    assert_eq!(search.body["total"], 1);

    let inverted = send(&app, "GET", "/api/book/filter?min_price=30&max_price=10", None, None).await;
    assert_eq!(inverted.status, StatusCode::BAD_REQUEST);

    let genres = send(&app, "GET", "/api/book/genres", None, None).await;
    assert_eq!(genres.body, json!(["Fantasy", "Science Fiction"]));

    let categories = send(&app, "GET", "/api/book/categories", None, None).await;
    assert_eq!(categories.body, json!(["General"]));
}

// --- Cart ---

#[tokio::test]
async fn test_cart_add_update_remove() {
    let state = setup_state().await;
    let app = app(&state);
    let token = signup(&app, "Ada", "ada@example.com", "secret-pass").await;
    let dune = create_book(state.db(), "Dune", "Science Fiction", 9.99, 10).await;
    let hobbit = create_book(state.db(), "The Hobbit", "Fantasy", 12.5, 10).await;

    let empty = send(&app, "GET", "/api/cart", Some(&token), None).await;
    assert_eq!(empty.status, StatusCode::OK);
    assert_eq!(empty.body["item_count"], 0);

    send(&app, "POST", "/api/cart/add", Some(&token), Some(json!({ "book_id": dune, "quantity": 2 }))).await;
    // merges with the existing line
    send(&app, "POST", "/api/cart/add", Some(&token), Some(json!({ "book_id": dune }))).await;
    let cart = send(
        &app,
        "POST",
        "/api/cart/add",
        Some(&token),
        Some(json!({ "book_id": hobbit, "quantity": 1 })),
    )
    .await;
    assert_eq!(cart.status, StatusCode::OK);
    assert_eq!(cart.body["items"].as_array().unwrap().len(), 2);
    assert_eq!(cart.body["item_count"], 4);
    assert_eq!(money(&cart.body["total_price"]), 42.47);

    let updated = send(
        &app,
        "PUT",
        "/api/cart/update",
        Some(&token),
        Some(json!({ "book_id": dune, "quantity": 1 })),
    )
    .await;
    assert_eq!(money(&updated.body["total_price"]), 22.49);

    let removed = send(&app, "DELETE", &format!("/api/cart/remove/{}", hobbit), Some(&token), None).await;
    assert_eq!(removed.body["item_count"], 1);
    assert_eq!(money(&removed.body["total_price"]), 9.99);

    let again = send(&app, "DELETE", &format!("/api/cart/remove/{}", hobbit), Some(&token), None).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);

    let cleared = send(&app, "DELETE", "/api/cart/clear", Some(&token), None).await;
    assert_eq!(cleared.body["item_count"], 0);
    assert_eq!(money(&cleared.body["total_price"]), 0.0);
}

#[tokio::test]
async fn test_cart_rejects_more_than_stock() {
    let state = setup_state().await;
    let app = app(&state);
    let token = signup(&app, "Ada", "ada@example.com", "secret-pass").await;
    let book = create_book(state.db(), "Rare", "History", 30.0, 2).await;

    let res = send(&app, "POST", "/api/cart/add", Some(&token), Some(json!({ "book_id": book, "quantity": 3 }))).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let zero = send(&app, "POST", "/api/cart/add", Some(&token), Some(json!({ "book_id": book, "quantity": 0 }))).await;
    assert_eq!(zero.status, StatusCode::BAD_REQUEST);

    let missing = send(&app, "POST", "/api/cart/add", Some(&token), Some(json!({ "book_id": 9999, "quantity": 1 }))).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

// --- Orders ---

#[tokio::test]
async fn test_order_on_empty_cart_fails() {
    let state = setup_state().await;
    let app = app(&state);
    let token = signup(&app, "Ada", "ada@example.com", "secret-pass").await;

    let res = send(
        &app,
        "POST",
        "/api/order/create",
        Some(&token),
        Some(json!({ "shipping_address": shipping_address(), "payment_method": "Cash on Delivery" })),
    )
    .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "Cart is empty");
}

#[tokio::test]
async fn test_order_totals_stock_and_cart() {
    let state = setup_state().await;
    let app = app(&state);
    let token = signup(&app, "Ada", "ada@example.com", "secret-pass").await;
    let book = create_book(state.db(), "Dune", "Science Fiction", 10.0, 5).await;

    send(&app, "POST", "/api/cart/add", Some(&token), Some(json!({ "book_id": book, "quantity": 2 }))).await;

    let res = send(
        &app,
        "POST",
        "/api/order/create",
        Some(&token),
        Some(json!({ "shipping_address": shipping_address(), "payment_method": "Credit Card" })),
    )
    .await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);

    let order = &res.body["order"];
    assert_eq!(money(&order["subtotal"]), 20.0);
    // below the free-shipping threshold
    assert_eq!(money(&order["shipping_cost"]), 4.99);
    assert_eq!(money(&order["tax"]), 1.6);
    assert_eq!(money(&order["total"]), 26.59);
    assert_eq!(order["status"], "Pending");
    assert_eq!(order["payment_status"], "Pending");
    assert_eq!(order["items"][0]["quantity"], 2);
    assert_eq!(order["items"][0]["title"], "Dune");

    assert_eq!(book_stock(state.db(), book).await, 3);

    let cart = send(&app, "GET", "/api/cart", Some(&token), None).await;
    assert_eq!(cart.body["item_count"], 0);
    assert_eq!(money(&cart.body["total_price"]), 0.0);

    let list = send(&app, "GET", "/api/order", Some(&token), None).await;
    assert_eq!(list.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_free_shipping_above_threshold() {
    let state = setup_state().await;
    let app = app(&state);
    let token = signup(&app, "Ada", "ada@example.com", "secret-pass").await;
    let book = create_book(state.db(), "Atlas", "Reference", 51.0, 1).await;

    send(&app, "POST", "/api/cart/add", Some(&token), Some(json!({ "book_id": book }))).await;
    let res = send(
        &app,
        "POST",
        "/api/order/create",
        Some(&token),
        Some(json!({ "shipping_address": shipping_address(), "payment_method": "PayPal" })),
    )
    .await;

    let order = &res.body["order"];
    assert_eq!(money(&order["shipping_cost"]), 0.0);
    assert_eq!(money(&order["total"]), 55.08);
    let parts = money(&order["subtotal"]) + money(&order["shipping_cost"]) + money(&order["tax"]);
    assert!((money(&order["total"]) - parts).abs() < 1e-9);
}

#[tokio::test]
async fn test_order_rejected_when_stock_dropped_after_adding() {
    let state = setup_state().await;
    let app = app(&state);
    let token = signup(&app, "Ada", "ada@example.com", "secret-pass").await;
    let book = create_book(state.db(), "Dune", "Science Fiction", 10.0, 2).await;

    send(&app, "POST", "/api/cart/add", Some(&token), Some(json!({ "book_id": book, "quantity": 2 }))).await;

    // someone else bought a copy in the meantime
    {
        use bookstore::models::book as book_model;
        use sea_orm::{ActiveModelTrait, EntityTrait, Set};
        let current = book_model::Entity::find_by_id(book).one(state.db()).await.unwrap().unwrap();
        let mut active: book_model::ActiveModel = current.into();
        active.stock = Set(1);
        active.update(state.db()).await.unwrap();
    }

    let res = send(
        &app,
        "POST",
        "/api/order/create",
        Some(&token),
        Some(json!({ "shipping_address": shipping_address(), "payment_method": "PayPal" })),
    )
    .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    assert_eq!(book_stock(state.db(), book).await, 1);
    let orders = send(&app, "GET", "/api/order", Some(&token), None).await;
    assert_eq!(orders.body.as_array().unwrap().len(), 0);
    let cart = send(&app, "GET", "/api/cart", Some(&token), None).await;
    assert_eq!(cart.body["item_count"], 2);
}

#[tokio::test]
async fn test_concurrent_checkouts_for_last_copy() {
    let dir = tempfile::tempdir().unwrap();
    let state = setup_file_state(&dir.path().join("race.db")).await;
    let app = app(&state);
    let ada = signup(&app, "Ada", "ada@example.com", "secret-pass").await;
    let bob = signup(&app, "Bob", "bob@example.com", "secret-pass").await;

    for round in 0..5 {
        let book = create_book(state.db(), &format!("Last Copy {}", round), "Classics", 10.0, 1).await;
        for token in [&ada, &bob] {
            let res = send(&app, "POST", "/api/cart/add", Some(token), Some(json!({ "book_id": book }))).await;
            assert_eq!(res.status, StatusCode::OK);
        }

        let checkout = |token: String| {
            let app = app.clone();
            async move {
                send(
                    &app,
                    "POST",
                    "/api/order/create",
                    Some(&token),
                    Some(json!({ "shipping_address": shipping_address(), "payment_method": "PayPal" })),
                )
                .await
            }
        };
        let (first, second) = tokio::join!(checkout(ada.clone()), checkout(bob.clone()));

        let mut statuses = [first.status, second.status];
        statuses.sort();
        assert_eq!(statuses, [StatusCode::CREATED, StatusCode::BAD_REQUEST], "round {}", round);
        assert_eq!(book_stock(state.db(), book).await, 0);

        // the losing buyer keeps their cart line
        let loser = if first.status == StatusCode::BAD_REQUEST { &ada } else { &bob };
        let cart = send(&app, "GET", "/api/cart", Some(loser), None).await;
        assert_eq!(cart.body["item_count"], 1);
        send(&app, "DELETE", "/api/cart/clear", Some(loser), None).await;
    }

    let admin = admin_token(&app, state.db()).await;
    let orders = send(&app, "GET", "/api/admin/orders", Some(&admin), None).await;
    assert_eq!(orders.body["total"], 5);
}

#[tokio::test]
async fn test_failed_decrement_rolls_back_earlier_lines() {
    use sea_orm::{ConnectionTrait, Statement};

    let state = setup_state().await;
    let app = app(&state);
    let token = signup(&app, "Ada", "ada@example.com", "secret-pass").await;
    let first = create_book(state.db(), "Dune", "Science Fiction", 10.0, 5).await;
    let second = create_book(state.db(), "Emma", "Classics", 8.0, 3).await;

    send(&app, "POST", "/api/cart/add", Some(&token), Some(json!({ "book_id": first, "quantity": 2 }))).await;
    send(&app, "POST", "/api/cart/add", Some(&token), Some(json!({ "book_id": second, "quantity": 1 }))).await;

    // Another buyer takes the second book once the first line is written
    state
        .db()
        .execute(Statement::from_string(
            state.db().get_database_backend(),
            format!(
                "CREATE TRIGGER sold_out AFTER INSERT ON order_items \
                 WHEN NEW.book_id = {first} \
                 BEGIN UPDATE books SET stock = 0 WHERE id = {second}; END"
            ),
        ))
        .await
        .unwrap();

    let res = send(
        &app,
        "POST",
        "/api/order/create",
        Some(&token),
        Some(json!({ "shipping_address": shipping_address(), "payment_method": "PayPal" })),
    )
    .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    assert_eq!(book_stock(state.db(), first).await, 5);
    assert_eq!(book_stock(state.db(), second).await, 3);
    let orders = send(&app, "GET", "/api/order", Some(&token), None).await;
    assert_eq!(orders.body.as_array().unwrap().len(), 0);
    let cart = send(&app, "GET", "/api/cart", Some(&token), None).await;
    assert_eq!(cart.body["item_count"], 3);
}

#[tokio::test]
async fn test_order_requires_complete_address() {
    let state = setup_state().await;
    let app = app(&state);
    let token = signup(&app, "Ada", "ada@example.com", "secret-pass").await;
    let book = create_book(state.db(), "Dune", "Science Fiction", 10.0, 2).await;
    send(&app, "POST", "/api/cart/add", Some(&token), Some(json!({ "book_id": book }))).await;

    let mut address = shipping_address();
    address["phone"] = json!("");
    let res = send(
        &app,
        "POST",
        "/api/order/create",
        Some(&token),
        Some(json!({ "shipping_address": address, "payment_method": "PayPal" })),
    )
    .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "Shipping phone is required");
}

async fn place_order(app: &axum::Router, token: &str, book: i32, quantity: i32) -> i64 {
    send(app, "POST", "/api/cart/add", Some(token), Some(json!({ "book_id": book, "quantity": quantity }))).await;
    let res = send(
        app,
        "POST",
        "/api/order/create",
        Some(token),
        Some(json!({ "shipping_address": shipping_address(), "payment_method": "Cash on Delivery" })),
    )
    .await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    res.body["order"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_cancel_restores_stock() {
    let state = setup_state().await;
    let app = app(&state);
    let token = signup(&app, "Ada", "ada@example.com", "secret-pass").await;
    let book = create_book(state.db(), "Dune", "Science Fiction", 10.0, 5).await;

    let order_id = place_order(&app, &token, book, 3).await;
    assert_eq!(book_stock(state.db(), book).await, 2);

    let res = send(&app, "PUT", &format!("/api/order/cancel/{}", order_id), Some(&token), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["order"]["status"], "Cancelled");
    assert!(res.body["order"]["cancelled_at"].is_string());
    assert_eq!(book_stock(state.db(), book).await, 5);

    let again = send(&app, "PUT", &format!("/api/order/cancel/{}", order_id), Some(&token), None).await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
    assert_eq!(again.body["error"], "Order is already cancelled");
}

#[tokio::test]
async fn test_cannot_cancel_shipped_order() {
    let state = setup_state().await;
    let app = app(&state);
    let admin = admin_token(&app, state.db()).await;
    let token = signup(&app, "Ada", "ada@example.com", "secret-pass").await;
    let book = create_book(state.db(), "Dune", "Science Fiction", 10.0, 5).await;
    let order_id = place_order(&app, &token, book, 1).await;

    let shipped = send(
        &app,
        "PUT",
        &format!("/api/admin/orders/{}/status", order_id),
        Some(&admin),
        Some(json!({ "status": "Shipped" })),
    )
    .await;
    assert_eq!(shipped.status, StatusCode::OK);

    let res = send(&app, "PUT", &format!("/api/order/cancel/{}", order_id), Some(&token), None).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "Cannot cancel an order that has been shipped");
    assert_eq!(book_stock(state.db(), book).await, 4);
}

#[tokio::test]
async fn test_orders_are_private() {
    let state = setup_state().await;
    let app = app(&state);
    let ada = signup(&app, "Ada", "ada@example.com", "secret-pass").await;
    let bob = signup(&app, "Bob", "bob@example.com", "secret-pass").await;
    let book = create_book(state.db(), "Dune", "Science Fiction", 10.0, 5).await;
    let order_id = place_order(&app, &ada, book, 1).await;

    let own = send(&app, "GET", &format!("/api/order/{}", order_id), Some(&ada), None).await;
    assert_eq!(own.status, StatusCode::OK);

    let other = send(&app, "GET", &format!("/api/order/{}", order_id), Some(&bob), None).await;
    assert_eq!(other.status, StatusCode::NOT_FOUND);

    let cancel = send(&app, "PUT", &format!("/api/order/cancel/{}", order_id), Some(&bob), None).await;
    assert_eq!(cancel.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_status_progression() {
    let state = setup_state().await;
    let app = app(&state);
    let admin = admin_token(&app, state.db()).await;
    let token = signup(&app, "Ada", "ada@example.com", "secret-pass").await;
    let book = create_book(state.db(), "Dune", "Science Fiction", 10.0, 5).await;
    let order_id = place_order(&app, &token, book, 1).await;
    let uri = format!("/api/admin/orders/{}/status", order_id);

    let backwards = send(&app, "PUT", &uri, Some(&admin), Some(json!({ "status": "Delivered" }))).await;
    assert_eq!(backwards.status, StatusCode::BAD_REQUEST);

    for status in ["Processing", "Shipped", "Delivered"] {
        let res = send(&app, "PUT", &uri, Some(&admin), Some(json!({ "status": status }))).await;
        assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    }

    let order = send(&app, "GET", &format!("/api/admin/orders/{}", order_id), Some(&admin), None).await;
    assert_eq!(order.body["status"], "Delivered");
    assert_eq!(order.body["payment_status"], "Paid");
    assert!(order.body["delivered_at"].is_string());
    assert_eq!(order.body["customer_email"], "ada@example.com");

    let terminal = send(&app, "PUT", &uri, Some(&admin), Some(json!({ "status": "Cancelled" }))).await;
    assert_eq!(terminal.status, StatusCode::BAD_REQUEST);

    let cancel = send(&app, "PUT", &format!("/api/order/cancel/{}", order_id), Some(&token), None).await;
    assert_eq!(cancel.status, StatusCode::BAD_REQUEST);
    assert_eq!(cancel.body["error"], "Cannot cancel an order that has been delivered");
}

#[tokio::test]
async fn test_admin_cancel_restores_stock() {
    let state = setup_state().await;
    let app = app(&state);
    let admin = admin_token(&app, state.db()).await;
    let token = signup(&app, "Ada", "ada@example.com", "secret-pass").await;
    let book = create_book(state.db(), "Dune", "Science Fiction", 10.0, 5).await;
    let order_id = place_order(&app, &token, book, 2).await;

    let res = send(
        &app,
        "PUT",
        &format!("/api/admin/orders/{}/status", order_id),
        Some(&admin),
        Some(json!({ "status": "Cancelled" })),
    )
    .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(book_stock(state.db(), book).await, 5);

    let filtered = send(&app, "GET", "/api/admin/orders?status=Cancelled", Some(&admin), None).await;
    assert_eq!(filtered.body["total"], 1);
}

// --- Favorites ---

#[tokio::test]
async fn test_favorite_toggle_twice_restores_membership() {
    let state = setup_state().await;
    let app = app(&state);
    let token = signup(&app, "Ada", "ada@example.com", "secret-pass").await;
    let dune = create_book(state.db(), "Dune", "Science Fiction", 10.0, 5).await;
    let hobbit = create_book(state.db(), "The Hobbit", "Fantasy", 10.0, 5).await;

    send(&app, "POST", &format!("/api/favorite/add/{}", hobbit), Some(&token), None).await;
    // idempotent
    send(&app, "POST", &format!("/api/favorite/add/{}", hobbit), Some(&token), None).await;

    let on = send(&app, "POST", &format!("/api/favorite/toggle/{}", dune), Some(&token), None).await;
    assert_eq!(on.body["is_favorite"], true);
    let list = send(&app, "GET", "/api/favorite", Some(&token), None).await;
    assert_eq!(list.body.as_array().unwrap().len(), 2);

    let off = send(&app, "POST", &format!("/api/favorite/toggle/{}", dune), Some(&token), None).await;
    assert_eq!(off.body["is_favorite"], false);

    let list = send(&app, "GET", "/api/favorite", Some(&token), None).await;
    let ids: Vec<i64> = list.body.as_array().unwrap().iter().map(|b| b["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![i64::from(hobbit)]);

    let check = send(&app, "GET", &format!("/api/favorite/check/{}", hobbit), Some(&token), None).await;
    assert_eq!(check.body["is_favorite"], true);

    send(&app, "DELETE", &format!("/api/favorite/remove/{}", hobbit), Some(&token), None).await;
    let removed = send(&app, "DELETE", &format!("/api/favorite/remove/{}", hobbit), Some(&token), None).await;
    assert_eq!(removed.status, StatusCode::OK);

    let missing = send(&app, "POST", "/api/favorite/toggle/9999", Some(&token), None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

// --- Admin catalog and analytics ---

#[tokio::test]
async fn test_admin_book_crud() {
    let state = setup_state().await;
    let app = app(&state);
    let admin = admin_token(&app, state.db()).await;
    let token = signup(&app, "Ada", "ada@example.com", "secret-pass").await;

    let created = send(
        &app,
        "POST",
        "/api/admin/books",
        Some(&admin),
        Some(json!({
            "title": "  Neuromancer ",
            "author": "William Gibson",
            "genre": "Science Fiction",
            "price": 14.0,
            "stock": 6
        })),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
    assert_eq!(created.body["book"]["title"], "Neuromancer");
    assert_eq!(created.body["book"]["category"], "General");
    let id = created.body["book"]["id"].as_i64().unwrap();

    let invalid = send(
        &app,
        "POST",
        "/api/admin/books",
        Some(&admin),
        Some(json!({ "title": "Bad", "author": "A", "genre": "G", "price": -1.0 })),
    )
    .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);

    let updated = send(
        &app,
        "PUT",
        &format!("/api/admin/books/{}", id),
        Some(&admin),
        Some(json!({ "price": 12.5, "stock": 2 })),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(money(&updated.body["book"]["price"]), 12.5);
    assert_eq!(updated.body["book"]["author"], "William Gibson");

    // book sits in a cart and a favorite list when it is deleted
    send(&app, "POST", "/api/cart/add", Some(&token), Some(json!({ "book_id": id, "quantity": 1 }))).await;
    send(&app, "POST", &format!("/api/favorite/add/{}", id), Some(&token), None).await;

    let deleted = send(&app, "DELETE", &format!("/api/admin/books/{}", id), Some(&admin), None).await;
    assert_eq!(deleted.status, StatusCode::OK);

    let cart = send(&app, "GET", "/api/cart", Some(&token), None).await;
    assert_eq!(cart.body["item_count"], 0);
    assert_eq!(money(&cart.body["total_price"]), 0.0);
    let favorites = send(&app, "GET", "/api/favorite", Some(&token), None).await;
    assert_eq!(favorites.body.as_array().unwrap().len(), 0);

    let gone = send(&app, "DELETE", &format!("/api/admin/books/{}", id), Some(&admin), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_analytics_dashboard() {
    let state = setup_state().await;
    let app = app(&state);
    let admin = admin_token(&app, state.db()).await;
    let token = signup(&app, "Ada", "ada@example.com", "secret-pass").await;
    let dune = create_book(state.db(), "Dune", "Science Fiction", 10.0, 10).await;
    let hobbit = create_book(state.db(), "The Hobbit", "Fantasy", 20.0, 3).await;

    place_order(&app, &token, dune, 3).await;
    let cancelled = place_order(&app, &token, hobbit, 1).await;
    send(&app, "PUT", &format!("/api/order/cancel/{}", cancelled), Some(&token), None).await;

    let res = send(&app, "GET", "/api/admin/analytics", Some(&admin), None).await;
    assert_eq!(res.status, StatusCode::OK);
    let stats = &res.body;

    assert_eq!(stats["total_users"], 2);
    assert_eq!(stats["total_books"], 2);
    assert_eq!(stats["total_orders"], 2);
    assert_eq!(stats["pending_orders"], 1);
    // 30.00 + 4.99 shipping + 2.40 tax; the cancelled order is excluded
    assert_eq!(money(&stats["total_revenue"]), 37.39);

    let by_status = stats["orders_by_status"].as_array().unwrap();
    assert_eq!(by_status.len(), 5);
    let cancelled_count = by_status
        .iter()
        .find(|s| s["status"] == "Cancelled")
        .unwrap();
    assert_eq!(cancelled_count["count"], 1);

    let monthly = stats["monthly_revenue"].as_array().unwrap();
    assert_eq!(monthly.len(), 6);
    assert_eq!(money(&monthly[5]["revenue"]), 37.39);

    assert_eq!(stats["top_selling_books"][0]["title"], "Dune");
    assert_eq!(stats["top_selling_books"][0]["units_sold"], 3);
    assert_eq!(stats["top_selling_books"].as_array().unwrap().len(), 1);

    // The Hobbit has 3 copies again after the cancellation
    let low: Vec<&str> = stats["low_stock_books"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap())
        .collect();
    assert_eq!(low, vec!["The Hobbit"]);

    assert_eq!(stats["recent_orders"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_profile_update() {
    let state = setup_state().await;
    let app = app(&state);
    let token = signup(&app, "Ada", "ada@example.com", "secret-pass").await;

    let res = send(
        &app,
        "PUT",
        "/api/user/profile",
        Some(&token),
        Some(json!({ "city": "London", "phone": "+44 20 0000 0000" })),
    )
    .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["user"]["city"], "London");
    assert_eq!(res.body["user"]["name"], "Ada");

    let blank = send(&app, "PUT", "/api/user/profile", Some(&token), Some(json!({ "name": "  " }))).await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);

    let profile = send(&app, "GET", "/api/user/profile", Some(&token), None).await;
    assert_eq!(profile.body["phone"], "+44 20 0000 0000");
}

#[tokio::test]
async fn test_health() {
    let state = setup_state().await;
    let app = app(&state);
    let res = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], "ok");
}

#[tokio::test]
async fn test_openapi_lists_every_route() {
    let state = setup_state().await;
    let app = app(&state);
    let res = send(&app, "GET", "/api-docs/openapi.json", None, None).await;
    assert_eq!(res.status, StatusCode::OK);

    let paths = res.body["paths"].as_object().expect("paths object");
    for path in [
        "/api/user/profile",
        "/api/book/genres",
        "/api/book/categories",
        "/api/cart/update",
        "/api/cart/remove/{id}",
        "/api/cart/clear",
        "/api/order/{id}",
        "/api/favorite/add/{id}",
        "/api/favorite/remove/{id}",
        "/api/favorite/check/{id}",
        "/api/admin/users",
        "/api/admin/users/{id}",
        "/api/admin/orders",
        "/api/admin/orders/{id}",
        "/api/admin/orders/{id}/status",
    ] {
        assert!(paths.contains_key(path), "missing {}", path);
    }
    assert_eq!(paths["/api/user/profile"].as_object().unwrap().len(), 2);
    assert_eq!(paths["/api/admin/users/{id}"].as_object().unwrap().len(), 3);
}
