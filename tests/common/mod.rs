#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode, header},
};
use bookstore::infrastructure::config::Config;
use bookstore::infrastructure::db;
use bookstore::infrastructure::AppState;
use bookstore::models::{Role, book, user};
use bookstore::infrastructure::server;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot`

pub const TEST_SECRET: &str = "test-secret";

pub async fn setup_state() -> AppState {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    AppState::new(db, Config::with_defaults("sqlite::memory:", TEST_SECRET))
}

/// State over a real SQLite file, for tests that need more than one connection.
pub async fn setup_file_state(path: &std::path::Path) -> AppState {
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let db = db::init_db(&url).await.expect("Failed to init DB");
    AppState::new(db, Config::with_defaults(&url, TEST_SECRET))
}

pub fn app(state: &AppState) -> Router {
    server::build_router(state.clone())
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// Value of the `token` cookie set by this response, if any.
    pub fn session_token(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .filter_map(|pair| pair.strip_prefix("token="))
            .find(|value| !value.is_empty())
            .map(str::to_owned)
    }
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("token={}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    TestResponse {
        status,
        headers,
        body,
    }
}

/// Sign up through the API and return the session token.
pub async fn signup(app: &Router, name: &str, email: &str, password: &str) -> String {
    let res = send(
        app,
        "POST",
        "/api/user/signup",
        None,
        Some(serde_json::json!({ "name": name, "email": email, "password": password })),
    )
    .await;
    assert_eq!(res.status, StatusCode::CREATED, "signup failed: {}", res.body);
    res.session_token().expect("signup sets the token cookie")
}

pub async fn promote_to_admin(db: &DatabaseConnection, email: &str) {
    let account = user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await
        .unwrap()
        .expect("user exists");
    let mut active: user::ActiveModel = account.into();
    active.role = Set(Role::Admin);
    active.update(db).await.unwrap();
}

/// Sign up a fresh admin and return their token.
pub async fn admin_token(app: &Router, db: &DatabaseConnection) -> String {
    let token = signup(app, "Store Admin", "admin@example.com", "admin-pass").await;
    promote_to_admin(db, "admin@example.com").await;
    token
}

pub async fn create_book(
    db: &DatabaseConnection,
    title: &str,
    genre: &str,
    price: f64,
    stock: i32,
) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let book = book::ActiveModel {
        title: Set(title.to_string()),
        author: Set("Test Author".to_string()),
        genre: Set(genre.to_string()),
        category: Set("General".to_string()),
        price: Set(price),
        stock: Set(stock),
        rating: Set(0.0),
        review_count: Set(0),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    let res = book::Entity::insert(book)
        .exec(db)
        .await
        .expect("Failed to create book");
    res.last_insert_id
}

pub async fn book_stock(db: &DatabaseConnection, id: i32) -> i32 {
    book::Entity::find_by_id(id)
        .one(db)
        .await
        .unwrap()
        .expect("book exists")
        .stock
}

pub fn shipping_address() -> Value {
    serde_json::json!({
        "full_name": "Ada Lovelace",
        "street": "12 St James's Square",
        "city": "London",
        "postal_code": "SW1Y 4JH",
        "country": "UK",
        "phone": "+44 20 7946 0000"
    })
}
