use crate::infrastructure::auth::hash_password;
use crate::domain::DomainError;
use crate::models::{Role, book, user};
use sea_orm::*;

/// (title, author, genre, category, price, stock, year)
const DEMO_BOOKS: &[(&str, &str, &str, &str, f64, i32, i32)] = &[
    ("Dune", "Frank Herbert", "Science Fiction", "Bestseller", 9.99, 25, 1965),
    ("Foundation", "Isaac Asimov", "Science Fiction", "Classic", 8.49, 18, 1951),
    ("The Hobbit", "J.R.R. Tolkien", "Fantasy", "Classic", 10.99, 30, 1937),
    ("Pride and Prejudice", "Jane Austen", "Romance", "Classic", 6.99, 12, 1813),
    ("The Name of the Wind", "Patrick Rothfuss", "Fantasy", "Bestseller", 12.5, 7, 2007),
    ("Gone Girl", "Gillian Flynn", "Thriller", "Bestseller", 11.25, 4, 2012),
    ("Sapiens", "Yuval Noah Harari", "History", "New Arrival", 18.0, 15, 2011),
    ("The Pragmatic Programmer", "Andrew Hunt", "Technology", "New Arrival", 39.95, 3, 1999),
];

pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DomainError> {
    // 1. Create Users
    let now = chrono::Utc::now().to_rfc3339();
    let accounts = [
        ("Store Admin", "admin@bookstore.local", "admin123", Role::Admin),
        ("Demo Reader", "reader@bookstore.local", "reader123", Role::User),
    ];

    for (name, email, password, role) in accounts {
        let password_hash = hash_password(password)
            .map_err(|e| DomainError::Internal(format!("password hashing failed: {}", e)))?;

        let account = user::ActiveModel {
            name: Set(name.to_owned()),
            email: Set(email.to_owned()),
            password_hash: Set(Some(password_hash)),
            role: Set(role),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        };

        user::Entity::insert(account)
            .on_conflict(
                sea_query::OnConflict::column(user::Column::Email)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
    }

    // 2. Create Books, only into an empty catalog
    if book::Entity::find().count(db).await? > 0 {
        tracing::info!("Catalog already populated, skipping demo books");
        return Ok(());
    }

    for &(title, author, genre, category, price, stock, year) in DEMO_BOOKS {
        let entry = book::ActiveModel {
            title: Set(title.to_owned()),
            author: Set(author.to_owned()),
            genre: Set(genre.to_owned()),
            category: Set(category.to_owned()),
            price: Set(price),
            stock: Set(stock),
            published_year: Set(Some(year)),
            language: Set(Some("English".to_owned())),
            rating: Set(0.0),
            review_count: Set(0),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        };
        entry.insert(db).await?;
    }

    tracing::info!("Seeded {} demo books", DEMO_BOOKS.len());
    Ok(())
}
