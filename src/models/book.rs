use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

pub const DEFAULT_CATEGORY: &str = "General";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub isbn: Option<String>,
    pub genre: String,
    pub category: String,
    pub price: f64,
    pub stock: i32,
    pub cover_image: Option<String>,
    pub publisher: Option<String>,
    pub published_year: Option<i32>,
    pub pages: Option<i32>,
    pub language: Option<String>,
    /// Denormalized average rating, 0 to 5
    pub rating: f64,
    pub review_count: i32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cart_item::Entity")]
    CartItems,
    #[sea_orm(has_many = "super::favorite::Entity")]
    Favorites,
}

impl Related<super::cart_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItems.def()
    }
}

impl Related<super::favorite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Favorites.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Admin payload for creating a catalog entry
#[derive(Debug, Clone, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub isbn: Option<String>,
    pub genre: String,
    pub category: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub stock: i32,
    pub cover_image: Option<String>,
    pub publisher: Option<String>,
    pub published_year: Option<i32>,
    pub pages: Option<i32>,
    pub language: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<i32>,
}

impl NewBook {
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_fields(
            &self.title,
            &self.author,
            &self.genre,
            self.price,
            self.stock,
            self.rating.unwrap_or(0.0),
        )
    }
}

/// Admin payload for a partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub isbn: Option<String>,
    pub genre: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i32>,
    pub cover_image: Option<String>,
    pub publisher: Option<String>,
    pub published_year: Option<i32>,
    pub pages: Option<i32>,
    pub language: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<i32>,
}

impl BookPatch {
    /// Merge onto an existing model and validate the result.
    pub fn apply(self, mut book: Model) -> Result<Model, DomainError> {
        if let Some(v) = self.title {
            book.title = v;
        }
        if let Some(v) = self.author {
            book.author = v;
        }
        if let Some(v) = self.genre {
            book.genre = v;
        }
        if let Some(v) = self.category {
            book.category = v;
        }
        if let Some(v) = self.price {
            book.price = v;
        }
        if let Some(v) = self.stock {
            book.stock = v;
        }
        if let Some(v) = self.rating {
            book.rating = v;
        }
        if let Some(v) = self.review_count {
            book.review_count = v;
        }
        book.description = self.description.or(book.description);
        book.isbn = self.isbn.or(book.isbn);
        book.cover_image = self.cover_image.or(book.cover_image);
        book.publisher = self.publisher.or(book.publisher);
        book.published_year = self.published_year.or(book.published_year);
        book.pages = self.pages.or(book.pages);
        book.language = self.language.or(book.language);

        validate_fields(
            &book.title,
            &book.author,
            &book.genre,
            book.price,
            book.stock,
            book.rating,
        )?;
        Ok(book)
    }
}

fn validate_fields(
    title: &str,
    author: &str,
    genre: &str,
    price: f64,
    stock: i32,
    rating: f64,
) -> Result<(), DomainError> {
    if title.trim().is_empty() {
        return Err(DomainError::Validation("Title is required".into()));
    }
    if author.trim().is_empty() {
        return Err(DomainError::Validation("Author is required".into()));
    }
    if genre.trim().is_empty() {
        return Err(DomainError::Validation("Genre is required".into()));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(DomainError::Validation(
            "Price must be a non-negative number".into(),
        ));
    }
    if stock < 0 {
        return Err(DomainError::Validation("Stock cannot be negative".into()));
    }
    if !(0.0..=5.0).contains(&rating) {
        return Err(DomainError::Validation(
            "Rating must be between 0 and 5".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Model {
        Model {
            id: 1,
            title: "Dune".into(),
            author: "Frank Herbert".into(),
            description: None,
            isbn: Some("9780441013593".into()),
            genre: "Science Fiction".into(),
            category: DEFAULT_CATEGORY.into(),
            price: 9.99,
            stock: 3,
            cover_image: None,
            publisher: None,
            published_year: Some(1965),
            pages: None,
            language: None,
            rating: 4.5,
            review_count: 10,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn patch_keeps_untouched_fields() {
        let patched = BookPatch {
            price: Some(12.5),
            description: Some("Spice".into()),
            ..Default::default()
        }
        .apply(sample())
        .unwrap();

        assert_eq!(patched.price, 12.5);
        assert_eq!(patched.description.as_deref(), Some("Spice"));
        assert_eq!(patched.title, "Dune");
        assert_eq!(patched.isbn.as_deref(), Some("9780441013593"));
    }

    #[test]
    fn patch_rejects_negative_stock() {
        let err = BookPatch {
            stock: Some(-1),
            ..Default::default()
        }
        .apply(sample())
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn new_book_requires_title() {
        let book = NewBook {
            title: "  ".into(),
            author: "Anon".into(),
            description: None,
            isbn: None,
            genre: "Poetry".into(),
            category: None,
            price: 1.0,
            stock: 0,
            cover_image: None,
            publisher: None,
            published_year: None,
            pages: None,
            language: None,
            rating: None,
            review_count: None,
        };
        assert!(book.validate().is_err());
    }
}
