use serde::{Deserialize, Serialize};

/// A book held by the in-memory store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Unique identifier for the book, assigned on create
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: String,
    /// Non-negative price
    pub price: f64,
}

/// Request body for creating or fully replacing a book.
///
/// Every field is required; a client-supplied `id` is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookPayload {
    pub title: String,
    pub author: String,
    pub description: String,
    pub price: f64,
}

impl BookPayload {
    /// Check the constraints serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("title", &self.title),
            ("author", &self.author),
            ("description", &self.description),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{field} must not be empty"));
            }
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err("price must be a non-negative number".to_string());
        }
        Ok(())
    }

    pub fn into_book(self, id: String) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            description: self.description,
            price: self.price,
        }
    }
}
