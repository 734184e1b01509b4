use std::collections::HashMap;

use tokio::sync::RwLock;

use super::models::{Book, BookPayload};
use crate::utils::generate_id;

/// In-memory book storage owned by the books module.
///
/// One `RwLock` guards the whole map, so every read-modify-write below is atomic.
#[derive(Debug, Default)]
pub struct BookStore {
    books: RwLock<HashMap<String, Book>>,
}

impl BookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with three sample books.
    pub fn with_samples() -> Self {
        let samples = [
            (
                "The Rust Programming Language",
                "Steve Klabnik & Carol Nichols",
                "The official book on the Rust programming language",
                39.95,
            ),
            (
                "Clean Code",
                "Robert C. Martin",
                "A handbook of agile software craftsmanship",
                39.99,
            ),
            (
                "Design Patterns",
                "Erich Gamma, Richard Helm, Ralph Johnson, John Vlissides",
                "Elements of reusable object-oriented software",
                54.99,
            ),
        ];

        let books = samples
            .into_iter()
            .map(|(title, author, description, price)| {
                let id = generate_id();
                let book = Book {
                    id: id.clone(),
                    title: title.to_string(),
                    author: author.to_string(),
                    description: description.to_string(),
                    price,
                };
                (id, book)
            })
            .collect();

        Self {
            books: RwLock::new(books),
        }
    }

    pub async fn list(&self) -> Vec<Book> {
        self.books.read().await.values().cloned().collect()
    }

    pub async fn get(&self, id: &str) -> Option<Book> {
        self.books.read().await.get(id).cloned()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.books.read().await.contains_key(id)
    }

    /// Store a new book under a freshly generated identifier.
    pub async fn insert(&self, payload: BookPayload) -> Book {
        let book = payload.into_book(generate_id());
        self.books
            .write()
            .await
            .insert(book.id.clone(), book.clone());
        book
    }

    /// Fully replace an existing book, keeping its identifier. `None` if absent.
    pub async fn replace(&self, id: &str, payload: BookPayload) -> Option<Book> {
        let mut books = self.books.write().await;
        let slot = books.get_mut(id)?;
        *slot = payload.into_book(id.to_string());
        Some(slot.clone())
    }

    pub async fn remove(&self, id: &str) -> Option<Book> {
        self.books.write().await.remove(id)
    }

    pub async fn len(&self) -> usize {
        self.books.read().await.len()
    }
}
