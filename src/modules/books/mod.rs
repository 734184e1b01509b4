pub mod models;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use gridwatch_http::AppError;
use gridwatch_kernel::{InitCtx, Module};
use gridwatch_telemetry::{instruments::BOOK_OPERATIONS_TOTAL, ScopedCounter};

use models::{Book, BookPayload};
use store::BookStore;

/// Book store CRUD API backed by an in-memory map
pub struct BooksModule {
    store: Arc<BookStore>,
}

impl BooksModule {
    pub fn new(store: Arc<BookStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let books = self.store.len().await;
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            books,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/books", get(list_books).post(create_book))
            .route(
                "/books/{id}",
                get(get_book).put(update_book).delete(delete_book),
            )
            .with_state(self.store.clone())
    }
}

fn book_not_found() -> AppError {
    AppError::not_found("Book not found")
}

/// List every book, in map iteration order
async fn list_books(State(store): State<Arc<BookStore>>) -> Json<Vec<Book>> {
    let _op = ScopedCounter::new(BOOK_OPERATIONS_TOTAL, &[("operation", "list")]);
    Json(store.list().await)
}

async fn get_book(
    State(store): State<Arc<BookStore>>,
    Path(id): Path<String>,
) -> Result<Json<Book>, AppError> {
    let _op = ScopedCounter::new(BOOK_OPERATIONS_TOTAL, &[("operation", "get")]);
    store.get(&id).await.map(Json).ok_or_else(book_not_found)
}

async fn create_book(
    State(store): State<Arc<BookStore>>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let _op = ScopedCounter::new(BOOK_OPERATIONS_TOTAL, &[("operation", "create")]);
    let Json(payload) = payload?;
    payload.validate().map_err(AppError::validation)?;

    let book = store.insert(payload).await;
    tracing::info!(book_id = %book.id, "book created");
    Ok((StatusCode::CREATED, Json(book)))
}

/// Replace every field of an existing book; the path id wins over any body id
async fn update_book(
    State(store): State<Arc<BookStore>>,
    Path(id): Path<String>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<Json<Book>, AppError> {
    let _op = ScopedCounter::new(BOOK_OPERATIONS_TOTAL, &[("operation", "update")]);
    if !store.contains(&id).await {
        return Err(book_not_found());
    }

    let Json(payload) = payload?;
    payload.validate().map_err(AppError::validation)?;

    // The book may have been deleted between the check and the write.
    store
        .replace(&id, payload)
        .await
        .map(Json)
        .ok_or_else(book_not_found)
}

async fn delete_book(
    State(store): State<Arc<BookStore>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let _op = ScopedCounter::new(BOOK_OPERATIONS_TOTAL, &[("operation", "delete")]);
    match store.remove(&id).await {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(book_not_found()),
    }
}

/// Create a books module seeded with sample data
pub fn create_module() -> Arc<dyn Module> {
    Arc::new(BooksModule::new(Arc::new(BookStore::with_samples())))
}
