//! Book catalog service

use std::{future::Future, sync::Arc, time::Duration};

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookFilter, CreateBook, UpdateBook},
    repository::BooksStore,
};

use super::validation::{validate_copies_available, validate_create, validate_update};

/// Upper bounds on each store call, applied on top of the caller's own
/// lifetime (a dropped request cancels the call).
#[derive(Debug, Clone, Copy)]
pub struct OperationTimeouts {
    pub create: Duration,
    pub get: Duration,
    pub update: Duration,
    pub delete: Duration,
    pub list: Duration,
    pub ping: Duration,
}

impl Default for OperationTimeouts {
    fn default() -> Self {
        Self {
            create: Duration::from_secs(5),
            get: Duration::from_secs(5),
            update: Duration::from_secs(5),
            delete: Duration::from_secs(5),
            list: Duration::from_secs(10),
            ping: Duration::from_secs(3),
        }
    }
}

#[derive(Clone)]
pub struct BooksService {
    store: Arc<dyn BooksStore>,
    timeouts: OperationTimeouts,
}

impl BooksService {
    pub fn new(store: Arc<dyn BooksStore>) -> Self {
        Self::with_timeouts(store, OperationTimeouts::default())
    }

    pub fn with_timeouts(store: Arc<dyn BooksStore>, timeouts: OperationTimeouts) -> Self {
        Self { store, timeouts }
    }

    /// Create a new book. `copies_available` defaults to `copies_total`.
    pub async fn create(&self, request: CreateBook) -> AppResult<Book> {
        validate_create(&request)?;

        let book = Book::from(request);
        validate_copies_available(book.copies_available, book.copies_total)?;

        with_timeout("create", self.timeouts.create, self.store.create(book)).await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Book> {
        with_timeout("get", self.timeouts.get, self.store.get(id)).await
    }

    /// Replace every mutable field of an existing book
    pub async fn update(&self, id: Uuid, request: UpdateBook) -> AppResult<Book> {
        validate_update(&request)?;
        validate_copies_available(request.copies_available, request.copies_total)?;

        let existing = self.get(id).await?;
        let book = existing.apply_update(request);

        with_timeout("update", self.timeouts.update, self.store.update(book)).await
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        with_timeout("delete", self.timeouts.delete, self.store.delete(id)).await
    }

    pub async fn list(&self, filter: BookFilter) -> AppResult<Vec<Book>> {
        with_timeout("list", self.timeouts.list, self.store.list(filter)).await
    }

    /// Check that the store answers (readiness probe)
    pub async fn ping(&self) -> AppResult<()> {
        with_timeout("ping", self.timeouts.ping, self.store.ping()).await
    }
}

async fn with_timeout<T>(
    operation: &'static str,
    limit: Duration,
    call: impl Future<Output = AppResult<T>>,
) -> AppResult<T> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("Book {} timed out after {:?}", operation, limit);
            Err(AppError::Internal(format!(
                "book {} timed out after {:?}",
                operation, limit
            )))
        }
    }
}
