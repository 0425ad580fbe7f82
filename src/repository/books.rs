//! Books repository for database operations.

use async_trait::async_trait;
use sqlx::{postgres::PgArguments, query::QueryAs, Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookFilter},
};

const BOOK_COLUMNS: &str = "id, title, author, isbn, published_year, copies_total, copies_available, created_at, updated_at";

/// Persistence port for books. Every method is a single statement.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BooksStore: Send + Sync {
    /// Insert a new book; the store assigns both timestamps.
    async fn create(&self, book: Book) -> AppResult<Book>;

    async fn get(&self, id: Uuid) -> AppResult<Book>;

    /// Replace every mutable column of an existing book.
    async fn update(&self, book: Book) -> AppResult<Book>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// Books matching `filter`, newest first.
    async fn list(&self, filter: BookFilter) -> AppResult<Vec<Book>>;

    /// Round trip to the store.
    async fn ping(&self) -> AppResult<()>;
}

/// Value bound to a positional placeholder in a list query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryArg {
    Text(String),
    Int(i64),
}

/// Incrementally assembled `SELECT` over `books`.
///
/// Predicates are kept as (clause, value) pairs; placeholders are only
/// numbered when the SQL text is rendered, so values never reach the text.
#[derive(Debug, Default)]
pub struct ListQuery {
    predicates: Vec<(&'static str, QueryArg)>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl ListQuery {
    pub fn from_filter(filter: &BookFilter) -> Self {
        let mut query = Self::default();

        if let Some(title) = filter.title.as_deref().filter(|t| !t.is_empty()) {
            query.push("title ILIKE", QueryArg::Text(contains_pattern(title)));
        }
        if let Some(author) = filter.author.as_deref().filter(|a| !a.is_empty()) {
            query.push("author ILIKE", QueryArg::Text(contains_pattern(author)));
        }
        if let Some(isbn) = filter.isbn.as_deref().filter(|i| !i.is_empty()) {
            query.push("isbn =", QueryArg::Text(isbn.to_string()));
        }

        query.limit = (filter.limit > 0).then_some(filter.limit);
        query.offset = (filter.offset > 0).then_some(filter.offset);
        query
    }

    fn push(&mut self, clause: &'static str, value: QueryArg) {
        self.predicates.push((clause, value));
    }

    /// Render the SQL text and the arguments in placeholder order.
    pub fn build(self) -> (String, Vec<QueryArg>) {
        let mut sql = format!("SELECT {} FROM books", BOOK_COLUMNS);
        let mut args = Vec::with_capacity(self.predicates.len() + 2);

        let conditions: Vec<String> = self
            .predicates
            .into_iter()
            .enumerate()
            .map(|(idx, (clause, value))| {
                args.push(value);
                format!("{} ${}", clause, idx + 1)
            })
            .collect();

        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        sql.push_str(" ORDER BY created_at DESC");

        if let Some(limit) = self.limit {
            args.push(QueryArg::Int(limit));
            sql.push_str(&format!(" LIMIT ${}", args.len()));
        }
        if let Some(offset) = self.offset {
            args.push(QueryArg::Int(offset));
            sql.push_str(&format!(" OFFSET ${}", args.len()));
        }

        (sql, args)
    }
}

/// `%value%` with LIKE metacharacters escaped so the value matches literally.
fn contains_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Translate store signals into domain errors.
fn map_write_error(error: sqlx::Error, id: Uuid) -> AppError {
    match error {
        sqlx::Error::RowNotFound => AppError::NotFound(format!("Book {} not found", id)),
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("A book with this ISBN already exists".to_string())
        }
        sqlx::Error::Database(ref db_err) if db_err.is_check_violation() => AppError::BadRequest(
            format!(
                "Book violates constraint {}",
                db_err.constraint().unwrap_or("check")
            ),
        ),
        other => other.into(),
    }
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BooksStore for BooksRepository {
    async fn create(&self, book: Book) -> AppResult<Book> {
        let id = book.id;

        let created = sqlx::query_as::<_, Book>(&format!(
            r#"
            INSERT INTO books (id, title, author, isbn, published_year, copies_total, copies_available, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW())
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.published_year)
        .bind(book.copies_total)
        .bind(book.copies_available)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, id))?;

        tracing::info!("Created book id={} isbn={}", created.id, created.isbn);
        Ok(created)
    }

    async fn get(&self, id: Uuid) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(&format!("SELECT {} FROM books WHERE id = $1", BOOK_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    async fn update(&self, book: Book) -> AppResult<Book> {
        let id = book.id;

        let updated = sqlx::query_as::<_, Book>(&format!(
            r#"
            UPDATE books SET
                title = $2,
                author = $3,
                isbn = $4,
                published_year = $5,
                copies_total = $6,
                copies_available = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.published_year)
        .bind(book.copies_total)
        .bind(book.copies_available)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, id))?;

        tracing::info!("Updated book id={}", updated.id);
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }

        tracing::info!("Deleted book id={}", id);
        Ok(())
    }

    async fn list(&self, filter: BookFilter) -> AppResult<Vec<Book>> {
        let (sql, args) = ListQuery::from_filter(&filter).build();
        tracing::debug!("Listing books: {} ({} args)", sql, args.len());

        let mut query: QueryAs<'_, Postgres, Book, PgArguments> = sqlx::query_as(&sql);
        for arg in args {
            query = match arg {
                QueryArg::Text(value) => query.bind(value),
                QueryArg::Int(value) => query.bind(value),
            };
        }

        let books = query.fetch_all(&self.pool).await?;
        Ok(books)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}
