//! Book (catalog entry) model and request shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Book record as persisted and returned by the API.
///
/// `copies_available` never exceeds `copies_total` for a stored row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub isbn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
    /// Copies owned by the library
    pub copies_total: i32,
    /// Copies currently on the shelf
    pub copies_available: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create book request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "author is required"))]
    pub author: String,
    #[validate(length(min = 1, message = "isbn is required"))]
    pub isbn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
    #[validate(range(min = 0, message = "copies_total must be >= 0"))]
    pub copies_total: i32,
    /// Defaults to `copies_total` when omitted
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, message = "copies_available must be >= 0"))]
    pub copies_available: Option<i32>,
}

/// Update book request. Replaces every mutable field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "author is required"))]
    pub author: String,
    #[validate(length(min = 1, message = "isbn is required"))]
    pub isbn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
    #[validate(range(min = 0, message = "copies_total must be >= 0"))]
    pub copies_total: i32,
    #[validate(range(min = 0, message = "copies_available must be >= 0"))]
    pub copies_available: i32,
}

/// Book list query parameters (API).
///
/// Kept as raw strings: empty values mean "no filter" and unparsable
/// `limit`/`offset` fall back to 0. A repeated key keeps its first value.
#[derive(Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Case-insensitive substring of the title
    pub title: Option<String>,
    /// Case-insensitive substring of the author
    pub author: Option<String>,
    /// Exact ISBN
    pub isbn: Option<String>,
    /// Maximum number of rows (0 = unbounded)
    #[param(value_type = Option<i64>)]
    pub limit: Option<String>,
    /// Rows to skip (0 = none)
    #[param(value_type = Option<i64>)]
    pub offset: Option<String>,
}

impl BookQuery {
    /// Collect known parameters from decoded query pairs; unknown keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();

        for (key, value) in pairs {
            let slot = match key.as_str() {
                "title" => &mut query.title,
                "author" => &mut query.author,
                "isbn" => &mut query.isbn,
                "limit" => &mut query.limit,
                "offset" => &mut query.offset,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }

        query
    }
}

/// Filter applied when listing books
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl From<BookQuery> for BookFilter {
    fn from(query: BookQuery) -> Self {
        fn non_empty(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.is_empty())
        }

        fn number(value: Option<String>) -> i64 {
            value.and_then(|v| v.parse().ok()).unwrap_or(0)
        }

        Self {
            title: non_empty(query.title),
            author: non_empty(query.author),
            isbn: non_empty(query.isbn),
            limit: number(query.limit),
            offset: number(query.offset),
        }
    }
}

impl From<CreateBook> for Book {
    /// Mint a new book from a create request. Timestamps are placeholders
    /// until the store assigns them.
    fn from(request: CreateBook) -> Self {
        let now = Utc::now();
        let copies_available = request.copies_available.unwrap_or(request.copies_total);

        Self {
            id: Uuid::new_v4(),
            title: request.title,
            author: request.author,
            isbn: request.isbn,
            published_year: request.published_year,
            copies_total: request.copies_total,
            copies_available,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Book {
    /// Replace the mutable fields with those of `request`, keeping id and
    /// creation time.
    pub fn apply_update(mut self, request: UpdateBook) -> Self {
        self.title = request.title;
        self.author = request.author;
        self.isbn = request.isbn;
        self.published_year = request.published_year;
        self.copies_total = request.copies_total;
        self.copies_available = request.copies_available;
        self
    }
}
