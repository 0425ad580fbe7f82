//! Repository integration tests against a live PostgreSQL
//!
//! Run with: DATABASE_URL=postgres://... cargo test -- --ignored

use std::time::Duration;

use library_server::{
    config::DatabaseConfig,
    db,
    models::{Book, BookFilter},
    repository::{BooksRepository, BooksStore},
    AppError,
};
use sqlx::PgPool;
use uuid::Uuid;

async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let config = DatabaseConfig {
        url: Some(url),
        connect_attempts: 1,
        ..DatabaseConfig::default()
    };
    db::connect_and_migrate(&config)
        .await
        .expect("Failed to connect to test database")
}

fn sample_book(title: &str, copies_total: i32) -> Book {
    let now = chrono::Utc::now();
    Book {
        id: Uuid::new_v4(),
        title: title.to_string(),
        author: "Test Author".to_string(),
        isbn: format!("isbn-{}", Uuid::new_v4()),
        published_year: Some(2001),
        copies_total,
        copies_available: copies_total,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
#[ignore]
async fn test_create_then_get() {
    let repo = BooksRepository::new(pool().await);

    let created = repo
        .create(sample_book("Repository Create", 3))
        .await
        .expect("create failed");
    let fetched = repo.get(created.id).await.expect("get failed");

    assert_eq!(fetched, created);
    assert_eq!(fetched.copies_available, 3);

    repo.delete(created.id).await.expect("cleanup failed");
}

#[tokio::test]
#[ignore]
async fn test_duplicate_isbn_is_conflict() {
    let repo = BooksRepository::new(pool().await);

    let first = repo
        .create(sample_book("Duplicate A", 1))
        .await
        .expect("create failed");

    let mut second = sample_book("Duplicate B", 1);
    second.isbn = first.isbn.clone();
    let result = repo.create(second).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    repo.delete(first.id).await.expect("cleanup failed");
}

#[tokio::test]
#[ignore]
async fn test_copies_constraint_is_bad_request() {
    let repo = BooksRepository::new(pool().await);

    let mut book = sample_book("Overdrawn", 2);
    book.copies_available = 3;
    let result = repo.create(book).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))), "got {result:?}");

    let created = repo
        .create(sample_book("Shrinking", 2))
        .await
        .expect("create failed");
    let mut changed = created.clone();
    changed.copies_total = 1;
    let result = repo.update(changed).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))), "got {result:?}");

    repo.delete(created.id).await.expect("cleanup failed");
}

#[tokio::test]
#[ignore]
async fn test_update_keeps_created_at_and_advances_updated_at() {
    let repo = BooksRepository::new(pool().await);

    let created = repo
        .create(sample_book("Before Update", 4))
        .await
        .expect("create failed");

    tokio::time::sleep(Duration::from_millis(10)).await;

    let mut changed = created.clone();
    changed.title = "After Update".to_string();
    changed.copies_available = 2;
    let updated = repo.update(changed).await.expect("update failed");

    assert_eq!(updated.title, "After Update");
    assert_eq!(updated.copies_available, 2);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);

    repo.delete(created.id).await.expect("cleanup failed");
}

#[tokio::test]
#[ignore]
async fn test_update_missing_book_is_not_found() {
    let repo = BooksRepository::new(pool().await);

    let result = repo.update(sample_book("Ghost", 1)).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
#[ignore]
async fn test_delete_then_get_is_not_found() {
    let repo = BooksRepository::new(pool().await);

    let created = repo
        .create(sample_book("To Delete", 1))
        .await
        .expect("create failed");
    repo.delete(created.id).await.expect("delete failed");

    assert!(matches!(repo.get(created.id).await, Err(AppError::NotFound(_))));
    assert!(matches!(
        repo.delete(created.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
#[ignore]
async fn test_list_filters_title_case_insensitively_newest_first() {
    let repo = BooksRepository::new(pool().await);
    let marker = Uuid::new_v4().simple().to_string();

    let older = repo
        .create(sample_book(&format!("Older {} Volume", marker), 1))
        .await
        .expect("create failed");
    tokio::time::sleep(Duration::from_millis(10)).await;
    let newer = repo
        .create(sample_book(&format!("Newer {} Volume", marker), 1))
        .await
        .expect("create failed");

    let filter = BookFilter {
        title: Some(marker.to_uppercase()),
        ..BookFilter::default()
    };
    let books = repo.list(filter).await.expect("list failed");

    let ids: Vec<Uuid> = books.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);

    let filter = BookFilter {
        title: Some(marker),
        limit: 1,
        offset: 1,
        ..BookFilter::default()
    };
    let page = repo.list(filter).await.expect("list failed");
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, older.id);

    repo.delete(older.id).await.expect("cleanup failed");
    repo.delete(newer.id).await.expect("cleanup failed");
}
