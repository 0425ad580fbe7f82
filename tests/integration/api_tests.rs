//! API integration tests against a running server

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:8080";

fn unique_isbn() -> String {
    format!("978-{}", &Uuid::new_v4().simple().to_string()[..10])
}

async fn create_book(client: &Client, isbn: &str, copies_total: i32) -> reqwest::Response {
    client
        .post(format!("{}/v1/books", BASE_URL))
        .json(&json!({
            "title": "The Great Gatsby",
            "author": "F. Scott Fitzgerald",
            "isbn": isbn,
            "published_year": 1925,
            "copies_total": copies_total
        }))
        .send()
        .await
        .expect("Failed to send create request")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/healthz", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.expect("Failed to read body"), "ok");
}

#[tokio::test]
#[ignore]
async fn test_readiness_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/readyz", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore]
async fn test_book_lifecycle() {
    let client = Client::new();
    let isbn = unique_isbn();

    // Create
    let response = create_book(&client, &isbn, 5).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let book: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(book["copies_total"], 5);
    assert_eq!(book["copies_available"], 5);
    let id = book["id"].as_str().expect("No id in response").to_string();

    // Duplicate ISBN
    let response = create_book(&client, &isbn, 1).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"]["code"], "conflict");

    // Unknown id
    let response = client
        .get(format!("{}/v1/books/{}", BASE_URL, Uuid::new_v4()))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Fetch
    let response = client
        .get(format!("{}/v1/books/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(fetched["isbn"], isbn.as_str());

    // Update breaking the inventory invariant
    let response = client
        .put(format!("{}/v1/books/{}", BASE_URL, id))
        .json(&json!({
            "title": "The Great Gatsby",
            "author": "F. Scott Fitzgerald",
            "isbn": isbn,
            "copies_total": 5,
            "copies_available": 6
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"]["code"], "bad_request");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap_or_default()
        .contains("copies_available must be <= copies_total"));

    // Valid update
    let response = client
        .put(format!("{}/v1/books/{}", BASE_URL, id))
        .json(&json!({
            "title": "The Great Gatsby",
            "author": "F. Scott Fitzgerald",
            "isbn": isbn,
            "copies_total": 5,
            "copies_available": 3
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(updated["copies_available"], 3);
    assert_eq!(updated["created_at"], book["created_at"]);

    // Delete, then it is gone
    let response = client
        .delete(format!("{}/v1/books/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .get(format!("{}/v1/books/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn test_list_books_by_isbn() {
    let client = Client::new();
    let isbn = unique_isbn();

    let response = create_book(&client, &isbn, 2).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = client
        .get(format!("{}/v1/books", BASE_URL))
        .query(&[("isbn", isbn.as_str()), ("limit", "10")])
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let books: Vec<Value> = response.json().await.expect("Failed to parse response");
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["isbn"], isbn.as_str());
}

#[tokio::test]
#[ignore]
async fn test_invalid_json_is_bad_request() {
    let client = Client::new();

    let response = client
        .post(format!("{}/v1/books", BASE_URL))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"]["message"], "Invalid JSON body");
}
