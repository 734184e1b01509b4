mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{empty_request, json_request, read_json, test_app};
use serde_json::json;
use tower::ServiceExt;

fn new_book() -> serde_json::Value {
    json!({
        "title": "The Rust Programming Language",
        "author": "Steve Klabnik",
        "description": "The official book on Rust",
        "price": 39.99
    })
}

async fn book_count(app: &axum::Router) -> usize {
    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/v1/books"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    read_json(response).await.as_array().unwrap().len()
}

#[tokio::test]
async fn lists_seeded_books() {
    let app = test_app().await;
    assert_eq!(book_count(&app).await, 3);
}

#[tokio::test]
async fn created_book_gets_a_fresh_id_and_can_be_fetched() {
    let app = test_app().await;

    let mut body = new_book();
    body["id"] = json!("client-chosen");
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/v1/books", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = read_json(response).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_ne!(id, "client-chosen");
    assert!(uuid::Uuid::parse_str(&id).is_ok());
    assert_eq!(created["price"], 39.99);

    let response = app
        .oneshot(empty_request("GET", &format!("/api/v1/books/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, created);
}

#[tokio::test]
async fn invalid_create_is_rejected_without_mutation() {
    let app = test_app().await;

    let mut missing_price = new_book();
    missing_price.as_object_mut().unwrap().remove("price");
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/v1/books", missing_price))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(read_json(response).await["error"].is_string());

    let mut blank_title = new_book();
    blank_title["title"] = json!("");
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/v1/books", blank_title))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let malformed = Request::builder()
        .method("POST")
        .uri("/api/v1/books")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(malformed).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(book_count(&app).await, 3);
}

#[tokio::test]
async fn get_of_unknown_book_is_not_found() {
    let app = test_app().await;
    let response = app
        .oneshot(empty_request("GET", "/api/v1/books/nope"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json(response).await, json!({ "error": "Book not found" }));
}

#[tokio::test]
async fn update_replaces_fields_and_keeps_the_path_id() {
    let app = test_app().await;
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/v1/books", new_book()))
        .await
        .unwrap();
    let id = read_json(response).await["id"].as_str().unwrap().to_string();

    let mut update = new_book();
    update["id"] = json!("other-id");
    update["title"] = json!("Programming Rust");
    update["price"] = json!(49.5);
    let response = app
        .clone()
        .oneshot(json_request("PUT", &format!("/api/v1/books/{id}"), update))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let updated = read_json(response).await;
    assert_eq!(updated["id"], id.as_str());
    assert_eq!(updated["title"], "Programming Rust");
    assert_eq!(updated["price"], 49.5);

    let response = app
        .oneshot(empty_request("GET", "/api/v1/books/other-id"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_of_unknown_book_is_not_found() {
    let app = test_app().await;
    let response = app
        .clone()
        .oneshot(json_request("PUT", "/api/v1/books/missing", new_book()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(book_count(&app).await, 3);
}

#[tokio::test]
async fn deleted_book_is_gone() {
    let app = test_app().await;
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/v1/books", new_book()))
        .await
        .unwrap();
    let id = read_json(response).await["id"].as_str().unwrap().to_string();
    let uri = format!("/api/v1/books/{id}");

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &uri))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(empty_request("GET", &uri))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(empty_request("DELETE", &uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
