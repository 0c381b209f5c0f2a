//! Functional tests for the books API.
//!
//! Drives the fully assembled router (middleware, module mounting, handlers,
//! store) through `tower::ServiceExt::oneshot`, asserting on the exact
//! response bodies the API contract fixes.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use shelf_kernel::settings::{DatabaseSettings, Settings};
use shelf_kernel::ModuleRegistry;
use shelf_store::BookStore;

async fn test_app() -> Router {
    let mut settings = Settings::default();
    settings.database = DatabaseSettings {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
    };

    let store = BookStore::connect(&settings.database).await.unwrap();

    let mut registry = ModuleRegistry::new();
    shelf_app::modules::register_all(&mut registry, store.clone());

    store
        .apply_migrations(&registry.collect_migrations())
        .await
        .unwrap();

    shelf_http::build_router(&registry, &settings)
}

async fn get_request(app: &Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, String::from_utf8(body.to_vec()).unwrap())
}

async fn post_request(app: &Router, uri: &str, body: Value) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .method("POST")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let response_body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, String::from_utf8(response_body.to_vec()).unwrap())
}

async fn post_form_request(app: &Router, uri: &str, body: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .method("POST")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let response_body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, String::from_utf8(response_body.to_vec()).unwrap())
}

async fn delete_request(app: &Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .method("DELETE")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, String::from_utf8(body.to_vec()).unwrap())
}

async fn create_book(app: &Router, title: &str) -> Value {
    let (status, body) = post_request(app, "/api/books", json!({ "title": title })).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_str(&body).unwrap()
}

#[tokio::test]
async fn create_book_returns_title_and_id() {
    let app = test_app().await;

    let book = create_book(&app, "The Left Hand of Darkness").await;

    assert_eq!(book["title"], "The Left Hand of Darkness");
    assert!(book["_id"].is_string());
}

#[tokio::test]
async fn create_book_strips_markup_from_title() {
    let app = test_app().await;

    let (status, body) =
        post_request(&app, "/api/books", json!({ "title": "TEST Keep On <b>Rocking</b>" })).await;

    assert_eq!(status, StatusCode::OK);
    let book: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(book["title"], "TEST Keep On Rocking");
}

#[tokio::test]
async fn create_book_without_title_is_rejected() {
    let app = test_app().await;

    let (status, body) = post_request(&app, "/api/books", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "missing required field title");

    // An empty string counts as missing too.
    let (_, body) = post_request(&app, "/api/books", json!({ "title": "" })).await;
    assert_eq!(body, "missing required field title");
}

#[tokio::test]
async fn markup_only_title_is_rejected_after_sanitization() {
    let app = test_app().await;

    let (status, body) = post_request(
        &app,
        "/api/books",
        json!({ "title": "<img src=x onerror=alert(1)>" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "sanitized title is empty");
}

#[tokio::test]
async fn create_book_with_empty_body_reports_missing_title() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/books")
                .method("POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(
        String::from_utf8(body.to_vec()).unwrap(),
        "missing required field title"
    );
}

#[tokio::test]
async fn titles_with_literal_ampersands_roundtrip() {
    let app = test_app().await;

    let created = create_book(&app, "War & Peace").await;
    assert_eq!(created["title"], "War & Peace");

    let id = created["_id"].as_str().unwrap();
    let (_, body) = get_request(&app, &format!("/api/books/{id}")).await;
    let book: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(book["title"], "War & Peace");
}

#[tokio::test]
async fn create_book_accepts_form_encoded_bodies() {
    let app = test_app().await;

    let (status, body) = post_form_request(&app, "/api/books", "title=Form+Posted+Book").await;

    assert_eq!(status, StatusCode::OK);
    let book: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(book["title"], "Form Posted Book");
}

#[tokio::test]
async fn created_book_can_be_fetched_with_same_title() {
    let app = test_app().await;

    let created = create_book(&app, "Invisible Cities").await;
    let id = created["_id"].as_str().unwrap();

    let (status, body) = get_request(&app, &format!("/api/books/{id}")).await;
    assert_eq!(status, StatusCode::OK);

    let book: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(book["_id"], created["_id"]);
    assert_eq!(book["title"], "Invisible Cities");
    assert_eq!(book["comments"], json!([]));
}

#[tokio::test]
async fn listing_exposes_summaries_with_comment_counts() {
    let app = test_app().await;

    let first = create_book(&app, "Dune").await;
    create_book(&app, "Emma").await;
    let id = first["_id"].as_str().unwrap();
    post_request(
        &app,
        &format!("/api/books/{id}"),
        json!({ "comment": "a classic" }),
    )
    .await;

    let (status, body) = get_request(&app, "/api/books").await;
    assert_eq!(status, StatusCode::OK);

    let books: Value = serde_json::from_str(&body).unwrap();
    let books = books.as_array().unwrap();
    assert_eq!(books.len(), 2);

    let dune = books
        .iter()
        .find(|book| book["title"] == "Dune")
        .unwrap();
    assert_eq!(dune["commentcount"], 1);
    assert!(dune["_id"].is_string());
    assert!(dune.get("comments").is_none());
}

#[tokio::test]
async fn fetching_unknown_and_malformed_ids_differ() {
    let app = test_app().await;

    let (status, body) =
        get_request(&app, &format!("/api/books/{}", Uuid::now_v7())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "no book exists");

    let (status, body) = get_request(&app, "/api/books/not-a-valid-id").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "cannot get book");
}

#[tokio::test]
async fn comments_append_in_order() {
    let app = test_app().await;

    let created = create_book(&app, "The Trial").await;
    let id = created["_id"].as_str().unwrap();
    let uri = format!("/api/books/{id}");

    for comment in ["first", "second", "third"] {
        let (status, body) = post_request(&app, &uri, json!({ "comment": comment })).await;
        assert_eq!(status, StatusCode::OK);
        let book: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(book["comments"].as_array().unwrap().last().unwrap(), comment);
    }

    let (_, body) = get_request(&app, &uri).await;
    let book: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(book["comments"], json!(["first", "second", "third"]));
}

#[tokio::test]
async fn comment_markup_is_stripped_before_storage() {
    let app = test_app().await;

    let created = create_book(&app, "Annotated").await;
    let id = created["_id"].as_str().unwrap();

    let (_, body) = post_request(
        &app,
        &format!("/api/books/{id}"),
        json!({ "comment": "so <em>good</em>" }),
    )
    .await;

    let book: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(book["comments"], json!(["so good"]));
}

#[tokio::test]
async fn comment_validation_messages_are_exact() {
    let app = test_app().await;

    let created = create_book(&app, "Quiet Book").await;
    let id = created["_id"].as_str().unwrap();
    let uri = format!("/api/books/{id}");

    let (_, body) = post_request(&app, &uri, json!({})).await;
    assert_eq!(body, "missing required field comment");

    let (_, body) = post_request(&app, &uri, json!({ "comment": "<img onerror=alert(1)>" })).await;
    assert_eq!(body, "sanitized comment is empty");
}

#[tokio::test]
async fn commenting_on_unknown_or_malformed_id() {
    let app = test_app().await;

    let (_, body) = post_request(
        &app,
        &format!("/api/books/{}", Uuid::now_v7()),
        json!({ "comment": "hello" }),
    )
    .await;
    assert_eq!(body, "no book exists");

    // Malformed ids fold into the generic failure text on this route.
    let (_, body) = post_request(
        &app,
        "/api/books/not-a-valid-id",
        json!({ "comment": "hello" }),
    )
    .await;
    assert_eq!(body, "cannot post comment");
}

#[tokio::test]
async fn deleting_a_book_twice_reports_no_book_exists() {
    let app = test_app().await;

    let created = create_book(&app, "Ephemeral").await;
    let id = created["_id"].as_str().unwrap();
    let uri = format!("/api/books/{id}");

    let (status, body) = delete_request(&app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "delete successful");

    let (status, body) = delete_request(&app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "no book exists");
}

#[tokio::test]
async fn deleting_with_malformed_id_reports_cannot_delete() {
    let app = test_app().await;

    let (_, body) = delete_request(&app, "/api/books/not-a-valid-id").await;
    assert_eq!(body, "cannot delete book");
}

#[tokio::test]
async fn delete_all_then_list_returns_empty_array() {
    let app = test_app().await;

    create_book(&app, "one").await;
    create_book(&app, "two").await;

    let (status, body) = delete_request(&app, "/api/books").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "complete delete successful");

    let (_, body) = get_request(&app, "/api/books").await;
    let books: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(books, json!([]));
}

#[tokio::test]
async fn health_endpoint_responds() {
    let app = test_app().await;

    let (status, body) = get_request(&app, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}
