mod common;

use axum::http::StatusCode;
use common::{TestUser, create_test_user, send, token_for};
use serde_json::{Value, json};
use sqlx::PgPool;
use uuid::Uuid;

async fn create_article(pool: &PgPool, author: &TestUser, title: &str) -> Value {
    let (status, body) = send(
        pool,
        "POST",
        "/api/articles",
        Some(&token_for(author)),
        Some(json!({ "title": title, "content": "  Body text  " })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_articles_is_public(pool: PgPool) {
    let author = create_test_user(&pool, &["user"]).await;
    create_article(&pool, &author, "First").await;
    create_article(&pool, &author, "Second").await;

    let (status, body) = send(&pool, "GET", "/api/articles", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 2);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_article(pool: PgPool) {
    let author = create_test_user(&pool, &["user"]).await;

    let body = create_article(&pool, &author, "  Hello world  ").await;
    assert_eq!(body["title"], "Hello world");
    assert_eq!(body["content"], "Body text");
    assert_eq!(body["user_id"], author.id.to_string());
    assert!(body["updated"].is_null());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_article_requires_signed_in_user(pool: PgPool) {
    let (status, body) = send(
        &pool,
        "POST",
        "/api/articles",
        None,
        Some(json!({ "title": "Anonymous" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Forbidden resource");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_article_invalid_body(pool: PgPool) {
    let author = create_test_user(&pool, &["user"]).await;
    let token = token_for(&author);

    let (status, body) = send(
        &pool,
        "POST",
        "/api/articles",
        Some(&token),
        Some(json!({ "title": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Title cannot be blank");

    let (status, _) = send(
        &pool,
        "POST",
        "/api/articles",
        Some(&token),
        Some(json!({ "content": "no title" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_read_article(pool: PgPool) {
    let author = create_test_user(&pool, &["user"]).await;
    let created = create_article(&pool, &author, "Readable").await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(&pool, "GET", &format!("/api/articles/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, created);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_article_lookup_failures(pool: PgPool) {
    let (status, body) = send(&pool, "GET", "/api/articles/not-an-id", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Article is invalid");

    let (status, body) = send(
        &pool,
        "GET",
        &format!("/api/articles/{}", Uuid::new_v4()),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "No article with that identifier has been found");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_article_by_author_and_admin(pool: PgPool) {
    let author = create_test_user(&pool, &["user"]).await;
    let admin = create_test_user(&pool, &["user", "admin"]).await;
    let created = create_article(&pool, &author, "Draft").await;
    let uri = format!("/api/articles/{}", created["id"].as_str().unwrap());

    let (status, body) = send(
        &pool,
        "PUT",
        &uri,
        Some(&token_for(&author)),
        Some(json!({ "title": "Final" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Final");
    assert_eq!(body["content"], "Body text");
    assert!(body["updated"].is_string());

    let (status, body) = send(
        &pool,
        "PUT",
        &uri,
        Some(&token_for(&admin)),
        Some(json!({ "content": "Edited by an admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "Edited by an admin");
    assert_eq!(body["user_id"], author.id.to_string());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_non_author_cannot_modify(pool: PgPool) {
    let author = create_test_user(&pool, &["user"]).await;
    let stranger = create_test_user(&pool, &["user"]).await;
    let created = create_article(&pool, &author, "Mine").await;
    let uri = format!("/api/articles/{}", created["id"].as_str().unwrap());

    let (status, body) = send(
        &pool,
        "PUT",
        &uri,
        Some(&token_for(&stranger)),
        Some(json!({ "title": "Yours now" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "User is not authorized");

    let (status, _) = send(&pool, "DELETE", &uri, Some(&token_for(&stranger)), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&pool, "DELETE", &uri, None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_article(pool: PgPool) {
    let author = create_test_user(&pool, &["user"]).await;
    let created = create_article(&pool, &author, "Short lived").await;
    let uri = format!("/api/articles/{}", created["id"].as_str().unwrap());

    let (status, body) = send(&pool, "DELETE", &uri, Some(&token_for(&author)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], created["id"]);

    let (status, body) = send(&pool, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "No article with that identifier has been found");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_articles_far_page_is_empty(pool: PgPool) {
    let author = create_test_user(&pool, &["user"]).await;
    create_article(&pool, &author, "Only one").await;

    let (status, body) = send(
        &pool,
        "GET",
        "/api/articles?page=9223372036854775807&per_page=100",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["meta"]["has_more"], false);
}
