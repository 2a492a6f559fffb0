mod common;

use axum::http::StatusCode;
use common::{create_test_user, send, token_for};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

#[sqlx::test(migrations = "./migrations")]
async fn test_list_users_requires_admin(pool: PgPool) {
    let user = create_test_user(&pool, &["user"]).await;
    let admin = create_test_user(&pool, &["user", "admin"]).await;

    let (status, body) = send(&pool, "GET", "/api/users", None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Forbidden resource");

    let (status, _) = send(&pool, "GET", "/api/users", Some(&token_for(&user)), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &pool,
        "GET",
        "/api/users?page=1&per_page=1",
        Some(&token_for(&admin)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 2);
    assert_eq!(body["meta"]["per_page"], 1);
    assert_eq!(body["meta"]["has_more"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert!(body["data"][0].get("hashed_password").is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_get_me(pool: PgPool) {
    let user = create_test_user(&pool, &["user"]).await;

    let (status, body) = send(&pool, "GET", "/api/users/me", Some(&token_for(&user)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], user.username);
    assert!(body.get("salt").is_none());

    let (status, body) = send(&pool, "GET", "/api/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing authorization header");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_me_keeps_password(pool: PgPool) {
    let user = create_test_user(&pool, &["user"]).await;
    let hash_before: String = sqlx::query_scalar("SELECT hashed_password FROM users WHERE id = $1")
        .bind(user.id)
        .fetch_one(&pool)
        .await
        .unwrap();

    let (status, body) = send(
        &pool,
        "PUT",
        "/api/users/me",
        Some(&token_for(&user)),
        Some(json!({ "first_name": "Grace", "last_name": "Hopper" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display_name"], "Grace Hopper");
    assert!(body["updated"].is_string());

    let hash_after: String = sqlx::query_scalar("SELECT hashed_password FROM users WHERE id = $1")
        .bind(user.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(hash_before, hash_after);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_me_username_taken(pool: PgPool) {
    let user = create_test_user(&pool, &["user"]).await;
    let other = create_test_user(&pool, &["user"]).await;

    let (status, body) = send(
        &pool,
        "PUT",
        "/api/users/me",
        Some(&token_for(&user)),
        Some(json!({ "username": other.username })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Username or email already exists");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_password_change(pool: PgPool) {
    let user = create_test_user(&pool, &["user"]).await;
    let token = token_for(&user);

    let (status, body) = send(
        &pool,
        "POST",
        "/api/users/password-change",
        Some(&token),
        Some(json!({
            "current_password": user.password,
            "new_password": "new-password-1",
            "verify_password": "new-password-2"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Passwords do not match");

    let (status, body) = send(
        &pool,
        "POST",
        "/api/users/password-change",
        Some(&token),
        Some(json!({
            "current_password": "not-my-password",
            "new_password": "new-password-1",
            "verify_password": "new-password-1"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Current password is incorrect");

    let (status, _) = send(
        &pool,
        "POST",
        "/api/users/password-change",
        Some(&token),
        Some(json!({
            "current_password": user.password,
            "new_password": "new-password-1",
            "verify_password": "new-password-1"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &pool,
        "POST",
        "/api/auth/signin",
        None,
        Some(json!({ "username_or_email": user.username, "password": "new-password-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_upload_profile_image(pool: PgPool) {
    let user = create_test_user(&pool, &["user"]).await;

    let (status, body) = send(
        &pool,
        "POST",
        "/api/users/upload",
        Some(&token_for(&user)),
        Some(json!({ "profile_image_url": "/uploads/avatar.png" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile_image_url"], "/uploads/avatar.png");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_get_user_by_id(pool: PgPool) {
    let admin = create_test_user(&pool, &["user", "admin"]).await;
    let user = create_test_user(&pool, &["user"]).await;

    let (status, body) = send(
        &pool,
        "GET",
        &format!("/api/users/{}", user.id),
        Some(&token_for(&admin)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], user.username);
    assert!(body.get("hashed_password").is_none());

    let (status, _) = send(
        &pool,
        "GET",
        &format!("/api/users/{}", admin.id),
        Some(&token_for(&user)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_user_lookup_failures(pool: PgPool) {
    let admin = create_test_user(&pool, &["user", "admin"]).await;
    let token = token_for(&admin);

    let (status, body) = send(&pool, "GET", "/api/users/not-an-id", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "User is invalid");

    let (status, body) = send(
        &pool,
        "GET",
        &format!("/api/users/{}", Uuid::new_v4()),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "No user with that identifier has been found");

    // Lookup runs before the role check.
    let (status, body) = send(&pool, "GET", "/api/users/not-an-id", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "User is invalid");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_update_user(pool: PgPool) {
    let admin = create_test_user(&pool, &["user", "admin"]).await;
    let user = create_test_user(&pool, &["user"]).await;
    let uri = format!("/api/users/{}", user.id);

    let (status, body) = send(
        &pool,
        "PUT",
        &uri,
        Some(&token_for(&admin)),
        Some(json!({ "roles": ["user", "admin"], "user_type": "employer" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["roles"], json!(["user", "admin"]));
    assert_eq!(body["user_type"], "employer");

    for roles in [json!([]), json!(["superuser"])] {
        let (status, _) = send(
            &pool,
            "PUT",
            &uri,
            Some(&token_for(&admin)),
            Some(json!({ "roles": roles })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_user_deactivates(pool: PgPool) {
    let admin = create_test_user(&pool, &["user", "admin"]).await;
    let user = create_test_user(&pool, &["user"]).await;

    let (status, body) = send(
        &pool,
        "DELETE",
        &format!("/api/users/{}", user.id),
        Some(&token_for(&admin)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active"], false);

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE id = $1")
        .bind(user.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 1);

    let (status, _) = send(
        &pool,
        "POST",
        "/api/auth/signin",
        None,
        Some(json!({ "username_or_email": user.username, "password": user.password })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_unrelated_update_keeps_display_name(pool: PgPool) {
    let user = create_test_user(&pool, &["user"]).await;
    let token = token_for(&user);

    let (status, _) = send(
        &pool,
        "PUT",
        "/api/users/me",
        Some(&token),
        Some(json!({ "display_name": "Countess" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &pool,
        "POST",
        "/api/users/upload",
        Some(&token),
        Some(json!({ "profile_image_url": "/uploads/ada.png" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display_name"], "Countess");
}
