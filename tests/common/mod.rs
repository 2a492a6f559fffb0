#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use quill::modules::users::model::{NewUser, User, UserPatch};
use quill::modules::users::service::UserService;
use quill::router::init_router;
use quill::state::AppState;
use quill_auth::create_access_token;
use quill_config::{CorsConfig, JwtConfig, UsersConfig};
use quill_models::LOCAL_PROVIDER;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "testpass123";

pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password: String,
    pub roles: Vec<String>,
}

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret-at-least-32-chars".to_string(),
        access_token_expiry: 3600,
    }
}

pub fn test_state(pool: PgPool) -> AppState {
    AppState {
        db: pool,
        jwt_config: test_jwt_config(),
        cors_config: CorsConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
        users_config: UsersConfig::default(),
    }
}

pub fn setup_test_app(pool: PgPool) -> Router {
    init_router(test_state(pool))
}

pub fn unique_username() -> String {
    format!("user_{}", &Uuid::new_v4().simple().to_string()[..12])
}

/// Creates a local user through the model's save hooks.
pub async fn create_test_user(pool: &PgPool, roles: &[&str]) -> TestUser {
    let username = unique_username();
    let email = format!("{username}@test.com");

    let mut user = User::new(NewUser {
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        email: Some(email.clone()),
        username: username.clone(),
        provider: LOCAL_PROVIDER.to_string(),
        profile_image_url: UsersConfig::default().default_profile_image_url,
    });
    user.set_password(TEST_PASSWORD);
    user.patch(UserPatch {
        roles: Some(roles.iter().map(|r| r.to_string()).collect()),
        ..Default::default()
    });
    UserService::save(pool, &mut user).await.unwrap();

    TestUser {
        id: user.id,
        username,
        email,
        password: TEST_PASSWORD.to_string(),
        roles: user.roles.clone(),
    }
}

pub fn token_for(user: &TestUser) -> String {
    create_access_token(
        user.id,
        &user.username,
        Some(&user.email),
        &user.roles,
        &test_jwt_config(),
    )
    .unwrap()
}

/// Sends one request through a fresh router and returns the status and the
/// JSON body (`Value::Null` when the body is empty).
pub async fn send(
    pool: &PgPool,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = setup_test_app(pool.clone())
        .oneshot(request)
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}
