use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use uuid::Uuid;

use quill_auth::{Claims, verify_token};
use quill_core::AppError;
use quill_models::roles;

use crate::state::AppState;

/// The authenticated principal, decoded from the bearer token.
///
/// When the role guard already decoded the token it leaves the principal in
/// the request extensions and the extractor reuses it.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.0.sub)
            .map_err(|_| AppError::unauthorized("Invalid user ID in token".to_string()))
    }

    pub fn roles(&self) -> &[String] {
        &self.0.roles
    }

    pub fn is_admin(&self) -> bool {
        self.0.has_role(roles::ADMIN)
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Missing authorization header".to_string()))?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::unauthorized("Invalid authorization header format".to_string()))
}

/// Principal of the request, if it carries a valid bearer token.
pub fn optional_principal(parts: &Parts, state: &AppState) -> Option<AuthUser> {
    if let Some(user) = parts.extensions.get::<AuthUser>() {
        return Some(user.clone());
    }
    let token = bearer_token(&parts.headers).ok()?;
    verify_token(token, &state.jwt_config).ok().map(AuthUser)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let token = bearer_token(&parts.headers)?;
        let claims = verify_token(token, &state.jwt_config)?;

        Ok(AuthUser(claims))
    }
}
