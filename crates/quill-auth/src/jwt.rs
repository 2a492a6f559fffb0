//! Access token creation and verification.
//!
//! ```ignore
//! let token = create_access_token(user.id, &user.username, user.email.as_deref(), &user.roles, &config)?;
//! let claims = verify_token(&token, &config)?;
//! ```

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use quill_config::JwtConfig;
use quill_core::AppError;

use crate::claims::Claims;

/// Signs an access token for the given user.
///
/// # Errors
///
/// Returns an internal [`AppError`] if encoding fails.
pub fn create_access_token(
    user_id: Uuid,
    username: &str,
    email: Option<&str>,
    roles: &[String],
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        email: email.map(str::to_string),
        roles: roles.to_vec(),
        exp: (now + jwt_config.access_token_expiry) as usize,
        iat: now as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create token: {e}")))
}

/// Decodes and validates an access token, including its expiry.
///
/// # Errors
///
/// Returns `401 Unauthorized` when the token is malformed, signed with
/// another secret, or expired.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Invalid or expired token".to_string()))
}
