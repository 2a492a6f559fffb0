use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;
use utoipa::ToSchema;

use quill_core::AppError;

use super::model::{
    AuthResponse, ForgotPasswordDto, MessageResponse, ResetPasswordDto, SigninDto, SignupDto,
    VerifyEmailDto,
};
use super::service::AuthService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[derive(ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Register a local account
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupDto,
    responses(
        (status = 201, description = "Account created and signed in", body = AuthResponse),
        (status = 409, description = "Username or email already exists", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<SignupDto>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let response =
        AuthService::signup(&state.db, dto, &state.jwt_config, &state.users_config).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Sign in with username or email
#[utoipa::path(
    post,
    path = "/api/auth/signin",
    request_body = SigninDto,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Invalid username or password", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn signin(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<SigninDto>,
) -> Result<Json<AuthResponse>, AppError> {
    let response = AuthService::signin(&state.db, dto, &state.jwt_config).await?;
    Ok(Json(response))
}

/// Confirm an email address
#[utoipa::path(
    post,
    path = "/api/auth/verify-email",
    request_body = VerifyEmailDto,
    responses(
        (status = 200, description = "Email verified", body = MessageResponse),
        (status = 400, description = "Invalid verification token", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn verify_email(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<VerifyEmailDto>,
) -> Result<Json<MessageResponse>, AppError> {
    Ok(Json(AuthService::verify_email(&state.db, dto).await?))
}

/// Request a password reset token
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    request_body = ForgotPasswordDto,
    responses(
        (status = 200, description = "Generic acknowledgement", body = MessageResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<ForgotPasswordDto>,
) -> Result<Json<MessageResponse>, AppError> {
    Ok(Json(
        AuthService::forgot_password(&state.db, dto, &state.users_config).await?,
    ))
}

/// Reset a password with a reset token
#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    request_body = ResetPasswordDto,
    responses(
        (status = 200, description = "Password reset", body = MessageResponse),
        (status = 400, description = "Token invalid or expired", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<ResetPasswordDto>,
) -> Result<Json<MessageResponse>, AppError> {
    Ok(Json(AuthService::reset_password(&state.db, dto).await?))
}
