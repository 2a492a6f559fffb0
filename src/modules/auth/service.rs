use anyhow::{Context, anyhow};
use chrono::{Duration, Utc};
use sqlx::PgPool;
use tracing::instrument;

use quill_auth::create_access_token;
use quill_config::{JwtConfig, UsersConfig};
use quill_core::{AppError, generate_random_token};
use quill_models::LOCAL_PROVIDER;

use super::model::{
    AuthResponse, ForgotPasswordDto, MessageResponse, ResetPasswordDto, SigninDto, SignupDto,
    VerifyEmailDto,
};
use crate::metrics::{track_jwt_issued, track_user_signin};
use crate::modules::users::model::{NewUser, User};
use crate::modules::users::service::{USER_COLUMNS, UserService};

const INVALID_CREDENTIALS: &str = "Invalid username or password";
const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account matches, password reset instructions have been issued";

#[derive(Debug, Clone, Copy)]
enum TokenKind {
    Verification,
    PasswordReset,
}

impl TokenKind {
    fn predicate(self) -> &'static str {
        match self {
            TokenKind::Verification => "verification_token = $1",
            TokenKind::PasswordReset => {
                "reset_password_token = $1 AND reset_password_expires > now()"
            }
        }
    }
}

pub struct AuthService;

impl AuthService {
    fn issue(user: &User, jwt_config: &JwtConfig) -> Result<AuthResponse, AppError> {
        let access_token = create_access_token(
            user.id,
            &user.username,
            user.email.as_deref(),
            &user.roles,
            jwt_config,
        )?;
        track_jwt_issued();

        Ok(AuthResponse {
            access_token,
            user: user.profile(),
        })
    }

    async fn find_by_token(
        db: &PgPool,
        kind: TokenKind,
        token: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE {}",
            kind.predicate()
        ))
        .bind(token)
        .fetch_optional(db)
        .await
        .context("Failed to fetch user by token")
        .map_err(AppError::database)?;

        Ok(user)
    }

    /// Registers a local account and signs it in.
    #[instrument(skip_all, fields(username = %dto.username))]
    pub async fn signup(
        db: &PgPool,
        dto: SignupDto,
        jwt_config: &JwtConfig,
        users_config: &UsersConfig,
    ) -> Result<AuthResponse, AppError> {
        let mut user = User::new(NewUser {
            first_name: dto.first_name,
            last_name: dto.last_name,
            email: dto.email,
            username: dto.username,
            provider: LOCAL_PROVIDER.to_string(),
            profile_image_url: users_config.default_profile_image_url.clone(),
        });
        user.set_password(dto.password);

        UserService::save(db, &mut user).await?;

        Self::issue(&user, jwt_config)
    }

    #[instrument(skip_all, fields(username_or_email = %dto.username_or_email))]
    pub async fn signin(
        db: &PgPool,
        dto: SigninDto,
        jwt_config: &JwtConfig,
    ) -> Result<AuthResponse, AppError> {
        let user = UserService::find_by_username_or_email(db, &dto.username_or_email).await?;

        let user = match user {
            Some(user) if user.authenticate(&dto.password) => user,
            _ => {
                track_user_signin(false);
                return Err(AppError::unauthorized(INVALID_CREDENTIALS.to_string()));
            }
        };

        if !user.active {
            track_user_signin(false);
            tracing::warn!(user.id = %user.id, "signin attempt on deactivated account");
            return Err(AppError::unauthorized("Account is deactivated".to_string()));
        }

        track_user_signin(true);
        tracing::info!(user.id = %user.id, "user signed in");
        Self::issue(&user, jwt_config)
    }

    #[instrument(skip_all)]
    pub async fn verify_email(db: &PgPool, dto: VerifyEmailDto) -> Result<MessageResponse, AppError> {
        let mut user = Self::find_by_token(db, TokenKind::Verification, &dto.token)
            .await?
            .ok_or_else(|| AppError::bad_request(anyhow!("Invalid verification token")))?;

        user.is_verified = true;
        user.verification_token = None;
        UserService::save(db, &mut user).await?;

        tracing::info!(user.id = %user.id, "email verified");
        Ok(MessageResponse::new("Email verified successfully"))
    }

    /// Stores a fresh reset token on the matching account, if any. The answer
    /// is the same whether or not an account matched.
    #[instrument(skip_all)]
    pub async fn forgot_password(
        db: &PgPool,
        dto: ForgotPasswordDto,
        users_config: &UsersConfig,
    ) -> Result<MessageResponse, AppError> {
        if let Some(mut user) =
            UserService::find_by_username_or_email(db, &dto.username_or_email).await?
        {
            if user.provider == LOCAL_PROVIDER && user.active {
                user.reset_password_token = Some(generate_random_token());
                user.reset_password_expires =
                    Some(Utc::now() + Duration::seconds(users_config.reset_password_expiry));
                UserService::save(db, &mut user).await?;
                tracing::info!(user.id = %user.id, "password reset token issued");
            } else {
                tracing::debug!(user.id = %user.id, "password reset skipped for account");
            }
        }

        Ok(MessageResponse::new(FORGOT_PASSWORD_MESSAGE))
    }

    #[instrument(skip_all)]
    pub async fn reset_password(
        db: &PgPool,
        dto: ResetPasswordDto,
    ) -> Result<MessageResponse, AppError> {
        let mut user = Self::find_by_token(db, TokenKind::PasswordReset, &dto.token)
            .await?
            .ok_or_else(|| {
                AppError::bad_request(anyhow!("Password reset token is invalid or has expired"))
            })?;

        user.set_password(dto.new_password);
        user.reset_password_token = None;
        user.reset_password_expires = None;
        UserService::save(db, &mut user).await?;

        tracing::info!(user.id = %user.id, "password reset");
        Ok(MessageResponse::new("Password has been reset"))
    }
}
