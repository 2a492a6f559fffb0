use anyhow::{Context, anyhow};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use quill_core::{AppError, PaginationParams};
use quill_models::MessageResponse;

use super::model::{
    AdminUpdateUserDto, ChangePasswordDto, PaginatedUsersResponse, UpdateProfileDto, User,
    UserPatch, UserProfile,
};

pub(crate) const USER_COLUMNS: &str = "id, first_name, last_name, display_name, email, username, \
    hashed_password, salt, profile_image_url, provider, provider_data, additional_providers_data, \
    roles, user_type, active, is_verified, verification_token, reset_password_token, \
    reset_password_expires, created, updated";

/// Columns of [`UserProfile`]: everything but password material and tokens.
pub(crate) const PROFILE_COLUMNS: &str = "id, first_name, last_name, display_name, email, username, \
    profile_image_url, provider, provider_data, additional_providers_data, roles, user_type, \
    active, is_verified, created, updated";

const DUPLICATE_USER_MESSAGE: &str = "Username or email already exists";

pub struct UserService;

impl UserService {
    /// Persists `user`, running its save hooks around the write.
    ///
    /// Unsaved users are inserted, loaded ones updated.
    #[instrument(skip_all, fields(user.id = %user.id, user.is_new = user.is_new()))]
    pub async fn save(db: &PgPool, user: &mut User) -> Result<(), AppError> {
        let outcome = user
            .pre_save()
            .map_err(|err| AppError::unprocessable(anyhow!("{err}")))?;

        let query = if outcome.was_new {
            format!(
                "INSERT INTO users ({USER_COLUMNS}) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21)"
            )
        } else {
            "UPDATE users SET first_name = $2, last_name = $3, display_name = $4, email = $5, \
             username = $6, hashed_password = $7, salt = $8, profile_image_url = $9, \
             provider = $10, provider_data = $11, additional_providers_data = $12, roles = $13, \
             user_type = $14, active = $15, is_verified = $16, verification_token = $17, \
             reset_password_token = $18, reset_password_expires = $19, created = $20, \
             updated = $21 WHERE id = $1"
                .to_string()
        };

        sqlx::query(&query)
            .bind(user.id)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.display_name)
            .bind(&user.email)
            .bind(&user.username)
            .bind(&user.hashed_password)
            .bind(&user.salt)
            .bind(&user.profile_image_url)
            .bind(&user.provider)
            .bind(&user.provider_data)
            .bind(&user.additional_providers_data)
            .bind(&user.roles)
            .bind(user.user_type)
            .bind(user.active)
            .bind(user.is_verified)
            .bind(&user.verification_token)
            .bind(&user.reset_password_token)
            .bind(user.reset_password_expires)
            .bind(user.created)
            .bind(user.updated)
            .execute(db)
            .await
            .map_err(|e| AppError::from_sqlx_conflict(e, DUPLICATE_USER_MESSAGE))?;

        user.post_save(&outcome);
        Ok(())
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("Failed to fetch user by ID")
        .map_err(AppError::database)?;

        Ok(user)
    }

    /// Loads a user or fails with `404`.
    pub async fn load(db: &PgPool, id: Uuid) -> Result<User, AppError> {
        Self::find_by_id(db, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))
    }

    #[instrument(skip(db))]
    pub async fn find_profile_by_id(db: &PgPool, id: Uuid) -> Result<Option<UserProfile>, AppError> {
        let profile = sqlx::query_as::<_, UserProfile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("Failed to fetch user profile")
        .map_err(AppError::database)?;

        Ok(profile)
    }

    /// Matches either the username or the email, case-insensitively.
    pub async fn find_by_username_or_email(
        db: &PgPool,
        username_or_email: &str,
    ) -> Result<Option<User>, AppError> {
        let needle = username_or_email.trim().to_lowercase();
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = $1 LIMIT 1"
        ))
        .bind(needle)
        .fetch_optional(db)
        .await
        .context("Failed to fetch user by username or email")
        .map_err(AppError::database)?;

        Ok(user)
    }

    #[instrument(skip(db))]
    pub async fn list_profiles(
        db: &PgPool,
        params: PaginationParams,
    ) -> Result<PaginatedUsersResponse, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(db)
            .await
            .context("Failed to count users")
            .map_err(AppError::database)?;

        let users = sqlx::query_as::<_, UserProfile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM users ORDER BY created DESC LIMIT $1 OFFSET $2"
        ))
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(db)
        .await
        .context("Failed to fetch users")
        .map_err(AppError::database)?;

        Ok(PaginatedUsersResponse::new(users, total, &params))
    }

    async fn patch_and_save(
        db: &PgPool,
        user_id: Uuid,
        patch: UserPatch,
    ) -> Result<UserProfile, AppError> {
        let mut user = Self::load(db, user_id).await?;
        user.patch(patch);
        Self::save(db, &mut user).await?;
        Ok(user.profile())
    }

    #[instrument(skip(db, dto))]
    pub async fn update_profile(
        db: &PgPool,
        user_id: Uuid,
        dto: UpdateProfileDto,
    ) -> Result<UserProfile, AppError> {
        Self::patch_and_save(db, user_id, dto.into()).await
    }

    #[instrument(skip(db, dto))]
    pub async fn admin_update(
        db: &PgPool,
        user_id: Uuid,
        dto: AdminUpdateUserDto,
    ) -> Result<UserProfile, AppError> {
        Self::patch_and_save(db, user_id, dto.into()).await
    }

    #[instrument(skip(db))]
    pub async fn set_profile_image(
        db: &PgPool,
        user_id: Uuid,
        profile_image_url: String,
    ) -> Result<UserProfile, AppError> {
        let patch = UserPatch {
            profile_image_url: Some(profile_image_url),
            ..Default::default()
        };
        Self::patch_and_save(db, user_id, patch).await
    }

    /// Users are never removed; deleting one switches it off.
    #[instrument(skip(db))]
    pub async fn deactivate(db: &PgPool, user_id: Uuid) -> Result<UserProfile, AppError> {
        let patch = UserPatch {
            active: Some(false),
            ..Default::default()
        };
        let profile = Self::patch_and_save(db, user_id, patch).await?;
        tracing::info!(user.id = %user_id, "user deactivated");
        Ok(profile)
    }

    #[instrument(skip(db, dto))]
    pub async fn change_password(
        db: &PgPool,
        user_id: Uuid,
        dto: ChangePasswordDto,
    ) -> Result<MessageResponse, AppError> {
        if dto.new_password != dto.verify_password {
            return Err(AppError::bad_request(anyhow!("Passwords do not match")));
        }

        let mut user = Self::load(db, user_id).await?;
        if !user.authenticate(&dto.current_password) {
            return Err(AppError::bad_request(anyhow!("Current password is incorrect")));
        }

        user.set_password(dto.new_password);
        Self::save(db, &mut user).await?;

        tracing::info!(user.id = %user_id, "password changed");
        Ok(MessageResponse::new("Password changed successfully"))
    }
}
