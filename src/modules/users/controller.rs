use axum::{
    Extension, Json,
    extract::{Query, State},
};
use tracing::instrument;

use quill_core::{AppError, PaginationParams};
use quill_models::MessageResponse;

use super::model::{
    AdminUpdateUserDto, ChangePasswordDto, PaginatedUsersResponse, ProfileImageDto,
    UpdateProfileDto, UserProfile,
};
use super::service::UserService;
use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// List users (admin only)
#[utoipa::path(
    get,
    path = "/api/users",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated users", body = PaginatedUsersResponse),
        (status = 403, description = "Forbidden resource", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginatedUsersResponse>, AppError> {
    let users = UserService::list_profiles(&state.db, params).await?;
    Ok(Json(users))
}

/// Current user's profile
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current user", body = UserProfile),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<UserProfile>, AppError> {
    let user_id = auth_user.user_id()?;
    let profile = UserService::find_profile_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("User is not signed in".to_string()))?;
    Ok(Json(profile))
}

/// Update the current user's profile
#[utoipa::path(
    put,
    path = "/api/users/me",
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "Updated profile", body = UserProfile),
        (status = 409, description = "Username or email already taken", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, dto))]
pub async fn update_me(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<UpdateProfileDto>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = UserService::update_profile(&state.db, auth_user.user_id()?, dto).await?;
    Ok(Json(profile))
}

/// Change the current user's password
#[utoipa::path(
    post,
    path = "/api/users/password-change",
    request_body = ChangePasswordDto,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Mismatch or wrong current password", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, dto))]
pub async fn change_password(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<ChangePasswordDto>,
) -> Result<Json<MessageResponse>, AppError> {
    let message = UserService::change_password(&state.db, auth_user.user_id()?, dto).await?;
    Ok(Json(message))
}

/// Set the current user's profile image
#[utoipa::path(
    post,
    path = "/api/users/upload",
    request_body = ProfileImageDto,
    responses(
        (status = 200, description = "Updated profile", body = UserProfile)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, dto))]
pub async fn upload_profile_image(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<ProfileImageDto>,
) -> Result<Json<UserProfile>, AppError> {
    let profile =
        UserService::set_profile_image(&state.db, auth_user.user_id()?, dto.profile_image_url)
            .await?;
    Ok(Json(profile))
}

/// Read a user (admin only)
#[utoipa::path(
    get,
    path = "/api/users/{user_id}",
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = UserProfile),
        (status = 401, description = "Invalid or unknown identifier", body = ErrorResponse),
        (status = 403, description = "Forbidden resource", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn get_user(Extension(user): Extension<UserProfile>) -> Json<UserProfile> {
    Json(user)
}

/// Update a user (admin only)
#[utoipa::path(
    put,
    path = "/api/users/{user_id}",
    params(("user_id" = String, Path, description = "User ID")),
    request_body = AdminUpdateUserDto,
    responses(
        (status = 200, description = "Updated user", body = UserProfile),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, user, dto), fields(user.id = %user.id))]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(user): Extension<UserProfile>,
    ValidatedJson(dto): ValidatedJson<AdminUpdateUserDto>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = UserService::admin_update(&state.db, user.id, dto).await?;
    Ok(Json(profile))
}

/// Deactivate a user (admin only)
#[utoipa::path(
    delete,
    path = "/api/users/{user_id}",
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Deactivated user", body = UserProfile)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, user), fields(user.id = %user.id))]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(user): Extension<UserProfile>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = UserService::deactivate(&state.db, user.id).await?;
    Ok(Json(profile))
}
