use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use quill_core::{PaginationMeta, PaginationParams};
use quill_models::{
    AdminUpdateUserDto, Article, AuthResponse, ChangePasswordDto, CreateArticleDto,
    ForgotPasswordDto, MessageResponse, PaginatedArticlesResponse, PaginatedUsersResponse,
    ProfileImageDto, ResetPasswordDto, SigninDto, SignupDto, UpdateArticleDto, UpdateProfileDto,
    UserProfile, UserType, VerifyEmailDto,
};

use crate::modules::auth::controller::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::signup,
        crate::modules::auth::controller::signin,
        crate::modules::auth::controller::verify_email,
        crate::modules::auth::controller::forgot_password,
        crate::modules::auth::controller::reset_password,
        crate::modules::users::controller::list_users,
        crate::modules::users::controller::get_me,
        crate::modules::users::controller::update_me,
        crate::modules::users::controller::change_password,
        crate::modules::users::controller::upload_profile_image,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::update_user,
        crate::modules::users::controller::delete_user,
        crate::modules::articles::controller::list_articles,
        crate::modules::articles::controller::create_article,
        crate::modules::articles::controller::read_article,
        crate::modules::articles::controller::update_article,
        crate::modules::articles::controller::delete_article,
    ),
    components(
        schemas(
            UserProfile,
            UserType,
            SignupDto,
            SigninDto,
            AuthResponse,
            VerifyEmailDto,
            ForgotPasswordDto,
            ResetPasswordDto,
            MessageResponse,
            UpdateProfileDto,
            AdminUpdateUserDto,
            ChangePasswordDto,
            ProfileImageDto,
            PaginatedUsersResponse,
            Article,
            CreateArticleDto,
            UpdateArticleDto,
            PaginatedArticlesResponse,
            PaginationMeta,
            PaginationParams,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Signup, signin and account token flows"),
        (name = "Users", description = "Profiles and user administration"),
        (name = "Articles", description = "Article publishing")
    ),
    info(
        title = "Quill API",
        version = "0.1.0",
        description = "User and article management REST API built with Rust, Axum, and PostgreSQL.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
