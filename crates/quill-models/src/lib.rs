//! # Quill Models
//!
//! Domain models and DTOs for the Quill API.
//!
//! - [`users`]: the `User` document with its save hooks, the username rule
//!   and the user DTOs
//! - [`auth`]: signup, signin and token-flow DTOs
//! - [`articles`]: the `Article` document and its DTOs
//!
//! # Example
//!
//! ```ignore
//! use quill_models::users::{NewUser, User};
//!
//! let mut user = User::new(NewUser { /* ... */ });
//! user.set_password("correct horse battery");
//! let outcome = user.pre_save()?;
//! // INSERT ...
//! user.post_save(&outcome);
//! ```

pub mod articles;
pub mod auth;
pub mod users;

pub use articles::{Article, CreateArticleDto, PaginatedArticlesResponse, UpdateArticleDto};

pub use auth::{
    AuthResponse, ForgotPasswordDto, MessageResponse, ResetPasswordDto, SigninDto, SignupDto,
    VerifyEmailDto,
};

pub use users::{
    AdminUpdateUserDto, ChangePasswordDto, LOCAL_PROVIDER, NewUser, PaginatedUsersResponse,
    ProfileImageDto, SaveOutcome, UpdateProfileDto, User, UserPatch, UserProfile, UserType,
    roles, validate_username,
};
