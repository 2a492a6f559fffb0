//! User domain model, lifecycle hooks and DTOs.
//!
//! A [`User`] is loaded from or inserted into the `users` table. Persisting a
//! user always goes through the same sequence:
//!
//! 1. [`User::pre_save`] validates the username rule, and when a new plaintext
//!    password is pending it derives a fresh salt and hash from it.
//! 2. The service runs the `INSERT` or `UPDATE`.
//! 3. [`User::post_save`] runs first-insert bookkeeping.
//!
//! Responses never carry a `User`; they carry a [`UserProfile`], the
//! projection without the password material and tokens.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use quill_core::encryption::{
    generate_hashed_password, generate_random_token, generate_salt, verify_hashed_password,
};
use quill_core::{PaginationMeta, PaginationParams};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Provider name of password-based accounts.
pub const LOCAL_PROVIDER: &str = "local";

/// Words that can never be used as a local username.
pub const RESERVED_USERNAMES: [&str; 10] = [
    "meanjs",
    "administrator",
    "password",
    "admin",
    "user",
    "unknown",
    "anonymous",
    "null",
    "undefined",
    "api",
];

pub const USERNAME_MESSAGE: &str = "Please enter a valid username: 3+ characters long, non restricted word, characters \"_-.\", no consecutive dots, does not begin or end with dots, letters a-z and numbers 0-9.";

static USERNAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.\-]{3,34}$").expect("valid username regex"));

static CONSECUTIVE_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[._\-]{2}").expect("valid separator regex"));

/// Role names a user can hold.
pub mod roles {
    pub const USER: &str = "user";
    pub const ADMIN: &str = "admin";

    pub const ALL: [&str; 2] = [USER, ADMIN];

    pub fn is_known(role: &str) -> bool {
        ALL.contains(&role)
    }
}

fn is_valid_local_username(username: &str) -> bool {
    USERNAME_CHARS.is_match(username)
        && !CONSECUTIVE_SEPARATORS.is_match(username)
        && !username.starts_with('.')
        && !username.ends_with('.')
        && !RESERVED_USERNAMES.contains(&username)
}

/// Username rule. Accounts from an external provider always pass; local
/// accounts must carry a username matching the character, separator and
/// reserved-word rules.
pub fn validate_username(provider: &str, username: Option<&str>) -> bool {
    if provider != LOCAL_PROVIDER {
        return true;
    }
    username.is_some_and(is_valid_local_username)
}

/// Stored form of a username: trimmed and lowercased.
pub fn normalize_username(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Normalizes a username while deserializing, so DTO validation sees the
/// value that will be stored.
pub fn deserialize_username<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|raw| normalize_username(&raw))
}

pub fn deserialize_optional_username<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|raw| raw.as_deref().map(normalize_username))
}

/// `validator` adapter for DTO fields that always describe a local account.
pub fn validate_local_username(username: &str) -> Result<(), ValidationError> {
    if is_valid_local_username(username) {
        Ok(())
    } else {
        Err(ValidationError::new("username").with_message(USERNAME_MESSAGE.into()))
    }
}

fn validate_roles(roles: &[String]) -> Result<(), ValidationError> {
    if roles.is_empty() {
        return Err(ValidationError::new("roles").with_message("At least one role is required".into()));
    }
    if let Some(unknown) = roles.iter().find(|r| !roles::is_known(r)) {
        return Err(
            ValidationError::new("roles").with_message(format!("Unknown role: {unknown}").into())
        );
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[default]
    Employee,
    Employer,
}

/// Fields required to construct a user that has never been persisted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub username: String,
    pub provider: String,
    pub profile_image_url: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    pub email: Option<String>,
    pub username: String,
    pub hashed_password: String,
    pub salt: Option<String>,
    pub profile_image_url: String,
    pub provider: String,
    pub provider_data: serde_json::Value,
    pub additional_providers_data: serde_json::Value,
    pub roles: Vec<String>,
    pub user_type: UserType,
    pub active: bool,
    pub is_verified: bool,
    pub verification_token: Option<String>,
    pub reset_password_token: Option<String>,
    pub reset_password_expires: Option<DateTime<Utc>>,
    pub created: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
    /// Set for instances built with [`User::new`] until their first save.
    #[sqlx(skip)]
    is_new: bool,
    /// Plaintext set through [`User::set_password`], consumed by `pre_save`.
    #[sqlx(skip)]
    pending_password: Option<String>,
}

/// What [`User::pre_save`] did, handed to [`User::post_save`] once the write
/// went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOutcome {
    pub was_new: bool,
    pub password_rehashed: bool,
}

impl User {
    /// Builds an unsaved user. `created` and `verification_token` are
    /// generated for this instance.
    pub fn new(new_user: NewUser) -> Self {
        let first_name = new_user.first_name.trim().to_string();
        let last_name = new_user.last_name.trim().to_string();
        let display_name = format!("{first_name} {last_name}").trim().to_string();

        Self {
            id: Uuid::new_v4(),
            first_name,
            last_name,
            display_name,
            email: normalize_email(new_user.email),
            username: normalize_username(&new_user.username),
            hashed_password: String::new(),
            salt: None,
            profile_image_url: new_user.profile_image_url,
            provider: new_user.provider,
            provider_data: serde_json::json!({}),
            additional_providers_data: serde_json::json!({}),
            roles: vec![roles::USER.to_string()],
            user_type: UserType::default(),
            active: true,
            is_verified: false,
            verification_token: Some(generate_random_token()),
            reset_password_token: None,
            reset_password_expires: None,
            created: Utc::now(),
            updated: None,
            is_new: true,
            pending_password: None,
        }
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == roles::ADMIN)
    }

    /// Marks `password` to be hashed on the next save.
    pub fn set_password(&mut self, password: impl Into<String>) {
        self.pending_password = Some(password.into());
    }

    /// Runs before every insert or update.
    ///
    /// A pending, non-empty plaintext password is replaced by a freshly salted
    /// hash. Saving without a pending password leaves salt and hash untouched.
    pub fn pre_save(&mut self) -> Result<SaveOutcome, ValidationError> {
        if !validate_username(&self.provider, Some(&self.username)) {
            return Err(ValidationError::new("username").with_message(USERNAME_MESSAGE.into()));
        }
        validate_roles(&self.roles)?;

        let mut password_rehashed = false;
        if let Some(password) = self.pending_password.take().filter(|p| !p.is_empty()) {
            let salt = generate_salt();
            self.hashed_password = generate_hashed_password(&salt, &password);
            self.salt = Some(salt);
            password_rehashed = true;
        }

        if !self.is_new {
            self.updated = Some(Utc::now());
        }

        Ok(SaveOutcome {
            was_new: self.is_new,
            password_rehashed,
        })
    }

    /// Runs after a successful write.
    pub fn post_save(&mut self, outcome: &SaveOutcome) {
        if outcome.was_new {
            self.is_new = false;
            tracing::info!(
                user.id = %self.id,
                user.username = %self.username,
                user.provider = %self.provider,
                "user created"
            );
            metrics::counter!("users_created_total").increment(1);
        }
    }

    /// True iff `password` hashes to the stored hash under the stored salt.
    pub fn authenticate(&self, password: &str) -> bool {
        match &self.salt {
            Some(salt) if !self.hashed_password.is_empty() => {
                verify_hashed_password(salt, password, &self.hashed_password)
            }
            _ => false,
        }
    }

    /// Merges the supplied fields into this user. Nothing is written until
    /// the caller saves.
    pub fn patch(&mut self, patch: UserPatch) {
        let renamed = patch.first_name.is_some() || patch.last_name.is_some();
        if let Some(first_name) = patch.first_name {
            self.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = patch.last_name {
            self.last_name = last_name.trim().to_string();
        }
        // An explicit display name wins; otherwise it follows a rename.
        match patch.display_name {
            Some(display_name) => self.display_name = display_name.trim().to_string(),
            None if renamed => {
                self.display_name = format!("{} {}", self.first_name, self.last_name)
                    .trim()
                    .to_string()
            }
            None => {}
        }
        if patch.email.is_some() {
            self.email = normalize_email(patch.email);
        }
        if let Some(username) = patch.username {
            self.username = normalize_username(&username);
        }
        if let Some(password) = patch.password {
            self.set_password(password);
        }
        if let Some(url) = patch.profile_image_url {
            self.profile_image_url = url;
        }
        if let Some(roles) = patch.roles {
            self.roles = roles;
        }
        if let Some(user_type) = patch.user_type {
            self.user_type = user_type;
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            display_name: self.display_name.clone(),
            email: self.email.clone(),
            username: self.username.clone(),
            profile_image_url: self.profile_image_url.clone(),
            provider: self.provider.clone(),
            provider_data: self.provider_data.clone(),
            additional_providers_data: self.additional_providers_data.clone(),
            roles: self.roles.clone(),
            user_type: self.user_type,
            active: self.active,
            is_verified: self.is_verified,
            created: self.created,
            updated: self.updated,
        }
    }
}

fn normalize_email(email: Option<String>) -> Option<String> {
    email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
}

/// Partial update applied by [`User::patch`].
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub profile_image_url: Option<String>,
    pub roles: Option<Vec<String>>,
    pub user_type: Option<UserType>,
    pub active: Option<bool>,
}

/// A user as exposed by the API: no salt, hash or tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    pub email: Option<String>,
    pub username: String,
    pub profile_image_url: String,
    pub provider: String,
    #[schema(value_type = Object)]
    pub provider_data: serde_json::Value,
    #[schema(value_type = Object)]
    pub additional_providers_data: serde_json::Value,
    pub roles: Vec<String>,
    pub user_type: UserType,
    pub active: bool,
    pub is_verified: bool,
    pub created: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileDto {
    #[validate(length(min = 1, message = "Please fill in your first name"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, message = "Please fill in your last name"))]
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    #[validate(email(message = "Please fill a valid email address"))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_username")]
    #[validate(custom(function = "validate_local_username"))]
    pub username: Option<String>,
}

impl From<UpdateProfileDto> for UserPatch {
    fn from(dto: UpdateProfileDto) -> Self {
        Self {
            first_name: dto.first_name,
            last_name: dto.last_name,
            display_name: dto.display_name,
            email: dto.email,
            username: dto.username,
            ..Default::default()
        }
    }
}

/// Admin-side update of another user.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AdminUpdateUserDto {
    #[validate(length(min = 1))]
    pub first_name: Option<String>,
    #[validate(length(min = 1))]
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    #[validate(custom(function = "validate_roles"))]
    pub roles: Option<Vec<String>>,
    pub user_type: Option<UserType>,
    pub active: Option<bool>,
}

impl From<AdminUpdateUserDto> for UserPatch {
    fn from(dto: AdminUpdateUserDto) -> Self {
        Self {
            first_name: dto.first_name,
            last_name: dto.last_name,
            display_name: dto.display_name,
            roles: dto.roles,
            user_type: dto.user_type,
            active: dto.active,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordDto {
    #[validate(length(min = 1))]
    pub current_password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
    pub verify_password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ProfileImageDto {
    #[validate(length(min = 1, max = 2048))]
    pub profile_image_url: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedUsersResponse {
    pub data: Vec<UserProfile>,
    pub meta: PaginationMeta,
}

impl PaginatedUsersResponse {
    pub fn new(data: Vec<UserProfile>, total: i64, params: &PaginationParams) -> Self {
        Self {
            data,
            meta: PaginationMeta::new(total, params),
        }
    }
}
