//! Account defaults shared by the auth and users modules.

use std::env;

use crate::env_or;

pub const DEFAULT_PROFILE_IMAGE_URL: &str = "/modules/users/client/img/profile/default.png";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UsersConfig {
    /// Image assigned to accounts that never uploaded one.
    pub default_profile_image_url: String,
    /// Lifetime of a password reset token, in seconds.
    pub reset_password_expiry: i64,
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            default_profile_image_url: DEFAULT_PROFILE_IMAGE_URL.to_string(),
            reset_password_expiry: 3600,
        }
    }
}

impl UsersConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_profile_image_url: env::var("DEFAULT_PROFILE_IMAGE_URL")
                .unwrap_or(defaults.default_profile_image_url),
            reset_password_expiry: env_or("RESET_PASSWORD_EXPIRY", defaults.reset_password_expiry),
        }
    }
}
