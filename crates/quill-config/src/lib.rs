//! # Quill Config
//!
//! Configuration structures loaded from environment variables. Each struct is
//! built once at startup and carried in the application state, so handlers and
//! middlewares receive their settings explicitly.
//!
//! - [`jwt`]: JWT signing secret and token lifetime
//! - [`cors`]: allowed origins
//! - [`server`]: bind address and metrics port
//! - [`users`]: account defaults shared by the user and auth modules

pub mod cors;
pub mod jwt;
pub mod server;
pub mod users;

pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use server::ServerConfig;
pub use users::UsersConfig;

pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
