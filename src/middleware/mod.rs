//! Cross-cutting request middleware.
//!
//! - [`auth`]: bearer token principal (`AuthUser`)
//! - [`role`]: role guard (`require_roles`, `require_admin`, `require_user`)

pub mod auth;
pub mod role;
