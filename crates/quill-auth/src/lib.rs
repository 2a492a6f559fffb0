//! # Quill Auth
//!
//! Access token claims and the functions that sign and verify them.
//!
//! The token carries the principal's roles, so the role guard can decide on
//! a request without touching the database.

pub mod claims;
pub mod jwt;

pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
