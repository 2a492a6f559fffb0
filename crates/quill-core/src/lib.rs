//! # Quill Core
//!
//! Core types, errors, and utilities for the Quill API.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`encryption`]: Salt, salted password hash and random token generation
//! - [`pagination`]: Pagination utilities for list endpoints
//!
//! # Example
//!
//! ```ignore
//! use quill_core::encryption::{generate_salt, generate_hashed_password};
//! use quill_core::AppError;
//!
//! let salt = generate_salt();
//! let hash = generate_hashed_password(&salt, "correct horse");
//!
//! let error = AppError::unauthorized("User is invalid".to_string());
//! ```

pub mod encryption;
pub mod errors;
pub mod pagination;

pub use encryption::{
    generate_hashed_password, generate_random_token, generate_salt, verify_hashed_password,
};
pub use errors::AppError;
pub use pagination::{PaginationMeta, PaginationParams};
