//! Password and token primitives used by the user lifecycle hooks.
//!
//! Passwords are never stored as-is. A user row carries a random `salt` and a
//! `hashed_password` derived from `(salt, plaintext)` with PBKDF2-HMAC-SHA512
//! by [`generate_hashed_password`]. Authentication recomputes the hash with
//! the stored salt and compares with [`verify_hashed_password`].
//!
//! # Example
//!
//! ```
//! use quill_core::encryption::{generate_hashed_password, generate_salt, verify_hashed_password};
//!
//! let salt = generate_salt();
//! let hash = generate_hashed_password(&salt, "s3cret-passw0rd");
//!
//! assert!(verify_hashed_password(&salt, "s3cret-passw0rd", &hash));
//! assert!(!verify_hashed_password(&salt, "wrong", &hash));
//! ```

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha512;
use subtle::ConstantTimeEq;

/// Salt length in bytes before hex encoding.
pub const SALT_LENGTH: usize = 16;

/// Random token length in bytes before hex encoding.
pub const TOKEN_LENGTH: usize = 20;

/// PBKDF2 iteration count.
pub const HASH_ROUNDS: u32 = 10_000;

/// Derived key length in bytes before hex encoding.
pub const HASH_LENGTH: usize = 64;

fn random_hex(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Generates a fresh random salt, hex encoded.
pub fn generate_salt() -> String {
    random_hex(SALT_LENGTH)
}

/// Generates a random token for email verification and password resets.
pub fn generate_random_token() -> String {
    random_hex(TOKEN_LENGTH)
}

/// Derives the stored hash for `password` under `salt`.
///
/// The derivation is deterministic: the same `(salt, password)` pair always
/// yields the same hex string.
pub fn generate_hashed_password(salt: &str, password: &str) -> String {
    let mut key = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha512>(password.as_bytes(), salt.as_bytes(), HASH_ROUNDS, &mut key);
    hex::encode(key)
}

/// Recomputes the hash of `password` under `salt` and compares it with
/// `expected` in constant time.
pub fn verify_hashed_password(salt: &str, password: &str, expected: &str) -> bool {
    let computed = generate_hashed_password(salt, password);
    computed.as_bytes().ct_eq(expected.as_bytes()).into()
}
