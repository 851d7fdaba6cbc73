//! Accounts and bearer tokens for the Askline forum.
//!
//! Two concerns live here:
//!
//! - [`users`]: the `users` table. Passwords are stored only as Argon2id
//!   PHC strings, and the hash never leaves this crate.
//! - [`token`]: [`TokenSigner`], which issues and checks the signed bearer
//!   tokens handed out by `POST /token`.

pub mod token;
pub mod users;

use askline_types::ValidationError;
use thiserror::Error;

pub use token::TokenSigner;
pub use users::{authenticate, create_user, get_user};

/// Errors produced by account and token operations.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// A unique field (email or username) is already taken.
    #[error("{0} already registered")]
    Conflict(&'static str),
    /// Unknown email or wrong password. Deliberately not more specific.
    #[error("incorrect email or password")]
    InvalidCredentials,
    /// Malformed, tampered, or expired bearer token.
    #[error("invalid or expired token")]
    InvalidToken,
    /// The password hasher rejected its input.
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
    #[error("user not found: {0}")]
    NotFound(i64),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
