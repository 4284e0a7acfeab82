//! Password hashing and session tokens.

pub mod password;
pub mod token;

pub use token::{Claims, TokenError, TokenSigner};
