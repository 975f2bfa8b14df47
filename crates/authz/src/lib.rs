//! Credential primitives for Bookshelf.
//!
//! - [`password`]: Argon2id hashing and verification of user passwords
//! - [`token`]: HS256 bearer tokens with a fixed one-hour lifetime
//!
//! Both services are immutable after construction and are shared behind an
//! `Arc` by the HTTP layer.

pub mod error;
pub mod password;
pub mod token;

pub use error::AuthError;
pub use password::PasswordHasher;
pub use token::{Claims, IssuedToken, TokenService, TOKEN_TTL_SECS};
