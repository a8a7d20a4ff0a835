//! Authentication primitives.
//!
//! - [`password`] -- Argon2id hashing, verification and the minimum-length rule.
//! - [`jwt`] -- HS256 access tokens and hashed refresh tokens.

pub mod jwt;
pub mod password;
