//! Ripple crypto helpers.
//!
//! - Argon2id digests for passwords, remember tokens and activation tokens.
//!   Only digests are persisted; raw secrets live in the browser or the
//!   activation link.
//! - Random URL-safe tokens.
//! - HMAC-SHA256 signed tokens (JWT, HS256) used as cookie values.

pub mod digest;
pub mod signer;
pub mod tokens;
