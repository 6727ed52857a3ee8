//! Credential hashing, session tokens and caller identity.
//!
//! # Responsibility
//! - Hash and verify passwords (`password`).
//! - Issue and verify signed, time-limited bearer tokens (`token`).
//! - Project a verified claim set onto the caller's user id (`identity`).
//!
//! # Invariants
//! - Tokens are stateless: validity is signature plus expiry, nothing else.
//! - Identity is only ever derived from claims that passed verification.

pub mod identity;
pub mod password;
pub mod token;
