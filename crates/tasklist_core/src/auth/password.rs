//! bcrypt password hashing.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Work factor used for stored credentials (2^10 bcrypt rounds).
pub const DEFAULT_HASH_COST: u32 = 10;
/// Lowest work factor bcrypt accepts.
pub const MIN_HASH_COST: u32 = 4;
/// Highest work factor bcrypt accepts.
pub const MAX_HASH_COST: u32 = 31;

/// Hasher failure. Always a server-side fault, never a wrong password.
#[derive(Debug)]
pub enum HashingError {
    /// Salt generation or the bcrypt primitive itself failed.
    Internal(bcrypt::BcryptError),
    /// The stored hash is not a parseable bcrypt string.
    MalformedHash(bcrypt::BcryptError),
}

impl Display for HashingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Internal(err) => write!(f, "password hashing failed: {err}"),
            Self::MalformedHash(err) => write!(f, "stored password hash is malformed: {err}"),
        }
    }
}

impl Error for HashingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Internal(err) | Self::MalformedHash(err) => Some(err),
        }
    }
}

/// Salted one-way password hasher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher {
    /// Hasher with [`DEFAULT_HASH_COST`].
    pub fn new() -> Self {
        Self {
            cost: DEFAULT_HASH_COST,
        }
    }

    /// Hasher with an explicit work factor, clamped to bcrypt's valid range.
    pub fn with_cost(cost: u32) -> Self {
        Self {
            cost: cost.clamp(MIN_HASH_COST, MAX_HASH_COST),
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hashes `plaintext` with a fresh random salt.
    pub fn hash(&self, plaintext: &str) -> Result<String, HashingError> {
        bcrypt::hash(plaintext, self.cost).map_err(HashingError::Internal)
    }

    /// Checks `plaintext` against a stored hash.
    ///
    /// A mismatch is `Ok(false)`; only an unparseable hash is an error.
    pub fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, HashingError> {
        bcrypt::verify(plaintext, hash).map_err(HashingError::MalformedHash)
    }
}
