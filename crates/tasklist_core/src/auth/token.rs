//! Stateless HS256 session tokens.
//!
//! # Responsibility
//! - Issue bearer tokens carrying `user_id` and an absolute `exp`.
//! - Verify signature and expiry, yielding a [`VerifiedClaims`] set.
//!
//! # Invariants
//! - `exp` is exactly [`TOKEN_TTL_SECS`] after issuance.
//! - A token is expired once `now >= exp`; there is no leeway.
//! - The signing secret is fixed for the lifetime of a `TokenService`.

use crate::auth::identity::extract_user_id;
use crate::config::TokenSecret;
use crate::model::user::UserId;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Token lifetime: 12 hours.
pub const TOKEN_TTL_SECS: i64 = 12 * 60 * 60;

/// Token issuance or verification failure.
#[derive(Debug)]
pub enum TokenError {
    /// Signature does not match the process secret (or wrong algorithm).
    InvalidSignature,
    /// Current time is at or past the embedded `exp`.
    Expired,
    /// Not a parseable token, or required claims are missing or mistyped.
    Malformed,
    /// Signing failed while issuing. Server-side fault.
    Signing(jsonwebtoken::errors::Error),
    /// `issued_at + TOKEN_TTL_SECS` does not fit in an `i64`.
    ExpiryOutOfRange,
}

impl Display for TokenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSignature => write!(f, "token signature is invalid"),
            Self::Expired => write!(f, "token has expired"),
            Self::Malformed => write!(f, "token is malformed"),
            Self::Signing(err) => write!(f, "token signing failed: {err}"),
            Self::ExpiryOutOfRange => write!(f, "token expiry is out of range"),
        }
    }
}

impl Error for TokenError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Signing(err) => Some(err),
            _ => None,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        match value.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => Self::InvalidSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Malformed,
        }
    }
}

#[derive(Debug, Serialize)]
struct IssuedClaims {
    user_id: UserId,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct DecodedClaims {
    #[serde(default)]
    user_id: Option<Value>,
    exp: i64,
}

/// Claim set of a token whose signature and expiry have been checked.
///
/// Only [`TokenService`] constructs this type, so holding one proves the
/// verification step ran.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedClaims {
    user_id: Option<Value>,
    expires_at: i64,
}

impl VerifiedClaims {
    pub(crate) fn new(user_id: Option<Value>, expires_at: i64) -> Self {
        Self {
            user_id,
            expires_at,
        }
    }

    /// Raw `user_id` claim as carried by the token, if any.
    pub fn user_id_claim(&self) -> Option<&Value> {
        self.user_id.as_ref()
    }

    /// Absolute expiry in Unix seconds.
    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }
}

/// Issues and verifies session tokens with one symmetric secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &TokenSecret) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against an explicit clock in `verify_claims_at`.
        validation.validate_exp = false;
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issues a token for `user_id` expiring 12 hours from now.
    pub fn issue(&self, user_id: UserId) -> Result<String, TokenError> {
        self.issue_at(user_id, unix_now())
    }

    /// Issues a token as if the current time were `issued_at` (Unix seconds).
    pub fn issue_at(&self, user_id: UserId, issued_at: i64) -> Result<String, TokenError> {
        let exp = issued_at
            .checked_add(TOKEN_TTL_SECS)
            .ok_or(TokenError::ExpiryOutOfRange)?;
        let claims = IssuedClaims { user_id, exp };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)
    }

    /// Verifies `token` and returns the embedded user id.
    ///
    /// An absent or non-numeric `user_id` claim is reported as `Malformed`.
    pub fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        self.verify_at(token, unix_now())
    }

    /// [`TokenService::verify`] against an explicit clock (Unix seconds).
    pub fn verify_at(&self, token: &str, now: i64) -> Result<UserId, TokenError> {
        let claims = self.verify_claims_at(token, now)?;
        extract_user_id(Some(&claims)).map_err(|_| TokenError::Malformed)
    }

    /// Checks signature and expiry and returns the verified claim set.
    pub fn verify_claims(&self, token: &str) -> Result<VerifiedClaims, TokenError> {
        self.verify_claims_at(token, unix_now())
    }

    /// [`TokenService::verify_claims`] against an explicit clock.
    pub fn verify_claims_at(&self, token: &str, now: i64) -> Result<VerifiedClaims, TokenError> {
        let data =
            jsonwebtoken::decode::<DecodedClaims>(token.trim(), &self.decoding_key, &self.validation)?;
        if now >= data.claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(VerifiedClaims::new(data.claims.user_id, data.claims.exp))
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs() as i64)
}
