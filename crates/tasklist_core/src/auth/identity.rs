//! Caller identity projected from verified token claims.
//!
//! This is a pure projection: it never re-checks signatures or expiry.
//! Holding a [`VerifiedClaims`] already proves that happened upstream.

use crate::auth::token::VerifiedClaims;
use crate::model::user::UserId;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Caller identity could not be established.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityError {
    /// The verified claim set carries no usable user id.
    MissingIdentity,
    /// The token names a user that has no account row.
    UnknownUser(UserId),
}

impl Display for IdentityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingIdentity => write!(f, "request carries no authenticated identity"),
            Self::UnknownUser(_) => write!(f, "authenticated user no longer exists"),
        }
    }
}

impl Error for IdentityError {}

/// Extracts the numeric `user_id` claim.
///
/// `None` means no verified claim set reached this point, which is treated
/// the same as a token without the claim.
pub fn extract_user_id(claims: Option<&VerifiedClaims>) -> Result<UserId, IdentityError> {
    match claims.and_then(VerifiedClaims::user_id_claim) {
        Some(Value::Number(number)) => number.as_u64().ok_or(IdentityError::MissingIdentity),
        _ => Err(IdentityError::MissingIdentity),
    }
}

/// Identity of the caller, resolved from a verified token.
///
/// Task operations take this instead of a bare id; the owner is never read
/// from request payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuthenticatedUser {
    user_id: UserId,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: Option<&VerifiedClaims>) -> Result<Self, IdentityError> {
        extract_user_id(claims).map(|user_id| Self { user_id })
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::{extract_user_id, AuthenticatedUser, IdentityError};
    use crate::auth::token::VerifiedClaims;
    use serde_json::json;

    #[test]
    fn extracts_numeric_user_id() {
        let claims = VerifiedClaims::new(Some(json!(12)), 0);
        assert_eq!(extract_user_id(Some(&claims)), Ok(12));
        let user = AuthenticatedUser::from_claims(Some(&claims)).expect("identity");
        assert_eq!(user.user_id(), 12);
    }

    #[test]
    fn rejects_absent_claim_set_and_absent_claim() {
        assert_eq!(extract_user_id(None), Err(IdentityError::MissingIdentity));
        let claims = VerifiedClaims::new(None, 0);
        assert_eq!(
            extract_user_id(Some(&claims)),
            Err(IdentityError::MissingIdentity)
        );
    }

    #[test]
    fn rejects_wrongly_typed_claims() {
        for value in [json!("12"), json!(-1), json!(1.5), json!(null), json!([12])] {
            let claims = VerifiedClaims::new(Some(value.clone()), 0);
            assert_eq!(
                extract_user_id(Some(&claims)),
                Err(IdentityError::MissingIdentity),
                "claim {value} should be rejected"
            );
        }
    }
}
