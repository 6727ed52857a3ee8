//! User account record.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};

/// Store-assigned user identifier.
pub type UserId = u64;

/// Persisted user account.
///
/// Not `Serialize`; the only outward shape is [`UserResponse`].
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    /// bcrypt hash in modular crypt format. Never the plaintext.
    pub password_hash: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

impl Debug for User {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Public projection of a user returned by sign-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{User, UserResponse};

    fn sample_user() -> User {
        User {
            id: 3,
            email: "a@x.com".to_string(),
            password_hash: "$2b$04$abcdefghijklmnopqrstuuvwxyzABCDEFGHIJKLMNOPQRSTUVWXY".to_string(),
            created_at: 1_000,
            updated_at: 1_000,
        }
    }

    #[test]
    fn debug_output_redacts_password_hash() {
        let rendered = format!("{:?}", sample_user());
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("$2b$"));
    }

    #[test]
    fn response_projection_keeps_only_id_and_email() {
        let response = UserResponse::from(&sample_user());
        let json = serde_json::to_value(&response).expect("serialize response");
        assert_eq!(json, serde_json::json!({ "id": 3, "email": "a@x.com" }));
    }
}
