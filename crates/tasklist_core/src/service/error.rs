//! Orchestrator-boundary error taxonomy.
//!
//! Every failure a caller can observe is one [`ServiceError`]. Each maps to
//! a stable [`ErrorKind`] code and an HTTP-style status so a transport layer
//! can answer without inspecting error internals.

use crate::auth::identity::IdentityError;
use crate::auth::password::HashingError;
use crate::auth::token::TokenError;
use crate::model::task::TaskId;
use crate::model::validation::ValidationError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Caller-facing failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    InvalidCredentials,
    DuplicateEmail,
    NotFound,
    InvalidToken,
    Internal,
}

impl ErrorKind {
    /// Stable machine-readable code.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation_error",
            Self::InvalidCredentials => "invalid_credentials",
            Self::DuplicateEmail => "duplicate_email",
            Self::NotFound => "not_found",
            Self::InvalidToken => "invalid_token",
            Self::Internal => "internal_error",
        }
    }

    /// HTTP status a transport layer should answer with.
    pub fn status_code(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::InvalidCredentials | Self::InvalidToken => 401,
            Self::NotFound => 404,
            Self::DuplicateEmail => 409,
            Self::Internal => 500,
        }
    }
}

/// Error returned by auth and task services.
#[derive(Debug)]
pub enum ServiceError {
    Validation(ValidationError),
    /// Unknown email or wrong password; intentionally not distinguished.
    InvalidCredentials,
    DuplicateEmail,
    /// Missing task or task owned by someone else.
    NotFound(TaskId),
    Token(TokenError),
    Identity(IdentityError),
    Hashing(HashingError),
    Repo(RepoError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::InvalidCredentials => ErrorKind::InvalidCredentials,
            Self::DuplicateEmail => ErrorKind::DuplicateEmail,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Token(TokenError::Signing(_) | TokenError::ExpiryOutOfRange) => {
                ErrorKind::Internal
            }
            Self::Token(_) | Self::Identity(_) => ErrorKind::InvalidToken,
            Self::Hashing(_) | Self::Repo(_) => ErrorKind::Internal,
        }
    }

    /// Message safe to hand to an unauthenticated caller.
    ///
    /// Internal faults are reduced to a generic message; their detail
    /// stays in `Display` for server-side logs.
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::Internal => "internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidCredentials => write!(f, "invalid email or password"),
            Self::DuplicateEmail => write!(f, "email is already registered"),
            Self::NotFound(task_id) => write!(f, "task not found: {task_id}"),
            Self::Token(err) => write!(f, "{err}"),
            Self::Identity(err) => write!(f, "{err}"),
            Self::Hashing(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Token(err) => Some(err),
            Self::Identity(err) => Some(err),
            Self::Hashing(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::InvalidCredentials | Self::DuplicateEmail | Self::NotFound(_) => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<TokenError> for ServiceError {
    fn from(value: TokenError) -> Self {
        Self::Token(value)
    }
}

impl From<IdentityError> for ServiceError {
    fn from(value: IdentityError) -> Self {
        Self::Identity(value)
    }
}

impl From<HashingError> for ServiceError {
    fn from(value: HashingError) -> Self {
        Self::Hashing(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(task_id) => Self::NotFound(task_id),
            RepoError::DuplicateEmail => Self::DuplicateEmail,
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::OwnerNotFound(user_id) => {
                Self::Identity(IdentityError::UnknownUser(user_id))
            }
            other => Self::Repo(other),
        }
    }
}
