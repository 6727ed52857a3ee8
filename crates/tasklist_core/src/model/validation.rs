//! Input-shape rules for credentials and task titles.
//!
//! # Invariants
//! - Validation never touches storage; it only inspects the input.
//! - Password limits are measured in bytes because bcrypt silently
//!   truncates input beyond 72 bytes.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const EMAIL_MAX_CHARS: usize = 254;
pub const PASSWORD_MAX_BYTES: usize = 72;
pub const TITLE_MAX_CHARS: usize = 200;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Malformed caller input. Recoverable by correcting the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyEmail,
    EmailTooLong { max_chars: usize },
    InvalidEmail,
    EmptyPassword,
    PasswordTooLong { max_bytes: usize },
    EmptyTitle,
    TitleTooLong { max_chars: usize },
}

impl ValidationError {
    /// Name of the request field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyEmail | Self::EmailTooLong { .. } | Self::InvalidEmail => "email",
            Self::EmptyPassword | Self::PasswordTooLong { .. } => "password",
            Self::EmptyTitle | Self::TitleTooLong { .. } => "title",
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email is required"),
            Self::EmailTooLong { max_chars } => {
                write!(f, "email must be at most {max_chars} characters")
            }
            Self::InvalidEmail => write!(f, "email is not a valid address"),
            Self::EmptyPassword => write!(f, "password is required"),
            Self::PasswordTooLong { max_bytes } => {
                write!(f, "password must be at most {max_bytes} bytes")
            }
            Self::EmptyTitle => write!(f, "title is required"),
            Self::TitleTooLong { max_chars } => {
                write!(f, "title must be at most {max_chars} characters")
            }
        }
    }
}

impl Error for ValidationError {}

/// Trims surrounding whitespace; the stored and looked-up form of an email.
pub fn normalize_email(email: &str) -> &str {
    email.trim()
}

/// Validates the email/password pair used by sign-up and log-in.
pub fn validate_credentials(email: &str, password: &str) -> Result<(), ValidationError> {
    validate_email(email)?;
    validate_password(password)
}

/// Validates an email address shape.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = normalize_email(email);
    if email.is_empty() {
        return Err(ValidationError::EmptyEmail);
    }
    if email.chars().count() > EMAIL_MAX_CHARS {
        return Err(ValidationError::EmailTooLong {
            max_chars: EMAIL_MAX_CHARS,
        });
    }
    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// Validates a plaintext password. Whitespace is significant.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyPassword);
    }
    if password.len() > PASSWORD_MAX_BYTES {
        return Err(ValidationError::PasswordTooLong {
            max_bytes: PASSWORD_MAX_BYTES,
        });
    }
    Ok(())
}

/// Validates a task title and returns its trimmed form.
pub fn validate_title(title: &str) -> Result<&str, ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if trimmed.chars().count() > TITLE_MAX_CHARS {
        return Err(ValidationError::TitleTooLong {
            max_chars: TITLE_MAX_CHARS,
        });
    }
    Ok(trimmed)
}
