//! Core of the per-user task-list backend.
//! Owns credential hashing, session tokens and owner-scoped task storage.

pub mod auth;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use auth::identity::{extract_user_id, AuthenticatedUser, IdentityError};
pub use auth::password::{
    HashingError, PasswordHasher, DEFAULT_HASH_COST, MAX_HASH_COST, MIN_HASH_COST,
};
pub use auth::token::{TokenError, TokenService, VerifiedClaims, TOKEN_TTL_SECS};
pub use config::{AppConfig, ConfigError, TokenSecret};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{NewTask, Task, TaskId, TaskResponse};
pub use model::user::{User, UserId, UserResponse};
pub use model::validation::ValidationError;
pub use repo::task_repo::{SqliteTaskRepository, TaskRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{MutationOutcome, RepoError, RepoResult};
pub use service::auth_service::AuthService;
pub use service::task_service::TaskService;
pub use service::{ErrorKind, ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
