//! Sign-up and log-in flows.
//!
//! # Responsibility
//! - Validate credentials, hash passwords, persist users.
//! - Check credentials and issue session tokens.
//! - Resolve a bearer token into an [`AuthenticatedUser`].
//!
//! # Invariants
//! - Unknown email and wrong password produce the same
//!   [`ServiceError::InvalidCredentials`], and both paths run one bcrypt
//!   verification so timing does not separate them either.
//! - Emails, passwords, hashes and tokens are never logged.

use crate::auth::identity::AuthenticatedUser;
use crate::auth::password::PasswordHasher;
use crate::auth::token::TokenService;
use crate::model::user::UserResponse;
use crate::model::validation::{normalize_email, validate_credentials};
use crate::repo::user_repo::UserRepository;
use crate::service::error::{ServiceError, ServiceResult};
use log::{info, warn};
use once_cell::sync::OnceCell;
use std::time::Instant;

// Verified against when the email is unknown, so the miss costs a hash.
const DECOY_PASSWORD: &str = "decoy-password-for-unknown-accounts";

/// Auth orchestrator over a user repository.
pub struct AuthService<R: UserRepository> {
    repo: R,
    hasher: PasswordHasher,
    tokens: TokenService,
    decoy_hash: OnceCell<String>,
}

impl<R: UserRepository> AuthService<R> {
    pub fn new(repo: R, hasher: PasswordHasher, tokens: TokenService) -> Self {
        Self {
            repo,
            hasher,
            tokens,
            decoy_hash: OnceCell::new(),
        }
    }

    /// Registers a new user and returns its public projection.
    ///
    /// # Errors
    /// - `Validation` for malformed email/password.
    /// - `DuplicateEmail` when the email is already registered.
    /// - `Hashing`/`Repo` for server-side faults.
    pub fn sign_up(&self, email: &str, password: &str) -> ServiceResult<UserResponse> {
        let started_at = Instant::now();
        validate_credentials(email, password)?;

        let hash = self.hasher.hash(password)?;
        let user = match self.repo.create_user(normalize_email(email), &hash) {
            Ok(user) => user,
            Err(err) => {
                let err = ServiceError::from(err);
                warn!(
                    "event=user_signup module=auth status=error duration_ms={} error_code={}",
                    started_at.elapsed().as_millis(),
                    err.kind().as_str()
                );
                return Err(err);
            }
        };

        info!(
            "event=user_signup module=auth status=ok user_id={} duration_ms={}",
            user.id,
            started_at.elapsed().as_millis()
        );
        Ok(UserResponse::from(&user))
    }

    /// Checks credentials and issues a 12-hour session token.
    ///
    /// # Errors
    /// - `Validation` for malformed input.
    /// - `InvalidCredentials` for an unknown email or a wrong password.
    pub fn log_in(&self, email: &str, password: &str) -> ServiceResult<String> {
        let started_at = Instant::now();
        validate_credentials(email, password)?;

        let Some(user) = self.repo.find_by_email(normalize_email(email))? else {
            self.burn_decoy_verification(password);
            warn!(
                "event=user_login module=auth status=error duration_ms={} error_code=invalid_credentials",
                started_at.elapsed().as_millis()
            );
            return Err(ServiceError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &user.password_hash)? {
            warn!(
                "event=user_login module=auth status=error duration_ms={} error_code=invalid_credentials",
                started_at.elapsed().as_millis()
            );
            return Err(ServiceError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id)?;
        info!(
            "event=user_login module=auth status=ok user_id={} duration_ms={}",
            user.id,
            started_at.elapsed().as_millis()
        );
        Ok(token)
    }

    /// Verifies a bearer token and resolves the caller identity.
    pub fn authenticate(&self, token: &str) -> ServiceResult<AuthenticatedUser> {
        let claims = self.tokens.verify_claims(token).map_err(|err| {
            warn!("event=token_verify module=auth status=error error={err}");
            err
        })?;
        Ok(AuthenticatedUser::from_claims(Some(&claims))?)
    }

    fn burn_decoy_verification(&self, password: &str) {
        if let Ok(decoy) = self
            .decoy_hash
            .get_or_try_init(|| self.hasher.hash(DECOY_PASSWORD))
        {
            let _ = self.hasher.verify(password, decoy);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AuthService;
    use crate::auth::password::{PasswordHasher, MIN_HASH_COST};
    use crate::auth::token::TokenService;
    use crate::config::TokenSecret;
    use crate::model::user::User;
    use crate::repo::user_repo::UserRepository;
    use crate::repo::{RepoError, RepoResult};
    use crate::service::error::ServiceError;
    use std::cell::RefCell;

    #[derive(Default)]
    struct MemoryUsers {
        rows: RefCell<Vec<User>>,
    }

    impl UserRepository for MemoryUsers {
        fn create_user(&self, email: &str, password_hash: &str) -> RepoResult<User> {
            let mut rows = self.rows.borrow_mut();
            if rows.iter().any(|user| user.email == email) {
                return Err(RepoError::DuplicateEmail);
            }
            let user = User {
                id: rows.len() as u64 + 1,
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                created_at: 0,
                updated_at: 0,
            };
            rows.push(user.clone());
            Ok(user)
        }

        fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
            Ok(self
                .rows
                .borrow()
                .iter()
                .find(|user| user.email == email)
                .cloned())
        }
    }

    fn service() -> AuthService<MemoryUsers> {
        let tokens = TokenService::new(&TokenSecret::new("unit-secret").expect("secret"));
        AuthService::new(
            MemoryUsers::default(),
            PasswordHasher::with_cost(MIN_HASH_COST),
            tokens,
        )
    }

    #[test]
    fn stored_hash_is_never_the_plaintext() {
        let service = service();
        service.sign_up("a@x.com", "secret123").expect("sign up");
        let rows = service.repo.rows.borrow();
        assert_ne!(rows[0].password_hash, "secret123");
        assert!(rows[0].password_hash.starts_with("$2"));
    }

    #[test]
    fn unknown_email_and_wrong_password_fail_identically() {
        let service = service();
        service.sign_up("a@x.com", "secret123").expect("sign up");

        let unknown = service.log_in("b@x.com", "secret123").expect_err("unknown");
        let wrong = service.log_in("a@x.com", "wrong").expect_err("wrong password");
        assert!(matches!(unknown, ServiceError::InvalidCredentials));
        assert!(matches!(wrong, ServiceError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[test]
    fn authenticate_resolves_logged_in_user() {
        let service = service();
        let created = service.sign_up("a@x.com", "secret123").expect("sign up");
        let token = service.log_in("a@x.com", "secret123").expect("log in");
        let caller = service.authenticate(&token).expect("authenticate");
        assert_eq!(caller.user_id(), created.id);
    }

    #[test]
    fn authenticate_rejects_garbage_token() {
        let err = service().authenticate("nope").expect_err("garbage token");
        assert!(matches!(err, ServiceError::Token(_)));
    }
}
