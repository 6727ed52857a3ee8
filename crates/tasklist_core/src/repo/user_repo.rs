//! User repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Email uniqueness is enforced by the `users.email` UNIQUE constraint,
//!   not by a read-before-write check, so concurrent sign-ups race safely.
//! - Only hashes are written; this layer never sees a plaintext password.

use crate::model::user::User;
use crate::repo::{ensure_connection_ready, id_from_db, RepoError, RepoResult};
use rusqlite::{ffi, params, Connection, ErrorCode, OptionalExtension, Row};

const USER_COLUMNS: &[&str] = &["id", "email", "password_hash", "created_at", "updated_at"];

/// Repository interface for user accounts.
pub trait UserRepository {
    /// Inserts a user and returns the stored row.
    fn create_user(&self, email: &str, password_hash: &str) -> RepoResult<User>;
    /// Looks a user up by exact email.
    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "users", USER_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, email: &str, password_hash: &str) -> RepoResult<User> {
        self.conn
            .query_row(
                "INSERT INTO users (email, password_hash)
                 VALUES (?1, ?2)
                 RETURNING id, email, password_hash, created_at, updated_at;",
                params![email, password_hash],
                |row| Ok(parse_user_row(row)),
            )
            .map_err(map_insert_error)?
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        self.conn
            .query_row(
                "SELECT id, email, password_hash, created_at, updated_at
                 FROM users
                 WHERE email = ?1;",
                [email],
                |row| Ok(parse_user_row(row)),
            )
            .optional()?
            .transpose()
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    Ok(User {
        id: id_from_db(row.get("id")?, "users.id")?,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn map_insert_error(err: rusqlite::Error) -> RepoError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            RepoError::DuplicateEmail
        }
        _ => RepoError::from(err),
    }
}
