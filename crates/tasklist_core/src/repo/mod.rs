//! Repository contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for users and tasks.
//! - Keep SQL inside the persistence boundary.
//!
//! # Invariants
//! - Every task query is filtered or conditioned on the owner id.
//! - Conditioned mutations report zero affected rows as
//!   [`MutationOutcome::NoMatch`], never as silent success.
//! - Repositories refuse connections whose schema is not fully migrated.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::task::TaskId;
use crate::model::user::UserId;
use crate::model::validation::ValidationError;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod task_repo;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence-layer error.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    /// No task matched both id and owner. Carries no hint of
    /// which half of the predicate failed.
    NotFound(TaskId),
    /// The `users.email` uniqueness constraint rejected the insert.
    DuplicateEmail,
    /// A task insert named an owner with no `users` row.
    OwnerNotFound(UserId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::DuplicateEmail => write!(f, "email is already registered"),
            Self::OwnerNotFound(user_id) => write!(f, "task owner not found: {user_id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Result of an update/delete conditioned on `id AND owner`.
///
/// The store reports success either way; only the affected-row count tells
/// the two cases apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome<T> {
    /// Exactly the targeted row was changed.
    Applied(T),
    /// The predicate matched no row: missing task or foreign owner.
    NoMatch,
}

impl MutationOutcome<()> {
    pub fn from_affected_rows(affected: usize) -> Self {
        if affected == 0 {
            Self::NoMatch
        } else {
            Self::Applied(())
        }
    }
}

impl<T> MutationOutcome<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    /// Converts `NoMatch` into [`RepoError::NotFound`] for `task_id`.
    pub fn found_or_not_found(self, task_id: TaskId) -> RepoResult<T> {
        match self {
            Self::Applied(value) => Ok(value),
            Self::NoMatch => Err(RepoError::NotFound(task_id)),
        }
    }
}

/// Maps an API id onto SQLite's signed INTEGER key space.
///
/// Ids above `i64::MAX` cannot name any stored row.
pub(crate) fn db_id(id: u64) -> Option<i64> {
    i64::try_from(id).ok()
}

pub(crate) fn id_from_db(value: i64, column: &str) -> RepoResult<u64> {
    u64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("negative id `{value}` in {column}")))
}

pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, table)? {
        return Err(RepoError::MissingRequiredTable(table));
    }
    for &column in columns {
        if !table_has_column(conn, table, column)? {
            return Err(RepoError::MissingRequiredColumn { table, column });
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::{db_id, MutationOutcome, RepoError};

    #[test]
    fn zero_affected_rows_is_no_match() {
        assert_eq!(MutationOutcome::from_affected_rows(0), MutationOutcome::NoMatch);
        assert!(MutationOutcome::from_affected_rows(1).is_applied());
    }

    #[test]
    fn no_match_becomes_not_found() {
        let err = MutationOutcome::<()>::NoMatch
            .found_or_not_found(9)
            .expect_err("no match must fail");
        assert!(matches!(err, RepoError::NotFound(9)));
    }

    #[test]
    fn ids_beyond_sqlite_range_map_to_none() {
        assert_eq!(db_id(5), Some(5));
        assert_eq!(db_id(u64::MAX), None);
    }
}
