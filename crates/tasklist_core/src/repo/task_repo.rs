//! Ownership-scoped task repository.
//!
//! # Responsibility
//! - Provide task CRUD where every statement names the owner.
//! - Surface conditioned mutations as explicit [`MutationOutcome`] values.
//!
//! # Invariants
//! - Reads filter on `user_id`; updates and deletes use the predicate
//!   `id = ?task AND user_id = ?owner`.
//! - A task owned by someone else is indistinguishable from a missing one.
//! - Lists are ordered by `created_at ASC, id ASC`.
//! - Write paths validate the title before SQL runs.
//! - Inserting for an owner without a `users` row is `OwnerNotFound`.

use crate::db::NOW_EPOCH_MS_SQL;
use crate::model::task::{NewTask, Task, TaskId};
use crate::model::user::UserId;
use crate::model::validation::validate_title;
use crate::repo::{
    db_id, ensure_connection_ready, id_from_db, MutationOutcome, RepoError, RepoResult,
};
use rusqlite::{ffi, params, Connection, ErrorCode, OptionalExtension, Row};

const TASK_COLUMNS: &[&str] = &["id", "user_id", "title", "created_at", "updated_at"];

const TASK_RETURNING_SQL: &str = "RETURNING id, user_id, title, created_at, updated_at";

/// Repository interface for owner-scoped task operations.
pub trait TaskRepository {
    /// Lists the owner's tasks, oldest first. Empty when there are none.
    fn list_by_owner(&self, owner_id: UserId) -> RepoResult<Vec<Task>>;
    /// Gets one task matching both owner and id.
    fn get_by_owner_and_id(&self, owner_id: UserId, task_id: TaskId) -> RepoResult<Task>;
    /// Inserts a task; the store assigns id and timestamps.
    fn create(&self, task: &NewTask) -> RepoResult<Task>;
    /// Replaces the title of an owned task and returns the updated row.
    fn update_title(&self, owner_id: UserId, task_id: TaskId, title: &str) -> RepoResult<Task>;
    /// Deletes an owned task.
    fn delete(&self, owner_id: UserId, task_id: TaskId) -> RepoResult<()>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "tasks", TASK_COLUMNS)?;
        Ok(Self { conn })
    }

    /// Runs `UPDATE ... WHERE id AND user_id` and reports what it touched.
    ///
    /// Rows come back through `RETURNING`, so the returned row count is the
    /// affected-row count of this exact statement.
    pub fn conditioned_update_title(
        &self,
        owner_id: UserId,
        task_id: TaskId,
        title: &str,
    ) -> RepoResult<MutationOutcome<Task>> {
        let title = validate_title(title)?;
        let (Some(owner), Some(id)) = (db_id(owner_id), db_id(task_id)) else {
            return Ok(MutationOutcome::NoMatch);
        };

        let mut stmt = self.conn.prepare(&format!(
            "UPDATE tasks
             SET
                title = ?1,
                updated_at = {NOW_EPOCH_MS_SQL}
             WHERE id = ?2
               AND user_id = ?3
             {TASK_RETURNING_SQL};"
        ))?;
        let mut rows = stmt.query(params![title, id, owner])?;
        let mut updated = Vec::new();
        while let Some(row) = rows.next()? {
            updated.push(parse_task_row(row)?);
        }

        match updated.len() {
            0 => Ok(MutationOutcome::NoMatch),
            1 => Ok(MutationOutcome::Applied(updated.remove(0))),
            count => Err(RepoError::InvalidData(format!(
                "conditioned update touched {count} rows for task {task_id}"
            ))),
        }
    }

    /// Runs `DELETE ... WHERE id AND user_id` and reports what it touched.
    pub fn conditioned_delete(
        &self,
        owner_id: UserId,
        task_id: TaskId,
    ) -> RepoResult<MutationOutcome<()>> {
        let (Some(owner), Some(id)) = (db_id(owner_id), db_id(task_id)) else {
            return Ok(MutationOutcome::NoMatch);
        };

        let affected = self.conn.execute(
            "DELETE FROM tasks
             WHERE id = ?1
               AND user_id = ?2;",
            params![id, owner],
        )?;
        Ok(MutationOutcome::from_affected_rows(affected))
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn list_by_owner(&self, owner_id: UserId) -> RepoResult<Vec<Task>> {
        let Some(owner) = db_id(owner_id) else {
            return Ok(Vec::new());
        };

        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, title, created_at, updated_at
             FROM tasks
             WHERE user_id = ?1
             ORDER BY created_at ASC, id ASC;",
        )?;
        let mut rows = stmt.query([owner])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn get_by_owner_and_id(&self, owner_id: UserId, task_id: TaskId) -> RepoResult<Task> {
        let (Some(owner), Some(id)) = (db_id(owner_id), db_id(task_id)) else {
            return Err(RepoError::NotFound(task_id));
        };

        self.conn
            .query_row(
                "SELECT id, user_id, title, created_at, updated_at
                 FROM tasks
                 WHERE id = ?1
                   AND user_id = ?2;",
                params![id, owner],
                |row| Ok(parse_task_row(row)),
            )
            .optional()?
            .unwrap_or(Err(RepoError::NotFound(task_id)))
    }

    fn create(&self, task: &NewTask) -> RepoResult<Task> {
        let title = validate_title(&task.title)?;
        let owner = db_id(task.user_id).ok_or(RepoError::OwnerNotFound(task.user_id))?;

        self.conn
            .query_row(
                &format!(
                    "INSERT INTO tasks (user_id, title)
                     VALUES (?1, ?2)
                     {TASK_RETURNING_SQL};"
                ),
                params![owner, title],
                |row| Ok(parse_task_row(row)),
            )
            .map_err(|err| map_insert_error(err, task.user_id))?
    }

    fn update_title(&self, owner_id: UserId, task_id: TaskId, title: &str) -> RepoResult<Task> {
        self.conditioned_update_title(owner_id, task_id, title)?
            .found_or_not_found(task_id)
    }

    fn delete(&self, owner_id: UserId, task_id: TaskId) -> RepoResult<()> {
        self.conditioned_delete(owner_id, task_id)?
            .found_or_not_found(task_id)
    }
}

fn map_insert_error(err: rusqlite::Error, owner_id: UserId) -> RepoError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
        {
            RepoError::OwnerNotFound(owner_id)
        }
        _ => RepoError::from(err),
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    Ok(Task {
        id: id_from_db(row.get("id")?, "tasks.id")?,
        user_id: id_from_db(row.get("user_id")?, "tasks.user_id")?,
        title: row.get("title")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
