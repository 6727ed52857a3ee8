//! Task CRUD flows for an authenticated caller.
//!
//! # Invariants
//! - The owner of a created task is always the caller, never input data.
//! - Every repository call is scoped by the caller's user id.
//! - Results leave this layer as [`TaskResponse`], not storage rows.

use crate::auth::identity::AuthenticatedUser;
use crate::model::task::{NewTask, TaskId, TaskResponse};
use crate::model::validation::validate_title;
use crate::repo::task_repo::TaskRepository;
use crate::service::error::ServiceResult;
use log::{debug, info};

/// Task orchestrator over an owner-scoped repository.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists the caller's tasks, oldest first.
    pub fn list_tasks(&self, caller: &AuthenticatedUser) -> ServiceResult<Vec<TaskResponse>> {
        let tasks = self.repo.list_by_owner(caller.user_id())?;
        debug!(
            "event=task_list module=task status=ok user_id={} count={}",
            caller.user_id(),
            tasks.len()
        );
        Ok(tasks.into_iter().map(TaskResponse::from).collect())
    }

    /// Gets one of the caller's tasks.
    ///
    /// A task owned by another user is reported as `NotFound`.
    pub fn get_task(
        &self,
        caller: &AuthenticatedUser,
        task_id: TaskId,
    ) -> ServiceResult<TaskResponse> {
        let task = self.repo.get_by_owner_and_id(caller.user_id(), task_id)?;
        Ok(TaskResponse::from(task))
    }

    /// Creates a task owned by the caller.
    pub fn create_task(
        &self,
        caller: &AuthenticatedUser,
        title: &str,
    ) -> ServiceResult<TaskResponse> {
        let title = validate_title(title)?;
        let task = self.repo.create(&NewTask {
            user_id: caller.user_id(),
            title: title.to_string(),
        })?;
        info!(
            "event=task_create module=task status=ok user_id={} task_id={}",
            task.user_id, task.id
        );
        Ok(TaskResponse::from(task))
    }

    /// Replaces the title of one of the caller's tasks.
    pub fn update_task(
        &self,
        caller: &AuthenticatedUser,
        task_id: TaskId,
        title: &str,
    ) -> ServiceResult<TaskResponse> {
        let title = validate_title(title)?;
        let task = self.repo.update_title(caller.user_id(), task_id, title)?;
        info!(
            "event=task_update module=task status=ok user_id={} task_id={}",
            task.user_id, task.id
        );
        Ok(TaskResponse::from(task))
    }

    /// Deletes one of the caller's tasks.
    ///
    /// Deleting an already-deleted task is `NotFound`, not a silent success.
    pub fn delete_task(&self, caller: &AuthenticatedUser, task_id: TaskId) -> ServiceResult<()> {
        self.repo.delete(caller.user_id(), task_id)?;
        info!(
            "event=task_delete module=task status=ok user_id={} task_id={task_id}",
            caller.user_id()
        );
        Ok(())
    }
}
