//! Task record owned by exactly one user.

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};

/// Store-assigned task identifier.
pub type TaskId = u64;

/// Persisted task row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    /// Owner. Immutable after creation.
    pub user_id: UserId,
    pub title: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds. Refreshed by title updates.
    pub updated_at: i64,
}

/// Insert shape for a task; the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub user_id: UserId,
    pub title: String,
}

/// Wire projection of a task. Omits the owner id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResponse {
    pub id: TaskId,
    pub title: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}
