/// Tenant-scoped task operations
///
/// Every method takes the authenticated owner's id as its first argument
/// and never reads ownership from the input. A task belonging to someone
/// else is reported as [`TaskError::NotFound`], the same as a missing one.

use crate::models::task::{CreateTask, ReplaceTask, Task};
use crate::store::{Store, StoreError};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Error type for task operations
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// No task with that id in the caller's scope
    #[error("Task not found")]
    NotFound,

    /// Input rejected before touching storage
    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Fields a client supplies when creating a task
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
}

/// Full replacement of an existing task
#[derive(Debug, Clone)]
pub struct TaskUpdate {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub done: bool,
}

#[derive(Clone)]
pub struct TaskStore {
    store: Arc<dyn Store>,
}

impl TaskStore {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Creates a task owned by `owner_id`
    pub async fn create(&self, owner_id: Uuid, task: NewTask) -> Result<Task, TaskError> {
        ensure_title(&task.title)?;

        let task = self
            .store
            .insert_task(CreateTask {
                owner_id,
                title: task.title,
                description: task.description,
            })
            .await?;

        debug!(task_id = %task.id, owner_id = %owner_id, "Task created");
        Ok(task)
    }

    /// Every task of `owner_id`, oldest first
    pub async fn list(&self, owner_id: Uuid) -> Result<Vec<Task>, TaskError> {
        Ok(self.store.list_tasks(owner_id).await?)
    }

    pub async fn find(&self, owner_id: Uuid, id: Uuid) -> Result<Task, TaskError> {
        self.store
            .find_task(id, owner_id)
            .await?
            .ok_or(TaskError::NotFound)
    }

    /// Replaces title, description and done of one of `owner_id`'s tasks
    pub async fn update(&self, owner_id: Uuid, update: TaskUpdate) -> Result<Task, TaskError> {
        ensure_title(&update.title)?;

        // Ownership check first, then a write that is itself scoped.
        self.find(owner_id, update.id).await?;

        let task = self
            .store
            .replace_task(
                owner_id,
                ReplaceTask {
                    id: update.id,
                    title: update.title,
                    description: update.description,
                    done: update.done,
                },
            )
            .await?
            .ok_or(TaskError::NotFound)?;

        debug!(task_id = %task.id, owner_id = %owner_id, "Task updated");
        Ok(task)
    }

    /// Deletes one of `owner_id`'s tasks and returns what was removed
    pub async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<Task, TaskError> {
        self.find(owner_id, id).await?;

        let task = self
            .store
            .delete_task(id, owner_id)
            .await?
            .ok_or(TaskError::NotFound)?;

        debug!(task_id = %task.id, owner_id = %owner_id, "Task deleted");
        Ok(task)
    }
}

fn ensure_title(title: &str) -> Result<(), TaskError> {
    if title.trim().is_empty() {
        return Err(TaskError::Validation {
            field: "title",
            message: "Title must not be blank".to_string(),
        });
    }
    Ok(())
}
