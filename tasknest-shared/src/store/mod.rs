/// Persistence seam for users and tasks
///
/// Domain services ([`crate::accounts`], [`crate::tasks`]) talk to storage
/// only through the [`Store`] trait. Two backends ship with the crate:
///
/// - [`postgres::PgStore`]: the production backend, a thin wrapper around
///   the queries in [`crate::models`]
/// - [`memory::MemoryStore`]: an in-process backend used by tests and local
///   experiments
///
/// # Contract
///
/// - `insert_user` is the atomic uniqueness gate for logins. Two concurrent
///   inserts of the same login must leave exactly one row and report
///   [`StoreError::Conflict`] to the loser.
/// - Every task operation except `insert_task` is scoped by owner. A task
///   that exists but belongs to another owner is reported as `None`, exactly
///   like a missing one.
/// - `list_tasks` returns tasks in creation order.

pub mod memory;
pub mod postgres;

use crate::models::task::{CreateTask, ReplaceTask, Task};
use crate::models::user::{CreateUser, User};
use async_trait::async_trait;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Backend failure
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => StoreError::Conflict(
                db_err
                    .constraint()
                    .map(|c| format!("unique constraint {} violated", c))
                    .unwrap_or_else(|| "unique constraint violated".to_string()),
            ),
            _ => StoreError::Database(err),
        }
    }
}

/// Storage backend for users and their tasks
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Cheap liveness probe
    async fn ping(&self) -> Result<(), StoreError>;

    /// Looks up a user by exact login
    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, StoreError>;

    /// Inserts a user, failing with [`StoreError::Conflict`] if the login is taken
    async fn insert_user(&self, data: CreateUser) -> Result<User, StoreError>;

    /// Inserts a task for `data.owner_id`
    async fn insert_task(&self, data: CreateTask) -> Result<Task, StoreError>;

    /// All tasks of an owner, in creation order
    async fn list_tasks(&self, owner_id: Uuid) -> Result<Vec<Task>, StoreError>;

    /// A single task within an owner's scope
    async fn find_task(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Task>, StoreError>;

    /// Replaces a task's mutable fields within an owner's scope
    async fn replace_task(
        &self,
        owner_id: Uuid,
        data: ReplaceTask,
    ) -> Result<Option<Task>, StoreError>;

    /// Deletes a task within an owner's scope, returning the removed row
    async fn delete_task(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Task>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_is_database_error() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[test]
    fn test_conflict_display() {
        let err = StoreError::Conflict("unique constraint users_login_key violated".to_string());
        assert_eq!(
            err.to_string(),
            "Conflict: unique constraint users_login_key violated"
        );
    }
}
