/// Task model and database operations
///
/// A task is a TODO item owned by exactly one user. Every read and write
/// below except [`Task::create`] takes the owner as a parameter and puts it
/// in the WHERE clause, so a task belonging to someone else is
/// indistinguishable from a task that does not exist.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL CHECK (length(btrim(title)) > 0),
///     description TEXT,
///     done BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use tasknest_shared::models::task::{Task, CreateTask, ReplaceTask};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, owner_id: Uuid) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, CreateTask {
///     owner_id,
///     title: "Buy milk".to_string(),
///     description: None,
/// }).await?;
///
/// let done = Task::replace_for_owner(&pool, owner_id, ReplaceTask {
///     id: task.id,
///     title: "Buy milk".to_string(),
///     description: None,
///     done: true,
/// }).await?;
/// assert!(done.map(|t| t.done).unwrap_or(false));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// TODO item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID (UUID v4)
    pub id: Uuid,

    /// Owning user; never changes after creation
    pub owner_id: Uuid,

    /// Non-blank title
    pub title: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Completion flag
    pub done: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
///
/// New tasks always start with `done = false`.
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
}

/// Full replacement of a task's mutable fields
///
/// Identity and ownership are not part of the replacement: `id` selects the
/// row, the owner comes from the caller.
#[derive(Debug, Clone)]
pub struct ReplaceTask {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub done: bool,
}

impl Task {
    /// Inserts a new task for its owner
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (owner_id, title, description)
            VALUES ($1, $2, $3)
            RETURNING id, owner_id, title, description, done, created_at, updated_at
            "#,
        )
        .bind(data.owner_id)
        .bind(data.title)
        .bind(data.description)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Lists every task of an owner, oldest first
    ///
    /// Ties on `created_at` are broken by `id` so the order is stable.
    pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, owner_id, title, description, done, created_at, updated_at
            FROM tasks
            WHERE owner_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Finds a task by ID within an owner's scope
    pub async fn find_by_id_and_owner(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, owner_id, title, description, done, created_at, updated_at
            FROM tasks
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Replaces title, description and done within an owner's scope
    ///
    /// Returns `None` if no row matched both id and owner.
    pub async fn replace_for_owner(
        pool: &PgPool,
        owner_id: Uuid,
        data: ReplaceTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = $3, description = $4, done = $5, updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, title, description, done, created_at, updated_at
            "#,
        )
        .bind(data.id)
        .bind(owner_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.done)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a task within an owner's scope
    ///
    /// Returns the deleted row, or `None` if no row matched both id and owner.
    pub async fn delete_for_owner(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            DELETE FROM tasks
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, title, description, done, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }
}
