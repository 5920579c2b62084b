/// Postgres-backed [`Store`]
///
/// Every method delegates to the model queries; unique violations are
/// turned into [`StoreError::Conflict`] by `From<sqlx::Error>`.
///
/// # Example
///
/// ```no_run
/// use tasknest_shared::db::pool::{create_pool, DatabaseConfig};
/// use tasknest_shared::store::{PgStore, Store};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let store = PgStore::new(pool);
/// store.ping().await?;
/// # Ok(())
/// # }
/// ```

use super::{Store, StoreError};
use crate::db::pool::health_check;
use crate::models::task::{CreateTask, ReplaceTask, Task};
use crate::models::user::{CreateUser, User};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool, for shutdown
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        health_check(&self.pool).await?;
        Ok(())
    }

    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, StoreError> {
        Ok(User::find_by_login(&self.pool, login).await?)
    }

    async fn insert_user(&self, data: CreateUser) -> Result<User, StoreError> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn insert_task(&self, data: CreateTask) -> Result<Task, StoreError> {
        Ok(Task::create(&self.pool, data).await?)
    }

    async fn list_tasks(&self, owner_id: Uuid) -> Result<Vec<Task>, StoreError> {
        Ok(Task::list_by_owner(&self.pool, owner_id).await?)
    }

    async fn find_task(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Task>, StoreError> {
        Ok(Task::find_by_id_and_owner(&self.pool, id, owner_id).await?)
    }

    async fn replace_task(
        &self,
        owner_id: Uuid,
        data: ReplaceTask,
    ) -> Result<Option<Task>, StoreError> {
        Ok(Task::replace_for_owner(&self.pool, owner_id, data).await?)
    }

    async fn delete_task(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Task>, StoreError> {
        Ok(Task::delete_for_owner(&self.pool, id, owner_id).await?)
    }
}
