/// In-process [`Store`] backed by `tokio::sync::RwLock`
///
/// Mirrors the Postgres backend's observable behavior: logins are unique
/// (checked and inserted under one write lock), task access is owner
/// scoped, and listings come back in creation order. Nothing is persisted.

use super::{Store, StoreError};
use crate::models::task::{CreateTask, ReplaceTask, Task};
use crate::models::user::{CreateUser, User};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
    /// Keyed by login
    users: HashMap<String, User>,

    /// Insertion order is creation order
    tasks: Vec<Task>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(login).cloned())
    }

    async fn insert_user(&self, data: CreateUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;

        if tables.users.contains_key(&data.login) {
            return Err(StoreError::Conflict(
                "unique constraint users_login_key violated".to_string(),
            ));
        }

        let user = User {
            id: Uuid::new_v4(),
            login: data.login,
            password_hash: data.password_hash,
            created_at: Utc::now(),
        };
        tables.users.insert(user.login.clone(), user.clone());

        Ok(user)
    }

    async fn insert_task(&self, data: CreateTask) -> Result<Task, StoreError> {
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            owner_id: data.owner_id,
            title: data.title,
            description: data.description,
            done: false,
            created_at: now,
            updated_at: now,
        };

        self.tables.write().await.tasks.push(task.clone());
        Ok(task)
    }

    async fn list_tasks(&self, owner_id: Uuid) -> Result<Vec<Task>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn find_task(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Task>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .find(|t| t.id == id && t.owner_id == owner_id)
            .cloned())
    }

    async fn replace_task(
        &self,
        owner_id: Uuid,
        data: ReplaceTask,
    ) -> Result<Option<Task>, StoreError> {
        let mut tables = self.tables.write().await;

        let Some(task) = tables
            .tasks
            .iter_mut()
            .find(|t| t.id == data.id && t.owner_id == owner_id)
        else {
            return Ok(None);
        };

        task.title = data.title;
        task.description = data.description;
        task.done = data.done;
        task.updated_at = Utc::now();

        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Task>, StoreError> {
        let mut tables = self.tables.write().await;

        let position = tables
            .tasks
            .iter()
            .position(|t| t.id == id && t.owner_id == owner_id);

        Ok(position.map(|index| tables.tasks.remove(index)))
    }
}
