/// Task endpoints
///
/// Every handler sits behind `require_access` and takes the owner from the
/// [`Principal`], never from the request. An `owner_id` sent in a body is
/// ignored.
///
/// # Endpoints
///
/// - `GET /api/v1/tasks` - List own tasks, oldest first
/// - `GET /api/v1/tasks/:id` - Get one task
/// - `POST /api/v1/tasks` - Create a task
/// - `PATCH /api/v1/tasks` - Replace a task's title, description and done
/// - `DELETE /api/v1/tasks/:id` - Delete a task, returning it

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ValidatedJson,
    middleware::auth::Principal,
};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use tasknest_shared::{
    models::task::Task,
    tasks::{NewTask, TaskUpdate},
};
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: String,

    #[validate(length(max = 4096, message = "Description must be at most 4096 characters"))]
    pub description: Option<String>,
}

/// Update task request
///
/// Full replacement: a missing `description` clears it, a missing `done`
/// resets it to false.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    pub id: Uuid,

    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: String,

    #[validate(length(max = 4096, message = "Description must be at most 4096 characters"))]
    pub description: Option<String>,

    #[serde(default)]
    pub done: bool,
}

pub async fn list_tasks(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = state.tasks.list(principal.user_id).await?;
    Ok(Json(tasks))
}

pub async fn get_task(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let task = state.tasks.find(principal.user_id, parse_task_id(&id)?).await?;
    Ok(Json(task))
}

pub async fn create_task(
    State(state): State<AppState>,
    principal: Principal,
    ValidatedJson(req): ValidatedJson<CreateTaskRequest>,
) -> ApiResult<Json<Task>> {
    let task = state
        .tasks
        .create(
            principal.user_id,
            NewTask {
                title: req.title,
                description: req.description,
            },
        )
        .await?;

    Ok(Json(task))
}

pub async fn update_task(
    State(state): State<AppState>,
    principal: Principal,
    ValidatedJson(req): ValidatedJson<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    let task = state
        .tasks
        .update(
            principal.user_id,
            TaskUpdate {
                id: req.id,
                title: req.title,
                description: req.description,
                done: req.done,
            },
        )
        .await?;

    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let task = state.tasks.delete(principal.user_id, parse_task_id(&id)?).await?;
    Ok(Json(task))
}

fn parse_task_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest("Invalid task id".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_task_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_task_id(&id.to_string()).unwrap(), id);
        assert!(matches!(parse_task_id("42"), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_update_defaults() {
        let req: UpdateTaskRequest = serde_json::from_value(serde_json::json!({
            "id": Uuid::new_v4(),
            "title": "t",
        }))
        .unwrap();

        assert_eq!(req.description, None);
        assert!(!req.done);
    }
}
