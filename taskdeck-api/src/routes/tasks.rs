/// Task CRUD endpoints
///
/// All handlers run behind the JWT layer; the authenticated user is the
/// owner for every operation. Ownership is enforced uniformly: fetching,
/// updating or deleting someone else's task is a 403.
///
/// # Endpoints
///
/// - `POST   /v1/tasks` - create
/// - `GET    /v1/tasks?status&priority&sortBy&sortOrder` - list
/// - `GET    /v1/tasks/:id` - fetch one
/// - `PUT    /v1/tasks/:id` - partial update
/// - `DELETE /v1/tasks/:id` - delete

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use taskdeck_shared::{
    auth::CurrentUser,
    lifecycle::{NewTask, TaskPatch},
    models::task::{
        CreateTask, SortDirection, SortField, Task, TaskFilter, TaskPriority, TaskSort,
    },
};
use uuid::Uuid;

/// Create response; the payload key is `newTask`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskResponse {
    pub success: bool,
    pub message: String,
    pub new_task: Task,
}

/// Listing query parameters
///
/// `status` is a coarse two-state filter: `completed` selects completed
/// tasks and any other supplied value selects uncompleted ones. It is not
/// a three-way match on the status enum.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksQuery {
    pub status: Option<String>,
    pub priority: Option<TaskPriority>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// List response; the tasks ride under `task`
#[derive(Debug, Serialize)]
pub struct ListTasksResponse {
    pub success: bool,
    pub task: Vec<Task>,
}

/// Single-task response
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub success: bool,
    pub data: Task,
}

/// Update response
#[derive(Debug, Serialize)]
pub struct UpdateTaskResponse {
    pub success: bool,
    pub message: String,
    pub data: Task,
}

/// Delete response
#[derive(Debug, Serialize)]
pub struct DeleteTaskResponse {
    pub success: bool,
    pub message: String,
}

/// Maps the `status` query param onto the completed-equality filter
fn completed_filter(status: Option<&str>) -> Option<bool> {
    status.map(|value| value == "completed")
}

/// Resolves `sortBy`/`sortOrder` into a whitelisted sort criterion
///
/// An unknown `sortBy` is rejected rather than silently ignored.
fn resolve_sort(
    sort_by: Option<&str>,
    sort_order: Option<&str>,
) -> Result<Option<TaskSort>, ApiError> {
    let Some(sort_by) = sort_by else {
        return Ok(None);
    };

    let field = SortField::parse(sort_by).ok_or_else(|| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "sortBy".to_string(),
            message: format!("Cannot sort by unknown field '{sort_by}'"),
        }])
    })?;

    Ok(Some(TaskSort {
        field,
        direction: SortDirection::parse(sort_order),
    }))
}

/// Fetches a task and enforces that the caller owns it
async fn find_owned_task(state: &AppState, id: Uuid, owner: Uuid) -> Result<Task, ApiError> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    if task.created_by != owner {
        return Err(ApiError::Forbidden(
            "You do not have access to this task".to_string(),
        ));
    }

    Ok(task)
}

/// Creates a task
///
/// Validation happens entirely before the insert; a rejected request
/// writes nothing. The new task starts Pending and not completed.
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<CurrentUser>,
    Json(req): Json<NewTask>,
) -> ApiResult<(StatusCode, Json<CreateTaskResponse>)> {
    let valid = req.validate(Utc::now())?;

    let task = Task::create(
        &state.db,
        CreateTask {
            title: valid.title,
            description: valid.description,
            due_date: valid.due_date,
            priority: valid.priority,
            created_by: auth.id,
        },
    )
    .await?;

    tracing::info!(
        user_id = %auth.id,
        task_id = %task.id,
        priority = task.priority.as_str(),
        "task created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateTaskResponse {
            success: true,
            message: "Task created successfully".to_string(),
            new_task: task,
        }),
    ))
}

/// Lists the caller's tasks with optional filter and sort
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<CurrentUser>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<ListTasksResponse>> {
    let filter = TaskFilter {
        completed: completed_filter(query.status.as_deref()),
        priority: query.priority,
    };
    let sort = resolve_sort(query.sort_by.as_deref(), query.sort_order.as_deref())?;

    let tasks = Task::list_by_owner(&state.db, auth.id, &filter, sort).await?;

    Ok(Json(ListTasksResponse {
        success: true,
        task: tasks,
    }))
}

/// Fetches one task by id
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskResponse>> {
    let task = find_owned_task(&state, id, auth.id).await?;

    Ok(Json(TaskResponse {
        success: true,
        data: task,
    }))
}

/// Partially updates a task
///
/// Only supplied fields are merged; completion state is re-derived from
/// the post-merge status on every call. Last write wins on concurrent
/// updates.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(patch): Json<TaskPatch>,
) -> ApiResult<Json<UpdateTaskResponse>> {
    let mut task = find_owned_task(&state, id, auth.id).await?;

    patch.apply_to(&mut task, Utc::now())?;
    let task = task.save(&state.db).await?;

    tracing::info!(
        user_id = %auth.id,
        task_id = %task.id,
        status = task.status.as_str(),
        "task updated"
    );

    Ok(Json(UpdateTaskResponse {
        success: true,
        message: "Task updated successfully".to_string(),
        data: task,
    }))
}

/// Deletes a task
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteTaskResponse>> {
    let task = find_owned_task(&state, id, auth.id).await?;

    let deleted = Task::delete(&state.db, task.id).await?;
    if !deleted {
        // Lost a race with a concurrent delete.
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    tracing::info!(user_id = %auth.id, task_id = %task.id, "task deleted");

    Ok(Json(DeleteTaskResponse {
        success: true,
        message: "Task deleted successfully".to_string(),
    }))
}
