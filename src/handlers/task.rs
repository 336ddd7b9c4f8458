use axum::{extract::State, http::StatusCode, Json};
use sea_orm::TransactionTrait;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use utoipa::{IntoParams, ToSchema};

use crate::error::AppResult;
use crate::handlers::{
    deserialize_present, validate_range, validate_required, ApiJson, ApiPath, ApiQuery,
};
use crate::models::{
    CreateTask, Task, TaskFilter, TaskSummary, UpdateTask, DEFAULT_PRIORITY, MAX_PRIORITY,
    MIN_PRIORITY, TASK_TITLE_MAX_LEN,
};
use crate::repositories::{Repository, TaskRepository};
use crate::state::AppState;

// ============ Request/Response DTOs ============

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub due_date: Option<Date>,
    #[serde(default = "default_priority")]
    #[schema(default = 2, minimum = 1, maximum = 4)]
    pub priority: i32,
    #[serde(default)]
    pub completed: bool,
    pub project_id: Option<i32>,
}

/// Partial update. For `description`, `due_date` and `project_id` an explicit
/// `null` clears the value while an omitted field keeps it.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<String>, format = Date)]
    pub due_date: Option<Option<Date>>,
    #[schema(minimum = 1, maximum = 4)]
    pub priority: Option<i32>,
    pub completed: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<i32>)]
    pub project_id: Option<Option<i32>>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct TaskListParams {
    /// Only tasks in this project
    pub project_id: Option<i32>,
    /// Only completed (`true`) or open (`false`) tasks
    pub completed: Option<bool>,
    /// Case-insensitive match against title or description
    pub search: Option<String>,
    /// Due on or before this date (YYYY-MM-DD)
    #[param(value_type = Option<String>, format = Date)]
    pub due_before: Option<Date>,
    /// Due on or after this date (YYYY-MM-DD)
    #[param(value_type = Option<String>, format = Date)]
    pub due_after: Option<Date>,
}

impl From<TaskListParams> for TaskFilter {
    fn from(p: TaskListParams) -> Self {
        Self {
            project_id: p.project_id,
            completed: p.completed,
            search: p.search.filter(|s| !s.is_empty()),
            due_before: p.due_before,
            due_after: p.due_after,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TaskResponse {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub due_date: Option<Date>,
    pub priority: i32,
    pub completed: bool,
    pub project_id: Option<i32>,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: OffsetDateTime,
}

impl From<Task> for TaskResponse {
    fn from(t: Task) -> Self {
        Self {
            id: t.id,
            title: t.title,
            description: t.description,
            due_date: t.due_date,
            priority: t.priority,
            completed: t.completed,
            project_id: t.project_id,
            created_at: t.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TaskSummaryResponse {
    pub total: u64,
    pub completed: u64,
    pub active: u64,
}

impl From<TaskSummary> for TaskSummaryResponse {
    fn from(s: TaskSummary) -> Self {
        Self {
            total: s.total,
            completed: s.completed,
            active: s.active,
        }
    }
}

// ============ Handlers ============

/// Create a new task
#[utoipa::path(
    post,
    path = "/api/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created successfully", body = TaskResponse),
        (status = 400, description = "Project does not exist"),
        (status = 422, description = "Validation error")
    ),
    tag = "Tasks"
)]
pub async fn create_task(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateTaskRequest>,
) -> AppResult<(StatusCode, Json<TaskResponse>)> {
    validate_required(&payload.title, "Title", TASK_TITLE_MAX_LEN)?;
    validate_range(payload.priority, "Priority", MIN_PRIORITY, MAX_PRIORITY)?;

    let create_task = CreateTask {
        title: payload.title,
        description: payload.description,
        due_date: payload.due_date,
        priority: payload.priority,
        completed: payload.completed,
        project_id: payload.project_id,
    };

    let txn = state.begin_write().await?;
    let task = TaskRepository::create(&*txn, &create_task).await?;
    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(task.into())))
}

/// List tasks matching the given filters
#[utoipa::path(
    get,
    path = "/api/tasks",
    params(TaskListParams),
    responses(
        (status = 200, description = "Filtered, ordered list of tasks", body = Vec<TaskResponse>),
        (status = 422, description = "Malformed filter")
    ),
    tag = "Tasks"
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<TaskListParams>,
) -> AppResult<Json<Vec<TaskResponse>>> {
    let filter = TaskFilter::from(params);

    let txn = state.db.begin().await?;
    let tasks = TaskRepository::list_filtered(&txn, &filter).await?;
    txn.commit().await?;

    Ok(Json(tasks.into_iter().map(|t| t.into()).collect()))
}

/// Get a task by ID
#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    params(
        ("id" = i32, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task details", body = TaskResponse),
        (status = 404, description = "Task not found")
    ),
    tag = "Tasks"
)]
pub async fn get_task(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<TaskResponse>> {
    let txn = state.db.begin().await?;
    let task = TaskRepository::find_by_id(&txn, id).await?;
    txn.commit().await?;

    Ok(Json(task.into()))
}

/// Update a task
#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    params(
        ("id" = i32, Path, description = "Task ID")
    ),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated successfully", body = TaskResponse),
        (status = 400, description = "Project does not exist"),
        (status = 404, description = "Task not found"),
        (status = 422, description = "Validation error")
    ),
    tag = "Tasks"
)]
pub async fn update_task(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<UpdateTaskRequest>,
) -> AppResult<Json<TaskResponse>> {
    if let Some(title) = &payload.title {
        validate_required(title, "Title", TASK_TITLE_MAX_LEN)?;
    }
    if let Some(priority) = payload.priority {
        validate_range(priority, "Priority", MIN_PRIORITY, MAX_PRIORITY)?;
    }

    let update_task = UpdateTask {
        title: payload.title,
        description: payload.description,
        due_date: payload.due_date,
        priority: payload.priority,
        completed: payload.completed,
        project_id: payload.project_id,
    };

    let txn = state.begin_write().await?;
    let task = TaskRepository::update(&*txn, id, &update_task).await?;
    txn.commit().await?;

    Ok(Json(task.into()))
}

/// Flip a task between open and completed
#[utoipa::path(
    patch,
    path = "/api/tasks/{id}/toggle",
    params(
        ("id" = i32, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task with its completion flag flipped", body = TaskResponse),
        (status = 404, description = "Task not found")
    ),
    tag = "Tasks"
)]
pub async fn toggle_task(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<TaskResponse>> {
    let txn = state.begin_write().await?;
    let task = TaskRepository::toggle(&*txn, id).await?;
    txn.commit().await?;

    Ok(Json(task.into()))
}

/// Delete a task
#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    params(
        ("id" = i32, Path, description = "Task ID")
    ),
    responses(
        (status = 204, description = "Task deleted successfully"),
        (status = 404, description = "Task not found")
    ),
    tag = "Tasks"
)]
pub async fn delete_task(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<StatusCode> {
    let txn = state.begin_write().await?;
    TaskRepository::delete(&*txn, id).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Count all tasks, completed tasks and open tasks
#[utoipa::path(
    get,
    path = "/api/tasks/summary",
    responses(
        (status = 200, description = "Task counts", body = TaskSummaryResponse)
    ),
    tag = "Tasks"
)]
pub async fn task_summary(State(state): State<AppState>) -> AppResult<Json<TaskSummaryResponse>> {
    let txn = state.db.begin().await?;
    let summary = TaskRepository::summary(&txn).await?;
    txn.commit().await?;

    Ok(Json(summary.into()))
}
