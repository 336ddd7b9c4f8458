use axum::{extract::State, http::StatusCode, Json};
use sea_orm::TransactionTrait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppResult;
use crate::handlers::{validate_optional, validate_required, ApiJson, ApiPath};
use crate::models::{
    CreateProject, Project, UpdateProject, DEFAULT_PROJECT_COLOR, PROJECT_COLOR_MAX_LEN,
    PROJECT_NAME_MAX_LEN,
};
use crate::repositories::{ProjectRepository, Repository};
use crate::state::AppState;

// ============ Request/Response DTOs ============

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProjectRequest {
    pub name: String,
    /// Defaults to `#7c3aed`
    pub color: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectResponse {
    pub id: i32,
    pub name: String,
    pub color: String,
}

impl From<Project> for ProjectResponse {
    fn from(p: Project) -> Self {
        Self {
            id: p.id,
            name: p.name,
            color: p.color,
        }
    }
}

// ============ Handlers ============

/// Create a new project
#[utoipa::path(
    post,
    path = "/api/projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created successfully", body = ProjectResponse),
        (status = 400, description = "A project with this name already exists"),
        (status = 422, description = "Validation error")
    ),
    tag = "Projects"
)]
pub async fn create_project(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateProjectRequest>,
) -> AppResult<(StatusCode, Json<ProjectResponse>)> {
    validate_required(&payload.name, "Name", PROJECT_NAME_MAX_LEN)?;
    validate_optional(&payload.color, "Color", PROJECT_COLOR_MAX_LEN)?;

    let create_project = CreateProject {
        name: payload.name,
        color: payload
            .color
            .unwrap_or_else(|| DEFAULT_PROJECT_COLOR.to_string()),
    };

    let txn = state.begin_write().await?;
    let project = ProjectRepository::create(&*txn, &create_project).await?;
    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(project.into())))
}

/// List all projects, sorted by name
#[utoipa::path(
    get,
    path = "/api/projects",
    responses(
        (status = 200, description = "List of projects", body = Vec<ProjectResponse>)
    ),
    tag = "Projects"
)]
pub async fn list_projects(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ProjectResponse>>> {
    let txn = state.db.begin().await?;
    let projects = ProjectRepository::list(&txn).await?;
    txn.commit().await?;

    Ok(Json(projects.into_iter().map(|p| p.into()).collect()))
}

/// Update a project.
///
/// The Inbox can be recoloured but not renamed: a rename is rejected with
/// `forbidden` so that a project named Inbox always exists. Earlier releases
/// accepted the rename.
#[utoipa::path(
    put,
    path = "/api/projects/{id}",
    params(
        ("id" = i32, Path, description = "Project ID")
    ),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Project updated successfully", body = ProjectResponse),
        (status = 400, description = "Name already taken or Inbox rename"),
        (status = 404, description = "Project not found"),
        (status = 422, description = "Validation error")
    ),
    tag = "Projects"
)]
pub async fn update_project(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<UpdateProjectRequest>,
) -> AppResult<Json<ProjectResponse>> {
    if let Some(name) = &payload.name {
        validate_required(name, "Name", PROJECT_NAME_MAX_LEN)?;
    }
    validate_optional(&payload.color, "Color", PROJECT_COLOR_MAX_LEN)?;

    let update_project = UpdateProject {
        name: payload.name,
        color: payload.color,
    };

    let txn = state.begin_write().await?;
    let project = ProjectRepository::update(&*txn, id, &update_project).await?;
    txn.commit().await?;

    Ok(Json(project.into()))
}

/// Delete a project. Its tasks are kept and detached.
#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    params(
        ("id" = i32, Path, description = "Project ID")
    ),
    responses(
        (status = 204, description = "Project deleted successfully"),
        (status = 400, description = "The Inbox project cannot be deleted"),
        (status = 404, description = "Project not found")
    ),
    tag = "Projects"
)]
pub async fn delete_project(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<StatusCode> {
    let txn = state.begin_write().await?;
    ProjectRepository::delete(&*txn, id).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
