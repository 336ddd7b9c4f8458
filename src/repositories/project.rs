use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entity::project::{self, ActiveModel, Column};
use crate::entity::ProjectEntity;
use crate::error::{AppError, AppResult};
use crate::models::{CreateProject, Project, UpdateProject};
use crate::repositories::{Repository, TaskRepository};

/// Project repository for database operations
pub struct ProjectRepository;

#[async_trait]
impl Repository<Project> for ProjectRepository {
    async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<Project> {
        let model = ProjectEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Project".to_string()))?;

        Ok(model.into())
    }

    /// Delete a project, detaching its tasks first. The Inbox is protected.
    async fn delete<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<()> {
        let project = Self::find_by_id(db, id).await?;

        if project.is_inbox() {
            tracing::info!(project_id = id, "Refusing to delete the Inbox project");
            return Err(AppError::Forbidden(
                "The Inbox project cannot be deleted".to_string(),
            ));
        }

        let detached = TaskRepository::detach_from_project(db, id).await?;

        let result = ProjectEntity::delete_by_id(id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Project".to_string()));
        }

        tracing::debug!(project_id = id, detached, "Project deleted");
        Ok(())
    }

    async fn list<C: ConnectionTrait>(db: &C) -> AppResult<Vec<Project>> {
        let models = ProjectEntity::find()
            .order_by_asc(Column::Name)
            .all(db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    async fn count<C: ConnectionTrait>(db: &C) -> AppResult<u64> {
        let count = ProjectEntity::find().count(db).await?;
        Ok(count)
    }
}

impl ProjectRepository {
    /// Create a new project. Names are unique across all projects.
    pub async fn create<C: ConnectionTrait>(db: &C, input: &CreateProject) -> AppResult<Project> {
        if Self::find_by_name(db, &input.name).await?.is_some() {
            return Err(AppError::Conflict(
                "A project with this name already exists".to_string(),
            ));
        }

        let model = ActiveModel {
            name: Set(input.name.clone()),
            color: Set(input.color.clone()),
            ..Default::default()
        };

        // A concurrent insert of the same name surfaces here as a unique violation
        let result = model.insert(db).await.map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => {
                AppError::Conflict("A project with this name already exists".to_string())
            }
            other => other,
        })?;

        tracing::debug!(project_id = result.id, name = %result.name, "Project created");
        Ok(result.into())
    }

    /// Find project by its exact name
    pub async fn find_by_name<C: ConnectionTrait>(
        db: &C,
        name: &str,
    ) -> AppResult<Option<Project>> {
        let model = ProjectEntity::find()
            .filter(Column::Name.eq(name))
            .one(db)
            .await?;

        Ok(model.map(Into::into))
    }

    /// Check whether a project with the given ID exists
    pub async fn exists<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<bool> {
        let count = ProjectEntity::find_by_id(id).count(db).await?;
        Ok(count > 0)
    }

    /// Apply a partial update; fields absent from `input` are left untouched
    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: i32,
        input: &UpdateProject,
    ) -> AppResult<Project> {
        let model = ProjectEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Project".to_string()))?;

        if input.renames_inbox(&model.clone().into()) {
            return Err(AppError::Forbidden(
                "The Inbox project cannot be renamed".to_string(),
            ));
        }

        let mut active: ActiveModel = model.clone().into();

        if let Some(name) = &input.name {
            active.name = Set(name.clone());
        }
        if let Some(color) = &input.color {
            active.color = Set(color.clone());
        }

        if !active.is_changed() {
            return Ok(model.into());
        }

        let result = active.update(db).await?;
        Ok(result.into())
    }

    /// Create the Inbox project unless one already exists
    pub async fn ensure_inbox<C: ConnectionTrait>(db: &C) -> AppResult<Project> {
        let inbox = CreateProject::inbox();

        if let Some(existing) = Self::find_by_name(db, &inbox.name).await? {
            return Ok(existing);
        }

        match Self::create(db, &inbox).await {
            Ok(project) => {
                tracing::info!(project_id = project.id, "Seeded Inbox project");
                Ok(project)
            }
            // Another process seeded it between our check and insert
            Err(AppError::Conflict(_)) => Self::find_by_name(db, &inbox.name)
                .await?
                .ok_or_else(|| AppError::Internal("Inbox project vanished".to_string())),
            Err(e) => Err(e),
        }
    }
}

// Conversion from SeaORM model to our domain model
impl From<project::Model> for Project {
    fn from(m: project::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            color: m.color,
        }
    }
}
