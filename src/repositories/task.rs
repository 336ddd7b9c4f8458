use async_trait::async_trait;
use sea_orm::{
    sea_query::{Expr, Func, LikeExpr},
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, Select, Set,
};

use crate::entity::task::{self, ActiveModel, Column};
use crate::entity::TaskEntity;
use crate::error::{AppError, AppResult};
use crate::models::{CreateTask, Task, TaskFilter, TaskSummary, UpdateTask};
use crate::repositories::{ProjectRepository, Repository};

/// Task repository for database operations
pub struct TaskRepository;

#[async_trait]
impl Repository<Task> for TaskRepository {
    async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<Task> {
        let model = TaskEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Task".to_string()))?;

        Ok(model.into())
    }

    async fn delete<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<()> {
        let result = TaskEntity::delete_by_id(id).exec(db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Task".to_string()));
        }

        tracing::debug!(task_id = id, "Task deleted");
        Ok(())
    }

    async fn list<C: ConnectionTrait>(db: &C) -> AppResult<Vec<Task>> {
        Self::list_filtered(db, &TaskFilter::default()).await
    }

    async fn count<C: ConnectionTrait>(db: &C) -> AppResult<u64> {
        let count = TaskEntity::find().count(db).await?;
        Ok(count)
    }
}

impl TaskRepository {
    /// Create a new task; `created_at` is assigned here, never by the caller
    pub async fn create<C: ConnectionTrait>(db: &C, input: &CreateTask) -> AppResult<Task> {
        if let Some(project_id) = input.project_id {
            Self::verify_project_reference(db, project_id).await?;
        }

        let model = ActiveModel {
            title: Set(input.title.clone()),
            description: Set(input.description.clone()),
            due_date: Set(input.due_date),
            priority: Set(input.priority),
            completed: Set(input.completed),
            project_id: Set(input.project_id),
            created_at: Set(time::OffsetDateTime::now_utc()),
            ..Default::default()
        };

        let result = model.insert(db).await?;
        tracing::debug!(task_id = result.id, project_id = ?result.project_id, "Task created");
        Ok(result.into())
    }

    /// List tasks matching every criterion in `filter`, in display order
    pub async fn list_filtered<C: ConnectionTrait>(
        db: &C,
        filter: &TaskFilter,
    ) -> AppResult<Vec<Task>> {
        let models = Self::ordered(Self::filtered(filter)).all(db).await?;
        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    /// Apply a partial update; fields absent from `input` are left untouched
    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: i32,
        input: &UpdateTask,
    ) -> AppResult<Task> {
        let model = TaskEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Task".to_string()))?;

        if let Some(project_id) = input.target_project() {
            Self::verify_project_reference(db, project_id).await?;
        }

        let mut active: ActiveModel = model.clone().into();

        if let Some(title) = &input.title {
            active.title = Set(title.clone());
        }
        if let Some(description) = &input.description {
            active.description = Set(description.clone());
        }
        if let Some(due_date) = input.due_date {
            active.due_date = Set(due_date);
        }
        if let Some(priority) = input.priority {
            active.priority = Set(priority);
        }
        if let Some(completed) = input.completed {
            active.completed = Set(completed);
        }
        if let Some(project_id) = input.project_id {
            active.project_id = Set(project_id);
        }

        if !active.is_changed() {
            return Ok(model.into());
        }

        let result = active.update(db).await?;
        Ok(result.into())
    }

    /// Flip the completion flag
    pub async fn toggle<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<Task> {
        let model = TaskEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Task".to_string()))?;

        let completed = !model.completed;
        let mut active: ActiveModel = model.into();
        active.completed = Set(completed);

        let result = active.update(db).await?;
        tracing::debug!(task_id = id, completed, "Task toggled");
        Ok(result.into())
    }

    /// Clear the project reference of every task in a project, returning how many moved
    pub async fn detach_from_project<C: ConnectionTrait>(
        db: &C,
        project_id: i32,
    ) -> AppResult<u64> {
        let result = TaskEntity::update_many()
            .col_expr(Column::ProjectId, Expr::value(Option::<i32>::None))
            .filter(Column::ProjectId.eq(project_id))
            .exec(db)
            .await?;

        Ok(result.rows_affected)
    }

    /// Counts over the whole task collection; filters never apply here
    pub async fn summary<C: ConnectionTrait>(db: &C) -> AppResult<TaskSummary> {
        let total = Self::count(db).await?;
        let completed = TaskEntity::find()
            .filter(Column::Completed.eq(true))
            .count(db)
            .await?;

        Ok(TaskSummary::new(total, completed))
    }

    async fn verify_project_reference<C: ConnectionTrait>(
        db: &C,
        project_id: i32,
    ) -> AppResult<()> {
        if !ProjectRepository::exists(db, project_id).await? {
            tracing::info!(project_id, "Task references a missing project");
            return Err(AppError::InvalidReference("Project does not exist".to_string()));
        }
        Ok(())
    }

    /// Translate filter criteria into a query. Absent criteria add nothing.
    fn filtered(filter: &TaskFilter) -> Select<TaskEntity> {
        let mut query = TaskEntity::find();

        if let Some(project_id) = filter.project_id {
            query = query.filter(Column::ProjectId.eq(project_id));
        }
        if let Some(completed) = filter.completed {
            query = query.filter(Column::Completed.eq(completed));
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = contains_pattern(search);
            let title = Func::lower(Expr::col((TaskEntity, Column::Title)));
            let description = Func::lower(Expr::col((TaskEntity, Column::Description)));
            query = query.filter(
                Condition::any()
                    .add(Expr::expr(title).like(LikeExpr::new(&pattern).escape('\\')))
                    .add(Expr::expr(description).like(LikeExpr::new(&pattern).escape('\\'))),
            );
        }
        if let Some(due_before) = filter.due_before {
            query = query.filter(Column::DueDate.lte(due_before));
        }
        if let Some(due_after) = filter.due_after {
            query = query.filter(Column::DueDate.gte(due_after));
        }

        query
    }

    /// Open before completed, then higher priority, then dated before undated,
    /// then earliest due date. Ties fall back to insertion order.
    fn ordered(query: Select<TaskEntity>) -> Select<TaskEntity> {
        query
            .order_by_asc(Column::Completed)
            .order_by_desc(Column::Priority)
            .order_by(Expr::col((TaskEntity, Column::DueDate)).is_null(), Order::Asc)
            .order_by_asc(Column::DueDate)
            .order_by_asc(Column::Id)
    }
}

/// LIKE pattern matching `search` as a literal substring.
///
/// SQLite's `LOWER` folds ASCII only, so the needle is folded the same way.
fn contains_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c.to_ascii_lowercase());
    }
    pattern.push('%');
    pattern
}

// Conversion from SeaORM model to our domain model
impl From<task::Model> for Task {
    fn from(m: task::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            due_date: m.due_date,
            priority: m.priority,
            completed: m.completed,
            project_id: m.project_id,
            created_at: m.created_at,
        }
    }
}
