use time::Date;

use taskflow::models::{CreateProject, CreateTask, Project, Task};
use taskflow::repositories::{ProjectRepository, TaskRepository};
use taskflow::state::AppState;

/// Factory for creating test data
pub struct Factory<'a> {
    state: &'a AppState,
}

#[allow(dead_code)]
impl<'a> Factory<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Create a test project with a unique name
    pub async fn create_project(&self) -> Project {
        let name = format!("Project {}", uuid::Uuid::new_v4().simple());
        self.create_project_with_name(&name).await
    }

    /// Create a test project with specific name
    pub async fn create_project_with_name(&self, name: &str) -> Project {
        ProjectRepository::create(&self.state.db, &CreateProject::new(name))
            .await
            .unwrap()
    }

    /// Create an unassigned task with default fields
    pub async fn create_task(&self, title: &str) -> Task {
        self.insert_task(CreateTask::new(title)).await
    }

    /// Create a task inside a project
    pub async fn create_task_in_project(&self, title: &str, project_id: i32) -> Task {
        self.insert_task(CreateTask {
            project_id: Some(project_id),
            ..CreateTask::new(title)
        })
        .await
    }

    /// Create a task with the fields that drive list ordering
    pub async fn create_task_with(
        &self,
        title: &str,
        priority: i32,
        due_date: Option<Date>,
        completed: bool,
    ) -> Task {
        self.insert_task(CreateTask {
            priority,
            due_date,
            completed,
            ..CreateTask::new(title)
        })
        .await
    }

    pub async fn insert_task(&self, input: CreateTask) -> Task {
        TaskRepository::create(&self.state.db, &input).await.unwrap()
    }
}
