pub mod common;
pub mod project;
pub mod task;

pub use common::{
    deserialize_present, validate_optional, validate_range, validate_required, ApiJson, ApiPath,
    ApiQuery,
};
pub use project::{
    create_project, delete_project, list_projects, update_project, CreateProjectRequest,
    ProjectResponse, UpdateProjectRequest,
};
pub use task::{
    create_task, delete_task, get_task, list_tasks, task_summary, toggle_task, update_task,
    CreateTaskRequest, TaskListParams, TaskResponse, TaskSummaryResponse, UpdateTaskRequest,
};
