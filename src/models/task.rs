use time::{Date, OffsetDateTime};

pub const TASK_TITLE_MAX_LEN: usize = 120;

pub const MIN_PRIORITY: i32 = 1;
pub const MAX_PRIORITY: i32 = 4;
pub const DEFAULT_PRIORITY: i32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<Date>,
    pub priority: i32,
    pub completed: bool,
    pub project_id: Option<i32>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<Date>,
    pub priority: i32,
    pub completed: bool,
    pub project_id: Option<i32>,
}

impl CreateTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            due_date: None,
            priority: DEFAULT_PRIORITY,
            completed: false,
            project_id: None,
        }
    }
}

/// Partial task update.
///
/// Nullable columns use a nested option: `None` leaves the column alone,
/// `Some(None)` clears it and `Some(Some(v))` sets it.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub due_date: Option<Option<Date>>,
    pub priority: Option<i32>,
    pub completed: Option<bool>,
    pub project_id: Option<Option<i32>>,
}

impl UpdateTask {
    /// Project the task is being moved to, if the update assigns one
    pub fn target_project(&self) -> Option<i32> {
        self.project_id.flatten()
    }
}

/// Optional criteria for listing tasks. Every present field narrows the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub project_id: Option<i32>,
    pub completed: Option<bool>,
    pub search: Option<String>,
    /// Inclusive upper bound on `due_date`
    pub due_before: Option<Date>,
    /// Inclusive lower bound on `due_date`
    pub due_after: Option<Date>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSummary {
    pub total: u64,
    pub completed: u64,
    pub active: u64,
}

impl TaskSummary {
    pub fn new(total: u64, completed: u64) -> Self {
        Self {
            total,
            completed,
            active: total.saturating_sub(completed),
        }
    }
}
