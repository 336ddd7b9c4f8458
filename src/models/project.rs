/// Name of the protected default project
pub const INBOX_NAME: &str = "Inbox";
pub const INBOX_COLOR: &str = "#2563eb";
pub const DEFAULT_PROJECT_COLOR: &str = "#7c3aed";

pub const PROJECT_NAME_MAX_LEN: usize = 80;
pub const PROJECT_COLOR_MAX_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: i32,
    pub name: String,
    pub color: String,
}

impl Project {
    pub fn is_inbox(&self) -> bool {
        self.name == INBOX_NAME
    }
}

#[derive(Debug, Clone)]
pub struct CreateProject {
    pub name: String,
    pub color: String,
}

impl CreateProject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: DEFAULT_PROJECT_COLOR.to_string(),
        }
    }

    pub fn inbox() -> Self {
        Self {
            name: INBOX_NAME.to_string(),
            color: INBOX_COLOR.to_string(),
        }
    }
}

/// Partial update: `None` leaves the stored value untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub color: Option<String>,
}

impl UpdateProject {
    /// True when applying this update would take the Inbox name away from `project`
    pub fn renames_inbox(&self, project: &Project) -> bool {
        project.is_inbox()
            && self
                .name
                .as_deref()
                .is_some_and(|name| name != INBOX_NAME)
    }
}
