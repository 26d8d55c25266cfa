use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub fn all() -> &'static [TaskPriority] {
        &[TaskPriority::Low, TaskPriority::Medium, TaskPriority::High]
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskPriority::Low => "Low",
            TaskPriority::Medium => "Medium",
            TaskPriority::High => "High",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn all() -> &'static [TaskStatus] {
        &[TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Completed]
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In progress",
            TaskStatus::Completed => "Completed",
        }
    }
}

/// A person tasks can be assigned to. Owned by the surrounding application;
/// the scheduler only stores references to `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
}

impl User {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// A single unit of schedulable work on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub status: TaskStatus,
    /// First day of work (inclusive).
    pub start: NaiveDate,
    /// Last day of work (inclusive). Never before `start`.
    pub end: NaiveDate,
    #[serde(default)]
    pub assignee_id: Option<Uuid>,
    /// Tasks that must finish before this one. Advisory only.
    #[serde(default)]
    pub dependencies: Vec<Uuid>,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    /// Shared by every instance generated from one recurrence request.
    #[serde(default)]
    pub recurring_instance_id: Option<Uuid>,
}

impl Task {
    /// Create a new task with sensible defaults.
    pub fn new(name: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            priority: TaskPriority::default(),
            status: TaskStatus::default(),
            start,
            end,
            assignee_id: None,
            dependencies: Vec::new(),
            parent_id: None,
            recurring_instance_id: None,
        }
    }

    pub fn with_parent(mut self, parent: Uuid) -> Self {
        self.parent_id = Some(parent);
        self
    }

    pub fn with_dependency(mut self, prerequisite: Uuid) -> Self {
        if !self.dependencies.contains(&prerequisite) {
            self.dependencies.push(prerequisite);
        }
        self
    }

    pub fn with_assignee(mut self, user: Uuid) -> Self {
        self.assignee_id = Some(user);
        self
    }

    /// Inclusive number of days the task covers; at least 1.
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days().max(0) + 1
    }

    pub fn depends_on(&self, other: Uuid) -> bool {
        self.dependencies.contains(&other)
    }
}

/// Partial update for a task. `None` leaves the field untouched.
///
/// Nullable fields use `Option<Option<_>>` so a patch can clear them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub assignee_id: Option<Option<Uuid>>,
    pub dependencies: Option<Vec<Uuid>>,
    pub parent_id: Option<Option<Uuid>>,
}

impl TaskPatch {
    pub fn dates(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Default::default()
        }
    }

    pub fn start(start: NaiveDate) -> Self {
        Self {
            start: Some(start),
            ..Default::default()
        }
    }

    pub fn end(end: NaiveDate) -> Self {
        Self {
            end: Some(end),
            ..Default::default()
        }
    }

    pub fn dependencies(deps: Vec<Uuid>) -> Self {
        Self {
            dependencies: Some(deps),
            ..Default::default()
        }
    }

    pub fn parent(parent: Option<Uuid>) -> Self {
        Self {
            parent_id: Some(parent),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }

    /// Apply every set field onto `task`.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(name) = &self.name {
            task.name = name.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(start) = self.start {
            task.start = start;
        }
        if let Some(end) = self.end {
            task.end = end;
        }
        if let Some(assignee) = self.assignee_id {
            task.assignee_id = assignee;
        }
        if let Some(deps) = &self.dependencies {
            task.dependencies = deps.clone();
        }
        if let Some(parent) = self.parent_id {
            task.parent_id = parent;
        }
    }
}
