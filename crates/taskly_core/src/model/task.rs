//! Task domain model.
//!
//! # Responsibility
//! - Define the persisted task record and its enums.
//! - Own create/merge semantics so stores only orchestrate.
//!
//! # Invariants
//! - `id` is assigned once and never overwritten by a patch.
//! - `title` is non-empty after trimming for every record built or patched
//!   through this module.
//! - Blank descriptions are stored as `None`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable task identifier (decimal epoch milliseconds at creation).
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type TaskId = String;

/// Color tags offered by the task form. The first entry is the default.
pub const TASK_COLORS: [&str; 4] = ["#FF7A7A", "#8B5CF6", "#06B6D4", "#F59E0B"];

/// Returns the default color tag for new tasks.
pub fn default_task_color() -> String {
    TASK_COLORS[0].to_string()
}

/// Task importance as picked in the form.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Normal => "Normal",
            Self::High => "High",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Low" => Some(Self::Low),
            "Normal" => Some(Self::Normal),
            "High" => Some(Self::High),
            _ => None,
        }
    }
}

/// Repeat cadence. Stored only; nothing schedules repeats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Repeat {
    #[default]
    None,
    Daily,
    Weekly,
}

impl Repeat {
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Self::None),
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            _ => None,
        }
    }
}

/// Validation failures for task records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Identifier is empty.
    EmptyId,
    /// Title is empty after trimming.
    BlankTitle,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "task id must not be empty"),
            Self::BlankTitle => write!(f, "task title must not be blank"),
        }
    }
}

impl Error for TaskValidationError {}

/// Persisted task record.
///
/// Serialized with camelCase keys (`dueAt`, `remindAt`). Every field except
/// `id` and `title` falls back to its default when missing on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub remind: bool,
    /// Stored for the UI only; no reminder is ever delivered.
    #[serde(default)]
    pub remind_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub repeat: Repeat,
    #[serde(default = "default_task_color")]
    pub color: String,
}

/// Field values for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub due_at: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub remind: bool,
    pub remind_at: Option<DateTime<Utc>>,
    pub repeat: Repeat,
    pub color: String,
}

impl Default for TaskDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: None,
            due_at: None,
            priority: Priority::default(),
            remind: false,
            remind_at: None,
            repeat: Repeat::default(),
            color: default_task_color(),
        }
    }
}

impl TaskDraft {
    /// Draft with only a title; everything else defaulted.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Demo record offered by the quick-add button.
    pub fn sample(now: DateTime<Utc>) -> Self {
        Self {
            title: "Sample: Prepare slides".to_string(),
            description: Some("Prepare 5 slides for meeting".to_string()),
            due_at: Some(now + chrono::Duration::hours(24)),
            priority: Priority::High,
            remind: true,
            remind_at: Some(now + chrono::Duration::hours(23)),
            repeat: Repeat::None,
            color: TASK_COLORS[1].to_string(),
        }
    }
}

/// Partial update merged over an existing task.
///
/// `None` leaves a field untouched. For nullable fields the inner option is
/// the new value, so `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    pub due_at: Option<Option<DateTime<Utc>>>,
    pub priority: Option<Priority>,
    pub remind: Option<bool>,
    pub remind_at: Option<Option<DateTime<Utc>>>,
    pub repeat: Option<Repeat>,
    pub color: Option<String>,
}

impl TaskPatch {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

impl Task {
    /// Builds a new record from a draft under a freshly issued `id`.
    ///
    /// Title and description are trimmed; `completed` starts as `false`.
    pub fn from_draft(id: TaskId, draft: TaskDraft) -> Result<Self, TaskValidationError> {
        let title = normalize_title(&draft.title).ok_or(TaskValidationError::BlankTitle)?;
        let task = Self {
            id,
            title,
            description: normalize_description(draft.description.as_deref()),
            completed: false,
            due_at: draft.due_at,
            priority: draft.priority,
            remind: draft.remind,
            remind_at: draft.remind_at,
            repeat: draft.repeat,
            color: draft.color,
        };
        task.validate()?;
        Ok(task)
    }

    /// Merges `patch` over this record. Supplied fields win; `id` is kept.
    ///
    /// A blank supplied title rejects the whole patch and leaves the record
    /// untouched.
    pub fn apply_patch(&mut self, patch: TaskPatch) -> Result<(), TaskValidationError> {
        let title = match patch.title.as_deref() {
            Some(raw) => Some(normalize_title(raw).ok_or(TaskValidationError::BlankTitle)?),
            None => None,
        };

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = normalize_description(description.as_deref());
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(due_at) = patch.due_at {
            self.due_at = due_at;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(remind) = patch.remind {
            self.remind = remind;
        }
        if let Some(remind_at) = patch.remind_at {
            self.remind_at = remind_at;
        }
        if let Some(repeat) = patch.repeat {
            self.repeat = repeat;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        Ok(())
    }

    /// Flips completion and returns the new value.
    pub fn toggle_completed(&mut self) -> bool {
        self.completed = !self.completed;
        self.completed
    }

    /// Checks record-level invariants.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.is_empty() {
            return Err(TaskValidationError::EmptyId);
        }
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::BlankTitle);
        }
        Ok(())
    }

    pub fn is_pending(&self) -> bool {
        !self.completed
    }
}

/// Trims a title; `None` when nothing remains.
pub fn normalize_title(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn normalize_description(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
