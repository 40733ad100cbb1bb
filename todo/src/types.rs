//! Domain types for the robot to-do list.
//!
//! A task list is an ordered collection of tasks that can be added, toggled,
//! removed, completed in bulk and cleared in bulk. Tasks carry a numeric id
//! that is assigned once and never reused.

use crate::notification::{NotificationAction, NotificationState};
use crate::store::TaskStore;
use chrono::{DateTime, Utc};
use robotask_macros::Action;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum task text length, in characters, after trimming
pub const MAX_TASK_LEN: usize = 100;

/// Tasks longer than this, in characters, are added with a length warning
pub const LENGTH_WARNING_THRESHOLD: usize = MAX_TASK_LEN * 4 / 5;

/// Category given to tasks created without one
pub const DEFAULT_CATEGORY: &str = "general";

/// Unique identifier for a task
///
/// Ids are positive and strictly increasing in creation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(u64);

impl TaskId {
    /// Creates a `TaskId` from a raw number
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw number
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TaskId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().trim_start_matches('#').parse().map(Self)
    }
}

/// How urgent a task is
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Can wait
    Low,
    /// The default
    #[default]
    Normal,
    /// Do first
    High,
}

impl Priority {
    /// Lowercase label used in listings
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            other => Err(format!("unknown priority '{other}'")),
        }
    }
}

/// A single to-do item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,
    /// Trimmed task text, 1 to [`MAX_TASK_LEN`] characters
    pub text: String,
    /// Whether the task is completed
    pub completed: bool,
    /// When the task was created
    pub created_at: DateTime<Utc>,
    /// Urgency
    pub priority: Priority,
    /// Free-form label
    pub category: String,
}

/// Unvalidated input for a new task
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    /// Raw text as typed, possibly untrimmed
    pub text: String,
    /// Urgency
    pub priority: Priority,
    /// Free-form label
    pub category: String,
}

impl TaskDraft {
    /// Draft with default priority and category
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            priority: Priority::default(),
            category: DEFAULT_CATEGORY.to_string(),
        }
    }

    /// Set the priority
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the category; blank categories fall back to the default
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        let category = category.trim();
        self.category = if category.is_empty() {
            DEFAULT_CATEGORY.to_string()
        } else {
            category.to_string()
        };
        self
    }
}

/// Rejected task text
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ValidationError {
    /// Nothing left after trimming
    #[error("task text cannot be empty")]
    Empty,

    /// More than [`MAX_TASK_LEN`] characters after trimming
    #[error("task text too long ({len} characters, max {max})")]
    TooLong {
        /// Length of the trimmed text
        len: usize,
        /// Allowed maximum
        max: usize,
    },
}

/// Errors returned by task operations
///
/// All of them leave the task list unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum TaskError {
    /// Input failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No task has this id
    #[error("task #{0} not found")]
    NotFound(TaskId),
}

/// State of the whole application
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppState {
    /// The task list
    pub tasks: TaskStore,
    /// Currently shown notification, if any
    pub notification: NotificationState,
    /// Error from the most recent command, cleared by the next success
    pub last_error: Option<TaskError>,
}

impl AppState {
    /// Creates an empty application state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Actions accepted by the application reducer
#[derive(Action, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppAction {
    /// Command: Add a task
    #[command]
    AddTask {
        /// What to add
        draft: TaskDraft,
    },

    /// Command: Flip a task between pending and completed
    #[command]
    ToggleTask {
        /// Task to toggle
        id: TaskId,
    },

    /// Command: Delete a task. Callers confirm with the user first.
    #[command]
    RemoveTask {
        /// Task to delete
        id: TaskId,
    },

    /// Command: Mark every pending task completed
    #[command]
    CompleteAll,

    /// Command: Delete every completed task. Callers confirm with the user first.
    #[command]
    ClearCompleted,

    /// Routed to the notification channel
    Notification(NotificationAction),
}

impl AppAction {
    /// Shorthand for adding a task with default priority and category
    #[must_use]
    pub fn add(text: impl Into<String>) -> Self {
        Self::AddTask {
            draft: TaskDraft::new(text),
        }
    }
}
