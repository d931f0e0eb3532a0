use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

use crate::history::{FieldValue, HistoryEntry, TaskField};
use crate::id::{CategoryId, TaskId};

/// Task urgency. Ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Can wait.
    Low,
    /// Default urgency.
    #[default]
    Medium,
    /// Should be handled soon.
    High,
    /// Needs attention now.
    Urgent,
}

impl Priority {
    /// Every priority, least urgent first.
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Urgent];

    /// Sort weight (`urgent=4 .. low=1`).
    #[must_use]
    pub const fn weight(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Urgent => 4,
        }
    }

    /// String representation used in fixtures and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown priority token.
#[derive(Debug, Error)]
#[error("invalid priority: {0}")]
pub struct ParsePriorityError(pub String);

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" | "normal" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(ParsePriorityError(s.to_owned())),
        }
    }
}

/// A task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique, immutable identifier.
    pub id: TaskId,
    /// Non-empty title.
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Urgency.
    #[serde(default)]
    pub priority: Priority,
    /// Weak reference to a category; the category may no longer exist.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// Optional due instant.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
    /// Completion flag.
    #[serde(default)]
    pub completed: bool,
    /// Set iff `completed` is true.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
    /// Creation instant, set once.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Manual sort position.
    #[serde(default)]
    pub order: u32,
    /// Append-only change log, oldest first.
    #[serde(default)]
    pub edit_history: Vec<HistoryEntry>,
}

impl Task {
    /// Current value of a patchable field.
    #[must_use]
    pub fn field_value(&self, field: TaskField) -> FieldValue {
        match field {
            TaskField::Title => FieldValue::Text(self.title.clone()),
            TaskField::Description => FieldValue::Text(self.description.clone()),
            TaskField::Priority => FieldValue::Priority(self.priority),
            TaskField::CategoryId => self.category_id.map_or(FieldValue::Null, FieldValue::Category),
            TaskField::DueDate => self.due_date.map_or(FieldValue::Null, FieldValue::Timestamp),
            TaskField::Completed => FieldValue::Bool(self.completed),
            TaskField::Order => FieldValue::Integer(i64::from(self.order)),
        }
    }

    /// Whether the task is due before `now` and still open.
    #[must_use]
    pub fn is_overdue(&self, now: OffsetDateTime) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < now)
    }
}

/// Input accepted by task creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    /// Task title (must not be blank).
    pub title: String,
    /// Description body.
    #[serde(default)]
    pub description: String,
    /// Urgency.
    #[serde(default)]
    pub priority: Priority,
    /// Optional category reference.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// Optional due instant.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
}

impl NewTask {
    /// Fields recorded in a `created` history entry, in display order.
    pub const RECORDED_FIELDS: [TaskField; 5] = [
        TaskField::Title,
        TaskField::Description,
        TaskField::Priority,
        TaskField::CategoryId,
        TaskField::DueDate,
    ];

    /// New task with default priority and no category or due date.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            priority: Priority::default(),
            category_id: None,
            due_date: None,
        }
    }

    /// Set the priority.
    #[must_use]
    pub const fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the category reference.
    #[must_use]
    pub const fn category(mut self, category: Option<CategoryId>) -> Self {
        self.category_id = category;
        self
    }

    /// Set the due instant.
    #[must_use]
    pub const fn due(mut self, due: Option<OffsetDateTime>) -> Self {
        self.due_date = due;
        self
    }
}
