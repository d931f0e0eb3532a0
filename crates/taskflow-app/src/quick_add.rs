//! One-line task entry with keyword hints.
//!
//! Matching is a case-insensitive substring search on the raw text; the
//! keywords stay in the title.

use taskflow_core::{CategoryId, NewTask, Priority};
use time::{Date, OffsetDateTime};

/// Hints extracted from a quick-add line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickAdd {
    /// Trimmed title.
    pub title: String,
    /// Priority implied by the text, `Medium` when none matched.
    pub priority: Priority,
    /// Start of the implied due day, if any.
    pub due_date: Option<OffsetDateTime>,
}

/// Errors produced by [`parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuickAddError {
    /// Input contained only whitespace.
    #[error("quick-add text must not be empty")]
    EmptyTitle,
}

/// Explicit values that take precedence over parsed hints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuickAddOverrides {
    /// Description to attach.
    pub description: Option<String>,
    /// Priority replacing the parsed one.
    pub priority: Option<Priority>,
    /// Category to file the task under.
    pub category_id: Option<CategoryId>,
    /// Due date replacing the parsed one.
    pub due_date: Option<OffsetDateTime>,
}

impl QuickAdd {
    /// Turn the hints into creation input.
    #[must_use]
    pub fn into_new_task(self) -> NewTask {
        self.into_new_task_with(QuickAddOverrides::default())
    }

    /// Turn the hints into creation input, preferring `overrides`.
    #[must_use]
    pub fn into_new_task_with(self, overrides: QuickAddOverrides) -> NewTask {
        let task = NewTask::new(self.title)
            .priority(overrides.priority.unwrap_or(self.priority))
            .category(overrides.category_id)
            .due(overrides.due_date.or(self.due_date));
        match overrides.description {
            Some(description) => task.description(description),
            None => task,
        }
    }
}

/// Parse `input` relative to the calendar day of `today`.
///
/// # Errors
/// Returns [`QuickAddError::EmptyTitle`] for blank input.
pub fn parse(input: &str, today: OffsetDateTime) -> Result<QuickAdd, QuickAddError> {
    let title = input.trim();
    if title.is_empty() {
        return Err(QuickAddError::EmptyTitle);
    }
    let lowered = title.to_lowercase();

    let due_day = if lowered.contains("today") {
        Some(today.date())
    } else if lowered.contains("tomorrow") {
        today.date().next_day()
    } else {
        None
    };

    let priority = if lowered.contains("urgent") || lowered.contains("asap") {
        Priority::Urgent
    } else if lowered.contains("high priority") {
        Priority::High
    } else if lowered.contains("low priority") {
        Priority::Low
    } else {
        Priority::Medium
    };

    Ok(QuickAdd {
        title: title.to_owned(),
        priority,
        due_date: due_day.map(|day| start_of(day, today)),
    })
}

fn start_of(day: Date, reference: OffsetDateTime) -> OffsetDateTime {
    day.midnight().assume_offset(reference.offset())
}
