//! Filter & sort engine deriving the visible task list from a [`FilterSpec`].
//!
//! Every stage narrows the working set and is skipped when its dimension is
//! unconstrained. The output is always sorted by [`compare_tasks`].

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Date, Duration, OffsetDateTime};

use crate::clock::Clock;
use crate::id::CategoryId;
use crate::task::{Priority, Task};

/// Top-level completeness filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    /// Every task.
    #[default]
    All,
    /// Open tasks only.
    Active,
    /// Completed tasks only.
    Completed,
}

impl View {
    /// Token used in presets and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    const fn admits(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.completed,
            Self::Completed => task.completed,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown view token.
#[derive(Debug, Error)]
#[error("invalid view: {0}")]
pub struct ParseViewError(pub String);

impl FromStr for View {
    type Err = ParseViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" | "open" => Ok(Self::Active),
            "completed" | "done" => Ok(Self::Completed),
            _ => Err(ParseViewError(s.to_owned())),
        }
    }
}

/// Relative due-date classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DateBucket {
    /// Due before now and not completed.
    Overdue,
    /// Due on today's calendar day.
    Today,
    /// Due on tomorrow's calendar day.
    Tomorrow,
    /// Due between today and today + 7 days (inclusive).
    ThisWeek,
    /// No due date.
    NoDate,
}

impl DateBucket {
    /// Token used in presets and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Overdue => "overdue",
            Self::Today => "today",
            Self::Tomorrow => "tomorrow",
            Self::ThisWeek => "thisWeek",
            Self::NoDate => "noDate",
        }
    }
}

impl fmt::Display for DateBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown date bucket token.
#[derive(Debug, Error)]
#[error("invalid date filter: {0}")]
pub struct ParseDateBucketError(pub String);

impl FromStr for DateBucket {
    type Err = ParseDateBucketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "");
        match normalized.as_str() {
            "overdue" => Ok(Self::Overdue),
            "today" => Ok(Self::Today),
            "tomorrow" => Ok(Self::Tomorrow),
            "thisweek" | "week" => Ok(Self::ThisWeek),
            "nodate" | "none" => Ok(Self::NoDate),
            _ => Err(ParseDateBucketError(s.to_owned())),
        }
    }
}

/// Active filter predicates. Empty dimensions do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    /// Completeness filter; `None` behaves like [`View::All`].
    #[serde(default)]
    pub view: Option<View>,
    /// Allowed categories.
    #[serde(default)]
    pub categories: BTreeSet<CategoryId>,
    /// Allowed priorities.
    #[serde(default)]
    pub priorities: BTreeSet<Priority>,
    /// Requested date buckets (union).
    #[serde(default)]
    pub date_filters: BTreeSet<DateBucket>,
}

impl FilterSpec {
    /// Open tasks (home page).
    #[must_use]
    pub fn home() -> Self {
        Self::default().with_view(View::Active)
    }

    /// Everything (all-tasks page).
    #[must_use]
    pub fn all() -> Self {
        Self::default().with_view(View::All)
    }

    /// Tasks due today.
    #[must_use]
    pub fn today() -> Self {
        Self::all().with_date_filters([DateBucket::Today])
    }

    /// Tasks due within the coming week.
    #[must_use]
    pub fn this_week() -> Self {
        Self::all().with_date_filters([DateBucket::ThisWeek])
    }

    /// Set the view.
    #[must_use]
    pub const fn with_view(mut self, view: View) -> Self {
        self.view = Some(view);
        self
    }

    /// Extend the allowed categories.
    #[must_use]
    pub fn with_categories(mut self, categories: impl IntoIterator<Item = CategoryId>) -> Self {
        self.categories.extend(categories);
        self
    }

    /// Extend the allowed priorities.
    #[must_use]
    pub fn with_priorities(mut self, priorities: impl IntoIterator<Item = Priority>) -> Self {
        self.priorities.extend(priorities);
        self
    }

    /// Extend the requested date buckets.
    #[must_use]
    pub fn with_date_filters(mut self, buckets: impl IntoIterator<Item = DateBucket>) -> Self {
        self.date_filters.extend(buckets);
        self
    }

    /// Returns true when no dimension constrains the result.
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        matches!(self.view, None | Some(View::All))
            && self.categories.is_empty()
            && self.priorities.is_empty()
            && self.date_filters.is_empty()
    }

    /// Evaluate every predicate against a single task.
    #[must_use]
    pub fn matches(&self, task: &Task, window: &DateWindow) -> bool {
        if let Some(view) = self.view
            && !view.admits(task)
        {
            return false;
        }
        if !self.categories.is_empty()
            && !task
                .category_id
                .is_some_and(|category| self.categories.contains(&category))
        {
            return false;
        }
        if !self.priorities.is_empty() && !self.priorities.contains(&task.priority) {
            return false;
        }
        self.date_filters.is_empty() || window.matches_any(task, &self.date_filters)
    }
}

/// Calendar anchors derived from a single instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    now: OffsetDateTime,
    today: Date,
    tomorrow: Option<Date>,
    week_end: Option<Date>,
}

impl DateWindow {
    /// Anchors relative to `now`, using `now`'s offset as the calendar.
    #[must_use]
    pub fn at(now: OffsetDateTime) -> Self {
        let today = now.date();
        Self {
            now,
            today,
            tomorrow: today.next_day(),
            week_end: today.checked_add(Duration::days(7)),
        }
    }

    /// The anchoring instant.
    #[must_use]
    pub const fn now(&self) -> OffsetDateTime {
        self.now
    }

    /// Start-of-day date for `now`.
    #[must_use]
    pub const fn today(&self) -> Date {
        self.today
    }

    /// Calendar day of `instant` in the window's offset, or `None` when the
    /// shifted date falls outside the representable range.
    #[must_use]
    pub fn day_of(&self, instant: OffsetDateTime) -> Option<Date> {
        instant
            .checked_to_offset(self.now.offset())
            .map(OffsetDateTime::date)
    }

    /// Whether `task` falls into `bucket`.
    #[must_use]
    pub fn matches(&self, task: &Task, bucket: DateBucket) -> bool {
        let Some(due) = task.due_date else {
            return bucket == DateBucket::NoDate;
        };
        if bucket == DateBucket::Overdue {
            return due < self.now && !task.completed;
        }
        let Some(day) = self.day_of(due) else {
            return false;
        };
        match bucket {
            DateBucket::NoDate | DateBucket::Overdue => false,
            DateBucket::Today => day == self.today,
            DateBucket::Tomorrow => self.tomorrow == Some(day),
            DateBucket::ThisWeek => day >= self.today && self.week_end.is_none_or(|end| day <= end),
        }
    }

    /// Union over `buckets`.
    #[must_use]
    pub fn matches_any(&self, task: &Task, buckets: &BTreeSet<DateBucket>) -> bool {
        buckets.iter().any(|&bucket| self.matches(task, bucket))
    }
}

/// Display order: descending priority weight, then ascending due date.
///
/// A task with a due date sorts before one without; two undated tasks of the
/// same priority compare equal so a stable sort keeps their input order.
#[must_use]
pub fn compare_tasks(a: &Task, b: &Task) -> Ordering {
    b.priority
        .weight()
        .cmp(&a.priority.weight())
        .then_with(|| match (a.due_date, b.due_date) {
            (Some(left), Some(right)) => left.cmp(&right),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}

/// Sort tasks in place with [`compare_tasks`] (stable).
pub fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by(compare_tasks);
}

/// Filter and sort `tasks` against the current reading of `clock`.
#[must_use]
pub fn apply(tasks: &[Task], spec: &FilterSpec, clock: &dyn Clock) -> Vec<Task> {
    apply_at(tasks, spec, clock.now())
}

/// Filter and sort `tasks` relative to `now`. The input is never mutated.
#[must_use]
pub fn apply_at(tasks: &[Task], spec: &FilterSpec, now: OffsetDateTime) -> Vec<Task> {
    let window = DateWindow::at(now);
    let mut selected: Vec<Task> = tasks
        .iter()
        .filter(|task| spec.matches(task, &window))
        .cloned()
        .collect();
    sort_tasks(&mut selected);
    selected
}
