//! Completion progress over task subsets.

use serde::Serialize;
use taskflow_core::Task;
use time::{Date, Duration, OffsetDateTime};

/// Completed versus total count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// Tasks considered.
    pub total: usize,
    /// Completed tasks among them.
    pub completed: usize,
}

impl Progress {
    /// Count over `tasks`.
    pub fn of<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        tasks.into_iter().fold(Self::default(), |acc, task| Self {
            total: acc.total + 1,
            completed: acc.completed + usize::from(task.completed),
        })
    }

    /// Tasks still open.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.total.saturating_sub(self.completed)
    }

    /// Rounded completion percentage, `0` for an empty set.
    #[must_use]
    pub fn percentage(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let rounded = (self.completed * 200 + self.total) / (self.total * 2);
        u8::try_from(rounded).unwrap_or(100)
    }
}

/// Progress over every task.
#[must_use]
pub fn overall(tasks: &[Task]) -> Progress {
    Progress::of(tasks)
}

/// Progress over tasks due on the calendar day of `now`.
#[must_use]
pub fn due_today(tasks: &[Task], now: OffsetDateTime) -> Progress {
    let today = now.date();
    Progress::of(
        tasks
            .iter()
            .filter(|task| local_day(task, now) == Some(today)),
    )
}

/// Progress over tasks due in the Sunday-start calendar week containing `now`.
#[must_use]
pub fn due_this_week(tasks: &[Task], now: OffsetDateTime) -> Progress {
    let (start, end) = week_bounds(now.date());
    Progress::of(
        tasks
            .iter()
            .filter(|task| local_day(task, now).is_some_and(|day| start <= day && day <= end)),
    )
}

/// Due day of `task` in the offset of `now`; `None` when undated or out of range.
fn local_day(task: &Task, now: OffsetDateTime) -> Option<Date> {
    task.due_date?
        .checked_to_offset(now.offset())
        .map(OffsetDateTime::date)
}

/// First (Sunday) and last (Saturday) day of the week containing `day`.
#[must_use]
pub fn week_bounds(day: Date) -> (Date, Date) {
    let back = i64::from(day.weekday().number_days_from_sunday());
    let start = day.checked_sub(Duration::days(back)).unwrap_or(day);
    let end = start.checked_add(Duration::days(6)).unwrap_or(start);
    (start, end)
}

/// Overall, today and this-week progress in one value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    /// Every task.
    pub overall: Progress,
    /// Due today.
    pub today: Progress,
    /// Due this week.
    pub this_week: Progress,
}

impl ProgressSummary {
    /// Compute all three figures at `now`.
    #[must_use]
    pub fn at(tasks: &[Task], now: OffsetDateTime) -> Self {
        Self {
            overall: overall(tasks),
            today: due_today(tasks, now),
            this_week: due_this_week(tasks, now),
        }
    }
}
