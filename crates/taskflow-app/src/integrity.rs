//! Optional consistency checks over the weak task → category reference.
//!
//! Nothing here mutates a store. Callers decide what to do with the findings.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use taskflow_core::{Category, CategoryId, Task, TaskId};

/// Task whose `categoryId` names a category that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DanglingReference {
    /// Referencing task.
    pub task_id: TaskId,
    /// Missing category.
    pub category_id: CategoryId,
}

/// Result of an integrity pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    /// Dangling references in ascending task id order.
    pub dangling: Vec<DanglingReference>,
    /// Categories whose stored `taskCount` differs from the active task count.
    pub stale_counts: Vec<StaleCount>,
}

/// Category whose denormalized count is out of date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaleCount {
    /// Affected category.
    pub category_id: CategoryId,
    /// Stored value.
    pub stored: u64,
    /// Value recomputed from tasks.
    pub actual: u64,
}

impl IntegrityReport {
    /// Whether no problem was found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.dangling.is_empty() && self.stale_counts.is_empty()
    }
}

/// Inspect `tasks` against `categories`.
#[must_use]
pub fn check(tasks: &[Task], categories: &[Category]) -> IntegrityReport {
    let known: BTreeSet<CategoryId> = categories.iter().map(|category| category.id).collect();
    let mut dangling: Vec<DanglingReference> = tasks
        .iter()
        .filter_map(|task| {
            let category_id = task.category_id?;
            (!known.contains(&category_id)).then_some(DanglingReference {
                task_id: task.id,
                category_id,
            })
        })
        .collect();
    dangling.sort_by_key(|reference| reference.task_id);

    let counts = active_task_counts(tasks);
    let stale_counts = categories
        .iter()
        .filter_map(|category| {
            let actual = counts.get(&category.id).copied().unwrap_or(0);
            (category.task_count != actual).then_some(StaleCount {
                category_id: category.id,
                stored: category.task_count,
                actual,
            })
        })
        .collect();

    let report = IntegrityReport {
        dangling,
        stale_counts,
    };
    if !report.dangling.is_empty() {
        tracing::warn!(count = report.dangling.len(), "tasks reference missing categories");
    }
    report
}

/// Number of incomplete tasks per referenced category.
#[must_use]
pub fn active_task_counts(tasks: &[Task]) -> BTreeMap<CategoryId, u64> {
    let mut counts = BTreeMap::new();
    for category in tasks
        .iter()
        .filter(|task| !task.completed)
        .filter_map(|task| task.category_id)
    {
        *counts.entry(category).or_insert(0) += 1;
    }
    counts
}
