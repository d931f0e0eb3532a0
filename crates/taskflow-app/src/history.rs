//! Edit-history recording: field diffs between a task and a patch.

use taskflow_core::{
    FieldChange, FieldValue, HistoryAction, HistoryEntry, NewTask, Task, TaskField,
};
use time::OffsetDateTime;

use crate::task_patch::TaskPatch;

/// Decides whether a patched field actually changed.
pub trait FieldEquality: Send + Sync {
    /// Returns true when `old` and `new` are the same value for `field`.
    fn unchanged(&self, field: TaskField, old: &FieldValue, new: &FieldValue) -> bool;
}

/// Structural equality. Timestamps compare as instants.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralEquality;

impl FieldEquality for StructuralEquality {
    fn unchanged(&self, _field: TaskField, old: &FieldValue, new: &FieldValue) -> bool {
        old == new
    }
}

/// Structural equality that ignores leading and trailing whitespace in text.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedTextEquality;

impl FieldEquality for NormalizedTextEquality {
    fn unchanged(&self, field: TaskField, old: &FieldValue, new: &FieldValue) -> bool {
        match (old, new) {
            (FieldValue::Text(old), FieldValue::Text(new)) => old.trim() == new.trim(),
            _ => StructuralEquality.unchanged(field, old, new),
        }
    }
}

/// Builds history entries using a pluggable equality policy.
#[derive(Debug, Clone, Default)]
pub struct HistoryRecorder<E = StructuralEquality> {
    equality: E,
}

impl<E: FieldEquality> HistoryRecorder<E> {
    /// Recorder using `equality` to suppress unchanged fields.
    pub const fn new(equality: E) -> Self {
        Self { equality }
    }

    /// Entry recorded on creation: every initial field with a `null` old value.
    pub fn created_entry(&self, task: &Task, at: OffsetDateTime) -> HistoryEntry {
        let changes = NewTask::RECORDED_FIELDS
            .into_iter()
            .map(|field| FieldChange {
                field,
                old_value: FieldValue::Null,
                new_value: task.field_value(field),
            })
            .collect();
        HistoryEntry {
            timestamp: at,
            action: HistoryAction::Created,
            changes,
        }
    }

    /// Changes `patch` would make to `before`, in field order.
    pub fn diff(&self, before: &Task, patch: &TaskPatch) -> Vec<FieldChange> {
        patch
            .entries()
            .into_iter()
            .filter_map(|(field, new_value)| {
                let old_value = before.field_value(field);
                (!self.equality.unchanged(field, &old_value, &new_value)).then_some(FieldChange {
                    field,
                    old_value,
                    new_value,
                })
            })
            .collect()
    }

    /// `updated` entry for `patch`, or `None` when nothing changes.
    pub fn update_entry(
        &self,
        before: &Task,
        patch: &TaskPatch,
        at: OffsetDateTime,
    ) -> Option<HistoryEntry> {
        let changes = self.diff(before, patch);
        (!changes.is_empty()).then_some(HistoryEntry {
            timestamp: at,
            action: HistoryAction::Updated,
            changes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskflow_core::{CategoryId, Priority, TaskId};
    use time::macros::datetime;

    fn task() -> Task {
        Task {
            id: TaskId(7),
            title: "Write report".into(),
            description: String::new(),
            priority: Priority::High,
            category_id: Some(CategoryId(2)),
            due_date: Some(datetime!(2025-03-01 09:00 UTC)),
            completed: false,
            completed_at: None,
            created_at: datetime!(2025-02-01 09:00 UTC),
            order: 1,
            edit_history: Vec::new(),
        }
    }

    #[test]
    fn created_entry_lists_initial_fields_with_null_old_values() {
        let entry = HistoryRecorder::<StructuralEquality>::default()
            .created_entry(&task(), datetime!(2025-02-01 09:00 UTC));

        assert_eq!(entry.action, HistoryAction::Created);
        let fields: Vec<TaskField> = entry.changes.iter().map(|change| change.field).collect();
        assert_eq!(fields, NewTask::RECORDED_FIELDS.to_vec());
        assert!(entry.changes.iter().all(|change| change.old_value.is_null()));
        assert_eq!(entry.changes[2].new_value, FieldValue::Priority(Priority::High));
    }

    #[test]
    fn diff_lists_only_changed_fields() {
        let recorder = HistoryRecorder::<StructuralEquality>::default();
        let patch = TaskPatch {
            title: Some("Write report".into()),
            priority: Some(Priority::Urgent),
            category_id: Some(None),
            ..TaskPatch::default()
        };

        let changes = recorder.diff(&task(), &patch);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].field, TaskField::Priority);
        assert_eq!(changes[0].old_value, FieldValue::Priority(Priority::High));
        assert_eq!(changes[1].field, TaskField::CategoryId);
        assert_eq!(changes[1].new_value, FieldValue::Null);
    }

    #[test]
    fn no_op_patch_produces_no_entry() {
        let recorder = HistoryRecorder::<StructuralEquality>::default();
        let patch = TaskPatch {
            completed: Some(false),
            order: Some(1),
            ..TaskPatch::default()
        };
        assert!(recorder.update_entry(&task(), &patch, datetime!(2025-02-02 00:00 UTC)).is_none());
    }

    #[test]
    fn timestamps_compare_as_instants() {
        let recorder = HistoryRecorder::<StructuralEquality>::default();
        let patch = TaskPatch {
            due_date: Some(Some(datetime!(2025-03-01 18:00 +09:00))),
            ..TaskPatch::default()
        };
        assert!(recorder.diff(&task(), &patch).is_empty());
    }

    #[test]
    fn normalized_text_ignores_surrounding_whitespace() {
        let patch = TaskPatch {
            title: Some("  Write report \n".into()),
            ..TaskPatch::default()
        };
        assert!(HistoryRecorder::new(NormalizedTextEquality).diff(&task(), &patch).is_empty());
        assert_eq!(HistoryRecorder::new(StructuralEquality).diff(&task(), &patch).len(), 1);
    }
}
