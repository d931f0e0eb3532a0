use serde::{Deserialize, Serialize};
use taskflow_core::{CategoryId, FieldValue, Priority, Task, TaskField};
use time::OffsetDateTime;

/// Partial task update. `None` leaves a field untouched.
///
/// The identifier is not part of the patch, so it can never be rewritten.
/// Nullable fields use a nested option: `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    /// Overwrite the title.
    #[serde(default)]
    pub title: Option<String>,
    /// Overwrite the description.
    #[serde(default)]
    pub description: Option<String>,
    /// Overwrite the priority.
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Set or clear the category reference.
    #[allow(clippy::option_option)]
    #[serde(
        default,
        deserialize_with = "deserialize_nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub category_id: Option<Option<CategoryId>>,
    /// Set or clear the due date.
    #[allow(clippy::option_option)]
    #[serde(default, with = "optional_timestamp", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<OffsetDateTime>>,
    /// Set the completion flag; `completedAt` is derived from the new value.
    #[serde(default)]
    pub completed: Option<bool>,
    /// Overwrite the manual sort position.
    #[serde(default)]
    pub order: Option<u32>,
}

impl TaskPatch {
    /// Patch toggling completion.
    #[must_use]
    pub fn completion(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    /// Returns true when the patch names no field.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.category_id.is_none()
            && self.due_date.is_none()
            && self.completed.is_none()
            && self.order.is_none()
    }

    /// Patched fields with their new values, in field order.
    #[must_use]
    pub fn entries(&self) -> Vec<(TaskField, FieldValue)> {
        let mut entries = Vec::new();
        if let Some(title) = &self.title {
            entries.push((TaskField::Title, FieldValue::Text(title.clone())));
        }
        if let Some(description) = &self.description {
            entries.push((TaskField::Description, FieldValue::Text(description.clone())));
        }
        if let Some(priority) = self.priority {
            entries.push((TaskField::Priority, FieldValue::Priority(priority)));
        }
        if let Some(category) = self.category_id {
            entries.push((
                TaskField::CategoryId,
                category.map_or(FieldValue::Null, FieldValue::Category),
            ));
        }
        if let Some(due) = self.due_date {
            entries.push((TaskField::DueDate, due.map_or(FieldValue::Null, FieldValue::Timestamp)));
        }
        if let Some(completed) = self.completed {
            entries.push((TaskField::Completed, FieldValue::Bool(completed)));
        }
        if let Some(order) = self.order {
            entries.push((TaskField::Order, FieldValue::Integer(i64::from(order))));
        }
        entries
    }

    /// Merge the patch onto `task`.
    ///
    /// When `completed` is present, `completedAt` is recomputed from the new
    /// value alone: `now` when true, cleared when false.
    pub fn apply_to(self, task: &mut Task, now: OffsetDateTime) {
        let Self {
            title,
            description,
            priority,
            category_id,
            due_date,
            completed,
            order,
        } = self;

        if let Some(title) = title {
            task.title = title;
        }
        if let Some(description) = description {
            task.description = description;
        }
        if let Some(priority) = priority {
            task.priority = priority;
        }
        if let Some(category) = category_id {
            task.category_id = category;
        }
        if let Some(due) = due_date {
            task.due_date = due;
        }
        if let Some(completed) = completed {
            task.completed = completed;
            task.completed_at = completed.then_some(now);
        }
        if let Some(order) = order {
            task.order = order;
        }
    }
}

/// Keep an explicit `null` as `Some(None)` instead of collapsing it to `None`.
#[allow(clippy::option_option)]
fn deserialize_nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Serde adapter distinguishing a missing `dueDate` from an explicit `null`.
mod optional_timestamp {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::OffsetDateTime;

    #[allow(clippy::ref_option, clippy::option_option)]
    pub fn serialize<S>(value: &Option<Option<OffsetDateTime>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(inner) => time::serde::rfc3339::option::serialize(inner, serializer),
            None => serializer.serialize_none(),
        }
    }

    #[allow(clippy::option_option)]
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<OffsetDateTime>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Wrapper(#[serde(with = "time::serde::rfc3339::option")] Option<OffsetDateTime>);

        Wrapper::deserialize(deserializer).map(|Wrapper(inner)| Some(inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskflow_core::TaskId;
    use time::macros::datetime;

    fn task() -> Task {
        Task {
            id: TaskId(1),
            title: "Old".into(),
            description: "body".into(),
            priority: Priority::Low,
            category_id: Some(CategoryId(1)),
            due_date: None,
            completed: false,
            completed_at: None,
            created_at: datetime!(2025-01-01 00:00 UTC),
            order: 1,
            edit_history: Vec::new(),
        }
    }

    #[test]
    fn apply_merges_present_fields_only() {
        let mut task = task();
        TaskPatch {
            title: Some("New".into()),
            category_id: Some(None),
            ..TaskPatch::default()
        }
        .apply_to(&mut task, datetime!(2025-01-02 00:00 UTC));

        assert_eq!(task.title, "New");
        assert_eq!(task.description, "body");
        assert_eq!(task.category_id, None);
        assert_eq!(task.id, TaskId(1));
    }

    #[test]
    fn completion_derives_completed_at_from_new_value() {
        let now = datetime!(2025-01-02 12:00 UTC);
        let mut task = task();

        TaskPatch::completion(true).apply_to(&mut task, now);
        assert_eq!(task.completed_at, Some(now));

        // recomputed even when the flag was already set
        let later = datetime!(2025-01-03 12:00 UTC);
        TaskPatch::completion(true).apply_to(&mut task, later);
        assert_eq!(task.completed_at, Some(later));

        TaskPatch::completion(false).apply_to(&mut task, later);
        assert!(task.completed_at.is_none());
        assert!(!task.completed);
    }

    #[test]
    fn entries_follow_field_order() {
        let patch = TaskPatch {
            completed: Some(true),
            title: Some("x".into()),
            due_date: Some(None),
            ..TaskPatch::default()
        };
        let fields: Vec<TaskField> = patch.entries().into_iter().map(|(field, _)| field).collect();
        assert_eq!(fields, vec![TaskField::Title, TaskField::DueDate, TaskField::Completed]);
    }

    #[test]
    fn deserialize_distinguishes_null_from_missing() {
        let cleared: TaskPatch =
            serde_json::from_str(r#"{"dueDate":null}"#).unwrap_or_else(|err| panic!("parse: {err}"));
        assert_eq!(cleared.due_date, Some(None));

        let uncategorized: TaskPatch =
            serde_json::from_str(r#"{"categoryId":null}"#).unwrap_or_else(|err| panic!("parse: {err}"));
        assert_eq!(uncategorized.category_id, Some(None));

        let untouched: TaskPatch = serde_json::from_str("{}").unwrap_or_else(|err| panic!("parse: {err}"));
        assert_eq!(untouched.due_date, None);
        assert!(untouched.is_empty());

        let set: TaskPatch = serde_json::from_str(r#"{"dueDate":"2025-02-01T09:00:00Z"}"#)
            .unwrap_or_else(|err| panic!("parse: {err}"));
        assert_eq!(set.due_date, Some(Some(datetime!(2025-02-01 09:00 UTC))));
    }
}
