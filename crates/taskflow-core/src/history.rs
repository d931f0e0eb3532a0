use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::id::CategoryId;
use crate::task::Priority;

/// Patchable task fields tracked by the edit history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskField {
    /// `title`
    Title,
    /// `description`
    Description,
    /// `priority`
    Priority,
    /// `categoryId`
    CategoryId,
    /// `dueDate`
    DueDate,
    /// `completed`
    Completed,
    /// `order`
    Order,
}

impl TaskField {
    /// Field name as it appears in serialized records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Priority => "priority",
            Self::CategoryId => "categoryId",
            Self::DueDate => "dueDate",
            Self::Completed => "completed",
            Self::Order => "order",
        }
    }
}

impl fmt::Display for TaskField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field value captured in a history entry.
///
/// Values are owned copies, so later mutation of the task never rewrites history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum FieldValue {
    /// Absent value (`null`).
    Null,
    /// Boolean flag.
    Bool(bool),
    /// Integer value.
    Integer(i64),
    /// Text value.
    Text(String),
    /// Priority value.
    Priority(Priority),
    /// Category reference.
    Category(CategoryId),
    /// Point in time.
    Timestamp(#[serde(with = "time::serde::rfc3339")] OffsetDateTime),
}

impl FieldValue {
    /// Returns true for [`FieldValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("(none)"),
            Self::Bool(value) => value.fmt(f),
            Self::Integer(value) => value.fmt(f),
            Self::Text(value) if value.is_empty() => f.write_str("(empty)"),
            Self::Text(value) => write!(f, "{value:?}"),
            Self::Priority(value) => value.fmt(f),
            Self::Category(value) => write!(f, "category {value}"),
            Self::Timestamp(value) => match value.format(&Rfc3339) {
                Ok(text) => f.write_str(&text),
                Err(_) => write!(f, "{value}"),
            },
        }
    }
}

/// Kind of recorded change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryAction {
    /// The task was created.
    Created,
    /// One or more fields changed.
    Updated,
}

/// Single field-level difference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    /// Changed field.
    pub field: TaskField,
    /// Value before the change (`Null` for creation).
    pub old_value: FieldValue,
    /// Value after the change.
    pub new_value: FieldValue,
}

/// One recorded change event with its field-level diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// When the change was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Creation or update.
    pub action: HistoryAction,
    /// Changed fields, in field order.
    pub changes: Vec<FieldChange>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn field_value_serializes_with_kind_tag() {
        let value = FieldValue::Priority(Priority::High);
        let json = serde_json::to_string(&value).unwrap_or_else(|err| panic!("serialize: {err}"));
        assert_eq!(json, r#"{"kind":"priority","value":"high"}"#);

        let null = serde_json::to_string(&FieldValue::Null).unwrap_or_else(|err| panic!("serialize: {err}"));
        assert_eq!(null, r#"{"kind":"null"}"#);
    }

    #[test]
    fn timestamps_compare_as_instants() {
        let utc = FieldValue::Timestamp(datetime!(2025-01-01 09:00 UTC));
        let tokyo = FieldValue::Timestamp(datetime!(2025-01-01 18:00 +9));
        assert_eq!(utc, tokyo);
    }

    #[test]
    fn display_is_human_readable() {
        assert_eq!(FieldValue::Null.to_string(), "(none)");
        assert_eq!(FieldValue::Text("Buy milk".into()).to_string(), "\"Buy milk\"");
        assert_eq!(FieldValue::Category(CategoryId(4)).to_string(), "category 4");
        assert_eq!(
            FieldValue::Timestamp(datetime!(2025-01-01 09:00 UTC)).to_string(),
            "2025-01-01T09:00:00Z"
        );
    }
}
