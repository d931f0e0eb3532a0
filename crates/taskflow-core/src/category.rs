use serde::{Deserialize, Serialize};

use crate::id::CategoryId;

/// A task category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Unique, immutable identifier.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// Color token (e.g. `#3b82f6`).
    pub color: String,
    /// Icon identifier.
    pub icon: String,
    /// Denormalized task count. Only changed by explicit recount calls.
    #[serde(default)]
    pub task_count: u64,
}

/// Input accepted by category creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    /// Display name (must not be blank).
    pub name: String,
    /// Color token.
    pub color: String,
    /// Icon identifier.
    pub icon: String,
}

/// Partial category update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPatch {
    /// New display name.
    #[serde(default)]
    pub name: Option<String>,
    /// New color token.
    #[serde(default)]
    pub color: Option<String>,
    /// New icon identifier.
    #[serde(default)]
    pub icon: Option<String>,
}

impl CategoryPatch {
    /// Returns true when the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none() && self.icon.is_none()
    }

    /// Merge the patch onto `category`. The id and task count are never touched.
    pub fn apply_to(self, category: &mut Category) {
        if let Some(name) = self.name {
            category.name = name;
        }
        if let Some(color) = self.color {
            category.color = color;
        }
        if let Some(icon) = self.icon {
            category.icon = icon;
        }
    }
}
