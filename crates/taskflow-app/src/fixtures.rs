//! Seed data for the in-memory stores.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use taskflow_core::{Category, Task};

use crate::store::{MemoryStore, Record};

const BUILTIN_TASKS: &str = include_str!("../fixtures/tasks.json");
const BUILTIN_CATEGORIES: &str = include_str!("../fixtures/categories.json");
const TASKS_FILE: &str = "tasks.json";
const CATEGORIES_FILE: &str = "categories.json";

/// Initial task and category collections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fixtures {
    /// Seed tasks.
    pub tasks: Vec<Task>,
    /// Seed categories.
    pub categories: Vec<Category>,
}

impl Fixtures {
    /// Seed bundled with the crate.
    ///
    /// # Errors
    /// Returns an error if the embedded JSON is malformed.
    pub fn builtin() -> Result<Self> {
        Self::parse(BUILTIN_TASKS, BUILTIN_CATEGORIES).context("invalid builtin fixtures")
    }

    /// Read `tasks.json` and `categories.json` from `dir`.
    ///
    /// # Errors
    /// Returns an error when either file is missing, malformed or inconsistent.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let read = |name: &str| {
            let path = dir.join(name);
            fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))
        };
        let fixtures = Self::parse(&read(TASKS_FILE)?, &read(CATEGORIES_FILE)?)
            .with_context(|| format!("invalid fixtures in {}", dir.display()))?;
        tracing::debug!(
            dir = %dir.display(),
            tasks = fixtures.tasks.len(),
            categories = fixtures.categories.len(),
            "loaded fixtures"
        );
        Ok(fixtures)
    }

    /// Parse both collections from JSON text.
    ///
    /// # Errors
    /// Returns an error on malformed JSON, duplicate ids, blank titles or a
    /// `completedAt` that disagrees with `completed`.
    pub fn parse(tasks: &str, categories: &str) -> Result<Self> {
        let tasks: Vec<Task> = serde_json::from_str(tasks).context("failed to parse tasks")?;
        let categories: Vec<Category> =
            serde_json::from_str(categories).context("failed to parse categories")?;
        let fixtures = Self { tasks, categories };
        fixtures.validate()?;
        Ok(fixtures)
    }

    /// Seeded stores, one per collection.
    #[must_use]
    pub fn into_stores(self) -> (MemoryStore<Task>, MemoryStore<Category>) {
        (MemoryStore::seeded(self.tasks), MemoryStore::seeded(self.categories))
    }

    fn validate(&self) -> Result<()> {
        ensure_unique("task", &self.tasks)?;
        ensure_unique("category", &self.categories)?;
        for task in &self.tasks {
            if task.title.trim().is_empty() {
                bail!("task {} has an empty title", task.id);
            }
            if task.completed != task.completed_at.is_some() {
                bail!("task {} has completedAt inconsistent with completed", task.id);
            }
        }
        Ok(())
    }
}

fn ensure_unique<R: Record>(kind: &str, records: &[R]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for record in records {
        let id = record.id();
        if !seen.insert(id) {
            bail!("duplicate {kind} id {id}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RecordStore;
    use taskflow_core::{CategoryId, HistoryAction, TaskId};
    use tempfile::tempdir;

    #[test]
    fn builtin_seed_is_consistent() -> Result<()> {
        let fixtures = Fixtures::builtin()?;
        assert_eq!(fixtures.categories.len(), 5);
        assert_eq!(fixtures.tasks.len(), 8);

        let report = &fixtures.tasks[0];
        assert_eq!(report.edit_history.len(), 2);
        assert_eq!(report.edit_history[0].action, HistoryAction::Created);
        assert!(fixtures.tasks[1].edit_history.is_empty());
        Ok(())
    }

    #[test]
    fn seeded_stores_allocate_after_fixture_ids() -> Result<()> {
        let (tasks, categories) = Fixtures::builtin()?.into_stores();
        assert_eq!(tasks.next_id()?, Some(TaskId(9)));
        assert_eq!(categories.next_id()?, Some(CategoryId(6)));
        Ok(())
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let tasks = r#"[
            {"id": 1, "title": "a", "createdAt": "2025-01-01T00:00:00Z"},
            {"id": 1, "title": "b", "createdAt": "2025-01-01T00:00:00Z"}
        ]"#;
        let Err(err) = Fixtures::parse(tasks, "[]") else {
            panic!("duplicate ids should error");
        };
        assert!(err.to_string().contains("duplicate task id 1"));
    }

    #[test]
    fn completion_timestamp_must_match_flag() {
        let tasks = r#"[{"id": 1, "title": "a", "completed": true, "createdAt": "2025-01-01T00:00:00Z"}]"#;
        assert!(Fixtures::parse(tasks, "[]").is_err());
    }

    #[test]
    fn load_dir_reads_override_files() -> Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join(TASKS_FILE),
            r#"[{"id": 4, "title": "Only task", "createdAt": "2025-01-01T00:00:00Z"}]"#,
        )?;
        fs::write(
            dir.path().join(CATEGORIES_FILE),
            r##"[{"id": 2, "name": "Misc", "color": "#000000", "icon": "Tag"}]"##,
        )?;

        let fixtures = Fixtures::load_dir(dir.path())?;
        assert_eq!(fixtures.tasks[0].id, TaskId(4));
        assert_eq!(fixtures.categories[0].task_count, 0);
        Ok(())
    }

    #[test]
    fn load_dir_reports_missing_files() -> Result<()> {
        let dir = tempdir()?;
        let Err(err) = Fixtures::load_dir(dir.path()) else {
            panic!("missing files should error");
        };
        assert!(format!("{err:#}").contains(TASKS_FILE));
        Ok(())
    }
}
