use std::sync::Arc;

use taskflow_core::{
    Category, CategoryId, Clock, FilterSpec, Task, TaskId, apply,
};
use time::OffsetDateTime;

use crate::async_store::{AsyncCategoryRepository, AsyncTaskRepository};
use crate::category_repository::CategoryRepository;
use crate::error::Result;
use crate::fixtures::Fixtures;
use crate::history::{FieldEquality, StructuralEquality};
use crate::integrity::{self, IntegrityReport};
use crate::latency::LatencyProfile;
use crate::quick_add::{self, QuickAddOverrides};
use crate::stats::ProgressSummary;
use crate::store::{MemoryStore, RecordStore};
use crate::task_patch::TaskPatch;
use crate::task_repository::TaskRepository;

/// Service façade over both repositories, used by the presentation layer.
pub struct TaskFlow<TS, CS, E = StructuralEquality> {
    tasks: AsyncTaskRepository<TS, E>,
    categories: AsyncCategoryRepository<CS>,
    clock: Arc<dyn Clock>,
}

/// Façade backed by the in-memory stores.
pub type MemoryTaskFlow = TaskFlow<MemoryStore<Task>, MemoryStore<Category>>;

impl MemoryTaskFlow {
    /// Seed fresh in-memory stores from `fixtures`.
    #[must_use]
    pub fn seeded(fixtures: Fixtures, clock: Arc<dyn Clock>, latency: &LatencyProfile) -> Self {
        let (tasks, categories) = fixtures.into_stores();
        Self::new(
            AsyncTaskRepository::new(TaskRepository::new(tasks, Arc::clone(&clock)), latency.clone()),
            AsyncCategoryRepository::new(CategoryRepository::new(categories), latency.clone()),
            clock,
        )
    }
}

impl<TS, CS, E> TaskFlow<TS, CS, E>
where
    TS: RecordStore<Task> + Send,
    CS: RecordStore<Category> + Send,
    E: FieldEquality,
{
    /// Assemble the façade from already built repositories.
    pub fn new(
        tasks: AsyncTaskRepository<TS, E>,
        categories: AsyncCategoryRepository<CS>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tasks,
            categories,
            clock,
        }
    }

    /// Task repository.
    pub const fn tasks(&self) -> &AsyncTaskRepository<TS, E> {
        &self.tasks
    }

    /// Category repository.
    pub const fn categories(&self) -> &AsyncCategoryRepository<CS> {
        &self.categories
    }

    /// Current instant.
    pub fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }

    /// Filtered and sorted task list.
    ///
    /// # Errors
    /// Propagates store failures.
    pub async fn list(&self, spec: &FilterSpec) -> Result<Vec<Task>> {
        let tasks = self.tasks.get_all().await?;
        Ok(apply(&tasks, spec, self.clock.as_ref()))
    }

    /// Flip the completion flag of a task.
    ///
    /// # Errors
    /// Returns a not-found error when the task is missing.
    pub async fn toggle_completed(&self, id: TaskId) -> Result<Task> {
        let task = self.tasks.get_by_id(id).await?;
        self.tasks
            .update(id, TaskPatch::completion(!task.completed))
            .await
    }

    /// Create a task from a one-line description.
    ///
    /// # Errors
    /// Returns [`crate::StoreError::EmptyTitle`] for blank text.
    pub async fn quick_add(&self, text: &str, overrides: QuickAddOverrides) -> Result<Task> {
        let hints = quick_add::parse(text, self.now())?;
        self.tasks.create(hints.into_new_task_with(overrides)).await
    }

    /// Categories for display. Failures are logged and yield an empty list.
    pub async fn categories_or_empty(&self) -> Vec<Category> {
        match self.categories.get_all().await {
            Ok(categories) => categories,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load categories");
                Vec::new()
            }
        }
    }

    /// Recompute every category's `taskCount` from open tasks.
    ///
    /// # Errors
    /// Propagates store failures.
    pub async fn refresh_task_counts(&self) -> Result<Vec<Category>> {
        let counts = integrity::active_task_counts(&self.tasks.get_all().await?);
        let mut refreshed = Vec::new();
        for category in self.categories.get_all().await? {
            let count = counts.get(&category.id).copied().unwrap_or(0);
            if let Some(updated) = self.categories.update_task_count(category.id, count).await? {
                refreshed.push(updated);
            }
        }
        Ok(refreshed)
    }

    /// Report dangling category references and stale counts.
    ///
    /// # Errors
    /// Propagates store failures.
    pub async fn integrity_report(&self) -> Result<IntegrityReport> {
        let tasks = self.tasks.get_all().await?;
        let categories = self.categories.get_all().await?;
        Ok(integrity::check(&tasks, &categories))
    }

    /// Overall, today and this-week completion.
    ///
    /// # Errors
    /// Propagates store failures.
    pub async fn progress(&self) -> Result<ProgressSummary> {
        let tasks = self.tasks.get_all().await?;
        Ok(ProgressSummary::at(&tasks, self.now()))
    }

    /// Delete a category. Referencing tasks keep their `categoryId`.
    ///
    /// # Errors
    /// Returns a not-found error when the category is missing.
    pub async fn delete_category(&self, id: CategoryId) -> Result<bool> {
        self.categories.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskflow_core::{FixedClock, Priority, View};
    use time::macros::datetime;

    fn flow() -> MemoryTaskFlow {
        let fixtures = Fixtures::builtin().unwrap_or_else(|err| panic!("fixtures: {err}"));
        let clock = Arc::new(FixedClock::new(datetime!(2025-06-16 08:00 UTC)));
        MemoryTaskFlow::seeded(fixtures, clock, &LatencyProfile::none())
    }

    #[tokio::test]
    async fn list_applies_filter_and_sort() -> Result<()> {
        let flow = flow();
        let active = flow.list(&FilterSpec::home()).await?;
        assert!(active.iter().all(|task| !task.completed));
        assert_eq!(active.len(), 7);
        assert_eq!(active[0].priority, Priority::Urgent);

        let today = flow.list(&FilterSpec::today()).await?;
        let ids: Vec<TaskId> = today.iter().map(|task| task.id).collect();
        assert_eq!(ids, vec![TaskId(5)]);
        Ok(())
    }

    #[tokio::test]
    async fn toggle_flips_completion() -> Result<()> {
        let flow = flow();
        let done = flow.toggle_completed(TaskId(2)).await?;
        assert!(done.completed);
        assert_eq!(done.completed_at, Some(datetime!(2025-06-16 08:00 UTC)));
        let reopened = flow.toggle_completed(TaskId(2)).await?;
        assert!(!reopened.completed);
        assert!(reopened.completed_at.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn quick_add_uses_hints() -> Result<()> {
        let flow = flow();
        let task = flow
            .quick_add("Send invoice today asap", QuickAddOverrides::default())
            .await?;
        assert_eq!(task.id, TaskId(9));
        assert_eq!(task.priority, Priority::Urgent);
        assert_eq!(task.due_date, Some(datetime!(2025-06-16 00:00 UTC)));
        assert!(flow.quick_add("   ", QuickAddOverrides::default()).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn deleting_a_category_leaves_tasks_dangling() -> Result<()> {
        let flow = flow();
        assert!(flow.integrity_report().await?.is_clean());

        flow.delete_category(CategoryId(5)).await?;
        let task = flow.tasks().get_by_id(TaskId(8)).await?;
        assert_eq!(task.category_id, Some(CategoryId(5)));

        let report = flow.integrity_report().await?;
        assert_eq!(report.dangling.len(), 1);
        assert_eq!(report.dangling[0].task_id, TaskId(8));
        Ok(())
    }

    #[tokio::test]
    async fn refresh_recounts_open_tasks() -> Result<()> {
        let flow = flow();
        flow.toggle_completed(TaskId(1)).await?;
        let refreshed = flow.refresh_task_counts().await?;
        let work = refreshed
            .iter()
            .find(|category| category.id == CategoryId(1))
            .map(|category| category.task_count);
        assert_eq!(work, Some(1));
        assert!(flow.integrity_report().await?.is_clean());
        Ok(())
    }

    #[tokio::test]
    async fn progress_summarizes_seed() -> Result<()> {
        let flow = flow();
        let summary = flow.progress().await?;
        assert_eq!(summary.overall.total, 8);
        assert_eq!(summary.overall.completed, 1);
        assert_eq!(summary.today.total, 1);
        assert_eq!(flow.list(&FilterSpec::default().with_view(View::Completed)).await?.len(), 1);
        Ok(())
    }
}
