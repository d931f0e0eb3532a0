//! Task repository: CRUD, derived queries and edit-history tracking.

use std::sync::Arc;

use taskflow_core::{
    CategoryId, Clock, HistoryEntry, NewTask, Priority, Task, TaskId,
};
use time::OffsetDateTime;

use crate::error::{Result, StoreError};
use crate::history::{FieldEquality, HistoryRecorder, StructuralEquality};
use crate::store::RecordStore;
use crate::task_patch::TaskPatch;

/// Repository owning a task store and recording history on every mutation.
pub struct TaskRepository<S, E = StructuralEquality> {
    store: S,
    clock: Arc<dyn Clock>,
    recorder: HistoryRecorder<E>,
}

impl<S: RecordStore<Task>> TaskRepository<S> {
    /// Create a repository with structural field equality.
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self::with_equality(store, clock, StructuralEquality)
    }
}

impl<S: RecordStore<Task>, E: FieldEquality> TaskRepository<S, E> {
    /// Create a repository with a custom equality policy for history diffs.
    pub fn with_equality(store: S, clock: Arc<dyn Clock>, equality: E) -> Self {
        Self {
            store,
            clock,
            recorder: HistoryRecorder::new(equality),
        }
    }

    /// Access the underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Current instant according to the repository clock.
    pub fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }

    /// All tasks in ascending id order.
    ///
    /// # Errors
    /// Returns [`StoreError::Backend`] when the store cannot be read.
    pub fn get_all(&self) -> Result<Vec<Task>> {
        self.store.load_all().map_err(StoreError::backend)
    }

    /// Load a single task.
    ///
    /// # Errors
    /// Returns [`StoreError::TaskNotFound`] when the id is unknown.
    pub fn get_by_id(&self, id: TaskId) -> Result<Task> {
        self.store
            .load(id)
            .map_err(StoreError::backend)?
            .ok_or(StoreError::TaskNotFound(id))
    }

    /// Tasks referencing `category`.
    ///
    /// # Errors
    /// Returns [`StoreError::Backend`] when the store cannot be read.
    pub fn get_by_category(&self, category: CategoryId) -> Result<Vec<Task>> {
        self.select(|task| task.category_id == Some(category))
    }

    /// Tasks whose completion flag equals `completed`.
    ///
    /// # Errors
    /// Returns [`StoreError::Backend`] when the store cannot be read.
    pub fn get_by_status(&self, completed: bool) -> Result<Vec<Task>> {
        self.select(|task| task.completed == completed)
    }

    /// Tasks with the given priority.
    ///
    /// # Errors
    /// Returns [`StoreError::Backend`] when the store cannot be read.
    pub fn get_by_priority(&self, priority: Priority) -> Result<Vec<Task>> {
        self.select(|task| task.priority == priority)
    }

    /// Tasks due within `[start, end]`, both inclusive. Undated tasks never match.
    ///
    /// # Errors
    /// Returns [`StoreError::Backend`] when the store cannot be read.
    pub fn get_by_date_range(&self, start: OffsetDateTime, end: OffsetDateTime) -> Result<Vec<Task>> {
        self.select(|task| task.due_date.is_some_and(|due| start <= due && due <= end))
    }

    /// Edit history of a task, oldest first.
    ///
    /// # Errors
    /// Returns [`StoreError::TaskNotFound`] when the id is unknown.
    pub fn edit_history(&self, id: TaskId) -> Result<Vec<HistoryEntry>> {
        self.get_by_id(id).map(|task| task.edit_history)
    }

    /// Create a task and record its `created` entry.
    ///
    /// # Errors
    /// Returns [`StoreError::EmptyTitle`] for a blank title,
    /// [`StoreError::IdSpaceExhausted`] once the largest id is taken, or a
    /// backend error.
    pub fn create(&self, input: NewTask) -> Result<Task> {
        if input.title.trim().is_empty() {
            return Err(StoreError::EmptyTitle);
        }

        let id = self
            .store
            .next_id()
            .map_err(StoreError::backend)?
            .ok_or(StoreError::IdSpaceExhausted("task"))?;
        let count = self.store.len().map_err(StoreError::backend)?;
        let now = self.clock.now();
        let mut task = Task {
            id,
            title: input.title,
            description: input.description,
            priority: input.priority,
            category_id: input.category_id,
            due_date: input.due_date,
            completed: false,
            completed_at: None,
            created_at: now,
            order: u32::try_from(count).unwrap_or(u32::MAX).saturating_add(1),
            edit_history: Vec::new(),
        };
        let entry = self.recorder.created_entry(&task, now);
        task.edit_history.push(entry);

        self.store.save(task.clone()).map_err(StoreError::backend)?;
        tracing::debug!(task = %id, "created task");
        Ok(task)
    }

    /// Merge `patch` onto a task, appending an `updated` entry when a field changed.
    ///
    /// # Errors
    /// Returns [`StoreError::TaskNotFound`] when the id is unknown and
    /// [`StoreError::EmptyTitle`] when the patch blanks the title.
    pub fn update(&self, id: TaskId, patch: TaskPatch) -> Result<Task> {
        let mut task = self.get_by_id(id)?;
        if patch.title.as_deref().is_some_and(|title| title.trim().is_empty()) {
            return Err(StoreError::EmptyTitle);
        }

        let now = self.clock.now();
        let entry = self.recorder.update_entry(&task, &patch, now);
        patch.apply_to(&mut task, now);
        let changed = entry.as_ref().map_or(0, |entry| entry.changes.len());
        if let Some(entry) = entry {
            task.edit_history.push(entry);
        }

        self.store.save(task.clone()).map_err(StoreError::backend)?;
        tracing::debug!(task = %id, changed, "updated task");
        Ok(task)
    }

    /// Hard-delete a task.
    ///
    /// # Errors
    /// Returns [`StoreError::TaskNotFound`] when the id is unknown.
    pub fn delete(&self, id: TaskId) -> Result<bool> {
        if !self.store.remove(id).map_err(StoreError::backend)? {
            return Err(StoreError::TaskNotFound(id));
        }
        tracing::debug!(task = %id, "deleted task");
        Ok(true)
    }

    /// Assign `order = 1..N` following `ids`. Unknown ids are skipped and
    /// tasks not listed keep their order. No history is recorded.
    ///
    /// # Errors
    /// Returns [`StoreError::Backend`] when the store fails.
    pub fn reorder(&self, ids: &[TaskId]) -> Result<Vec<Task>> {
        for (position, &id) in (1_u32..).zip(ids) {
            if let Some(mut task) = self.store.load(id).map_err(StoreError::backend)? {
                task.order = position;
                self.store.save(task).map_err(StoreError::backend)?;
            }
        }
        tracing::debug!(count = ids.len(), "reordered tasks");
        self.get_all()
    }

    fn select(&self, predicate: impl Fn(&Task) -> bool) -> Result<Vec<Task>> {
        let mut tasks = self.get_all()?;
        tasks.retain(|task| predicate(task));
        Ok(tasks)
    }
}
