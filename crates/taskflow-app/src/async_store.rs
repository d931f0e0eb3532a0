//! Async repositories with simulated latency.
//!
//! Each call sleeps for its configured delay and then runs the synchronous
//! repository operation under a `tokio::sync::Mutex`, so at most one
//! operation executes per store. The delay is taken before the lock: calls
//! that overlap complete in deadline order and the last completion wins.

use taskflow_core::{
    Category, CategoryId, CategoryPatch, HistoryEntry, NewCategory, NewTask, Priority, Task, TaskId,
};
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::category_repository::CategoryRepository;
use crate::error::Result;
use crate::history::{FieldEquality, StructuralEquality};
use crate::latency::{LatencyProfile, Operation};
use crate::store::RecordStore;
use crate::task_patch::TaskPatch;
use crate::task_repository::TaskRepository;

async fn simulate(latency: &LatencyProfile, op: Operation) {
    let delay = latency.get(op);
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Async decorator around [`TaskRepository`].
pub struct AsyncTaskRepository<S, E = StructuralEquality> {
    inner: Mutex<TaskRepository<S, E>>,
    latency: LatencyProfile,
}

impl<S, E> AsyncTaskRepository<S, E>
where
    S: RecordStore<Task> + Send,
    E: FieldEquality,
{
    /// Wrap `repository`, delaying every call according to `latency`.
    pub fn new(repository: TaskRepository<S, E>, latency: LatencyProfile) -> Self {
        Self {
            inner: Mutex::new(repository),
            latency,
        }
    }

    /// See [`TaskRepository::get_all`].
    ///
    /// # Errors
    /// Propagates the repository error.
    pub async fn get_all(&self) -> Result<Vec<Task>> {
        simulate(&self.latency, Operation::GetAll).await;
        self.inner.lock().await.get_all()
    }

    /// See [`TaskRepository::get_by_id`].
    ///
    /// # Errors
    /// Propagates the repository error.
    pub async fn get_by_id(&self, id: TaskId) -> Result<Task> {
        simulate(&self.latency, Operation::GetById).await;
        self.inner.lock().await.get_by_id(id)
    }

    /// See [`TaskRepository::get_by_category`].
    ///
    /// # Errors
    /// Propagates the repository error.
    pub async fn get_by_category(&self, category: CategoryId) -> Result<Vec<Task>> {
        simulate(&self.latency, Operation::Query).await;
        self.inner.lock().await.get_by_category(category)
    }

    /// See [`TaskRepository::get_by_status`].
    ///
    /// # Errors
    /// Propagates the repository error.
    pub async fn get_by_status(&self, completed: bool) -> Result<Vec<Task>> {
        simulate(&self.latency, Operation::Query).await;
        self.inner.lock().await.get_by_status(completed)
    }

    /// See [`TaskRepository::get_by_priority`].
    ///
    /// # Errors
    /// Propagates the repository error.
    pub async fn get_by_priority(&self, priority: Priority) -> Result<Vec<Task>> {
        simulate(&self.latency, Operation::Query).await;
        self.inner.lock().await.get_by_priority(priority)
    }

    /// See [`TaskRepository::get_by_date_range`].
    ///
    /// # Errors
    /// Propagates the repository error.
    pub async fn get_by_date_range(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Vec<Task>> {
        simulate(&self.latency, Operation::Query).await;
        self.inner.lock().await.get_by_date_range(start, end)
    }

    /// See [`TaskRepository::edit_history`].
    ///
    /// # Errors
    /// Propagates the repository error.
    pub async fn edit_history(&self, id: TaskId) -> Result<Vec<HistoryEntry>> {
        simulate(&self.latency, Operation::GetById).await;
        self.inner.lock().await.edit_history(id)
    }

    /// See [`TaskRepository::create`].
    ///
    /// # Errors
    /// Propagates the repository error.
    pub async fn create(&self, input: NewTask) -> Result<Task> {
        simulate(&self.latency, Operation::Create).await;
        self.inner.lock().await.create(input)
    }

    /// See [`TaskRepository::update`].
    ///
    /// # Errors
    /// Propagates the repository error.
    pub async fn update(&self, id: TaskId, patch: TaskPatch) -> Result<Task> {
        simulate(&self.latency, Operation::Update).await;
        self.inner.lock().await.update(id, patch)
    }

    /// See [`TaskRepository::delete`].
    ///
    /// # Errors
    /// Propagates the repository error.
    pub async fn delete(&self, id: TaskId) -> Result<bool> {
        simulate(&self.latency, Operation::Delete).await;
        self.inner.lock().await.delete(id)
    }

    /// See [`TaskRepository::reorder`].
    ///
    /// # Errors
    /// Propagates the repository error.
    pub async fn reorder(&self, ids: &[TaskId]) -> Result<Vec<Task>> {
        simulate(&self.latency, Operation::Reorder).await;
        self.inner.lock().await.reorder(ids)
    }
}

/// Async decorator around [`CategoryRepository`].
pub struct AsyncCategoryRepository<S> {
    inner: Mutex<CategoryRepository<S>>,
    latency: LatencyProfile,
}

impl<S: RecordStore<Category> + Send> AsyncCategoryRepository<S> {
    /// Wrap `repository`, delaying every call according to `latency`.
    pub fn new(repository: CategoryRepository<S>, latency: LatencyProfile) -> Self {
        Self {
            inner: Mutex::new(repository),
            latency,
        }
    }

    /// See [`CategoryRepository::get_all`].
    ///
    /// # Errors
    /// Propagates the repository error.
    pub async fn get_all(&self) -> Result<Vec<Category>> {
        simulate(&self.latency, Operation::GetAll).await;
        self.inner.lock().await.get_all()
    }

    /// See [`CategoryRepository::get_by_id`].
    ///
    /// # Errors
    /// Propagates the repository error.
    pub async fn get_by_id(&self, id: CategoryId) -> Result<Category> {
        simulate(&self.latency, Operation::GetById).await;
        self.inner.lock().await.get_by_id(id)
    }

    /// See [`CategoryRepository::create`].
    ///
    /// # Errors
    /// Propagates the repository error.
    pub async fn create(&self, input: NewCategory) -> Result<Category> {
        simulate(&self.latency, Operation::Create).await;
        self.inner.lock().await.create(input)
    }

    /// See [`CategoryRepository::update`].
    ///
    /// # Errors
    /// Propagates the repository error.
    pub async fn update(&self, id: CategoryId, patch: CategoryPatch) -> Result<Category> {
        simulate(&self.latency, Operation::Update).await;
        self.inner.lock().await.update(id, patch)
    }

    /// See [`CategoryRepository::delete`].
    ///
    /// # Errors
    /// Propagates the repository error.
    pub async fn delete(&self, id: CategoryId) -> Result<bool> {
        simulate(&self.latency, Operation::Delete).await;
        self.inner.lock().await.delete(id)
    }

    /// See [`CategoryRepository::update_task_count`].
    ///
    /// # Errors
    /// Propagates the repository error.
    pub async fn update_task_count(&self, id: CategoryId, count: u64) -> Result<Option<Category>> {
        simulate(&self.latency, Operation::UpdateTaskCount).await;
        self.inner.lock().await.update_task_count(id, count)
    }
}
