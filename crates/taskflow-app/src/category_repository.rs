//! Category repository.
//!
//! `taskCount` is denormalized: the repository never looks at tasks and the
//! count only moves through [`CategoryRepository::update_task_count`].

use taskflow_core::{Category, CategoryId, CategoryPatch, NewCategory};

use crate::error::{Result, StoreError};
use crate::store::RecordStore;

/// Repository owning a category store.
pub struct CategoryRepository<S> {
    store: S,
}

impl<S: RecordStore<Category>> CategoryRepository<S> {
    /// Wrap `store`.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Access the underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// All categories in ascending id order.
    ///
    /// # Errors
    /// Returns [`StoreError::Backend`] when the store cannot be read.
    pub fn get_all(&self) -> Result<Vec<Category>> {
        self.store.load_all().map_err(StoreError::backend)
    }

    /// Load a single category.
    ///
    /// # Errors
    /// Returns [`StoreError::CategoryNotFound`] when the id is unknown.
    pub fn get_by_id(&self, id: CategoryId) -> Result<Category> {
        self.store
            .load(id)
            .map_err(StoreError::backend)?
            .ok_or(StoreError::CategoryNotFound(id))
    }

    /// Create a category with a zero task count.
    ///
    /// # Errors
    /// Returns [`StoreError::EmptyName`] for a blank name,
    /// [`StoreError::IdSpaceExhausted`] once the largest id is taken, or a
    /// backend error.
    pub fn create(&self, input: NewCategory) -> Result<Category> {
        if input.name.trim().is_empty() {
            return Err(StoreError::EmptyName);
        }
        let id = self
            .store
            .next_id()
            .map_err(StoreError::backend)?
            .ok_or(StoreError::IdSpaceExhausted("category"))?;
        let category = Category {
            id,
            name: input.name,
            color: input.color,
            icon: input.icon,
            task_count: 0,
        };
        self.store.save(category.clone()).map_err(StoreError::backend)?;
        tracing::debug!(category = %category.id, "created category");
        Ok(category)
    }

    /// Merge `patch` onto a category.
    ///
    /// # Errors
    /// Returns [`StoreError::CategoryNotFound`] when the id is unknown and
    /// [`StoreError::EmptyName`] when the patch blanks the name.
    pub fn update(&self, id: CategoryId, patch: CategoryPatch) -> Result<Category> {
        let mut category = self.get_by_id(id)?;
        if patch.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(StoreError::EmptyName);
        }
        patch.apply_to(&mut category);
        self.store.save(category.clone()).map_err(StoreError::backend)?;
        tracing::debug!(category = %id, "updated category");
        Ok(category)
    }

    /// Hard-delete a category. Tasks referencing it are left untouched.
    ///
    /// # Errors
    /// Returns [`StoreError::CategoryNotFound`] when the id is unknown.
    pub fn delete(&self, id: CategoryId) -> Result<bool> {
        if !self.store.remove(id).map_err(StoreError::backend)? {
            return Err(StoreError::CategoryNotFound(id));
        }
        tracing::debug!(category = %id, "deleted category");
        Ok(true)
    }

    /// Overwrite the denormalized task count. Returns `None` for an unknown id.
    ///
    /// # Errors
    /// Returns [`StoreError::Backend`] when the store fails.
    pub fn update_task_count(&self, id: CategoryId, count: u64) -> Result<Option<Category>> {
        let Some(mut category) = self.store.load(id).map_err(StoreError::backend)? else {
            return Ok(None);
        };
        category.task_count = count;
        self.store.save(category.clone()).map_err(StoreError::backend)?;
        tracing::debug!(category = %id, count, "updated task count");
        Ok(Some(category))
    }
}
