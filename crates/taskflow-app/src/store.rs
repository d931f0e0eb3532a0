//! Storage abstraction behind the repositories and its in-memory backend.

use std::collections::BTreeMap;
use std::sync::RwLock;

use anyhow::{Error, anyhow};
use taskflow_core::{Category, CategoryId, SequentialId, Task, TaskId};

/// Record addressable by a sequential identifier.
pub trait Record: Clone {
    /// Identifier type.
    type Id: SequentialId + std::fmt::Debug + std::fmt::Display + Send + Sync;

    /// Identifier of this record.
    fn id(&self) -> Self::Id;
}

impl Record for Task {
    type Id = TaskId;

    fn id(&self) -> TaskId {
        self.id
    }
}

impl Record for Category {
    type Id = CategoryId;

    fn id(&self) -> CategoryId {
        self.id
    }
}

/// Minimal storage abstraction required by the repositories.
///
/// Implementations hand out owned copies; callers can never reach into the
/// stored records through a returned value.
pub trait RecordStore<R: Record> {
    /// Error type bubbled up from the backing store.
    type Error: Into<Error>;

    /// Load a single record.
    ///
    /// # Errors
    /// Returns a store-specific error when the record cannot be read.
    fn load(&self, id: R::Id) -> Result<Option<R>, Self::Error>;

    /// Load every record in ascending id order.
    ///
    /// # Errors
    /// Returns a store-specific error when listing fails.
    fn load_all(&self) -> Result<Vec<R>, Self::Error>;

    /// Insert or replace a record keyed by its id.
    ///
    /// # Errors
    /// Returns a store-specific error when persisting fails.
    fn save(&self, record: R) -> Result<(), Self::Error>;

    /// Remove a record. Returns whether it existed.
    ///
    /// # Errors
    /// Returns a store-specific error when removal fails.
    fn remove(&self, id: R::Id) -> Result<bool, Self::Error>;

    /// Check if a record exists.
    ///
    /// # Errors
    /// Returns a store-specific error when the check fails.
    fn contains(&self, id: R::Id) -> Result<bool, Self::Error> {
        self.load(id).map(|record| record.is_some())
    }

    /// Number of stored records.
    ///
    /// # Errors
    /// Returns a store-specific error when listing fails.
    fn len(&self) -> Result<usize, Self::Error> {
        self.load_all().map(|records| records.len())
    }

    /// Whether the store holds no records.
    ///
    /// # Errors
    /// Returns a store-specific error when listing fails.
    fn is_empty(&self) -> Result<bool, Self::Error> {
        self.len().map(|len| len == 0)
    }

    /// Identifier for the next created record (`max + 1`, or the first id).
    ///
    /// `Ok(None)` means the largest identifier is already in use.
    ///
    /// # Errors
    /// Returns a store-specific error when listing fails.
    fn next_id(&self) -> Result<Option<R::Id>, Self::Error> {
        self.load_all()
            .map(|records| R::Id::allocate(records.iter().map(Record::id)))
    }
}

/// Lock-guarded in-memory store keyed by id.
#[derive(Debug)]
pub struct MemoryStore<R: Record> {
    records: RwLock<BTreeMap<R::Id, R>>,
}

impl<R: Record> Default for MemoryStore<R> {
    fn default() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<R: Record> MemoryStore<R> {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `records`. Later duplicates replace earlier ones.
    #[must_use]
    pub fn seeded(records: impl IntoIterator<Item = R>) -> Self {
        let map = records.into_iter().map(|record| (record.id(), record)).collect();
        Self {
            records: RwLock::new(map),
        }
    }
}

impl<R: Record> RecordStore<R> for MemoryStore<R> {
    type Error = Error;

    fn load(&self, id: R::Id) -> Result<Option<R>, Self::Error> {
        let records = self.records.read().map_err(|_| anyhow!("Failed to lock store"))?;
        Ok(records.get(&id).cloned())
    }

    fn load_all(&self) -> Result<Vec<R>, Self::Error> {
        let records = self.records.read().map_err(|_| anyhow!("Failed to lock store"))?;
        Ok(records.values().cloned().collect())
    }

    fn save(&self, record: R) -> Result<(), Self::Error> {
        let mut records = self.records.write().map_err(|_| anyhow!("Failed to lock store"))?;
        records.insert(record.id(), record);
        drop(records);
        Ok(())
    }

    fn remove(&self, id: R::Id) -> Result<bool, Self::Error> {
        let mut records = self.records.write().map_err(|_| anyhow!("Failed to lock store"))?;
        Ok(records.remove(&id).is_some())
    }

    fn contains(&self, id: R::Id) -> Result<bool, Self::Error> {
        let records = self.records.read().map_err(|_| anyhow!("Failed to lock store"))?;
        Ok(records.contains_key(&id))
    }

    fn len(&self) -> Result<usize, Self::Error> {
        let records = self.records.read().map_err(|_| anyhow!("Failed to lock store"))?;
        Ok(records.len())
    }

    fn next_id(&self) -> Result<Option<R::Id>, Self::Error> {
        let records = self.records.read().map_err(|_| anyhow!("Failed to lock store"))?;
        Ok(R::Id::allocate(records.keys().copied()))
    }
}
