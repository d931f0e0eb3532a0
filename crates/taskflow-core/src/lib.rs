//! Domain types and pure task logic for taskflow.
//!
//! Nothing in this crate performs I/O: stores and services live in `taskflow-app`.

/// Category records and patches.
pub mod category;
/// Clock abstraction.
pub mod clock;
/// Filter & sort engine.
pub mod filter;
/// Edit history types.
pub mod history;
/// Identifier types.
pub mod id;
/// Task records.
pub mod task;

pub use category::{Category, CategoryPatch, NewCategory};
pub use clock::{Clock, FixedClock, SystemClock};
pub use filter::{
    DateBucket, DateWindow, FilterSpec, ParseDateBucketError, ParseViewError, View, apply, apply_at,
    compare_tasks, sort_tasks,
};
pub use history::{FieldChange, FieldValue, HistoryAction, HistoryEntry, TaskField};
pub use id::{CategoryId, ParseIdError, SequentialId, TaskId};
pub use task::{NewTask, ParsePriorityError, Priority, Task};
