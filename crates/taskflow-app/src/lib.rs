//! Application layer for taskflow.
//!
//! This crate provides the repositories, edit-history recording, simulated
//! latency, configuration and the service façade used by the CLI.

/// Async repositories with simulated latency.
pub mod async_store;
/// Category repository.
pub mod category_repository;
/// Project configuration.
pub mod config;
/// Repository errors.
pub mod error;
/// Seed data.
pub mod fixtures;
/// User-facing filter construction.
pub mod filter_util;
/// Edit-history recorder.
pub mod history;
/// Weak-reference integrity checks.
pub mod integrity;
/// Latency profiles.
pub mod latency;
/// Quick-add parsing.
pub mod quick_add;
/// Service façade.
pub mod service;
/// Completion statistics.
pub mod stats;
/// Storage abstraction.
pub mod store;
/// Partial task updates.
pub mod task_patch;
/// Task repository.
pub mod task_repository;

// Re-exports for convenience
pub use async_store::{AsyncCategoryRepository, AsyncTaskRepository};
pub use category_repository::CategoryRepository;
pub use config::{FixturesConfig, LatencyConfig, ProjectConfig};
pub use error::{Result, StoreError};
pub use filter_util::{FilterBuildError, TaskFilterBuilder, parse_date_input};
pub use fixtures::Fixtures;
pub use history::{FieldEquality, HistoryRecorder, NormalizedTextEquality, StructuralEquality};
pub use integrity::{DanglingReference, IntegrityReport, StaleCount};
pub use latency::{LatencyProfile, Operation};
pub use quick_add::{QuickAdd, QuickAddError, QuickAddOverrides};
pub use service::{MemoryTaskFlow, TaskFlow};
pub use stats::{Progress, ProgressSummary};
pub use store::{MemoryStore, Record, RecordStore};
pub use task_patch::TaskPatch;
pub use task_repository::TaskRepository;
