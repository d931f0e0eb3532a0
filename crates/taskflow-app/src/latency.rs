//! Simulated per-operation latency.

use std::fmt;
use std::time::Duration;

/// Store operation kinds that carry a simulated delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Listing every record.
    GetAll,
    /// Loading one record.
    GetById,
    /// Creating a record.
    Create,
    /// Patching a record.
    Update,
    /// Deleting a record.
    Delete,
    /// Derived queries (by category, status, priority, date range).
    Query,
    /// Reassigning manual order.
    Reorder,
    /// Overwriting a category's task count.
    UpdateTaskCount,
}

impl Operation {
    /// Every operation kind.
    pub const ALL: [Self; 8] = [
        Self::GetAll,
        Self::GetById,
        Self::Create,
        Self::Update,
        Self::Delete,
        Self::Query,
        Self::Reorder,
        Self::UpdateTaskCount,
    ];

    /// Reference delay in milliseconds.
    #[must_use]
    pub const fn reference_millis(self) -> u64 {
        match self {
            Self::GetAll | Self::Update | Self::Query | Self::Reorder => 300,
            Self::GetById | Self::UpdateTaskCount => 200,
            Self::Create => 400,
            Self::Delete => 250,
        }
    }

    /// Configuration key for this operation.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::GetAll => "get_all",
            Self::GetById => "get_by_id",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Query => "query",
            Self::Reorder => "reorder",
            Self::UpdateTaskCount => "update_task_count",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Delay applied before each operation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatencyProfile {
    delays: [Duration; Operation::ALL.len()],
}

impl LatencyProfile {
    /// Reference delays (200-400 ms).
    #[must_use]
    pub fn reference() -> Self {
        Self {
            delays: Operation::ALL.map(|op| Duration::from_millis(op.reference_millis())),
        }
    }

    /// No delay at all.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            delays: [Duration::ZERO; Operation::ALL.len()],
        }
    }

    /// Delay configured for `op`.
    #[must_use]
    pub const fn get(&self, op: Operation) -> Duration {
        self.delays[op as usize]
    }

    /// Replace the delay for `op`.
    #[must_use]
    pub const fn with(mut self, op: Operation, delay: Duration) -> Self {
        self.delays[op as usize] = delay;
        self
    }

    /// Whether every delay is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.delays.iter().all(Duration::is_zero)
    }
}

impl Default for LatencyProfile {
    fn default() -> Self {
        Self::reference()
    }
}
