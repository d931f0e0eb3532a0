use serde::{Deserialize, Serialize};
use std::{fmt, num::ParseIntError, str::FromStr};
use thiserror::Error;

/// Identifiers allocated as `max(existing) + 1`.
///
/// Allocation never reuses an identifier that is still present, but an id freed
/// by deleting the current maximum is handed out again.
pub trait SequentialId: Copy + Ord {
    /// Identifier handed out by an empty store.
    const FIRST: Self;

    /// The identifier following `self`, or `None` at the top of the range.
    fn successor(self) -> Option<Self>;

    /// Allocate the next identifier given every identifier currently in use.
    ///
    /// Returns `None` once the maximum identifier is taken.
    fn allocate<I>(existing: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        existing
            .into_iter()
            .max()
            .map_or(Some(Self::FIRST), Self::successor)
    }
}

/// Error returned when an identifier string is not a positive integer.
#[derive(Debug, Error)]
pub enum ParseIdError {
    /// The input was not an integer.
    #[error("invalid id '{input}': {source}")]
    NotANumber {
        /// Raw input.
        input: String,
        /// Underlying integer parse failure.
        #[source]
        source: ParseIntError,
    },
    /// Identifiers start at 1.
    #[error("invalid id '{0}': ids start at 1")]
    Zero(String),
}

fn parse_positive(s: &str) -> Result<u64, ParseIdError> {
    let trimmed = s.trim().trim_start_matches('#');
    let value = trimmed.parse::<u64>().map_err(|source| ParseIdError::NotANumber {
        input: s.to_owned(),
        source,
    })?;
    if value == 0 {
        return Err(ParseIdError::Zero(s.to_owned()));
    }
    Ok(value)
}

/// Identifier of a task.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl SequentialId for TaskId {
    const FIRST: Self = Self(1);

    fn successor(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TaskId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_positive(s).map(Self)
    }
}

/// Identifier of a category.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub u64);

impl SequentialId for CategoryId {
    const FIRST: Self = Self(1);

    fn successor(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for CategoryId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_positive(s).map(Self)
    }
}
