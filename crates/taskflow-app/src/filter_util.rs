use taskflow_core::{
    CategoryId, DateBucket, FilterSpec, ParseDateBucketError, ParseIdError, ParsePriorityError,
    ParseViewError, Priority, View,
};
use thiserror::Error;
use time::{Date, OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339, macros::format_description};

/// Error type returned while constructing filters from user-facing inputs.
#[derive(Debug, Error)]
pub enum FilterBuildError {
    /// Unknown view token.
    #[error(transparent)]
    InvalidView(#[from] ParseViewError),
    /// Category token is not a positive integer.
    #[error("invalid category {token}: {source}")]
    InvalidCategory {
        /// Offending input.
        token: String,
        /// Parse failure.
        #[source]
        source: ParseIdError,
    },
    /// Unknown priority token.
    #[error(transparent)]
    InvalidPriority(#[from] ParsePriorityError),
    /// Unknown date bucket token.
    #[error(transparent)]
    InvalidDateFilter(#[from] ParseDateBucketError),
    /// Unknown preset name.
    #[error("invalid preset: {token} (expected home, all, today or week)")]
    InvalidPreset {
        /// Offending input.
        token: String,
    },
    /// Date is neither RFC 3339 nor `YYYY-MM-DD`.
    #[error("invalid date {token}: expected RFC 3339 or YYYY-MM-DD")]
    InvalidDate {
        /// Offending input.
        token: String,
    },
}

/// Result alias for filter construction helpers.
pub type FilterBuildResult<T> = Result<T, FilterBuildError>;

/// Builder that accepts user-facing strings and normalizes them into a [`FilterSpec`].
///
/// A preset, when given, is the starting point; explicit tokens are layered on top.
#[derive(Debug, Clone, Default)]
pub struct TaskFilterBuilder {
    preset: Option<FilterSpec>,
    view: Option<View>,
    categories: Vec<CategoryId>,
    priorities: Vec<Priority>,
    date_filters: Vec<DateBucket>,
}

impl TaskFilterBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a named preset (`home`, `all`, `today`, `week`).
    ///
    /// # Errors
    /// Returns an error for an unknown preset name.
    pub fn with_preset(mut self, preset: Option<&str>) -> FilterBuildResult<Self> {
        self.preset = preset.map(parse_preset).transpose()?;
        Ok(self)
    }

    /// Set the view token (`all`, `active`, `completed`).
    ///
    /// # Errors
    /// Returns an error for an unknown view.
    pub fn with_view(mut self, view: Option<&str>) -> FilterBuildResult<Self> {
        self.view = view.map(str::parse).transpose()?;
        Ok(self)
    }

    /// Extend the category filter with id tokens.
    ///
    /// # Errors
    /// Returns an error if any token is not a valid id.
    pub fn with_categories(mut self, tokens: &[String]) -> FilterBuildResult<Self> {
        for token in tokens {
            let id = token.parse().map_err(|source| FilterBuildError::InvalidCategory {
                token: token.clone(),
                source,
            })?;
            self.categories.push(id);
        }
        Ok(self)
    }

    /// Extend the priority filter.
    ///
    /// # Errors
    /// Returns an error for an unknown priority.
    pub fn with_priorities(mut self, tokens: &[String]) -> FilterBuildResult<Self> {
        for token in tokens {
            self.priorities.push(token.parse()?);
        }
        Ok(self)
    }

    /// Extend the date bucket filter.
    ///
    /// # Errors
    /// Returns an error for an unknown bucket.
    pub fn with_date_filters(mut self, tokens: &[String]) -> FilterBuildResult<Self> {
        for token in tokens {
            self.date_filters.push(token.parse()?);
        }
        Ok(self)
    }

    /// Build the final [`FilterSpec`].
    #[must_use]
    pub fn build(self) -> FilterSpec {
        let mut spec = self.preset.unwrap_or_default();
        if let Some(view) = self.view {
            spec = spec.with_view(view);
        }
        spec.with_categories(self.categories)
            .with_priorities(self.priorities)
            .with_date_filters(self.date_filters)
    }
}

fn parse_preset(token: &str) -> FilterBuildResult<FilterSpec> {
    let normalized = token.trim().to_ascii_lowercase().replace(['-', '_', ' '], "");
    match normalized.as_str() {
        "home" => Ok(FilterSpec::home()),
        "all" => Ok(FilterSpec::all()),
        "today" => Ok(FilterSpec::today()),
        "week" | "thisweek" => Ok(FilterSpec::this_week()),
        _ => Err(FilterBuildError::InvalidPreset {
            token: token.to_owned(),
        }),
    }
}

/// Parse an RFC 3339 timestamp, or a `YYYY-MM-DD` date taken as the start of
/// that day at `offset`.
///
/// # Errors
/// Returns [`FilterBuildError::InvalidDate`] when neither form matches.
pub fn parse_date_input(raw: &str, offset: UtcOffset) -> FilterBuildResult<OffsetDateTime> {
    let trimmed = raw.trim();
    if let Ok(timestamp) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Ok(timestamp);
    }
    Date::parse(trimmed, format_description!("[year]-[month]-[day]"))
        .map(|day| day.midnight().assume_offset(offset))
        .map_err(|_| FilterBuildError::InvalidDate {
            token: raw.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{datetime, offset};

    fn tokens(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_owned()).collect()
    }

    #[test]
    fn builder_parses_tokens() -> FilterBuildResult<()> {
        let spec = TaskFilterBuilder::new()
            .with_view(Some("active"))?
            .with_categories(&tokens(&["1", "#3"]))?
            .with_priorities(&tokens(&["high", "URGENT"]))?
            .with_date_filters(&tokens(&["this-week", "no_date"]))?
            .build();

        assert_eq!(spec.view, Some(View::Active));
        assert_eq!(spec.categories.len(), 2);
        assert!(spec.categories.contains(&CategoryId(3)));
        assert!(spec.priorities.contains(&Priority::Urgent));
        assert!(spec.date_filters.contains(&DateBucket::ThisWeek));
        assert!(spec.date_filters.contains(&DateBucket::NoDate));
        Ok(())
    }

    #[test]
    fn empty_builder_is_unconstrained() {
        assert!(TaskFilterBuilder::new().build().is_unconstrained());
    }

    #[test]
    fn preset_is_extended_by_explicit_tokens() -> FilterBuildResult<()> {
        let spec = TaskFilterBuilder::new()
            .with_preset(Some("today"))?
            .with_view(Some("completed"))?
            .with_date_filters(&tokens(&["overdue"]))?
            .build();
        assert_eq!(spec.view, Some(View::Completed));
        assert_eq!(spec.date_filters.len(), 2);

        let home = TaskFilterBuilder::new().with_preset(Some("home"))?.build();
        assert_eq!(home, FilterSpec::home());
        Ok(())
    }

    #[test]
    fn invalid_tokens_are_reported() {
        assert!(matches!(
            TaskFilterBuilder::new().with_view(Some("someday")),
            Err(FilterBuildError::InvalidView(_))
        ));
        assert!(matches!(
            TaskFilterBuilder::new().with_categories(&tokens(&["work"])),
            Err(FilterBuildError::InvalidCategory { .. })
        ));
        assert!(matches!(
            TaskFilterBuilder::new().with_priorities(&tokens(&["critical"])),
            Err(FilterBuildError::InvalidPriority(_))
        ));
        assert!(matches!(
            TaskFilterBuilder::new().with_date_filters(&tokens(&["yesterday"])),
            Err(FilterBuildError::InvalidDateFilter(_))
        ));
        assert!(matches!(
            TaskFilterBuilder::new().with_preset(Some("month")),
            Err(FilterBuildError::InvalidPreset { .. })
        ));
    }

    #[test]
    fn date_input_accepts_both_forms() -> FilterBuildResult<()> {
        assert_eq!(
            parse_date_input("2025-06-20T17:00:00Z", offset!(+9))?,
            datetime!(2025-06-20 17:00 UTC)
        );
        assert_eq!(
            parse_date_input(" 2025-06-20 ", offset!(+9))?,
            datetime!(2025-06-20 00:00 +9)
        );
        assert!(matches!(
            parse_date_input("20/06/2025", offset!(UTC)),
            Err(FilterBuildError::InvalidDate { .. })
        ));
        Ok(())
    }
}
