//! Typed filter helpers shared by list queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::result::AppResult;

/// A free-text search term, normalised for SQL `ILIKE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSearch(String);

impl TextSearch {
    /// Build from an optional query parameter. Blank input yields `None`.
    pub fn from_param(raw: Option<&str>) -> Option<Self> {
        let term = raw?.trim();
        if term.is_empty() {
            None
        } else {
            Some(Self(term.to_string()))
        }
    }

    /// `%term%` pattern with `LIKE` metacharacters escaped.
    pub fn pattern(&self) -> String {
        let mut escaped = String::with_capacity(self.0.len() + 2);
        escaped.push('%');
        for c in self.0.chars() {
            if matches!(c, '%' | '_' | '\\') {
                escaped.push('\\');
            }
            escaped.push(c);
        }
        escaped.push('%');
        escaped
    }
}

/// Inclusive time window filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Lower bound.
    pub from: Option<DateTime<Utc>>,
    /// Upper bound.
    pub to: Option<DateTime<Utc>>,
}

impl TimeRange {
    /// Validate that the bounds are ordered.
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> AppResult<Self> {
        if let (Some(f), Some(t)) = (from, to) {
            if f > t {
                return Err(AppError::bad_request("'from' must not be after 'to'")
                    .with_code("INVALID_FILTER"));
            }
        }
        Ok(Self { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_search_pattern_escapes() {
        let search = TextSearch::from_param(Some(" 50%_off ")).unwrap();
        assert_eq!(search.pattern(), "%50\\%\\_off%");
        assert!(TextSearch::from_param(Some("   ")).is_none());
        assert!(TextSearch::from_param(None).is_none());
    }

    #[test]
    fn test_time_range_order() {
        let now = Utc::now();
        assert!(TimeRange::new(Some(now), Some(now + Duration::hours(1))).is_ok());
        assert!(TimeRange::new(Some(now), Some(now - Duration::hours(1))).is_err());
        assert!(TimeRange::new(None, Some(now)).is_ok());
    }
}
