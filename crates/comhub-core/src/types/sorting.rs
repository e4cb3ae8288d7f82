//! Sorting types for list endpoints.
//!
//! Clients send `sort=field:dir[,field:dir...]`. Each resource declares a
//! whitelist mapping public field names onto SQL columns, so the parsed
//! [`SortSpec`] only ever contains trusted column names.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::result::AppResult;

/// Maximum number of sort tokens accepted in one request.
const MAX_SORT_FIELDS: usize = 4;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl SortDirection {
    /// Return the SQL keyword for this direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A sort specification consisting of a column and direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    /// Whitelisted SQL column.
    pub column: &'static str,
    /// Sort direction.
    pub direction: SortDirection,
}

/// Whitelist of sortable fields for one resource: `(public name, SQL column)`.
pub type SortWhitelist = &'static [(&'static str, &'static str)];

/// Parsed, validated ordering for a list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    fields: Vec<SortField>,
}

impl SortSpec {
    /// Parse a raw `sort` parameter against a whitelist.
    ///
    /// An absent or blank parameter yields `default`. A missing direction
    /// means ascending.
    pub fn parse(
        raw: Option<&str>,
        whitelist: SortWhitelist,
        default: SortField,
    ) -> AppResult<Self> {
        let raw = match raw.map(str::trim) {
            Some(raw) if !raw.is_empty() => raw,
            _ => {
                return Ok(Self {
                    fields: vec![default],
                });
            }
        };

        let mut fields: Vec<SortField> = Vec::new();
        for token in raw.split(',') {
            let token = token.trim();
            let (name, dir) = match token.split_once(':') {
                Some((name, dir)) => (name.trim(), Some(dir.trim())),
                None => (token, None),
            };

            let column = whitelist
                .iter()
                .find(|(public, _)| *public == name)
                .map(|(_, column)| *column)
                .ok_or_else(|| {
                    let allowed: Vec<&str> = whitelist.iter().map(|(p, _)| *p).collect();
                    AppError::bad_request(format!(
                        "Cannot sort by '{name}'. Allowed fields: {}",
                        allowed.join(", ")
                    ))
                    .with_code("INVALID_SORT")
                })?;

            let direction = match dir.map(str::to_ascii_lowercase).as_deref() {
                None | Some("asc") => SortDirection::Asc,
                Some("desc") => SortDirection::Desc,
                Some(other) => {
                    return Err(AppError::bad_request(format!(
                        "Invalid sort direction '{other}', expected 'asc' or 'desc'"
                    ))
                    .with_code("INVALID_SORT"));
                }
            };

            if fields.iter().any(|f| f.column == column) {
                return Err(
                    AppError::bad_request(format!("Field '{name}' sorted more than once"))
                        .with_code("INVALID_SORT"),
                );
            }
            fields.push(SortField { column, direction });
        }

        if fields.len() > MAX_SORT_FIELDS {
            return Err(AppError::bad_request(format!(
                "At most {MAX_SORT_FIELDS} sort fields are allowed"
            ))
            .with_code("INVALID_SORT"));
        }

        Ok(Self { fields })
    }

    /// The parsed fields, in priority order.
    pub fn fields(&self) -> &[SortField] {
        &self.fields
    }

    /// Render as an `ORDER BY` clause, with `tiebreak` appended for stable paging.
    pub fn order_by(&self, tiebreak: &str) -> String {
        let mut parts: Vec<String> = self
            .fields
            .iter()
            .map(|f| format!("{} {}", f.column, f.direction.as_sql()))
            .collect();
        if !self.fields.iter().any(|f| f.column == tiebreak) {
            parts.push(format!("{tiebreak} ASC"));
        }
        format!(" ORDER BY {}", parts.join(", "))
    }
}

impl SortField {
    /// Ascending sort on a column.
    pub fn asc(column: &'static str) -> Self {
        Self {
            column,
            direction: SortDirection::Asc,
        }
    }

    /// Descending sort on a column.
    pub fn desc(column: &'static str) -> Self {
        Self {
            column,
            direction: SortDirection::Desc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const FIELDS: SortWhitelist = &[("title", "e.title"), ("starts_at", "e.starts_at")];

    #[test]
    fn test_default_when_absent() {
        let spec = SortSpec::parse(None, FIELDS, SortField::desc("e.starts_at")).unwrap();
        assert_eq!(spec.order_by("e.id"), " ORDER BY e.starts_at DESC, e.id ASC");

        let spec = SortSpec::parse(Some("  "), FIELDS, SortField::asc("e.title")).unwrap();
        assert_eq!(spec.fields(), &[SortField::asc("e.title")]);
    }

    #[test]
    fn test_multiple_tokens() {
        let spec = SortSpec::parse(
            Some("starts_at:desc, title"),
            FIELDS,
            SortField::asc("e.title"),
        )
        .unwrap();
        assert_eq!(
            spec.fields(),
            &[SortField::desc("e.starts_at"), SortField::asc("e.title")]
        );
    }

    #[test]
    fn test_direction_is_case_insensitive() {
        let spec = SortSpec::parse(Some("title:DESC"), FIELDS, SortField::asc("e.id")).unwrap();
        assert_eq!(spec.fields()[0].direction, SortDirection::Desc);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = SortSpec::parse(Some("password_hash:asc"), FIELDS, SortField::asc("e.id"))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::BadRequest);
        assert_eq!(err.code, "INVALID_SORT");
    }

    #[test]
    fn test_bad_direction_rejected() {
        assert!(SortSpec::parse(Some("title:up"), FIELDS, SortField::asc("e.id")).is_err());
    }

    #[test]
    fn test_duplicate_field_rejected() {
        assert!(
            SortSpec::parse(Some("title:asc,title:desc"), FIELDS, SortField::asc("e.id")).is_err()
        );
    }
}
