//! Pagination and sorting query parameters.

use serde::Deserialize;

use comhub_core::result::AppResult;
use comhub_core::types::pagination::{DEFAULT_PAGE_SIZE, PageRequest};
use comhub_core::types::sorting::{SortDirection, SortField, SortSpec, SortWhitelist};

/// Query parameters shared by every list endpoint:
/// `page`, `page_size` and `sort=field:dir[,field:dir]`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    /// Page number (1-based, default: 1).
    pub page: Option<u64>,
    /// Items per page (default: 20, max: 100).
    pub page_size: Option<u64>,
    pub sort: Option<String>,
}

impl ListParams {
    /// Converts to a clamped `PageRequest`.
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(
            self.page.unwrap_or(1),
            self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }

    /// Parses `sort` against the resource's whitelist.
    pub fn sort_spec(
        &self,
        whitelist: SortWhitelist,
        default_column: &'static str,
        default_direction: SortDirection,
    ) -> AppResult<SortSpec> {
        SortSpec::parse(
            self.sort.as_deref(),
            whitelist,
            SortField {
                column: default_column,
                direction: default_direction,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITELIST: SortWhitelist = &[("title", "e.title"), ("starts_at", "e.starts_at")];

    #[test]
    fn test_defaults_and_clamping() {
        let params = ListParams::default();
        let page = params.page_request();
        assert_eq!((page.page, page.page_size), (1, 20));

        let params = ListParams {
            page: Some(0),
            page_size: Some(1000),
            sort: None,
        };
        let page = params.page_request();
        assert_eq!((page.page, page.page_size), (1, 100));
    }

    #[test]
    fn test_sort_tokens() {
        let params = ListParams {
            sort: Some("starts_at:desc,title".into()),
            ..Default::default()
        };
        let spec = params
            .sort_spec(WHITELIST, "e.starts_at", SortDirection::Asc)
            .unwrap();
        assert_eq!(spec.order_by("e.id"), " ORDER BY e.starts_at DESC, e.title ASC, e.id ASC");

        let params = ListParams {
            sort: Some("password:asc".into()),
            ..Default::default()
        };
        let err = params
            .sort_spec(WHITELIST, "e.starts_at", SortDirection::Asc)
            .unwrap_err();
        assert_eq!(err.code, "INVALID_SORT");
    }
}
