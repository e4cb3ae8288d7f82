//! Audit log queries.

use std::sync::Arc;

use comhub_core::result::AppResult;
use comhub_core::types::pagination::{PageRequest, PageResponse};
use comhub_core::types::sorting::SortDirection;
use comhub_database::repositories::audit::{AuditFilter, AuditLogRepository};
use comhub_entity::audit::AuditLogEntry;

use crate::context::RequestContext;

/// Read access to the audit trail.
#[derive(Debug, Clone)]
pub struct AuditService {
    audit: Arc<AuditLogRepository>,
}

impl AuditService {
    pub fn new(audit: Arc<AuditLogRepository>) -> Self {
        Self { audit }
    }

    /// Searches the audit log, newest first by default.
    pub async fn search(
        &self,
        ctx: &RequestContext,
        filter: &AuditFilter,
        direction: SortDirection,
        page: PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        ctx.require("audit:read")?;
        self.audit.search(filter, direction, page).await
    }
}
