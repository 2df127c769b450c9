//! Resource descriptor trait definition.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::cloud::errors::CloudError;
use crate::cloud::types::Owner;
use crate::errors::ReaperError;
use crate::filter::criteria::FilterCriteria;
use crate::filter::predicates::PredicateSet;

use super::types::{ResourceKind, ResourceRecord};

/// Per-type behavior: how to list, filter, delete and find the owner of a
/// resource. Each supported kind implements this once.
pub trait ResourceDescriptor {
    fn kind(&self) -> ResourceKind;

    /// One inventory call. Errors are not retried.
    fn list(&self) -> Result<Vec<ResourceRecord>, CloudError>;

    fn delete(&self, id: &str) -> Result<(), CloudError>;

    /// The predicates this kind supports, in pipeline order.
    ///
    /// `age_threshold` is passed separately from the criteria so a sweep can
    /// run with a shorter grace period than the flag pass.
    fn predicates(
        &self,
        criteria: &FilterCriteria,
        age_threshold: Option<TimeDelta>,
        now: DateTime<Utc>,
    ) -> PredicateSet;

    /// Whether owners of this kind can be warned before deletion.
    fn supports_notification(&self) -> bool {
        false
    }

    /// Resolve who should hear about `record`. `Ok(None)` means nobody.
    fn recipient_for(&self, _record: &ResourceRecord) -> Result<Option<Owner>, CloudError> {
        Ok(None)
    }

    /// Delete every record in order. One failure never stops the rest.
    fn delete_all(&self, records: &[ResourceRecord]) -> DeleteReport {
        let mut report = DeleteReport::default();

        info!(
            event = "core.resource.delete_batch_started",
            kind = %self.kind(),
            count = records.len()
        );

        for record in records {
            match self.delete(&record.id) {
                Ok(()) => {
                    info!(
                        event = "core.resource.deleted",
                        kind = %self.kind(),
                        resource_id = %record.id,
                        name = %record.name
                    );
                    report.deleted.push(record.clone());
                }
                Err(e) => {
                    warn!(
                        event = "core.resource.delete_failed",
                        kind = %self.kind(),
                        resource_id = %record.id,
                        name = %record.name,
                        error = %e
                    );
                    report.failed.push(DeleteFailure {
                        id: record.id.clone(),
                        name: record.name.clone(),
                        error_code: e.error_code(),
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            event = "core.resource.delete_batch_completed",
            kind = %self.kind(),
            deleted = report.deleted.len(),
            failed = report.failed.len()
        );

        report
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteFailure {
    pub id: String,
    pub name: String,
    pub error_code: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DeleteReport {
    pub deleted: Vec<ResourceRecord>,
    pub failed: Vec<DeleteFailure>,
}

impl DeleteReport {
    pub fn is_partial_failure(&self) -> bool {
        !self.failed.is_empty()
    }
}
