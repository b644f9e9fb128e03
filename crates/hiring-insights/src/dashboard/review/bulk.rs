use futures::future::join_all;
use serde::Serialize;

use super::super::domain::{ApplicationId, ApplicationRecord, ApplicationStatus, ValidationError};
use super::super::repository::ApplicationRepository;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkFailure {
    pub application_id: ApplicationId,
    pub message: String,
}

/// Per-id results of one bulk status update.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkOutcome {
    pub status: ApplicationStatus,
    pub updated: Vec<ApplicationRecord>,
    pub failures: Vec<BulkFailure>,
}

impl BulkOutcome {
    pub fn report(&self) -> BulkReport {
        BulkReport {
            status: self.status,
            succeeded: self.updated.len(),
            failed: self.failures.len(),
            failures: self.failures.clone(),
        }
    }
}

/// Summary surfaced to the caller; partial success is expected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkReport {
    pub status: ApplicationStatus,
    pub succeeded: usize,
    pub failed: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<BulkFailure>,
}

/// Submit one status update per id, all before awaiting any, then collect
/// every outcome. Nothing is retried.
pub async fn dispatch_status_updates<A>(
    repository: &A,
    ids: &[ApplicationId],
    status: ApplicationStatus,
) -> Result<BulkOutcome, ValidationError>
where
    A: ApplicationRepository + ?Sized,
{
    if ids.is_empty() {
        return Err(ValidationError::EmptySelection);
    }

    let requests: Vec<_> = ids
        .iter()
        .map(|id| repository.update_status(id, status))
        .collect();
    let results = join_all(requests).await;

    let mut updated = Vec::new();
    let mut failures = Vec::new();
    for (id, result) in ids.iter().zip(results) {
        match result {
            Ok(record) => updated.push(record),
            Err(err) => failures.push(BulkFailure {
                application_id: id.clone(),
                message: err.to_string(),
            }),
        }
    }

    Ok(BulkOutcome {
        status,
        updated,
        failures,
    })
}
