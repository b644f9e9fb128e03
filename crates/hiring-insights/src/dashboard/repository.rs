use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::domain::{
    ApplicationId, ApplicationRecord, ApplicationStatus, JobId, JobPosting, JobStatus,
};

/// Optional narrowing applied when listing the employer's own postings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
}

/// Source of the employer's job postings.
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn list_mine(&self, query: &JobQuery) -> Result<Vec<JobPosting>, RepositoryError>;
}

/// Source and mutation boundary for applications.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    async fn list_for_job(&self, job_id: &JobId) -> Result<Vec<ApplicationRecord>, RepositoryError>;

    async fn update_status(
        &self,
        application_id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<ApplicationRecord, RepositoryError>;

    async fn add_note(&self, application_id: &ApplicationId, text: &str)
        -> Result<(), RepositoryError>;
}

/// Error enumeration for collaborator failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
