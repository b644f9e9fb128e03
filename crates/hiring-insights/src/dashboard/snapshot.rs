use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

use super::domain::{ApplicationRecord, JobId, JobPosting, TaggedApplication};
use super::repository::{ApplicationRepository, JobQuery, JobRepository, RepositoryError};

/// Point-in-time copy of jobs and their tagged applications used as the input
/// to one aggregation cycle.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub jobs: Vec<JobPosting>,
    pub applications: Vec<TaggedApplication>,
    pub warnings: Vec<FetchWarning>,
    pub fetched_at: DateTime<Utc>,
}

impl DashboardSnapshot {
    pub fn new(
        jobs: Vec<JobPosting>,
        applications: Vec<ApplicationRecord>,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        let applications = applications
            .into_iter()
            .filter_map(|record| {
                jobs.iter()
                    .find(|job| job.id == record.job_id)
                    .map(|job| TaggedApplication::new(record, job.context()))
            })
            .collect();

        Self {
            jobs,
            applications,
            warnings: Vec::new(),
            fetched_at,
        }
    }

    /// Replace a record with its collaborator-confirmed version. Returns false
    /// when the record is not part of this snapshot.
    pub fn replace_record(&mut self, record: ApplicationRecord) -> bool {
        match self
            .applications
            .iter_mut()
            .find(|item| item.record.id == record.id)
        {
            Some(item) => {
                item.record = record;
                true
            }
            None => false,
        }
    }
}

/// Non-fatal record of a per-job application fetch that failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchWarning {
    pub job_id: JobId,
    pub job_title: String,
    pub message: String,
}

/// Fetches jobs, then fans out one application fetch per job and joins them.
pub struct SnapshotLoader<J, A> {
    jobs: Arc<J>,
    applications: Arc<A>,
}

impl<J, A> Clone for SnapshotLoader<J, A> {
    fn clone(&self) -> Self {
        Self {
            jobs: Arc::clone(&self.jobs),
            applications: Arc::clone(&self.applications),
        }
    }
}

impl<J, A> SnapshotLoader<J, A>
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    pub fn new(jobs: Arc<J>, applications: Arc<A>) -> Self {
        Self { jobs, applications }
    }

    /// Job list failures propagate; per-job application failures become
    /// warnings and contribute no applications.
    pub async fn load(
        &self,
        query: &JobQuery,
        now: DateTime<Utc>,
    ) -> Result<DashboardSnapshot, RepositoryError> {
        let jobs = self.jobs.list_mine(query).await?;

        let fetches = jobs
            .iter()
            .map(|job| self.applications.list_for_job(&job.id));
        let results = join_all(fetches).await;

        let mut applications = Vec::new();
        let mut warnings = Vec::new();
        for (job, result) in jobs.iter().zip(results) {
            match result {
                Ok(records) => {
                    let context = job.context();
                    applications.extend(
                        records
                            .into_iter()
                            .filter(|record| record.job_id == job.id)
                            .map(|record| TaggedApplication::new(record, context.clone())),
                    );
                }
                Err(err) => {
                    warn!(
                        job_id = %job.id,
                        error = %err,
                        "application fetch failed; job contributes no applications"
                    );
                    warnings.push(FetchWarning {
                        job_id: job.id.clone(),
                        job_title: job.title.clone(),
                        message: err.to_string(),
                    });
                }
            }
        }

        debug!(
            jobs = jobs.len(),
            applications = applications.len(),
            warnings = warnings.len(),
            "dashboard snapshot loaded"
        );

        Ok(DashboardSnapshot {
            jobs,
            applications,
            warnings,
            fetched_at: now,
        })
    }
}
