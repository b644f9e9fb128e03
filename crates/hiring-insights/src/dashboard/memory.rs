use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::domain::{ApplicationId, ApplicationRecord, ApplicationStatus, JobId, JobPosting};
use super::repository::{ApplicationRepository, JobQuery, JobRepository, RepositoryError};

/// Job store backed by a shared vector.
#[derive(Default, Clone)]
pub struct InMemoryJobRepository {
    jobs: Arc<Mutex<Vec<JobPosting>>>,
}

impl InMemoryJobRepository {
    pub fn new(jobs: Vec<JobPosting>) -> Self {
        Self {
            jobs: Arc::new(Mutex::new(jobs)),
        }
    }

    pub fn jobs(&self) -> Vec<JobPosting> {
        lock(&self.jobs).clone()
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn list_mine(&self, query: &JobQuery) -> Result<Vec<JobPosting>, RepositoryError> {
        Ok(lock(&self.jobs)
            .iter()
            .filter(|job| query.status.map_or(true, |status| job.status == status))
            .cloned()
            .collect())
    }
}

/// Application store keyed by id. Jobs or applications registered as failing
/// answer with [`RepositoryError::Unavailable`], which lets demos and tests
/// exercise partial-failure paths.
#[derive(Default, Clone)]
pub struct InMemoryApplicationRepository {
    records: Arc<Mutex<BTreeMap<ApplicationId, ApplicationRecord>>>,
    failing_jobs: Arc<Mutex<HashSet<JobId>>>,
    failing_applications: Arc<Mutex<HashSet<ApplicationId>>>,
}

impl InMemoryApplicationRepository {
    pub fn new(records: Vec<ApplicationRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();
        Self {
            records: Arc::new(Mutex::new(records)),
            ..Self::default()
        }
    }

    pub fn fail_job(&self, job_id: JobId) {
        lock(&self.failing_jobs).insert(job_id);
    }

    pub fn fail_application(&self, application_id: ApplicationId) {
        lock(&self.failing_applications).insert(application_id);
    }

    pub fn get(&self, application_id: &ApplicationId) -> Option<ApplicationRecord> {
        lock(&self.records).get(application_id).cloned()
    }

    fn ensure_writable(&self, application_id: &ApplicationId) -> Result<(), RepositoryError> {
        if lock(&self.failing_applications).contains(application_id) {
            return Err(RepositoryError::Unavailable(format!(
                "application {application_id} could not be written"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryApplicationRepository {
    async fn list_for_job(
        &self,
        job_id: &JobId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        if lock(&self.failing_jobs).contains(job_id) {
            return Err(RepositoryError::Unavailable(format!(
                "applications for job {job_id} could not be fetched"
            )));
        }
        Ok(lock(&self.records)
            .values()
            .filter(|record| &record.job_id == job_id)
            .cloned()
            .collect())
    }

    async fn update_status(
        &self,
        application_id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<ApplicationRecord, RepositoryError> {
        self.ensure_writable(application_id)?;
        let mut guard = lock(&self.records);
        let record = guard
            .get_mut(application_id)
            .ok_or(RepositoryError::NotFound)?;
        record.status = status;
        Ok(record.clone())
    }

    async fn add_note(
        &self,
        application_id: &ApplicationId,
        _text: &str,
    ) -> Result<(), RepositoryError> {
        self.ensure_writable(application_id)?;
        if lock(&self.records).contains_key(application_id) {
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
