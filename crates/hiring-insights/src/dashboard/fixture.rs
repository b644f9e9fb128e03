use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::domain::{
    ApplicationRecord, JobPosting, RawApplicationRecord, RawJobPosting, ValidationError,
};
use super::memory::{InMemoryApplicationRepository, InMemoryJobRepository};

/// JSON document of collaborator records used to seed in-memory repositories.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardFixture {
    #[serde(default)]
    pub jobs: Vec<RawJobPosting>,
    #[serde(default)]
    pub applications: Vec<RawApplicationRecord>,
}

impl DashboardFixture {
    pub fn from_json(raw: &str) -> Result<Self, FixtureError> {
        serde_json::from_str(raw).map_err(FixtureError::Parse)
    }

    /// Validate every record. The first unknown status aborts the load.
    pub fn into_records(self) -> Result<(Vec<JobPosting>, Vec<ApplicationRecord>), FixtureError> {
        let jobs = self
            .jobs
            .into_iter()
            .map(JobPosting::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let applications = self
            .applications
            .into_iter()
            .map(ApplicationRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((jobs, applications))
    }

    pub fn into_repositories(
        self,
    ) -> Result<(InMemoryJobRepository, InMemoryApplicationRepository), FixtureError> {
        let (jobs, applications) = self.into_records()?;
        Ok((
            InMemoryJobRepository::new(jobs),
            InMemoryApplicationRepository::new(applications),
        ))
    }
}

pub fn load_fixture(path: impl AsRef<Path>) -> Result<DashboardFixture, FixtureError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| FixtureError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    DashboardFixture::from_json(&raw)
}

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("failed to read fixture {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse fixture: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("invalid fixture record: {0}")]
    Validation(#[from] ValidationError),
}
