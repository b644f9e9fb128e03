use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::super::domain::{ApplicationStatus, JobId, TaggedApplication, ValidationError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobScope {
    #[default]
    All,
    Job(JobId),
}

impl FromStr for JobScope {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "" | "all" => Ok(Self::All),
            id => Ok(Self::Job(JobId(id.to_string()))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusScope {
    #[default]
    All,
    Only(ApplicationStatus),
}

impl FromStr for StatusScope {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "" | "all" => Ok(Self::All),
            status => Ok(Self::Only(status.parse()?)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppliedWithin {
    #[default]
    All,
    Today,
    Week,
    Month,
}

impl AppliedWithin {
    /// Earliest accepted `applied_at`, if the window constrains anything.
    pub fn earliest(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::All => None,
            Self::Today => now
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .map(|midnight| midnight.and_utc()),
            Self::Week => Some(now - Duration::days(7)),
            Self::Month => Some(now - Duration::days(30)),
        }
    }
}

impl FromStr for AppliedWithin {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "today" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            other => Err(ValidationError::UnknownOption {
                field: "date range",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationSort {
    #[default]
    Newest,
    Oldest,
    Name,
    Status,
}

impl FromStr for ApplicationSort {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "newest" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            "name" => Ok(Self::Name),
            "status" => Ok(Self::Status),
            other => Err(ValidationError::UnknownOption {
                field: "sort",
                value: other.to_string(),
            }),
        }
    }
}

/// Filter descriptor for the application review list. Values are replaced,
/// never mutated in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationFilter {
    pub job: JobScope,
    pub status: StatusScope,
    pub search: String,
    pub applied_within: AppliedWithin,
    pub sort: ApplicationSort,
}

/// Partial update to an [`ApplicationFilter`]; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FilterPatch {
    #[serde(default)]
    pub job: Option<JobScope>,
    #[serde(default)]
    pub status: Option<StatusScope>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub applied_within: Option<AppliedWithin>,
    #[serde(default)]
    pub sort: Option<ApplicationSort>,
}

impl FilterPatch {
    pub fn is_empty(&self) -> bool {
        self.job.is_none()
            && self.status.is_none()
            && self.search.is_none()
            && self.applied_within.is_none()
            && self.sort.is_none()
    }
}

impl ApplicationFilter {
    pub fn patched(&self, patch: FilterPatch) -> Self {
        Self {
            job: patch.job.unwrap_or_else(|| self.job.clone()),
            status: patch.status.unwrap_or(self.status),
            search: patch.search.unwrap_or_else(|| self.search.clone()),
            applied_within: patch.applied_within.unwrap_or(self.applied_within),
            sort: patch.sort.unwrap_or(self.sort),
        }
    }

    pub fn matches(&self, item: &TaggedApplication, now: DateTime<Utc>) -> bool {
        let record = &item.record;

        if let JobScope::Job(job_id) = &self.job {
            if &record.job_id != job_id {
                return false;
            }
        }

        if let StatusScope::Only(status) = self.status {
            if record.status != status {
                return false;
            }
        }

        let needle = self.search.trim().to_lowercase();
        if !needle.is_empty() {
            let haystacks = [
                record.applicant.name.as_deref().unwrap_or(""),
                record.applicant.email.as_str(),
                item.job.title.as_str(),
            ];
            if !haystacks
                .iter()
                .any(|value| value.to_lowercase().contains(&needle))
            {
                return false;
            }
        }

        match self.applied_within.earliest(now) {
            Some(earliest) => record.applied_at >= earliest,
            None => true,
        }
    }

    /// Filter then sort; ties fall back to ascending application id.
    pub fn apply<'a>(
        &self,
        items: &'a [TaggedApplication],
        now: DateTime<Utc>,
    ) -> Vec<&'a TaggedApplication> {
        let mut visible: Vec<&TaggedApplication> = items
            .iter()
            .filter(|item| self.matches(item, now))
            .collect();
        visible.sort_by(|left, right| {
            compare(self.sort, left, right).then_with(|| left.id().cmp(right.id()))
        });
        visible
    }
}

fn compare(sort: ApplicationSort, left: &TaggedApplication, right: &TaggedApplication) -> Ordering {
    match sort {
        ApplicationSort::Newest => right.record.applied_at.cmp(&left.record.applied_at),
        ApplicationSort::Oldest => left.record.applied_at.cmp(&right.record.applied_at),
        ApplicationSort::Name => display_name(left).cmp(&display_name(right)),
        ApplicationSort::Status => left.status().as_str().cmp(right.status().as_str()),
    }
}

fn display_name(item: &TaggedApplication) -> String {
    item.record
        .applicant
        .name
        .as_deref()
        .unwrap_or("")
        .to_lowercase()
}
