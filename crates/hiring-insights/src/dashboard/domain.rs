use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for employer job postings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Publication lifecycle of a job posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Draft,
    Published,
    Paused,
    Closed,
    Expired,
}

impl JobStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Paused => "paused",
            Self::Closed => "closed",
            Self::Expired => "expired",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Published => "Published",
            Self::Paused => "Paused",
            Self::Closed => "Closed",
            Self::Expired => "Expired",
        }
    }
}

impl FromStr for JobStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "paused" => Ok(Self::Paused),
            "closed" => Ok(Self::Closed),
            "expired" => Ok(Self::Expired),
            _ => Err(ValidationError::UnknownJobStatus(value.to_string())),
        }
    }
}

/// Review pipeline status of a single application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Reviewed,
    Shortlisted,
    Interviewed,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    /// Statuses in pipeline order, with rejection last.
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Pending,
            Self::Reviewed,
            Self::Shortlisted,
            Self::Interviewed,
            Self::Accepted,
            Self::Rejected,
        ]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewed => "reviewed",
            Self::Shortlisted => "shortlisted",
            Self::Interviewed => "interviewed",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Reviewed => "Reviewed",
            Self::Shortlisted => "Shortlisted",
            Self::Interviewed => "Interviewed",
            Self::Accepted => "Accepted",
            Self::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "reviewed" => Ok(Self::Reviewed),
            "shortlisted" => Ok(Self::Shortlisted),
            "interviewed" => Ok(Self::Interviewed),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ValidationError::UnknownApplicationStatus(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobLocation {
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRange {
    #[serde(default)]
    pub min: Option<u32>,
    #[serde(default)]
    pub max: Option<u32>,
    pub currency: String,
    #[serde(default)]
    pub is_public: bool,
}

/// Employer-owned job posting as returned by the job collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: JobId,
    pub title: String,
    pub status: JobStatus,
    pub category: String,
    pub employment_type: String,
    pub level: String,
    pub location: JobLocation,
    pub salary: SalaryRange,
    pub capacity: u32,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    pub view_count: u64,
    pub application_count: u64,
    pub save_count: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl JobPosting {
    pub fn context(&self) -> JobContext {
        JobContext {
            title: self.title.clone(),
            employment_type: self.employment_type.clone(),
            category: self.category.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationNote {
    pub author: String,
    pub text: String,
    pub added_at: DateTime<Utc>,
}

/// Application submitted against one of the employer's job postings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub applicant: Applicant,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub interview_scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cover_letter: Option<String>,
    #[serde(default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub notes: Vec<ApplicationNote>,
}

/// Job fields denormalized onto each application for display and search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobContext {
    pub title: String,
    pub employment_type: String,
    pub category: String,
}

/// Application tagged with the posting it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedApplication {
    #[serde(flatten)]
    pub record: ApplicationRecord,
    pub job: JobContext,
}

impl TaggedApplication {
    pub fn new(record: ApplicationRecord, job: JobContext) -> Self {
        Self { record, job }
    }

    pub fn id(&self) -> &ApplicationId {
        &self.record.id
    }

    pub fn status(&self) -> ApplicationStatus {
        self.record.status
    }
}

/// Job posting as delivered by the collaborator, before status validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawJobPosting {
    pub id: String,
    pub title: String,
    pub status: String,
    pub category: String,
    pub employment_type: String,
    pub level: String,
    pub location: JobLocation,
    pub salary: SalaryRange,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub application_count: u64,
    #[serde(default)]
    pub save_count: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl TryFrom<RawJobPosting> for JobPosting {
    type Error = ValidationError;

    fn try_from(raw: RawJobPosting) -> Result<Self, Self::Error> {
        Ok(Self {
            status: raw.status.parse()?,
            id: JobId(raw.id),
            title: raw.title,
            category: raw.category,
            employment_type: raw.employment_type,
            level: raw.level,
            location: raw.location,
            salary: raw.salary,
            capacity: raw.capacity,
            deadline: raw.deadline,
            view_count: raw.view_count,
            application_count: raw.application_count,
            save_count: raw.save_count,
            created_at: raw.created_at,
            published_at: raw.published_at,
        })
    }
}

/// Application as delivered by the collaborator, before status validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawApplicationRecord {
    pub id: String,
    pub job_id: String,
    pub applicant: Applicant,
    pub status: String,
    pub applied_at: DateTime<Utc>,
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub interview_scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cover_letter: Option<String>,
    #[serde(default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub notes: Vec<ApplicationNote>,
}

impl TryFrom<RawApplicationRecord> for ApplicationRecord {
    type Error = ValidationError;

    fn try_from(raw: RawApplicationRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            status: raw.status.parse()?,
            id: ApplicationId(raw.id),
            job_id: JobId(raw.job_id),
            applicant: raw.applicant,
            applied_at: raw.applied_at,
            reviewed_at: raw.reviewed_at,
            interview_scheduled_at: raw.interview_scheduled_at,
            cover_letter: raw.cover_letter,
            resume_url: raw.resume_url,
            notes: raw.notes,
        })
    }
}

/// Input rejected before any collaborator call is issued.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("unknown job status '{0}'")]
    UnknownJobStatus(String),
    #[error("unknown application status '{0}'")]
    UnknownApplicationStatus(String),
    #[error("unsupported date range of {0} days (expected 7, 30, 90 or 365)")]
    UnsupportedDateRange(u32),
    #[error("unknown {field} '{value}'")]
    UnknownOption { field: &'static str, value: String },
    #[error("bulk actions require at least one selected application")]
    EmptySelection,
    #[error("application {0} is not in the current list")]
    NotVisible(ApplicationId),
}
