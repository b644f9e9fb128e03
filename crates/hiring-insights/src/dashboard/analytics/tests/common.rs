use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use crate::dashboard::domain::{
    Applicant, ApplicationId, ApplicationRecord, ApplicationStatus, JobContext, JobId,
    JobLocation, JobPosting, JobStatus, SalaryRange, TaggedApplication,
};

pub(crate) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 15, 14, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(crate) fn today() -> NaiveDate {
    now().date_naive()
}

/// Timestamp `days` calendar days before today at `hour`:00 UTC.
pub(crate) fn days_ago(days: i64, hour: u32) -> DateTime<Utc> {
    let date = today() - Duration::days(days);
    date.and_hms_opt(hour, 0, 0)
        .expect("valid time")
        .and_utc()
}

pub(crate) fn job(
    id: &str,
    title: &str,
    status: JobStatus,
    view_count: u64,
    application_count: u64,
) -> JobPosting {
    JobPosting {
        id: JobId(id.to_string()),
        title: title.to_string(),
        status,
        category: "Hospitality".to_string(),
        employment_type: "full_time".to_string(),
        level: "junior".to_string(),
        location: JobLocation {
            city: "Da Nang".to_string(),
            district: Some("Hai Chau".to_string()),
        },
        salary: SalaryRange {
            min: Some(8_000_000),
            max: Some(12_000_000),
            currency: "VND".to_string(),
            is_public: true,
        },
        capacity: 2,
        deadline: None,
        view_count,
        application_count,
        save_count: 0,
        created_at: days_ago(60, 9),
        published_at: Some(days_ago(59, 9)),
    }
}

pub(crate) fn record_at(
    job_id: &str,
    application_id: &str,
    status: ApplicationStatus,
    applied_at: DateTime<Utc>,
) -> ApplicationRecord {
    ApplicationRecord {
        id: ApplicationId(application_id.to_string()),
        job_id: JobId(job_id.to_string()),
        applicant: Applicant {
            name: Some(format!("Applicant {application_id}")),
            email: format!("{application_id}@example.com"),
            phone: None,
        },
        status,
        applied_at,
        reviewed_at: None,
        interview_scheduled_at: None,
        cover_letter: None,
        resume_url: None,
        notes: Vec::new(),
    }
}

pub(crate) fn tagged_at(
    job_id: &str,
    application_id: &str,
    status: ApplicationStatus,
    applied_at: DateTime<Utc>,
) -> TaggedApplication {
    TaggedApplication::new(
        record_at(job_id, application_id, status, applied_at),
        JobContext {
            title: format!("Job {job_id}"),
            employment_type: "full_time".to_string(),
            category: "Hospitality".to_string(),
        },
    )
}

/// One application per status, all applied yesterday.
pub(crate) fn tagged_statuses(
    job_id: &str,
    statuses: &[ApplicationStatus],
) -> Vec<TaggedApplication> {
    statuses
        .iter()
        .enumerate()
        .map(|(index, status)| {
            tagged_at(
                job_id,
                &format!("{job_id}-app-{index}"),
                *status,
                days_ago(1, 10),
            )
        })
        .collect()
}
