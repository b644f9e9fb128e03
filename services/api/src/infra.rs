use chrono::{DateTime, Duration, NaiveDate, Utc};
use hiring_insights::dashboard::domain::{Applicant, ApplicationNote, JobLocation, SalaryRange};
use hiring_insights::dashboard::{
    load_fixture, ApplicationId, ApplicationRecord, ApplicationStatus,
    InMemoryApplicationRepository, InMemoryJobRepository, JobId, JobPosting, JobStatus,
};
use hiring_insights::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Application the demo data set refuses to update, so bulk runs show a
/// partial failure.
pub(crate) const FLAKY_APPLICATION: &str = "app-cook-3";

/// Repositories seeded from a JSON fixture, or from the built-in sample data
/// anchored on `now` when no fixture is given.
pub(crate) fn load_repositories(
    fixture: Option<&Path>,
    now: DateTime<Utc>,
) -> Result<(InMemoryJobRepository, InMemoryApplicationRepository), AppError> {
    match fixture {
        Some(path) => Ok(load_fixture(path)?.into_repositories()?),
        None => {
            let (jobs, applications) = sample_records(now);
            Ok((
                InMemoryJobRepository::new(jobs),
                InMemoryApplicationRepository::new(applications),
            ))
        }
    }
}

pub(crate) fn sample_records(now: DateTime<Utc>) -> (Vec<JobPosting>, Vec<ApplicationRecord>) {
    use ApplicationStatus::*;

    let jobs = vec![
        sample_job("job-barista", "Barista", JobStatus::Published, 640, 9, now),
        sample_job("job-cook", "Line Cook", JobStatus::Published, 410, 5, now),
        sample_job("job-host", "Front-of-House Host", JobStatus::Paused, 120, 2, now),
        sample_job("job-sommelier", "Sommelier", JobStatus::Draft, 0, 0, now),
    ];

    let seeds: [(&str, &str, &str, ApplicationStatus, i64); 16] = [
        ("app-barista-1", "job-barista", "Tran Minh Anh", Pending, 0),
        ("app-barista-2", "job-barista", "Le Thu Ha", Pending, 1),
        ("app-barista-3", "job-barista", "Nguyen Bao", Reviewed, 2),
        ("app-barista-4", "job-barista", "Pham Duc", Shortlisted, 4),
        ("app-barista-5", "job-barista", "Vo Lan", Interviewed, 6),
        ("app-barista-6", "job-barista", "Hoang Nam", Accepted, 9),
        ("app-barista-7", "job-barista", "Do Mai", Rejected, 12),
        ("app-barista-8", "job-barista", "Bui Khanh", Accepted, 18),
        ("app-barista-9", "job-barista", "Dang Quoc", Pending, 25),
        ("app-cook-1", "job-cook", "Ngo Tuan", Pending, 1),
        ("app-cook-2", "job-cook", "Trinh Hoa", Pending, 3),
        (FLAKY_APPLICATION, "job-cook", "Ly Phuong", Pending, 5),
        ("app-cook-4", "job-cook", "Mac Son", Rejected, 11),
        ("app-cook-5", "job-cook", "Chu Vy", Interviewed, 20),
        ("app-host-1", "job-host", "Ta Linh", Reviewed, 33),
        ("app-host-2", "job-host", "Kieu Trang", Rejected, 48),
    ];

    let applications = seeds
        .into_iter()
        .map(|(id, job_id, name, status, days_ago)| {
            sample_application(id, job_id, name, status, now - Duration::days(days_ago))
        })
        .collect();

    (jobs, applications)
}

fn sample_job(
    id: &str,
    title: &str,
    status: JobStatus,
    view_count: u64,
    application_count: u64,
    now: DateTime<Utc>,
) -> JobPosting {
    JobPosting {
        id: JobId(id.to_string()),
        title: title.to_string(),
        status,
        category: "Food & Beverage".to_string(),
        employment_type: "full_time".to_string(),
        level: "junior".to_string(),
        location: JobLocation {
            city: "Da Nang".to_string(),
            district: Some("Son Tra".to_string()),
        },
        salary: SalaryRange {
            min: Some(7_000_000),
            max: Some(11_000_000),
            currency: "VND".to_string(),
            is_public: true,
        },
        capacity: 2,
        deadline: Some((now + Duration::days(21)).date_naive()),
        view_count,
        application_count,
        save_count: view_count / 20,
        created_at: now - Duration::days(60),
        published_at: (status != JobStatus::Draft).then(|| now - Duration::days(58)),
    }
}

fn sample_application(
    id: &str,
    job_id: &str,
    name: &str,
    status: ApplicationStatus,
    applied_at: DateTime<Utc>,
) -> ApplicationRecord {
    let email = format!("{}@example.com", id.replace('-', "."));
    let reviewed_at =
        (status != ApplicationStatus::Pending).then(|| applied_at + Duration::days(1));
    let notes = if status == ApplicationStatus::Interviewed {
        vec![ApplicationNote {
            author: "Hiring manager".to_string(),
            text: "Strong practical trial shift".to_string(),
            added_at: applied_at + Duration::days(2),
        }]
    } else {
        Vec::new()
    };

    ApplicationRecord {
        id: ApplicationId(id.to_string()),
        job_id: JobId(job_id.to_string()),
        applicant: Applicant {
            name: Some(name.to_string()),
            email,
            phone: None,
        },
        status,
        applied_at,
        reviewed_at,
        interview_scheduled_at: None,
        cover_letter: None,
        resume_url: None,
        notes,
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Evaluation instant for a report date: the last second of that day in UTC.
pub(crate) fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(23, 59, 59)
        .map(|moment| moment.and_utc())
        .unwrap_or_else(Utc::now)
}
