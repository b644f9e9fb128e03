use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::dashboard::domain::{
    Applicant, ApplicationId, ApplicationRecord, ApplicationStatus, JobContext, JobId,
    TaggedApplication,
};
use crate::dashboard::repository::{ApplicationRepository, RepositoryError};
use crate::dashboard::review::ReviewBoard;

pub(crate) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 15, 14, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn days_ago(days: i64, hour: u32) -> DateTime<Utc> {
    (now().date_naive() - Duration::days(days))
        .and_hms_opt(hour, 0, 0)
        .expect("valid time")
        .and_utc()
}

fn item(
    id: &str,
    job_id: &str,
    job_title: &str,
    name: Option<&str>,
    email: &str,
    status: ApplicationStatus,
    applied_at: DateTime<Utc>,
) -> TaggedApplication {
    TaggedApplication::new(
        ApplicationRecord {
            id: ApplicationId(id.to_string()),
            job_id: JobId(job_id.to_string()),
            applicant: Applicant {
                name: name.map(str::to_string),
                email: email.to_string(),
                phone: None,
            },
            status,
            applied_at,
            reviewed_at: None,
            interview_scheduled_at: None,
            cover_letter: None,
            resume_url: None,
            notes: Vec::new(),
        },
        JobContext {
            title: job_title.to_string(),
            employment_type: "full_time".to_string(),
            category: "Hospitality".to_string(),
        },
    )
}

pub(crate) fn review_items() -> Vec<TaggedApplication> {
    vec![
        item(
            "a-1",
            "job-1",
            "Barista",
            Some("Tran Minh"),
            "minh@example.com",
            ApplicationStatus::Pending,
            days_ago(0, 9),
        ),
        item(
            "a-2",
            "job-2",
            "Line Cook",
            Some("Nguyen Van"),
            "van@example.com",
            ApplicationStatus::Reviewed,
            days_ago(2, 9),
        ),
        item(
            "a-3",
            "job-2",
            "Line Cook",
            Some("Le Hoa"),
            "hoa@example.com",
            ApplicationStatus::Interviewed,
            days_ago(5, 9),
        ),
        item(
            "a-4",
            "job-1",
            "Barista",
            None,
            "anon@example.com",
            ApplicationStatus::Pending,
            days_ago(20, 9),
        ),
        item(
            "a-5",
            "job-3",
            "Host",
            Some("Pham Quynh"),
            "quynh@example.com",
            ApplicationStatus::Accepted,
            days_ago(45, 9),
        ),
    ]
}

pub(crate) fn app_id(id: &str) -> ApplicationId {
    ApplicationId(id.to_string())
}

/// Application store whose updates fail for a configured set of ids. Each
/// update yields once before answering and the peak overlap is recorded.
#[derive(Default)]
pub(crate) struct MemoryApplications {
    records: Mutex<HashMap<ApplicationId, ApplicationRecord>>,
    failing: HashSet<ApplicationId>,
    pub(crate) update_calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub(crate) peak_in_flight: AtomicUsize,
    pub(crate) notes: Mutex<Vec<(ApplicationId, String)>>,
}

impl MemoryApplications {
    pub(crate) fn seeded(items: &[TaggedApplication]) -> Self {
        let records = items
            .iter()
            .map(|item| (item.id().clone(), item.record.clone()))
            .collect();
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    pub(crate) fn failing_for(mut self, ids: &[&str]) -> Self {
        self.failing = ids.iter().map(|id| app_id(id)).collect();
        self
    }

    pub(crate) fn stored_status(&self, id: &str) -> Option<ApplicationStatus> {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .get(&app_id(id))
            .map(|record| record.status)
    }
}

#[async_trait]
impl ApplicationRepository for MemoryApplications {
    async fn list_for_job(
        &self,
        job_id: &JobId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
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
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(application_id) {
            return Err(RepositoryError::Unavailable("write timeout".to_string()));
        }
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let record = guard
            .get_mut(application_id)
            .ok_or(RepositoryError::NotFound)?;
        record.status = status;
        record.reviewed_at = Some(now());
        Ok(record.clone())
    }

    async fn add_note(
        &self,
        application_id: &ApplicationId,
        text: &str,
    ) -> Result<(), RepositoryError> {
        if self.failing.contains(application_id) {
            return Err(RepositoryError::Unavailable("write timeout".to_string()));
        }
        self.notes
            .lock()
            .expect("notes mutex poisoned")
            .push((application_id.clone(), text.to_string()));
        Ok(())
    }
}

pub(crate) fn board_with(
    repository: MemoryApplications,
) -> (ReviewBoard<MemoryApplications>, Arc<MemoryApplications>) {
    let repository = Arc::new(repository);
    let board = ReviewBoard::new(repository.clone(), review_items());
    (board, repository)
}
