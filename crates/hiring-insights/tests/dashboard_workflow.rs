//! End-to-end scenarios for the recruitment dashboard: loading a fixture into
//! in-memory repositories, deriving the aggregate through a session, and
//! mutating applications from the review board.

mod common {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use serde_json::{json, Value};

    use hiring_insights::dashboard::DashboardFixture;

    pub(super) fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 20, 16, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn stamp(days_ago: i64) -> String {
        (now() - Duration::days(days_ago)).to_rfc3339()
    }

    fn job(id: &str, title: &str, status: &str, views: u64) -> Value {
        json!({
            "id": id,
            "title": title,
            "status": status,
            "category": "Food & Beverage",
            "employment_type": "full_time",
            "level": "junior",
            "location": { "city": "Ho Chi Minh City", "district": "District 1" },
            "salary": { "min": 7000000, "max": 9000000, "currency": "VND", "is_public": true },
            "capacity": 3,
            "view_count": views,
            "application_count": 0,
            "created_at": stamp(60),
        })
    }

    fn application(id: &str, job_id: &str, status: &str, days_ago: i64) -> Value {
        json!({
            "id": id,
            "job_id": job_id,
            "applicant": {
                "name": format!("Candidate {id}"),
                "email": format!("{id}@example.com"),
            },
            "status": status,
            "applied_at": stamp(days_ago),
        })
    }

    /// One busy job with the canonical five-status mix, one quiet job, one draft.
    pub(super) fn fixture() -> DashboardFixture {
        let document = json!({
            "jobs": [
                job("job-barista", "Barista", "published", 500),
                job("job-cook", "Line Cook", "published", 0),
                job("job-host", "Host", "draft", 0),
            ],
            "applications": [
                application("app-1", "job-barista", "pending", 1),
                application("app-2", "job-barista", "pending", 2),
                application("app-3", "job-barista", "accepted", 12),
                application("app-4", "job-barista", "rejected", 15),
                application("app-5", "job-barista", "shortlisted", 20),
            ],
        });
        DashboardFixture::from_json(&document.to_string()).expect("fixture parses")
    }
}

use std::sync::Arc;

use hiring_insights::dashboard::analytics::{
    AggregateParams, DateRange, FunnelStageKind, InsightKind, PerformanceLabel, SortDirection,
    TopJobsColumn, TopJobsSort,
};
use hiring_insights::dashboard::review::{FilterPatch, StatusScope};
use hiring_insights::dashboard::{
    ApplicationId, ApplicationStatus, DashboardSession, JobId, RefreshOutcome, ReviewBoard,
};

use common::{fixture, now};

fn applied(outcome: RefreshOutcome) -> Arc<hiring_insights::dashboard::DerivedAggregate> {
    match outcome {
        RefreshOutcome::Applied(aggregate) => aggregate,
        RefreshOutcome::Stale { .. } => panic!("refresh unexpectedly stale"),
    }
}

#[tokio::test]
async fn fixture_backed_session_derives_every_view() {
    let (jobs, applications) = fixture().into_repositories().expect("fixture valid");
    let session = DashboardSession::new(
        Arc::new(jobs),
        Arc::new(applications),
        AggregateParams::default(),
    );

    let aggregate = applied(session.refresh(now()).await.expect("refresh succeeds"));

    assert_eq!(aggregate.overview.total_jobs, 3);
    assert_eq!(aggregate.overview.active_jobs, 2);
    assert_eq!(aggregate.funnel.count(FunnelStageKind::Applied), 5);
    assert_eq!(aggregate.funnel.rejected, 1);

    let barista = aggregate
        .top_jobs
        .iter()
        .find(|row| row.job_id == JobId("job-barista".to_string()))
        .expect("barista row");
    assert_eq!(
        (
            barista.application_count,
            barista.pending_count,
            barista.accepted_count,
            barista.rejected_count
        ),
        (5, 2, 1, 1)
    );
    assert_eq!(barista.acceptance_rate, 20.0);
    assert_eq!(barista.performance, PerformanceLabel::Excellent);

    let cook = aggregate
        .performance
        .iter()
        .find(|row| row.job_id == JobId("job-cook".to_string()))
        .expect("cook row");
    assert_eq!(cook.conversion_rate, 0.0);
}

#[tokio::test]
async fn trend_has_one_point_per_day_for_every_range() {
    let (jobs, applications) = fixture().into_repositories().expect("fixture valid");
    let session = DashboardSession::new(
        Arc::new(jobs),
        Arc::new(applications),
        AggregateParams::default(),
    );
    session.refresh(now()).await.expect("refresh succeeds");

    for range in DateRange::ordered() {
        let aggregate = session
            .set_date_range(range.days(), now())
            .expect("supported range")
            .expect("snapshot loaded");
        assert_eq!(aggregate.trend.points.len(), range.days() as usize);
    }
}

#[tokio::test]
async fn top_jobs_directions_mirror_each_other_except_ties() {
    let (jobs, applications) = fixture().into_repositories().expect("fixture valid");
    let session = DashboardSession::new(
        Arc::new(jobs),
        Arc::new(applications),
        AggregateParams::default(),
    );
    session.refresh(now()).await.expect("refresh succeeds");

    let ids = |direction| -> Vec<String> {
        session
            .set_top_jobs_sort(TopJobsSort::new(TopJobsColumn::Applications, direction), now())
            .expect("snapshot loaded")
            .top_jobs
            .iter()
            .map(|row| row.job_id.0.clone())
            .collect()
    };

    // job-cook and job-host tie on zero applications and stay in id order.
    assert_eq!(
        ids(SortDirection::Descending),
        vec!["job-barista", "job-cook", "job-host"]
    );
    assert_eq!(
        ids(SortDirection::Ascending),
        vec!["job-cook", "job-host", "job-barista"]
    );
}

#[tokio::test]
async fn recency_alert_fires_when_active_jobs_go_quiet() {
    let (jobs, applications) = fixture().into_repositories().expect("fixture valid");
    let session = DashboardSession::new(
        Arc::new(jobs),
        Arc::new(applications),
        AggregateParams::default(),
    );
    session.refresh(now()).await.expect("refresh succeeds");

    let a_month_later = now() + chrono::Duration::days(30);
    let aggregate = session
        .set_date_range(30, a_month_later)
        .expect("supported range")
        .expect("snapshot loaded");

    let kinds: Vec<InsightKind> = aggregate.insights.iter().map(|insight| insight.kind).collect();
    assert!(kinds.contains(&InsightKind::NoRecentApplications));
}

#[tokio::test]
async fn bulk_review_updates_board_and_dashboard_together() {
    let (jobs, applications) = fixture().into_repositories().expect("fixture valid");
    applications.fail_application(ApplicationId("app-2".to_string()));
    let applications = Arc::new(applications);
    let session = DashboardSession::new(
        Arc::new(jobs),
        applications.clone(),
        AggregateParams::default(),
    );
    session.refresh(now()).await.expect("refresh succeeds");
    let snapshot = session.snapshot().expect("snapshot loaded");
    let mut board = ReviewBoard::from_snapshot(applications.clone(), &snapshot);

    for id in ["app-1", "app-2", "app-3", "app-5"] {
        board
            .toggle_select(&ApplicationId(id.to_string()), now())
            .expect("visible");
    }
    let outcome = board
        .bulk_update_status(ApplicationStatus::Reviewed)
        .await
        .expect("bulk dispatched");
    let report = outcome.report();
    assert_eq!((report.succeeded, report.failed), (3, 1));
    assert_eq!(report.failures[0].application_id.0, "app-2");
    assert_eq!(
        applications
            .get(&ApplicationId("app-2".to_string()))
            .map(|record| record.status),
        Some(ApplicationStatus::Pending)
    );

    let aggregate = session
        .apply_confirmed_updates(outcome.updated, now())
        .expect("snapshot loaded");
    assert_eq!(aggregate.funnel.count(FunnelStageKind::Reviewed), 3);
    assert_eq!(aggregate.funnel.count(FunnelStageKind::Accepted), 0);

    board.select_all(true, now());
    board.set_filter(FilterPatch {
        status: Some(StatusScope::Only(ApplicationStatus::Pending)),
        ..FilterPatch::default()
    });
    assert!(board.selection().is_empty());
    assert_eq!(board.visible(now()).len(), 1);
}
