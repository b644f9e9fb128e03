use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::snapshot::DashboardSnapshot;
use super::insights::{InsightContext, InsightEngine, InsightThresholds};
use super::metrics::{hiring_funnel, job_performance, overview, status_breakdown, PerformanceMetric};
use super::ranking::{build_top_jobs, TopJobsSort};
use super::trend::{build_trend, DateRange};
use super::views::DerivedAggregate;

/// Caller-selected parameters for one aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateParams {
    pub range: DateRange,
    pub metric: PerformanceMetric,
    pub top_jobs_sort: TopJobsSort,
    pub thresholds: InsightThresholds,
}

/// Derive every dashboard view from `snapshot`. Overview, funnel, performance
/// and top jobs use all-time totals; the trend and recency rule use `now`.
pub fn aggregate(
    snapshot: &DashboardSnapshot,
    params: &AggregateParams,
    now: DateTime<Utc>,
) -> DerivedAggregate {
    let jobs = &snapshot.jobs;
    let applications = &snapshot.applications;

    let overview = overview(jobs);
    let insights = InsightEngine::standard(&params.thresholds).evaluate(&InsightContext {
        overview: &overview,
        applications,
        now,
    });

    DerivedAggregate {
        funnel: hiring_funnel(applications),
        status_breakdown: status_breakdown(applications),
        performance_metric: params.metric,
        performance: job_performance(jobs, applications, params.metric),
        trend: build_trend(applications, params.range, now.date_naive()),
        top_jobs_sort: params.top_jobs_sort,
        top_jobs: build_top_jobs(jobs, applications, params.top_jobs_sort),
        insights,
        overview,
        warnings: snapshot.warnings.clone(),
    }
}
