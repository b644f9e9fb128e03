use chrono::NaiveDate;
use serde::Serialize;

use super::super::domain::{ApplicationStatus, JobId, JobStatus};
use super::super::snapshot::FetchWarning;
use super::metrics::PerformanceMetric;
use super::ranking::TopJobsSort;
use super::trend::DateRange;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub total_jobs: usize,
    pub active_jobs: usize,
    pub total_applications: u64,
    pub total_views: u64,
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FunnelStageKind {
    Applied,
    Reviewed,
    Shortlisted,
    Interviewed,
    Accepted,
}

impl FunnelStageKind {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Applied,
            Self::Reviewed,
            Self::Shortlisted,
            Self::Interviewed,
            Self::Accepted,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Applied => "Applied",
            Self::Reviewed => "Reviewed",
            Self::Shortlisted => "Shortlisted",
            Self::Interviewed => "Interviewed",
            Self::Accepted => "Accepted",
        }
    }

    /// Whether an application with `status` has reached this stage.
    pub const fn includes(self, status: ApplicationStatus) -> bool {
        use ApplicationStatus::*;
        match self {
            Self::Applied => true,
            Self::Reviewed => matches!(status, Reviewed | Shortlisted | Interviewed | Accepted),
            Self::Shortlisted => matches!(status, Shortlisted | Interviewed | Accepted),
            Self::Interviewed => matches!(status, Interviewed | Accepted),
            Self::Accepted => matches!(status, Accepted),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunnelStage {
    pub stage: FunnelStageKind,
    pub label: &'static str,
    pub count: usize,
    /// Percentage of the previous stage that reached this one.
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HiringFunnel {
    pub stages: Vec<FunnelStage>,
    pub rejected: usize,
}

impl HiringFunnel {
    pub fn count(&self, stage: FunnelStageKind) -> usize {
        self.stages
            .iter()
            .find(|entry| entry.stage == stage)
            .map(|entry| entry.count)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: ApplicationStatus,
    pub label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobPerformance {
    pub job_id: JobId,
    pub title: String,
    pub status: JobStatus,
    pub views: u64,
    pub applications: usize,
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

impl TrendDirection {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Up => "Trending up",
            Self::Down => "Trending down",
            Self::Stable => "Stable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendStats {
    pub max: usize,
    pub min: usize,
    pub mean: f64,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub range: DateRange,
    pub points: Vec<TrendPoint>,
    pub direction: TrendDirection,
    pub stats: TrendStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceLabel {
    Excellent,
    Good,
    NeedsImprovement,
    NoResultsYet,
}

impl PerformanceLabel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::NeedsImprovement => "needs improvement",
            Self::NoResultsYet => "no results yet",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopJobRow {
    pub job_id: JobId,
    pub title: String,
    pub application_count: usize,
    pub pending_count: usize,
    pub accepted_count: usize,
    pub rejected_count: usize,
    pub acceptance_rate: f64,
    pub performance: PerformanceLabel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    LowConversion,
    NoRecentApplications,
    ReviewBacklog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightSeverity {
    Info,
    Warning,
    Alert,
}

impl InsightSeverity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Alert => "alert",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub severity: InsightSeverity,
    pub title: &'static str,
    pub description: String,
    pub action: &'static str,
}

/// Every view the dashboard renders, derived from one snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct DerivedAggregate {
    pub overview: Overview,
    pub funnel: HiringFunnel,
    pub status_breakdown: Vec<StatusCount>,
    pub performance_metric: PerformanceMetric,
    pub performance: Vec<JobPerformance>,
    pub trend: TrendSeries,
    pub top_jobs_sort: TopJobsSort,
    pub top_jobs: Vec<TopJobRow>,
    pub insights: Vec<Insight>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<FetchWarning>,
}
