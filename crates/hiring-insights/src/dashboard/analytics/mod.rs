//! Derived dashboard views: overview KPIs, hiring funnel, per-job performance,
//! application trend, top jobs table, and rule-based insights.

mod aggregate;
pub mod insights;
pub mod metrics;
pub mod ranking;
pub mod trend;
pub mod views;

#[cfg(test)]
pub(crate) mod tests;

pub use aggregate::{aggregate, AggregateParams};
pub use insights::{InsightContext, InsightEngine, InsightRule, InsightThresholds};
pub use metrics::PerformanceMetric;
pub use ranking::{SortDirection, TopJobsColumn, TopJobsSort};
pub use trend::DateRange;
pub use views::{
    DerivedAggregate, FunnelStage, FunnelStageKind, HiringFunnel, Insight, InsightKind,
    InsightSeverity, JobPerformance, Overview, PerformanceLabel, StatusCount, TopJobRow,
    TrendDirection, TrendPoint, TrendSeries, TrendStats,
};
