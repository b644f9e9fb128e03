use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::super::domain::{ApplicationStatus, TaggedApplication};
use super::metrics::count_status;
use super::views::{Insight, InsightKind, InsightSeverity, Overview};

/// Thresholds the standard rules fire against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InsightThresholds {
    pub low_conversion_pct: f64,
    pub recent_window_days: u32,
    pub backlog_pending: usize,
}

impl Default for InsightThresholds {
    fn default() -> Self {
        Self {
            low_conversion_pct: 2.0,
            recent_window_days: 7,
            backlog_pending: 10,
        }
    }
}

/// Inputs every rule sees.
pub struct InsightContext<'a> {
    pub overview: &'a Overview,
    pub applications: &'a [TaggedApplication],
    pub now: DateTime<Utc>,
}

pub trait InsightRule: Send + Sync {
    fn evaluate(&self, context: &InsightContext<'_>) -> Option<Insight>;
}

pub struct LowConversionRule {
    pub threshold_pct: f64,
}

impl InsightRule for LowConversionRule {
    fn evaluate(&self, context: &InsightContext<'_>) -> Option<Insight> {
        let rate = context.overview.conversion_rate;
        (rate < self.threshold_pct).then(|| Insight {
            kind: InsightKind::LowConversion,
            severity: InsightSeverity::Warning,
            title: "Low conversion rate",
            description: format!(
                "Only {rate:.1}% of job views turn into applications (benchmark {:.1}%).",
                self.threshold_pct
            ),
            action: "Improve job descriptions",
        })
    }
}

pub struct NoRecentApplicationsRule {
    pub window_days: u32,
}

impl InsightRule for NoRecentApplicationsRule {
    fn evaluate(&self, context: &InsightContext<'_>) -> Option<Insight> {
        let active_jobs = context.overview.active_jobs;
        if active_jobs == 0 {
            return None;
        }

        let since = context.now - Duration::days(i64::from(self.window_days));
        let recent = context
            .applications
            .iter()
            .filter(|item| item.record.applied_at >= since)
            .count();
        if recent > 0 {
            return None;
        }

        Some(Insight {
            kind: InsightKind::NoRecentApplications,
            severity: InsightSeverity::Alert,
            title: "No new applications",
            description: format!(
                "None of your {active_jobs} active job{} got applications in the last {} days.",
                if active_jobs == 1 { "" } else { "s" },
                self.window_days
            ),
            action: "Promote your jobs",
        })
    }
}

pub struct BacklogRule {
    pub max_pending: usize,
}

impl InsightRule for BacklogRule {
    fn evaluate(&self, context: &InsightContext<'_>) -> Option<Insight> {
        let pending = count_status(context.applications, ApplicationStatus::Pending);
        (pending > self.max_pending).then(|| Insight {
            kind: InsightKind::ReviewBacklog,
            severity: InsightSeverity::Info,
            title: "Applications awaiting review",
            description: format!("{pending} applications are still pending review."),
            action: "Review applications",
        })
    }
}

/// Ordered list of independent rules; every rule is evaluated.
pub struct InsightEngine {
    rules: Vec<Box<dyn InsightRule>>,
}

impl InsightEngine {
    pub fn new(rules: Vec<Box<dyn InsightRule>>) -> Self {
        Self { rules }
    }

    pub fn standard(thresholds: &InsightThresholds) -> Self {
        Self::new(vec![
            Box::new(LowConversionRule {
                threshold_pct: thresholds.low_conversion_pct,
            }),
            Box::new(NoRecentApplicationsRule {
                window_days: thresholds.recent_window_days,
            }),
            Box::new(BacklogRule {
                max_pending: thresholds.backlog_pending,
            }),
        ])
    }

    pub fn with_rule(mut self, rule: Box<dyn InsightRule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn evaluate(&self, context: &InsightContext<'_>) -> Vec<Insight> {
        self.rules
            .iter()
            .filter_map(|rule| rule.evaluate(context))
            .collect()
    }
}
