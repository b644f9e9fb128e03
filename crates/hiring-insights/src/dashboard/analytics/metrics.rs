use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::super::domain::{
    ApplicationStatus, JobId, JobPosting, JobStatus, TaggedApplication, ValidationError,
};
use super::views::{
    FunnelStage, FunnelStageKind, HiringFunnel, JobPerformance, Overview, StatusCount,
};

/// Ratio expressed as a percentage; zero when the denominator is zero.
pub fn percentage(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator * 100.0
    } else {
        0.0
    }
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn overview(jobs: &[JobPosting]) -> Overview {
    let total_applications: u64 = jobs.iter().map(|job| job.application_count).sum();
    let total_views: u64 = jobs.iter().map(|job| job.view_count).sum();

    Overview {
        total_jobs: jobs.len(),
        active_jobs: jobs
            .iter()
            .filter(|job| job.status == JobStatus::Published)
            .count(),
        total_applications,
        total_views,
        conversion_rate: round1(percentage(total_applications as f64, total_views as f64)),
    }
}

pub fn hiring_funnel(applications: &[TaggedApplication]) -> HiringFunnel {
    let mut previous: Option<usize> = None;
    let stages = FunnelStageKind::ordered()
        .into_iter()
        .map(|stage| {
            let count = applications
                .iter()
                .filter(|item| stage.includes(item.status()))
                .count();
            let upstream = previous.unwrap_or(count);
            previous = Some(count);
            FunnelStage {
                stage,
                label: stage.label(),
                count,
                conversion_rate: round1(percentage(count as f64, upstream as f64)),
            }
        })
        .collect();

    HiringFunnel {
        stages,
        rejected: count_status(applications, ApplicationStatus::Rejected),
    }
}

pub fn status_breakdown(applications: &[TaggedApplication]) -> Vec<StatusCount> {
    ApplicationStatus::ordered()
        .into_iter()
        .map(|status| StatusCount {
            status,
            label: status.label(),
            count: count_status(applications, status),
        })
        .collect()
}

pub(crate) fn count_status(applications: &[TaggedApplication], status: ApplicationStatus) -> usize {
    applications
        .iter()
        .filter(|item| item.status() == status)
        .count()
}

pub(crate) fn applications_per_job(
    applications: &[TaggedApplication],
) -> HashMap<&JobId, Vec<&TaggedApplication>> {
    let mut grouped: HashMap<&JobId, Vec<&TaggedApplication>> = HashMap::new();
    for item in applications {
        grouped.entry(&item.record.job_id).or_default().push(item);
    }
    grouped
}

/// Metric used to rank per-job performance rows, always descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceMetric {
    #[default]
    Applications,
    Views,
    ConversionRate,
}

impl FromStr for PerformanceMetric {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "applications" => Ok(Self::Applications),
            "views" => Ok(Self::Views),
            "conversion_rate" | "conversion" => Ok(Self::ConversionRate),
            other => Err(ValidationError::UnknownOption {
                field: "performance metric",
                value: other.to_string(),
            }),
        }
    }
}

pub fn job_performance(
    jobs: &[JobPosting],
    applications: &[TaggedApplication],
    metric: PerformanceMetric,
) -> Vec<JobPerformance> {
    let grouped = applications_per_job(applications);
    let mut rows: Vec<JobPerformance> = jobs
        .iter()
        .map(|job| {
            let count = grouped.get(&job.id).map(Vec::len).unwrap_or(0);
            JobPerformance {
                job_id: job.id.clone(),
                title: job.title.clone(),
                status: job.status,
                views: job.view_count,
                applications: count,
                conversion_rate: round1(percentage(count as f64, job.view_count as f64)),
            }
        })
        .collect();

    sort_performance(&mut rows, metric);
    rows
}

pub fn sort_performance(rows: &mut [JobPerformance], metric: PerformanceMetric) {
    rows.sort_by(|left, right| {
        let primary = match metric {
            PerformanceMetric::Applications => right.applications.cmp(&left.applications),
            PerformanceMetric::Views => right.views.cmp(&left.views),
            PerformanceMetric::ConversionRate => {
                right.conversion_rate.total_cmp(&left.conversion_rate)
            }
        };
        match primary {
            Ordering::Equal => left.job_id.cmp(&right.job_id),
            other => other,
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::analytics::tests::common::*;

    #[test]
    fn overview_without_views_has_zero_conversion() {
        let jobs = vec![
            job("job-1", "Barista", JobStatus::Published, 0, 4),
            job("job-2", "Cook", JobStatus::Draft, 0, 0),
        ];

        let overview = overview(&jobs);

        assert_eq!(overview.total_jobs, 2);
        assert_eq!(overview.active_jobs, 1);
        assert_eq!(overview.total_applications, 4);
        assert_eq!(overview.total_views, 0);
        assert_eq!(overview.conversion_rate, 0.0);
    }

    #[test]
    fn overview_rounds_conversion_to_one_decimal() {
        let jobs = vec![
            job("job-1", "Barista", JobStatus::Published, 200, 3),
            job("job-2", "Cook", JobStatus::Paused, 100, 2),
        ];

        let overview = overview(&jobs);

        assert_eq!(overview.total_views, 300);
        assert_eq!(overview.conversion_rate, 1.7);
    }

    #[test]
    fn funnel_counts_cumulative_stages() {
        let apps = tagged_statuses(
            "job-1",
            &[
                ApplicationStatus::Pending,
                ApplicationStatus::Reviewed,
                ApplicationStatus::Shortlisted,
                ApplicationStatus::Interviewed,
                ApplicationStatus::Accepted,
                ApplicationStatus::Rejected,
            ],
        );

        let funnel = hiring_funnel(&apps);

        assert_eq!(funnel.count(FunnelStageKind::Applied), 6);
        assert_eq!(funnel.count(FunnelStageKind::Reviewed), 4);
        assert_eq!(funnel.count(FunnelStageKind::Shortlisted), 3);
        assert_eq!(funnel.count(FunnelStageKind::Interviewed), 2);
        assert_eq!(funnel.count(FunnelStageKind::Accepted), 1);
        assert_eq!(funnel.rejected, 1);
        assert_eq!(funnel.stages[0].conversion_rate, 100.0);
        assert_eq!(funnel.stages[1].conversion_rate, 66.7);
        assert_eq!(funnel.stages[4].conversion_rate, 50.0);
    }

    #[test]
    fn funnel_is_non_increasing_for_every_status_mix() {
        let statuses = ApplicationStatus::ordered();
        // Enumerate every multiset of up to three statuses.
        for a in statuses {
            for b in statuses {
                for c in statuses {
                    let apps = tagged_statuses("job-1", &[a, b, c]);
                    let counts: Vec<usize> = hiring_funnel(&apps)
                        .stages
                        .iter()
                        .map(|stage| stage.count)
                        .collect();
                    assert!(
                        counts.windows(2).all(|pair| pair[0] >= pair[1]),
                        "funnel increased for {a:?}/{b:?}/{c:?}: {counts:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn empty_funnel_has_zero_rates() {
        let funnel = hiring_funnel(&[]);
        assert!(funnel
            .stages
            .iter()
            .all(|stage| stage.count == 0 && stage.conversion_rate == 0.0));
    }

    #[test]
    fn job_performance_counts_records_not_posting_counter() {
        let jobs = vec![
            job("job-1", "Barista", JobStatus::Published, 50, 99),
            job("job-2", "Cook", JobStatus::Published, 0, 0),
        ];
        let mut apps = tagged_statuses("job-1", &[ApplicationStatus::Pending; 2]);
        apps.extend(tagged_statuses("job-2", &[ApplicationStatus::Pending; 3]));

        let rows = job_performance(&jobs, &apps, PerformanceMetric::Applications);

        assert_eq!(rows[0].job_id, JobId("job-2".to_string()));
        assert_eq!(rows[0].applications, 3);
        assert_eq!(rows[0].conversion_rate, 0.0);
        assert_eq!(rows[1].applications, 2);
        assert_eq!(rows[1].conversion_rate, 4.0);
    }

    #[test]
    fn job_performance_resorts_by_views_with_id_tie_break() {
        let jobs = vec![
            job("job-b", "Cook", JobStatus::Published, 80, 0),
            job("job-c", "Host", JobStatus::Published, 120, 0),
            job("job-a", "Barista", JobStatus::Published, 80, 0),
        ];

        let rows = job_performance(&jobs, &[], PerformanceMetric::Views);
        let ids: Vec<&str> = rows.iter().map(|row| row.job_id.0.as_str()).collect();

        assert_eq!(ids, vec!["job-c", "job-a", "job-b"]);
    }

    #[test]
    fn performance_metric_parses_aliases() {
        assert_eq!(
            "conversion".parse::<PerformanceMetric>(),
            Ok(PerformanceMetric::ConversionRate)
        );
        assert!("salary".parse::<PerformanceMetric>().is_err());
    }
}
