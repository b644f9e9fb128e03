use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::super::domain::{ApplicationStatus, JobPosting, TaggedApplication, ValidationError};
use super::metrics::{applications_per_job, percentage, round1};
use super::views::{PerformanceLabel, TopJobRow};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopJobsColumn {
    Title,
    #[default]
    Applications,
    Pending,
    Accepted,
    Rejected,
    AcceptanceRate,
}

impl FromStr for TopJobsColumn {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "applications" | "application_count" => Ok(Self::Applications),
            "pending" | "pending_count" => Ok(Self::Pending),
            "accepted" | "accepted_count" => Ok(Self::Accepted),
            "rejected" | "rejected_count" => Ok(Self::Rejected),
            "acceptance_rate" => Ok(Self::AcceptanceRate),
            other => Err(ValidationError::UnknownOption {
                field: "top jobs column",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

impl FromStr for SortDirection {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            other => Err(ValidationError::UnknownOption {
                field: "sort direction",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopJobsSort {
    pub column: TopJobsColumn,
    pub direction: SortDirection,
}

impl TopJobsSort {
    pub const fn new(column: TopJobsColumn, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    /// Selecting the active column flips direction; a new column starts descending.
    pub fn select(self, column: TopJobsColumn) -> Self {
        if self.column == column {
            Self::new(column, self.direction.toggled())
        } else {
            Self::new(column, SortDirection::Descending)
        }
    }
}

pub fn performance_label(application_count: usize, acceptance_rate: f64) -> PerformanceLabel {
    if application_count == 0 {
        PerformanceLabel::NoResultsYet
    } else if acceptance_rate >= 20.0 {
        PerformanceLabel::Excellent
    } else if acceptance_rate >= 10.0 {
        PerformanceLabel::Good
    } else if acceptance_rate > 0.0 {
        PerformanceLabel::NeedsImprovement
    } else {
        PerformanceLabel::NoResultsYet
    }
}

/// One row per job with status tallies, ordered by `sort`.
pub fn build_top_jobs(
    jobs: &[JobPosting],
    applications: &[TaggedApplication],
    sort: TopJobsSort,
) -> Vec<TopJobRow> {
    let grouped = applications_per_job(applications);

    let mut rows: Vec<TopJobRow> = jobs
        .iter()
        .map(|job| {
            let group = grouped.get(&job.id).map(Vec::as_slice).unwrap_or(&[]);
            let tally = |status: ApplicationStatus| {
                group.iter().filter(|item| item.status() == status).count()
            };
            let application_count = group.len();
            let accepted_count = tally(ApplicationStatus::Accepted);
            let acceptance_rate =
                round1(percentage(accepted_count as f64, application_count as f64));

            TopJobRow {
                job_id: job.id.clone(),
                title: job.title.clone(),
                application_count,
                pending_count: tally(ApplicationStatus::Pending),
                accepted_count,
                rejected_count: tally(ApplicationStatus::Rejected),
                acceptance_rate,
                performance: performance_label(application_count, acceptance_rate),
            }
        })
        .collect();

    sort_top_jobs(&mut rows, sort);
    rows
}

/// Orders rows by the selected column. Ties always fall back to ascending job
/// id so repeated sorts of the same input agree.
pub fn sort_top_jobs(rows: &mut [TopJobRow], sort: TopJobsSort) {
    rows.sort_by(|left, right| {
        let primary = compare_column(left, right, sort.column);
        let primary = match sort.direction {
            SortDirection::Ascending => primary,
            SortDirection::Descending => primary.reverse(),
        };
        primary.then_with(|| left.job_id.cmp(&right.job_id))
    });
}

fn compare_column(left: &TopJobRow, right: &TopJobRow, column: TopJobsColumn) -> Ordering {
    match column {
        TopJobsColumn::Title => left
            .title
            .to_lowercase()
            .cmp(&right.title.to_lowercase()),
        TopJobsColumn::Applications => left.application_count.cmp(&right.application_count),
        TopJobsColumn::Pending => left.pending_count.cmp(&right.pending_count),
        TopJobsColumn::Accepted => left.accepted_count.cmp(&right.accepted_count),
        TopJobsColumn::Rejected => left.rejected_count.cmp(&right.rejected_count),
        TopJobsColumn::AcceptanceRate => left.acceptance_rate.total_cmp(&right.acceptance_rate),
    }
}
