use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::super::domain::{TaggedApplication, ValidationError};
use super::views::{TrendDirection, TrendPoint, TrendSeries, TrendStats};

/// Window sizes the trend chart supports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum DateRange {
    Week,
    #[default]
    Month,
    Quarter,
    Year,
}

impl DateRange {
    pub const fn ordered() -> [Self; 4] {
        [Self::Week, Self::Month, Self::Quarter, Self::Year]
    }

    pub const fn days(self) -> u32 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Quarter => 90,
            Self::Year => 365,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Week => "Last 7 days",
            Self::Month => "Last 30 days",
            Self::Quarter => "Last 90 days",
            Self::Year => "Last 365 days",
        }
    }

    /// First calendar day inside the window ending on `today`.
    pub fn first_day(self, today: NaiveDate) -> NaiveDate {
        today - Duration::days(i64::from(self.days()) - 1)
    }
}

impl TryFrom<u32> for DateRange {
    type Error = ValidationError;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        Self::ordered()
            .into_iter()
            .find(|range| range.days() == days)
            .ok_or(ValidationError::UnsupportedDateRange(days))
    }
}

impl From<DateRange> for u32 {
    fn from(range: DateRange) -> Self {
        range.days()
    }
}

/// Daily application counts for the window ending on `today`, one point per
/// day whether or not anything was received.
pub fn build_trend(
    applications: &[TaggedApplication],
    range: DateRange,
    today: NaiveDate,
) -> TrendSeries {
    let first_day = range.first_day(today);

    let mut buckets: HashMap<NaiveDate, usize> = HashMap::new();
    for item in applications {
        let day = item.record.applied_at.date_naive();
        if day >= first_day && day <= today {
            *buckets.entry(day).or_default() += 1;
        }
    }

    let points: Vec<TrendPoint> = first_day
        .iter_days()
        .take(range.days() as usize)
        .map(|date| TrendPoint {
            date,
            count: buckets.get(&date).copied().unwrap_or(0),
        })
        .collect();

    let counts: Vec<usize> = points.iter().map(|point| point.count).collect();

    TrendSeries {
        range,
        direction: classify_direction(&counts),
        stats: summarize(&counts),
        points,
    }
}

/// Compare the mean of the second half of the series against the first half
/// with a ten percent dead band.
pub fn classify_direction(counts: &[usize]) -> TrendDirection {
    if counts.len() < 2 {
        return TrendDirection::Stable;
    }

    let (first, second) = counts.split_at(counts.len() / 2);
    let first_mean = mean(first);
    let second_mean = mean(second);

    if second_mean > first_mean * 1.1 {
        TrendDirection::Up
    } else if second_mean < first_mean * 0.9 {
        TrendDirection::Down
    } else {
        TrendDirection::Stable
    }
}

fn summarize(counts: &[usize]) -> TrendStats {
    TrendStats {
        max: counts.iter().copied().max().unwrap_or(0),
        min: counts.iter().copied().min().unwrap_or(0),
        mean: mean(counts),
        total: counts.iter().sum(),
    }
}

fn mean(counts: &[usize]) -> f64 {
    if counts.is_empty() {
        0.0
    } else {
        counts.iter().sum::<usize>() as f64 / counts.len() as f64
    }
}
