use crate::infra::{end_of_day, load_repositories, FLAKY_APPLICATION};
use chrono::{DateTime, NaiveDate, Utc};
use clap::Args;
use hiring_insights::dashboard::analytics::{
    AggregateParams, DateRange, DerivedAggregate, PerformanceMetric,
};
use hiring_insights::dashboard::review::{FilterPatch, StatusScope};
use hiring_insights::dashboard::{
    ApplicationId, ApplicationRepository, ApplicationStatus, DashboardError, DashboardSession,
    JobRepository, RefreshOutcome, ReviewBoard,
};
use hiring_insights::error::AppError;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the reporting date (defaults to today).
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Stop after the dashboard report, skipping the review walkthrough.
    #[arg(long)]
    pub(crate) skip_review: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DashboardReportArgs {
    /// JSON fixture with `jobs` and `applications` (sample data otherwise)
    #[arg(long)]
    pub(crate) fixture: Option<PathBuf>,
    /// Trend window in days: 7, 30, 90 or 365
    #[arg(long, default_value_t = 30)]
    pub(crate) range: u32,
    /// Ranking metric for job performance: applications, views or conversion_rate
    #[arg(long, default_value = "applications")]
    pub(crate) metric: String,
    /// Evaluation date for the report (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the aggregate as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) async fn run_dashboard_report(args: DashboardReportArgs) -> Result<(), AppError> {
    let DashboardReportArgs {
        fixture,
        range,
        metric,
        today,
        json,
    } = args;

    let now = today.map(end_of_day).unwrap_or_else(Utc::now);
    let params = AggregateParams {
        range: DateRange::try_from(range)?,
        metric: metric.parse::<PerformanceMetric>()?,
        ..AggregateParams::default()
    };

    let (jobs, applications) = load_repositories(fixture.as_deref(), now)?;
    let session = DashboardSession::new(Arc::new(jobs), Arc::new(applications), params);
    let aggregate = refreshed(&session, now).await?;

    if json {
        match serde_json::to_string_pretty(aggregate.as_ref()) {
            Ok(rendered) => println!("{rendered}"),
            Err(err) => println!("Aggregate could not be rendered as JSON: {err}"),
        }
    } else {
        render_dashboard(&aggregate, now);
    }
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let now = args.today.map(end_of_day).unwrap_or_else(Utc::now);

    println!("Hiring insights demo");
    let (jobs, applications) = load_repositories(None, now)?;
    applications.fail_application(ApplicationId(FLAKY_APPLICATION.to_string()));
    let applications = Arc::new(applications);
    let session = DashboardSession::new(
        Arc::new(jobs),
        applications.clone(),
        AggregateParams::default(),
    );

    let aggregate = refreshed(&session, now).await?;
    render_dashboard(&aggregate, now);

    if args.skip_review {
        return Ok(());
    }

    println!("\nReview walkthrough");
    let Some(snapshot) = session.snapshot() else {
        return Ok(());
    };
    let mut board = ReviewBoard::from_snapshot(applications, &snapshot);
    board.set_filter(FilterPatch {
        status: Some(StatusScope::Only(ApplicationStatus::Pending)),
        ..FilterPatch::default()
    });

    let visible = board.visible(now);
    println!("Pending applications ({}):", visible.len());
    for item in &visible {
        println!(
            "  - {} | {} | {} | applied {}",
            item.id(),
            item.record.applicant.name.as_deref().unwrap_or("(no name)"),
            item.job.title,
            item.record.applied_at.format("%Y-%m-%d")
        );
    }

    board.select_all(true, now);
    println!(
        "\nMarking {} selected applications as {}",
        board.selection().len(),
        ApplicationStatus::Reviewed.label()
    );
    let outcome = board.bulk_update_status(ApplicationStatus::Reviewed).await?;
    let report = outcome.report();
    println!("- {} updated | {} failed", report.succeeded, report.failed);
    for failure in &report.failures {
        println!("  ! {}: {}", failure.application_id, failure.message);
    }

    if let Some(updated) = session.apply_confirmed_updates(outcome.updated, now) {
        println!("\nFunnel after review");
        render_funnel(&updated);
    }

    Ok(())
}

async fn refreshed<J, A>(
    session: &DashboardSession<J, A>,
    now: DateTime<Utc>,
) -> Result<Arc<DerivedAggregate>, AppError>
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    match session.refresh(now).await? {
        RefreshOutcome::Applied(aggregate) => Ok(aggregate),
        RefreshOutcome::Stale { .. } => Err(DashboardError::Superseded.into()),
    }
}

pub(crate) fn render_dashboard(aggregate: &DerivedAggregate, now: DateTime<Utc>) {
    let overview = &aggregate.overview;
    println!("Recruitment dashboard as of {}", now.format("%Y-%m-%d %H:%M UTC"));
    println!(
        "- {} jobs ({} active) | {} applications | {} views | {:.1}% conversion",
        overview.total_jobs,
        overview.active_jobs,
        overview.total_applications,
        overview.total_views,
        overview.conversion_rate
    );

    if !aggregate.warnings.is_empty() {
        println!("\nPartial data");
        for warning in &aggregate.warnings {
            println!("  ! {} ({}): {}", warning.job_title, warning.job_id, warning.message);
        }
    }

    println!("\nHiring funnel");
    render_funnel(aggregate);

    println!("\nStatus breakdown");
    for entry in &aggregate.status_breakdown {
        println!("  - {}: {}", entry.label, entry.count);
    }

    println!(
        "\nJob performance (by {})",
        match aggregate.performance_metric {
            PerformanceMetric::Applications => "applications",
            PerformanceMetric::Views => "views",
            PerformanceMetric::ConversionRate => "conversion rate",
        }
    );
    for row in &aggregate.performance {
        println!(
            "  - {} [{}]: {} views | {} applications | {:.1}%",
            row.title,
            row.status.label(),
            row.views,
            row.applications,
            row.conversion_rate
        );
    }

    let trend = &aggregate.trend;
    println!(
        "\nApplication trend ({}): {} | total {} | peak {} | low {} | {:.1}/day",
        trend.range.label(),
        trend.direction.label(),
        trend.stats.total,
        trend.stats.max,
        trend.stats.min,
        trend.stats.mean
    );
    let recent: Vec<String> = trend
        .points
        .iter()
        .filter(|point| point.count > 0)
        .rev()
        .take(5)
        .map(|point| format!("{} ({})", point.date.format("%m-%d"), point.count))
        .collect();
    if !recent.is_empty() {
        println!("  Recent activity: {}", recent.join(", "));
    }

    println!("\nTop jobs");
    for row in &aggregate.top_jobs {
        println!(
            "  - {}: {} applications | {} pending | {} accepted | {} rejected | {:.1}% ({})",
            row.title,
            row.application_count,
            row.pending_count,
            row.accepted_count,
            row.rejected_count,
            row.acceptance_rate,
            row.performance.label()
        );
    }

    if aggregate.insights.is_empty() {
        println!("\nInsights: none");
    } else {
        println!("\nInsights");
        for insight in &aggregate.insights {
            println!(
                "  [{}] {}: {} -> {}",
                insight.severity.label(),
                insight.title,
                insight.description,
                insight.action
            );
        }
    }
}

fn render_funnel(aggregate: &DerivedAggregate) {
    for stage in &aggregate.funnel.stages {
        println!(
            "  - {}: {} ({:.1}%)",
            stage.label, stage.count, stage.conversion_rate
        );
    }
    println!("  - Rejected: {}", aggregate.funnel.rejected);
}
