use std::io::Write;

use super::analytics::TopJobRow;
use super::domain::TaggedApplication;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush csv output: {0}")]
    Io(#[from] std::io::Error),
}

pub fn export_top_jobs_csv<W: Write>(rows: &[TopJobRow], writer: W) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "Job ID",
        "Title",
        "Applications",
        "Pending",
        "Accepted",
        "Rejected",
        "Acceptance Rate",
        "Performance",
    ])?;

    for row in rows {
        csv.write_record(&[
            row.job_id.0.clone(),
            row.title.clone(),
            row.application_count.to_string(),
            row.pending_count.to_string(),
            row.accepted_count.to_string(),
            row.rejected_count.to_string(),
            format!("{:.1}", row.acceptance_rate),
            row.performance.label().to_string(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

pub fn export_applications_csv<'a, W, I>(items: I, writer: W) -> Result<(), ExportError>
where
    W: Write,
    I: IntoIterator<Item = &'a TaggedApplication>,
{
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "Application ID",
        "Job",
        "Applicant",
        "Email",
        "Phone",
        "Status",
        "Applied At",
    ])?;

    for item in items {
        let record = &item.record;
        csv.write_record(&[
            record.id.0.clone(),
            item.job.title.clone(),
            record.applicant.name.clone().unwrap_or_default(),
            record.applicant.email.clone(),
            record.applicant.phone.clone().unwrap_or_default(),
            record.status.label().to_string(),
            record.applied_at.to_rfc3339(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}
