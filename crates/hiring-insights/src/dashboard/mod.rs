//! Recruitment dashboard: snapshot loading, derived analytics, the review
//! list, and the HTTP surface over them.

pub mod analytics;
pub mod domain;
pub mod export;
pub mod fixture;
pub mod memory;
pub mod repository;
pub mod review;
pub mod router;
pub mod session;
pub mod snapshot;

pub use analytics::{aggregate, AggregateParams, DerivedAggregate};
pub use domain::{
    ApplicationId, ApplicationRecord, ApplicationStatus, JobId, JobPosting, JobStatus,
    TaggedApplication, ValidationError,
};
pub use export::{export_applications_csv, export_top_jobs_csv, ExportError};
pub use fixture::{load_fixture, DashboardFixture, FixtureError};
pub use memory::{InMemoryApplicationRepository, InMemoryJobRepository};
pub use repository::{ApplicationRepository, JobQuery, JobRepository, RepositoryError};
pub use review::{ReviewBoard, ReviewError};
pub use router::{dashboard_router, DashboardState};
pub use session::{DashboardError, DashboardSession, RefreshOutcome};
pub use snapshot::{DashboardSnapshot, FetchWarning, SnapshotLoader};
