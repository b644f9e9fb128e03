use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::analytics::{
    AggregateParams, DateRange, DerivedAggregate, PerformanceMetric, SortDirection, TopJobsColumn,
    TopJobsSort,
};
use super::domain::{
    ApplicationId, ApplicationRecord, ApplicationStatus, TaggedApplication, ValidationError,
};
use super::export::{export_applications_csv, export_top_jobs_csv};
use super::repository::{ApplicationRepository, JobRepository};
use super::review::{ApplicationFilter, BulkReport, FilterPatch, ReviewBoard};
use super::session::{DashboardError, DashboardSession, RefreshOutcome};
use crate::error::AppError;

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Shared state behind the dashboard routes: one session and the review board
/// populated from its latest snapshot.
pub struct DashboardState<J, A> {
    session: Arc<DashboardSession<J, A>>,
    board: Arc<Mutex<ReviewBoard<A>>>,
    clock: Clock,
}

impl<J, A> Clone for DashboardState<J, A> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            board: Arc::clone(&self.board),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<J, A> DashboardState<J, A>
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    pub fn new(session: Arc<DashboardSession<J, A>>, applications: Arc<A>) -> Self {
        Self {
            session,
            board: Arc::new(Mutex::new(ReviewBoard::new(applications, Vec::new()))),
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    pub fn session(&self) -> &Arc<DashboardSession<J, A>> {
        &self.session
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Refresh the session and repopulate the review board from the new
    /// snapshot.
    pub async fn refresh(&self, now: DateTime<Utc>) -> Result<Arc<DerivedAggregate>, AppError> {
        match self.session.refresh(now).await? {
            RefreshOutcome::Applied(aggregate) => {
                if let Some(snapshot) = self.session.snapshot() {
                    self.board
                        .lock()
                        .await
                        .replace_items(snapshot.applications.clone());
                }
                Ok(aggregate)
            }
            RefreshOutcome::Stale { .. } => Err(DashboardError::Superseded.into()),
        }
    }

    async fn ensure_loaded(&self, now: DateTime<Utc>) -> Result<(), AppError> {
        if self.session.snapshot().is_none() {
            self.refresh(now).await?;
        }
        Ok(())
    }
}

/// Router exposing the dashboard aggregate, CSV exports and the review list.
pub fn dashboard_router<J, A>(state: DashboardState<J, A>) -> Router
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    Router::new()
        .route("/api/v1/dashboard", get(dashboard_handler::<J, A>))
        .route(
            "/api/v1/dashboard/top-jobs.csv",
            get(top_jobs_csv_handler::<J, A>),
        )
        .route("/api/v1/applications", get(applications_handler::<J, A>))
        .route(
            "/api/v1/applications.csv",
            get(applications_csv_handler::<J, A>),
        )
        .route(
            "/api/v1/applications/{application_id}/status",
            patch(update_status_handler::<J, A>),
        )
        .route(
            "/api/v1/applications/bulk-status",
            post(bulk_status_handler::<J, A>),
        )
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub range_days: Option<u32>,
    pub metric: Option<String>,
    pub sort: Option<String>,
    pub direction: Option<String>,
}

impl DashboardQuery {
    /// Validate every field before anything is applied. Omitted fields keep
    /// the value from `base`; an omitted direction resets to the default.
    fn into_params(self, base: AggregateParams) -> Result<AggregateParams, ValidationError> {
        let mut params = base;
        if let Some(days) = self.range_days {
            params.range = DateRange::try_from(days)?;
        }
        if let Some(metric) = self.metric.as_deref() {
            params.metric = metric.parse::<PerformanceMetric>()?;
        }
        if self.sort.is_some() || self.direction.is_some() {
            let column = self
                .sort
                .as_deref()
                .map(str::parse::<TopJobsColumn>)
                .transpose()?
                .unwrap_or(base.top_jobs_sort.column);
            let direction = parse_or_default::<SortDirection>(self.direction.as_deref())?;
            params.top_jobs_sort = TopJobsSort::new(column, direction);
        }
        Ok(params)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ApplicationQuery {
    pub job_id: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub date_range: Option<String>,
    pub sort: Option<String>,
}

impl ApplicationQuery {
    /// Every field is provided so the request fully describes the filter.
    fn into_patch(self) -> Result<FilterPatch, ValidationError> {
        Ok(FilterPatch {
            job: Some(parse_or_default(self.job_id.as_deref())?),
            status: Some(parse_or_default(self.status.as_deref())?),
            search: Some(self.search.unwrap_or_default()),
            applied_within: Some(parse_or_default(self.date_range.as_deref())?),
            sort: Some(parse_or_default(self.sort.as_deref())?),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct BulkStatusChange {
    pub ids: Vec<String>,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ApplicationList {
    pub filter: ApplicationFilter,
    pub total: usize,
    pub items: Vec<TaggedApplication>,
}

fn parse_or_default<T>(raw: Option<&str>) -> Result<T, ValidationError>
where
    T: FromStr<Err = ValidationError> + Default,
{
    raw.map(str::parse).transpose().map(Option::unwrap_or_default)
}

pub(crate) async fn dashboard_handler<J, A>(
    State(state): State<DashboardState<J, A>>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DerivedAggregate>, AppError>
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let now = state.now();
    let params = query.into_params(state.session().params())?;

    state.refresh(now).await?;
    let aggregate = state
        .session()
        .derive(&params, now)
        .ok_or(DashboardError::Superseded)?;
    Ok(Json(aggregate))
}

pub(crate) async fn top_jobs_csv_handler<J, A>(
    State(state): State<DashboardState<J, A>>,
) -> Result<Response, AppError>
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let now = state.now();
    state.ensure_loaded(now).await?;
    let rows = state
        .session()
        .current()
        .map(|aggregate| aggregate.top_jobs.clone())
        .unwrap_or_default();

    let mut buffer = Vec::new();
    export_top_jobs_csv(&rows, &mut buffer)?;
    Ok(csv_response(buffer))
}

pub(crate) async fn applications_handler<J, A>(
    State(state): State<DashboardState<J, A>>,
    Query(query): Query<ApplicationQuery>,
) -> Result<Json<ApplicationList>, AppError>
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let now = state.now();
    let patch = query.into_patch()?;
    state.ensure_loaded(now).await?;

    let mut board = state.board.lock().await;
    board.set_filter(patch);
    let items: Vec<TaggedApplication> = board.visible(now).into_iter().cloned().collect();
    Ok(Json(ApplicationList {
        filter: board.filter().clone(),
        total: items.len(),
        items,
    }))
}

pub(crate) async fn applications_csv_handler<J, A>(
    State(state): State<DashboardState<J, A>>,
    Query(query): Query<ApplicationQuery>,
) -> Result<Response, AppError>
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let now = state.now();
    let patch = query.into_patch()?;
    state.ensure_loaded(now).await?;

    let mut board = state.board.lock().await;
    board.set_filter(patch);
    let mut buffer = Vec::new();
    export_applications_csv(board.visible(now), &mut buffer)?;
    Ok(csv_response(buffer))
}

pub(crate) async fn update_status_handler<J, A>(
    State(state): State<DashboardState<J, A>>,
    Path(application_id): Path<String>,
    Json(change): Json<StatusChange>,
) -> Result<Json<ApplicationRecord>, AppError>
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let now = state.now();
    let status = change.status.parse::<ApplicationStatus>()?;
    state.ensure_loaded(now).await?;

    let application_id = ApplicationId(application_id);
    let record = state
        .board
        .lock()
        .await
        .update_status(&application_id, status, now)
        .await?;
    state
        .session()
        .apply_confirmed_updates([record.clone()], now);
    Ok(Json(record))
}

/// Selects exactly the requested ids, which must all be visible under the
/// board's current filter, then runs the bulk update.
pub(crate) async fn bulk_status_handler<J, A>(
    State(state): State<DashboardState<J, A>>,
    Json(request): Json<BulkStatusChange>,
) -> Result<Json<BulkReport>, AppError>
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let now = state.now();
    let status = request.status.parse::<ApplicationStatus>()?;
    state.ensure_loaded(now).await?;

    let ids: BTreeSet<ApplicationId> = request.ids.into_iter().map(ApplicationId).collect();
    let outcome = {
        let mut board = state.board.lock().await;
        board.select_all(false, now);
        for id in &ids {
            board.toggle_select(id, now)?;
        }
        board.bulk_update_status(status).await?
    };

    state
        .session()
        .apply_confirmed_updates(outcome.updated.iter().cloned(), now);
    Ok(Json(outcome.report()))
}

fn csv_response(body: Vec<u8>) -> Response {
    (
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::dashboard::analytics::tests::common::{days_ago, job, now, record_at};
    use crate::dashboard::analytics::AggregateParams;
    use crate::dashboard::domain::JobStatus;
    use crate::dashboard::memory::{InMemoryApplicationRepository, InMemoryJobRepository};

    type MemoryState = DashboardState<InMemoryJobRepository, InMemoryApplicationRepository>;

    fn state() -> MemoryState {
        let jobs = Arc::new(InMemoryJobRepository::new(vec![
            job("job-1", "Barista", JobStatus::Published, 200, 2),
            job("job-2", "Line Cook", JobStatus::Published, 50, 2),
        ]));
        let applications = Arc::new(InMemoryApplicationRepository::new(vec![
            record_at("job-1", "a-1", ApplicationStatus::Pending, days_ago(1, 9)),
            record_at("job-1", "a-2", ApplicationStatus::Reviewed, days_ago(2, 9)),
            record_at("job-2", "a-3", ApplicationStatus::Pending, days_ago(3, 9)),
            record_at("job-2", "a-4", ApplicationStatus::Interviewed, days_ago(20, 9)),
        ]));
        applications.fail_application(ApplicationId("a-3".to_string()));

        let session = Arc::new(DashboardSession::new(
            jobs,
            applications.clone(),
            AggregateParams::default(),
        ));
        DashboardState::new(session, applications).with_clock(now)
    }

    fn router() -> Router {
        dashboard_router(state())
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = router
            .clone()
            .oneshot(request)
            .await
            .expect("router responds");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        (status, body.to_vec())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    fn json_request(method: &str, uri: &str, payload: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request")
    }

    fn parse(body: &[u8]) -> Value {
        serde_json::from_slice(body).expect("json body")
    }

    #[tokio::test]
    async fn dashboard_returns_aggregate_for_requested_range() {
        let router = router();

        let (status, body) =
            send(&router, get("/api/v1/dashboard?range_days=7&metric=views")).await;

        assert_eq!(status, StatusCode::OK);
        let payload = parse(&body);
        assert_eq!(payload["overview"]["total_jobs"], 2);
        assert_eq!(payload["trend"]["points"].as_array().map(Vec::len), Some(7));
        assert_eq!(payload["trend"]["stats"]["total"], 3);
        assert_eq!(payload["performance_metric"], "views");
        assert_eq!(payload["performance"][0]["job_id"], "job-1");
    }

    #[tokio::test]
    async fn unsupported_range_is_unprocessable() {
        let router = router();

        let (status, body) = send(&router, get("/api/v1/dashboard?range_days=14")).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(parse(&body)["error"]
            .as_str()
            .is_some_and(|message| message.contains("14")));
    }

    #[tokio::test]
    async fn invalid_parameter_leaves_session_untouched() {
        let state = state();
        let router = dashboard_router(state.clone());

        let (status, _) = send(&router, get("/api/v1/dashboard?range_days=7&metric=salary")).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(state.session().params(), AggregateParams::default());
        assert_eq!(state.session().params().range, DateRange::Month);
        assert_eq!(state.session().generation(), 0);
    }

    #[tokio::test]
    async fn dashboard_parameters_apply_to_one_request_only() {
        let state = state();
        let router = dashboard_router(state.clone());

        let (_, body) = send(
            &router,
            get("/api/v1/dashboard?range_days=7&direction=ascending"),
        )
        .await;
        let narrowed = parse(&body);
        let (_, body) = send(&router, get("/api/v1/dashboard")).await;
        let default = parse(&body);

        assert_eq!(narrowed["trend"]["points"].as_array().map(Vec::len), Some(7));
        assert_eq!(narrowed["top_jobs_sort"]["direction"], "ascending");
        assert_eq!(default["trend"]["points"].as_array().map(Vec::len), Some(30));
        assert_eq!(default["top_jobs_sort"]["direction"], "descending");
        assert_eq!(state.session().params(), AggregateParams::default());
    }

    #[tokio::test]
    async fn applications_are_filtered_by_query() {
        let router = router();

        let (status, body) = send(&router, get("/api/v1/applications?status=pending")).await;

        assert_eq!(status, StatusCode::OK);
        let payload = parse(&body);
        assert_eq!(payload["total"], 2);
        assert_eq!(payload["items"][0]["id"], "a-1");
        assert_eq!(payload["items"][1]["job"]["title"], "Line Cook");
    }

    #[tokio::test]
    async fn status_update_is_reflected_in_the_funnel() {
        let router = router();

        let (status, body) = send(
            &router,
            json_request(
                "PATCH",
                "/api/v1/applications/a-1/status",
                json!({ "status": "accepted" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(parse(&body)["status"], "accepted");

        let (_, body) = send(&router, get("/api/v1/dashboard")).await;
        let stages = parse(&body)["funnel"]["stages"].clone();
        assert_eq!(stages[4]["stage"], "accepted");
        assert_eq!(stages[4]["count"], 1);
    }

    #[tokio::test]
    async fn unknown_application_is_not_found() {
        let router = router();

        let (status, _) = send(
            &router,
            json_request(
                "PATCH",
                "/api/v1/applications/missing/status",
                json!({ "status": "reviewed" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn bulk_update_reports_partial_failure() {
        let router = router();

        let (status, body) = send(
            &router,
            json_request(
                "POST",
                "/api/v1/applications/bulk-status",
                json!({ "ids": ["a-1", "a-3"], "status": "reviewed" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let report = parse(&body);
        assert_eq!(report["succeeded"], 1);
        assert_eq!(report["failed"], 1);
        assert_eq!(report["failures"][0]["application_id"], "a-3");

        let (_, body) = send(&router, get("/api/v1/applications?status=reviewed")).await;
        assert_eq!(parse(&body)["total"], 2);
    }

    #[tokio::test]
    async fn empty_bulk_request_is_rejected() {
        let router = router();

        let (status, _) = send(
            &router,
            json_request(
                "POST",
                "/api/v1/applications/bulk-status",
                json!({ "ids": [], "status": "reviewed" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn top_jobs_export_is_csv() {
        let router = router();

        let response = router
            .clone()
            .oneshot(get("/api/v1/dashboard/top-jobs.csv"))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let text = String::from_utf8(body.to_vec()).expect("utf8");
        assert_eq!(text.lines().count(), 3);
        assert!(text.starts_with("Job ID,Title"));
    }
}
