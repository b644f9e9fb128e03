use crate::cli::ServeArgs;
use crate::infra::{load_repositories, AppState};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use hiring_insights::config::AppConfig;
use hiring_insights::dashboard::{dashboard_router, DashboardSession, DashboardState};
use hiring_insights::error::AppError;
use hiring_insights::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let (jobs, applications) = load_repositories(args.fixture.as_deref(), Utc::now())?;
    let applications = Arc::new(applications);
    let session = Arc::new(DashboardSession::new(
        Arc::new(jobs),
        applications.clone(),
        config.dashboard.params(),
    ));
    let dashboard = DashboardState::new(session, applications);

    match dashboard.refresh(Utc::now()).await {
        Ok(aggregate) => info!(
            jobs = aggregate.overview.total_jobs,
            insights = aggregate.insights.len(),
            "initial dashboard aggregate ready"
        ),
        Err(err) => warn!(error = %err, "initial dashboard refresh failed; serving on demand"),
    }

    let app = with_service_routes(dashboard_router(dashboard))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "hiring insights service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
