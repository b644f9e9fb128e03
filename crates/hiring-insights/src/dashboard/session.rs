use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::analytics::{
    aggregate, AggregateParams, DateRange, DerivedAggregate, PerformanceMetric, TopJobsSort,
};
use super::domain::{ApplicationRecord, ValidationError};
use super::repository::{ApplicationRepository, JobQuery, JobRepository, RepositoryError};
use super::snapshot::{DashboardSnapshot, SnapshotLoader};

/// Result of a refresh. A refresh that was overtaken by a newer one, or by a
/// parameter change, is dropped without touching the session state.
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    Applied(Arc<DerivedAggregate>),
    Stale { generation: u64 },
}

#[derive(Default)]
struct SessionState {
    params: AggregateParams,
    snapshot: Option<Arc<DashboardSnapshot>>,
    aggregate: Option<Arc<DerivedAggregate>>,
}

/// Owns the latest snapshot and its derived aggregate. Every refresh and
/// range change takes a new generation; results carrying an older generation
/// are discarded.
pub struct DashboardSession<J, A> {
    loader: SnapshotLoader<J, A>,
    query: JobQuery,
    generation: AtomicU64,
    state: Mutex<SessionState>,
}

impl<J, A> DashboardSession<J, A>
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    pub fn new(jobs: Arc<J>, applications: Arc<A>, params: AggregateParams) -> Self {
        Self {
            loader: SnapshotLoader::new(jobs, applications),
            query: JobQuery::default(),
            generation: AtomicU64::new(0),
            state: Mutex::new(SessionState {
                params,
                ..SessionState::default()
            }),
        }
    }

    pub fn with_query(mut self, query: JobQuery) -> Self {
        self.query = query;
        self
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn params(&self) -> AggregateParams {
        self.lock().params
    }

    pub fn current(&self) -> Option<Arc<DerivedAggregate>> {
        self.lock().aggregate.clone()
    }

    pub fn snapshot(&self) -> Option<Arc<DashboardSnapshot>> {
        self.lock().snapshot.clone()
    }

    /// Derive an aggregate from the current snapshot with caller-supplied
    /// params. The session's own params and aggregate are left untouched.
    pub fn derive(
        &self,
        params: &AggregateParams,
        now: DateTime<Utc>,
    ) -> Option<DerivedAggregate> {
        let snapshot = self.snapshot()?;
        Some(aggregate(&snapshot, params, now))
    }

    /// Fetch a new snapshot and rebuild the aggregate. Job list failures are
    /// returned; per-job failures surface as warnings on the aggregate.
    pub async fn refresh(&self, now: DateTime<Utc>) -> Result<RefreshOutcome, DashboardError> {
        let generation = self.advance();
        let loaded = self.loader.load(&self.query, now).await;

        // The generation is compared while holding the state lock so a newer
        // commit cannot land between the check and the write.
        let mut state = self.lock();
        let current = self.generation();
        if current != generation {
            debug!(generation, current, "discarding stale dashboard refresh");
            return Ok(RefreshOutcome::Stale { generation });
        }

        let snapshot = Arc::new(loaded.map_err(DashboardError::Fetch)?);
        let aggregate = Arc::new(aggregate(&snapshot, &state.params, now));
        info!(
            generation,
            jobs = snapshot.jobs.len(),
            applications = snapshot.applications.len(),
            warnings = snapshot.warnings.len(),
            "dashboard aggregate rebuilt"
        );
        state.snapshot = Some(snapshot);
        state.aggregate = Some(Arc::clone(&aggregate));
        Ok(RefreshOutcome::Applied(aggregate))
    }

    /// Change the trend window. In-flight refreshes are invalidated and the
    /// aggregate is rebuilt from the current snapshot, if any.
    pub fn set_date_range(
        &self,
        days: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<Arc<DerivedAggregate>>, DashboardError> {
        let range = DateRange::try_from(days)?;
        let mut state = self.lock();
        self.advance();
        Ok(rebuild(&mut state, now, |params| params.range = range))
    }

    pub fn set_sort_metric(
        &self,
        metric: PerformanceMetric,
        now: DateTime<Utc>,
    ) -> Option<Arc<DerivedAggregate>> {
        rebuild(&mut self.lock(), now, |params| params.metric = metric)
    }

    pub fn set_top_jobs_sort(
        &self,
        sort: TopJobsSort,
        now: DateTime<Utc>,
    ) -> Option<Arc<DerivedAggregate>> {
        rebuild(&mut self.lock(), now, |params| params.top_jobs_sort = sort)
    }

    /// Fold collaborator-confirmed records into the snapshot and rebuild.
    pub fn apply_confirmed_updates(
        &self,
        records: impl IntoIterator<Item = ApplicationRecord>,
        now: DateTime<Utc>,
    ) -> Option<Arc<DerivedAggregate>> {
        let mut state = self.lock();
        self.advance();
        let current = state.snapshot.as_ref()?;
        let mut snapshot = DashboardSnapshot::clone(current);
        let mut changed = false;
        for record in records {
            changed |= snapshot.replace_record(record);
        }
        if !changed {
            return state.aggregate.clone();
        }

        let snapshot = Arc::new(snapshot);
        let aggregate = Arc::new(aggregate(&snapshot, &state.params, now));
        state.snapshot = Some(snapshot);
        state.aggregate = Some(Arc::clone(&aggregate));
        Some(aggregate)
    }

    fn advance(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // State is only replaced wholesale, so a poisoned guard still holds a
        // consistent value.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn rebuild(
    state: &mut SessionState,
    now: DateTime<Utc>,
    change: impl FnOnce(&mut AggregateParams),
) -> Option<Arc<DerivedAggregate>> {
    change(&mut state.params);
    let snapshot = state.snapshot.clone()?;
    let aggregate = Arc::new(aggregate(&snapshot, &state.params, now));
    state.aggregate = Some(Arc::clone(&aggregate));
    Some(aggregate)
}

/// Error raised by dashboard operations.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("failed to fetch job postings: {0}")]
    Fetch(#[source] RepositoryError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("refresh superseded by a newer request")]
    Superseded,
}
