use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::super::domain::{
    ApplicationId, ApplicationNote, ApplicationRecord, ApplicationStatus, TaggedApplication,
    ValidationError,
};
use super::super::repository::{ApplicationRepository, RepositoryError};
use super::super::snapshot::DashboardSnapshot;
use super::bulk::{dispatch_status_updates, BulkOutcome};
use super::filter::{ApplicationFilter, FilterPatch};

/// Review screen state: the flattened application list, the active filter,
/// and the multi-select set. The selection is always a subset of the visible
/// list.
pub struct ReviewBoard<A> {
    repository: Arc<A>,
    items: Vec<TaggedApplication>,
    filter: ApplicationFilter,
    selection: BTreeSet<ApplicationId>,
}

impl<A> ReviewBoard<A>
where
    A: ApplicationRepository + 'static,
{
    pub fn new(repository: Arc<A>, items: Vec<TaggedApplication>) -> Self {
        Self {
            repository,
            items,
            filter: ApplicationFilter::default(),
            selection: BTreeSet::new(),
        }
    }

    pub fn from_snapshot(repository: Arc<A>, snapshot: &DashboardSnapshot) -> Self {
        Self::new(repository, snapshot.applications.clone())
    }

    /// Swap in a freshly fetched list. The filter is kept; the selection is not.
    pub fn replace_items(&mut self, items: Vec<TaggedApplication>) {
        self.items = items;
        self.selection.clear();
    }

    pub fn items(&self) -> &[TaggedApplication] {
        &self.items
    }

    pub fn get(&self, application_id: &ApplicationId) -> Option<&TaggedApplication> {
        self.items.iter().find(|item| item.id() == application_id)
    }

    pub fn filter(&self) -> &ApplicationFilter {
        &self.filter
    }

    pub fn selection(&self) -> &BTreeSet<ApplicationId> {
        &self.selection
    }

    pub fn visible(&self, now: DateTime<Utc>) -> Vec<&TaggedApplication> {
        self.filter.apply(&self.items, now)
    }

    /// Apply a partial filter update. Any provided field clears the selection.
    pub fn set_filter(&mut self, patch: FilterPatch) {
        if patch.is_empty() {
            return;
        }
        self.filter = self.filter.patched(patch);
        self.selection.clear();
    }

    /// Returns whether the application is selected afterwards.
    pub fn toggle_select(
        &mut self,
        application_id: &ApplicationId,
        now: DateTime<Utc>,
    ) -> Result<bool, ValidationError> {
        if self.selection.remove(application_id) {
            return Ok(false);
        }

        let visible = self
            .visible(now)
            .iter()
            .any(|item| item.id() == application_id);
        if !visible {
            return Err(ValidationError::NotVisible(application_id.clone()));
        }

        self.selection.insert(application_id.clone());
        Ok(true)
    }

    /// `true` selects exactly the visible list; `false` clears the selection.
    pub fn select_all(&mut self, selected: bool, now: DateTime<Utc>) {
        self.selection = if selected {
            self.visible(now)
                .into_iter()
                .map(|item| item.id().clone())
                .collect()
        } else {
            BTreeSet::new()
        };
    }

    /// Update one application. Local state changes only after the
    /// collaborator confirms.
    pub async fn update_status(
        &mut self,
        application_id: &ApplicationId,
        status: ApplicationStatus,
        now: DateTime<Utc>,
    ) -> Result<ApplicationRecord, ReviewError> {
        if self.get(application_id).is_none() {
            return Err(ReviewError::UnknownApplication(application_id.clone()));
        }

        let record = self
            .repository
            .update_status(application_id, status)
            .await
            .map_err(|source| {
                warn!(application_id = %application_id, error = %source, "status update failed");
                ReviewError::Mutation {
                    application_id: application_id.clone(),
                    source,
                }
            })?;

        self.apply_confirmed(record.clone());
        self.prune_selection(now);
        Ok(record)
    }

    /// Update every selected application concurrently. Failed ids keep their
    /// previous status; the selection is cleared afterwards.
    pub async fn bulk_update_status(
        &mut self,
        status: ApplicationStatus,
    ) -> Result<BulkOutcome, ReviewError> {
        let ids: Vec<ApplicationId> = self.selection.iter().cloned().collect();
        let outcome = dispatch_status_updates(self.repository.as_ref(), &ids, status).await?;

        for record in &outcome.updated {
            self.apply_confirmed(record.clone());
        }
        self.selection.clear();

        info!(
            status = %status,
            succeeded = outcome.updated.len(),
            failed = outcome.failures.len(),
            "bulk status update finished"
        );
        Ok(outcome)
    }

    pub async fn add_note(
        &mut self,
        application_id: &ApplicationId,
        author: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<(), ReviewError> {
        if self.get(application_id).is_none() {
            return Err(ReviewError::UnknownApplication(application_id.clone()));
        }

        self.repository
            .add_note(application_id, text)
            .await
            .map_err(|source| ReviewError::Note {
                application_id: application_id.clone(),
                source,
            })?;

        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.id() == application_id)
        {
            item.record.notes.push(ApplicationNote {
                author: author.to_string(),
                text: text.to_string(),
                added_at: now,
            });
        }
        Ok(())
    }

    fn apply_confirmed(&mut self, record: ApplicationRecord) {
        if let Some(item) = self.items.iter_mut().find(|item| item.id() == &record.id) {
            item.record = record;
        }
    }

    fn prune_selection(&mut self, now: DateTime<Utc>) {
        let visible: HashSet<ApplicationId> = self
            .visible(now)
            .into_iter()
            .map(|item| item.id().clone())
            .collect();
        self.selection.retain(|id| visible.contains(id));
    }
}

/// Error raised by review operations.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("application {0} is not loaded")]
    UnknownApplication(ApplicationId),
    #[error("status update for application {application_id} failed: {source}")]
    Mutation {
        application_id: ApplicationId,
        #[source]
        source: RepositoryError,
    },
    #[error("adding a note to application {application_id} failed: {source}")]
    Note {
        application_id: ApplicationId,
        #[source]
        source: RepositoryError,
    },
}
