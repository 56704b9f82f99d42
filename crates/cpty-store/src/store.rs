//! Application state store
//!
//! Owns the in-memory state and the command handlers views dispatch:
//! - Handlers call the injected `CounterpartyApi` and translate failures into state
//! - Mutations are optimistic, then reconciled with the server's re-listed records
//! - Background refreshes are discarded if a mutation overlapped them
//!
//! Nothing here returns an error to the caller; failures end up as flags and
//! messages in `AppState`.
//!
//! A failed delete reinserts the record at the index it had when the delete
//! started. If another mutation shifted the list meanwhile, that index is
//! stale and the record lands out of order until the next reconcile or
//! refresh replaces the list.

use crate::state::{
    reduce, Action, AppState, DELETE_ERROR, EDIT_ERROR, LOAD_ERROR, SAVE_ERROR,
};
use chrono::Utc;
use cpty_client::{CounterpartyApi, ServiceError, StatusProbe};
use cpty_model::{validate, Counterparty, CounterpartyFormData, CounterpartyId, FormErrors};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Result of `Store::handle_save`
#[derive(Debug)]
pub enum SaveOutcome {
    /// Server accepted the write
    Saved,
    /// Validation failed; nothing was sent
    Rejected(FormErrors),
    /// Server or network failure
    Failed(ServiceError),
}

impl SaveOutcome {
    /// Server accepted the write
    #[inline]
    #[must_use]
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved)
    }
}

/// Result of a background refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Records replaced with the server list
    Applied,
    /// Request failed; load status set to failed
    Failed,
    /// A mutation overlapped the request; result ignored
    Discarded,
}

/// Tracks user mutations so overlapping refreshes can be detected
#[derive(Debug, Default)]
struct MutationTracker {
    generation: AtomicU64,
    in_flight: AtomicUsize,
}

impl MutationTracker {
    fn begin(&self) -> MutationGuard<'_> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.generation.fetch_add(1, Ordering::SeqCst);
        MutationGuard { tracker: self }
    }

    /// Generation at request time, or `None` while a mutation is running
    fn ticket(&self) -> Option<u64> {
        let generation = self.generation.load(Ordering::SeqCst);
        (self.in_flight.load(Ordering::SeqCst) == 0).then_some(generation)
    }

    fn is_current(&self, ticket: Option<u64>) -> bool {
        ticket == Some(self.generation.load(Ordering::SeqCst))
    }
}

struct MutationGuard<'a> {
    tracker: &'a MutationTracker,
}

impl Drop for MutationGuard<'_> {
    fn drop(&mut self) {
        self.tracker.generation.fetch_add(1, Ordering::SeqCst);
        self.tracker.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Application state store
#[derive(Debug)]
pub struct Store {
    api: Arc<dyn CounterpartyApi>,
    probe: Option<StatusProbe>,
    state: watch::Sender<AppState>,
    mutations: MutationTracker,
}

impl Store {
    /// Create store over an API implementation
    #[must_use]
    pub fn new(api: Arc<dyn CounterpartyApi>) -> Self {
        let (state, _) = watch::channel(AppState::default());
        Self {
            api,
            probe: None,
            state,
            mutations: MutationTracker::default(),
        }
    }

    /// With connectivity probe, run on every refresh tick
    #[inline]
    #[must_use]
    pub fn with_status_probe(mut self, probe: StatusProbe) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Snapshot of the current state
    #[must_use]
    pub fn state(&self) -> AppState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    /// Apply one action to the state
    pub fn dispatch(&self, action: Action) {
        self.state.send_modify(|state| reduce(state, action));
    }

    /// Initial load: shows the loading state until the list arrives
    pub async fn load(&self) {
        self.dispatch(Action::LoadStarted);
        match self.api.list_all().await {
            Ok(records) => {
                tracing::info!(count = records.len(), "counterparties loaded");
                self.dispatch(Action::RecordsLoaded {
                    records,
                    at: Utc::now(),
                });
            }
            Err(e) => {
                tracing::error!(error = %e, "initial load failed");
                self.dispatch(Action::LoadFailed(LOAD_ERROR));
            }
        }
    }

    /// Background reload; the current table stays visible meanwhile
    pub async fn refresh(&self) -> RefreshOutcome {
        let ticket = self.mutations.ticket();
        let result = self.api.list_all().await;

        if !self.mutations.is_current(ticket) {
            tracing::debug!("refresh overlapped a mutation, discarding result");
            return RefreshOutcome::Discarded;
        }

        match result {
            Ok(records) => {
                self.dispatch(Action::RecordsLoaded {
                    records,
                    at: Utc::now(),
                });
                RefreshOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(error = %e, "background refresh failed");
                self.dispatch(Action::LoadFailed(LOAD_ERROR));
                RefreshOutcome::Failed
            }
        }
    }

    /// Update the connectivity indicator
    pub async fn probe_status(&self) {
        if let Some(probe) = &self.probe {
            let status = probe.check().await;
            self.dispatch(Action::ServerStatusChanged(status));
        }
    }

    /// One polling step: refresh records and probe connectivity
    pub async fn tick(&self) {
        self.refresh().await;
        self.probe_status().await;
    }

    /// Open the modal for a new record
    pub fn handle_add_new(&self) {
        self.dispatch(Action::OpenCreate);
    }

    /// Close the modal without saving
    pub fn handle_cancel(&self) {
        self.dispatch(Action::CloseModal);
    }

    /// Open the modal on the latest server copy of a record
    pub async fn handle_edit(&self, id: &CounterpartyId) {
        match self.api.get_by_id(id).await {
            Ok(record) => self.dispatch(Action::OpenEdit(record)),
            Err(e) => {
                tracing::error!(%id, error = %e, "could not open record for editing");
                self.dispatch(Action::LoadFailed(EDIT_ERROR));
            }
        }
    }

    /// Remove a record: local removal first, then the server call
    ///
    /// On failure the record is put back at its index from before the
    /// request, which may be stale under concurrent mutations (see module docs).
    pub async fn handle_delete(&self, id: &CounterpartyId) {
        let _guard = self.mutations.begin();
        let removed = {
            let state = self.state.borrow();
            state
                .position(id)
                .map(|index| (index, state.records[index].clone()))
        };
        self.dispatch(Action::RecordRemoved(id.clone()));

        match self.api.delete(id).await {
            Ok(records) => self.reconcile(records),
            Err(e) => {
                tracing::error!(%id, error = %e, "delete failed, restoring record");
                if let Some((index, record)) = removed {
                    self.dispatch(Action::RecordReinserted { index, record });
                }
                self.dispatch(Action::LoadFailed(DELETE_ERROR));
            }
        }
    }

    /// Validate and persist the form, then close the modal
    ///
    /// A form with an id updates that record (applied locally first); a
    /// form without one creates a record under a fresh id. Invalid forms are
    /// rejected before any request and the modal stays open.
    pub async fn handle_save(&self, form: CounterpartyFormData) -> SaveOutcome {
        let errors = validate(&form);
        if !errors.is_empty() {
            tracing::debug!(%errors, "save rejected by validation");
            return SaveOutcome::Rejected(errors);
        }

        let _guard = self.mutations.begin();
        let result = match form.id.clone() {
            Some(id) => self.update(id, form).await,
            None => self.api.create(form).await,
        };

        let outcome = match result {
            Ok(records) => {
                self.reconcile(records);
                SaveOutcome::Saved
            }
            Err(e) => {
                tracing::error!(error = %e, "save failed");
                self.dispatch(Action::LoadFailed(SAVE_ERROR));
                SaveOutcome::Failed(e)
            }
        };
        self.dispatch(Action::CloseModal);
        outcome
    }

    async fn update(
        &self,
        id: CounterpartyId,
        form: CounterpartyFormData,
    ) -> Result<Vec<Counterparty>, ServiceError> {
        let previous = self.state.borrow().record(&id).cloned();
        self.dispatch(Action::RecordReplaced(
            form.clone().into_counterparty(id.clone()),
        ));

        let result = self.api.update(&id, form).await;
        if result.is_err() {
            if let Some(previous) = previous {
                self.dispatch(Action::RecordReplaced(previous));
            }
        }
        result
    }

    fn reconcile(&self, records: Vec<Counterparty>) {
        if self.state.borrow().records != records {
            tracing::debug!("local records differ from server, replacing");
        }
        self.dispatch(Action::RecordsLoaded {
            records,
            at: Utc::now(),
        });
    }
}
