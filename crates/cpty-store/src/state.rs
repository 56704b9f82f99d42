//! Application state and its reducer
//!
//! All state changes go through `reduce`, one `Action` at a time:
//! - The record set is always replaced as a whole, never edited in place
//! - Load status, modal mode and connectivity are independent of each other

use chrono::{DateTime, Utc};
use cpty_client::ServerStatus;
use cpty_model::{Counterparty, CounterpartyId};

/// Message shown when the list could not be loaded
pub const LOAD_ERROR: &str = "Ошибка загрузки данных";

/// Message shown when a delete failed
pub const DELETE_ERROR: &str = "Ошибка удаления";

/// Message shown when a save failed
pub const SAVE_ERROR: &str = "Ошибка сохранения";

/// Message shown when a record could not be opened for editing
pub const EDIT_ERROR: &str = "Не удалось загрузить запись";

/// Outcome of the most recent load attempt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LoadStatus {
    /// First load in progress
    #[default]
    Loading,
    /// Last attempt succeeded
    Loaded,
    /// Last attempt failed
    Failed,
}

/// Modal form visibility and mode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ModalState {
    /// No modal shown
    #[default]
    Closed,
    /// Creating a new record
    Create,
    /// Editing the server copy of a record
    Edit(Counterparty),
}

/// Everything the views render from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    /// Records in server order
    pub records: Vec<Counterparty>,
    /// Load status
    pub load: LoadStatus,
    /// Modal state
    pub modal: ModalState,
    /// User-facing message for the last failure
    pub error_message: Option<&'static str>,
    /// Connectivity indicator
    pub server_status: ServerStatus,
    /// When the record set last matched the server
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl AppState {
    /// Modal is visible
    #[inline]
    #[must_use]
    pub fn is_modal_open(&self) -> bool {
        !matches!(self.modal, ModalState::Closed)
    }

    /// First load still running
    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.load == LoadStatus::Loading
    }

    /// Most recent load did not fail
    #[inline]
    #[must_use]
    pub fn loaded_success(&self) -> bool {
        self.load != LoadStatus::Failed
    }

    /// Record open in the modal, if editing
    #[inline]
    #[must_use]
    pub fn editing_record(&self) -> Option<&Counterparty> {
        match &self.modal {
            ModalState::Edit(record) => Some(record),
            ModalState::Create | ModalState::Closed => None,
        }
    }

    /// Look up a record by id
    #[must_use]
    pub fn record(&self, id: &CounterpartyId) -> Option<&Counterparty> {
        self.records.iter().find(|r| &r.id == id)
    }

    /// Position of a record in the list
    #[must_use]
    pub fn position(&self, id: &CounterpartyId) -> Option<usize> {
        self.records.iter().position(|r| &r.id == id)
    }
}

/// State transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Initial load started
    LoadStarted,
    /// Server list received
    RecordsLoaded {
        /// Server-confirmed records
        records: Vec<Counterparty>,
        /// Receive time
        at: DateTime<Utc>,
    },
    /// Load or mutation failed
    LoadFailed(&'static str),
    /// Open modal in create mode
    OpenCreate,
    /// Open modal in edit mode
    OpenEdit(Counterparty),
    /// Close modal
    CloseModal,
    /// Tentatively remove a record
    RecordRemoved(CounterpartyId),
    /// Tentatively replace a record by id
    RecordReplaced(Counterparty),
    /// Put a removed record back at its former position
    RecordReinserted {
        /// Former index
        index: usize,
        /// Record to restore
        record: Counterparty,
    },
    /// Connectivity probe finished
    ServerStatusChanged(ServerStatus),
}

/// Apply one action
pub fn reduce(state: &mut AppState, action: Action) {
    match action {
        Action::LoadStarted => {
            state.load = LoadStatus::Loading;
        }
        Action::RecordsLoaded { records, at } => {
            if state.records != records {
                state.records = records;
            }
            state.load = LoadStatus::Loaded;
            state.error_message = None;
            state.last_synced_at = Some(at);
        }
        Action::LoadFailed(message) => {
            state.load = LoadStatus::Failed;
            state.error_message = Some(message);
        }
        Action::OpenCreate => {
            state.modal = ModalState::Create;
        }
        Action::OpenEdit(record) => {
            state.modal = ModalState::Edit(record);
        }
        Action::CloseModal => {
            state.modal = ModalState::Closed;
        }
        Action::RecordRemoved(id) => {
            if state.position(&id).is_some() {
                state.records = state
                    .records
                    .iter()
                    .filter(|r| r.id != id)
                    .cloned()
                    .collect();
            }
        }
        Action::RecordReplaced(record) => {
            if let Some(idx) = state.position(&record.id) {
                let mut records = state.records.clone();
                records[idx] = record;
                state.records = records;
            }
        }
        Action::RecordReinserted { index, record } => {
            if state.position(&record.id).is_none() {
                let mut records = state.records.clone();
                records.insert(index.min(records.len()), record);
                state.records = records;
            }
        }
        Action::ServerStatusChanged(status) => {
            state.server_status = status;
        }
    }
}
