//! Subcommand handlers
//!
//! Each handler writes its human-readable result to `out` and reports
//! failures as `CommandError`, which the binary maps to an exit code.

use crate::view;
use chrono::Utc;
use cpty_client::{CounterpartyApi, CounterpartyService, ServiceError, StatusProbe};
use cpty_model::{CounterpartyFormData, CounterpartyId, CounterpartyPatch, FormErrors, FormField};
use cpty_store::{
    reduce, Action, AppState, FormSession, SaveOutcome, Store, DELETE_ERROR, EDIT_ERROR,
    LOAD_ERROR, SAVE_ERROR,
};
use std::collections::HashSet;
use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

/// ANSI clear-screen and cursor-home, written before every `watch` frame
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Command failures
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Input rejected by the field rules; nothing was sent
    #[error("validation failed: {0}")]
    Invalid(FormErrors),

    /// No record with this id
    #[error("counterparty {0} not found")]
    NotFound(CounterpartyId),

    /// `update` without any field flags
    #[error("nothing to update: pass at least one field")]
    NothingToUpdate,

    /// Backend call failed
    #[error(transparent)]
    Service(ServiceError),

    /// Store reported a failure in its state
    #[error("{0}")]
    Failed(&'static str),

    /// Writing output failed
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
}

impl CommandError {
    /// Process exit code for this failure
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Invalid(_) | Self::NothingToUpdate => 2,
            Self::NotFound(_) => 3,
            Self::Service(_) | Self::Failed(_) | Self::Io(_) => 1,
        }
    }

    fn from_service(err: ServiceError, id: &CounterpartyId) -> Self {
        if err.is_not_found() {
            Self::NotFound(id.clone())
        } else {
            Self::Service(err)
        }
    }
}

impl From<ServiceError> for CommandError {
    fn from(err: ServiceError) -> Self {
        Self::Service(err)
    }
}

/// Print the record table
///
/// # Errors
/// Backend or output failure
pub async fn list(service: &CounterpartyService, out: &mut impl Write) -> Result<(), CommandError> {
    let records = service.list_all().await?;
    let mut state = AppState::default();
    reduce(
        &mut state,
        Action::RecordsLoaded {
            records,
            at: Utc::now(),
        },
    );
    writeln!(out, "{}", view::render_table(&state))?;
    Ok(())
}

/// Print one record
///
/// # Errors
/// `NotFound` for an unknown id, otherwise backend or output failure
pub async fn show(
    service: &CounterpartyService,
    id: &CounterpartyId,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    let record = service
        .get_by_id(id)
        .await
        .map_err(|e| CommandError::from_service(e, id))?;
    writeln!(out, "{}", view::render_record(&record))?;
    Ok(())
}

/// Create a record through the store's save handler; prints the new id
///
/// Input is validated before any request. The new id is the one record the
/// reconciled list holds that the initial load did not.
///
/// # Errors
/// `Invalid` when any field fails, otherwise backend, state or output failure
pub async fn create(
    store: &Store,
    input: CounterpartyFormData,
    out: &mut impl Write,
) -> Result<CounterpartyId, CommandError> {
    store.handle_add_new();
    let mut form = FormSession::create();
    for field in FormField::ALL {
        form.apply(field, input.field(field));
    }
    let data = form.submit().map_err(|errors| {
        store.handle_cancel();
        CommandError::Invalid(errors)
    })?;

    load_checked(store).await?;
    let known: HashSet<CounterpartyId> =
        store.state().records.into_iter().map(|r| r.id).collect();

    match store.handle_save(data).await {
        SaveOutcome::Saved => {}
        SaveOutcome::Rejected(errors) => return Err(CommandError::Invalid(errors)),
        SaveOutcome::Failed(e) => return Err(CommandError::Service(e)),
    }

    let id = store
        .state()
        .records
        .into_iter()
        .map(|r| r.id)
        .find(|id| !known.contains(id))
        .ok_or(CommandError::Failed(SAVE_ERROR))?;
    writeln!(out, "Создан: {id}")?;
    Ok(id)
}

/// Apply the given fields to a record through the store
///
/// The fields are merged over the latest server copy and the merged record
/// must pass validation before anything is sent.
///
/// # Errors
/// `NothingToUpdate`, `Invalid`, `NotFound`, backend, state or output failure
pub async fn update(
    store: &Store,
    id: &CounterpartyId,
    patch: CounterpartyPatch,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    if patch.is_empty() {
        return Err(CommandError::NothingToUpdate);
    }
    load_checked(store).await?;
    if store.state().record(id).is_none() {
        return Err(CommandError::NotFound(id.clone()));
    }

    store.handle_edit(id).await;
    let state = store.state();
    let Some(current) = state.editing_record() else {
        return Err(CommandError::Failed(state.error_message.unwrap_or(EDIT_ERROR)));
    };

    let mut form = FormSession::edit(&patch.apply_to(current));
    let data = form.submit().map_err(|errors| {
        store.handle_cancel();
        CommandError::Invalid(errors)
    })?;

    match store.handle_save(data).await {
        SaveOutcome::Saved => {}
        SaveOutcome::Rejected(errors) => return Err(CommandError::Invalid(errors)),
        SaveOutcome::Failed(e) => return Err(CommandError::from_service(e, id)),
    }

    let state = store.state();
    let saved = state.record(id).ok_or_else(|| CommandError::NotFound(id.clone()))?;
    writeln!(out, "{}", view::render_record(saved))?;
    Ok(())
}

/// Delete a record through the store
///
/// # Errors
/// `NotFound` for an unknown id, otherwise state or output failure
pub async fn delete(
    store: &Store,
    id: &CounterpartyId,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    load_checked(store).await?;
    if store.state().record(id).is_none() {
        return Err(CommandError::NotFound(id.clone()));
    }

    store.handle_delete(id).await;
    let state = store.state();
    if !state.loaded_success() {
        return Err(CommandError::Failed(state.error_message.unwrap_or(DELETE_ERROR)));
    }
    writeln!(out, "Удалён: {id}")?;
    Ok(())
}

/// Print the connectivity indicator
///
/// # Errors
/// Output failure only
pub async fn status(probe: &StatusProbe, out: &mut impl Write) -> Result<(), CommandError> {
    let status = probe.check().await;
    writeln!(out, "{}", view::render_status(status))?;
    Ok(())
}

/// Mount the store and redraw on every state change until `shutdown` resolves
///
/// The refresh task is torn down before returning on every path.
///
/// # Errors
/// Output failure
pub async fn watch(
    store: &Arc<Store>,
    every: Duration,
    shutdown: impl Future<Output = ()>,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    let mut rx = store.subscribe();
    let mounted = store.mount(every).await;
    tracing::info!(?every, "watching counterparties");

    let result = async {
        let screen = view::render_screen(&rx.borrow_and_update());
        writeln!(out, "{CLEAR_SCREEN}{screen}")?;

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                () = &mut shutdown => break,
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let screen = view::render_screen(&rx.borrow_and_update());
                    writeln!(out, "{CLEAR_SCREEN}{screen}")?;
                }
            }
        }
        Ok::<(), CommandError>(())
    }
    .await;

    mounted.unmount();
    tracing::info!("watch stopped");
    result
}

async fn load_checked(store: &Store) -> Result<(), CommandError> {
    store.load().await;
    let state = store.state();
    if state.loaded_success() {
        Ok(())
    } else {
        Err(CommandError::Failed(state.error_message.unwrap_or(LOAD_ERROR)))
    }
}
