use cpty_client::{Method, ServerStatus};
use cpty_model::{CounterpartyFormData, FormField, INN_ERROR};
use cpty_store::{
    LoadStatus, ModalState, RefreshOutcome, SaveOutcome, Store, DELETE_ERROR, EDIT_ERROR,
    LOAD_ERROR, SAVE_ERROR,
};
use cpty_test_utils::{id, named_record, sample_form, sample_record, service_for, MockBackend};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn store_over(backend: &Arc<MockBackend>) -> Arc<Store> {
    let service = service_for(backend);
    let probe = service.status_probe();
    Arc::new(Store::new(Arc::new(service)).with_status_probe(probe))
}

async fn loaded_store(backend: &Arc<MockBackend>) -> Arc<Store> {
    let store = store_over(backend);
    store.load().await;
    backend.clear_requests();
    store
}

#[tokio::test]
async fn test_load_replaces_records() {
    let backend = MockBackend::with_records(vec![sample_record("1"), named_record("2", "b")]);
    let store = store_over(&backend);
    assert!(store.state().is_loading());

    store.load().await;

    let state = store.state();
    assert_eq!(state.load, LoadStatus::Loaded);
    assert!(!state.is_loading());
    assert_eq!(state.records.len(), 2);
    assert!(state.last_synced_at.is_some());
}

#[tokio::test]
async fn test_failed_load_surfaces_message() {
    let backend = MockBackend::new();
    backend.set_offline(true);
    let store = store_over(&backend);

    store.load().await;

    let state = store.state();
    assert!(!state.loaded_success());
    assert_eq!(state.error_message, Some(LOAD_ERROR));
    assert!(state.records.is_empty());
}

#[tokio::test]
async fn test_failed_refresh_keeps_existing_records() {
    let backend = MockBackend::with_records(vec![sample_record("1")]);
    let store = loaded_store(&backend).await;

    backend.set_offline(true);
    assert_eq!(store.refresh().await, RefreshOutcome::Failed);

    let state = store.state();
    assert!(!state.loaded_success());
    assert_eq!(state.error_message, Some(LOAD_ERROR));
    assert_eq!(state.records, vec![sample_record("1")]);

    backend.set_offline(false);
    assert_eq!(store.refresh().await, RefreshOutcome::Applied);
    assert!(store.state().loaded_success());
}

#[tokio::test]
async fn test_refresh_does_not_show_loading() {
    let backend = MockBackend::with_records(vec![sample_record("1")]);
    let store = loaded_store(&backend).await;
    let mut rx = store.subscribe();

    backend.insert_direct(named_record("2", "b"));
    store.refresh().await;

    assert!(rx.has_changed().unwrap());
    let state = rx.borrow_and_update().clone();
    assert_eq!(state.load, LoadStatus::Loaded);
    assert_eq!(state.records.len(), 2);
}

#[tokio::test]
async fn test_add_new_twice_stays_in_create_mode() {
    let backend = MockBackend::new();
    let store = loaded_store(&backend).await;

    store.handle_add_new();
    store.handle_add_new();

    let state = store.state();
    assert!(state.is_modal_open());
    assert_eq!(state.modal, ModalState::Create);
    assert!(state.editing_record().is_none());
    assert_eq!(backend.request_count(), 0);
}

#[tokio::test]
async fn test_cancel_closes_modal() {
    let backend = MockBackend::new();
    let store = loaded_store(&backend).await;

    store.handle_add_new();
    store.handle_cancel();
    assert!(!store.state().is_modal_open());
}

#[tokio::test]
async fn test_edit_uses_latest_server_copy() {
    let backend = MockBackend::with_records(vec![sample_record("1")]);
    let store = loaded_store(&backend).await;

    backend.remove_direct(&id("1"));
    backend.insert_direct(named_record("1", "Renamed elsewhere"));

    store.handle_edit(&id("1")).await;

    let state = store.state();
    assert!(state.is_modal_open());
    assert_eq!(state.editing_record().unwrap().name, "Renamed elsewhere");
    // Local table is untouched until the next refresh
    assert_eq!(state.records[0].name, "Test Name");
}

#[tokio::test]
async fn test_edit_missing_record_keeps_modal_closed() {
    let backend = MockBackend::new();
    let store = loaded_store(&backend).await;

    store.handle_edit(&id("ghost")).await;

    let state = store.state();
    assert!(!state.is_modal_open());
    assert!(!state.loaded_success());
    assert_eq!(state.error_message, Some(EDIT_ERROR));
}

#[tokio::test]
async fn test_delete_removes_record() {
    let backend = MockBackend::with_records(vec![sample_record("1"), named_record("2", "b")]);
    let store = loaded_store(&backend).await;

    store.handle_delete(&id("1")).await;

    let state = store.state();
    assert_eq!(state.records, vec![named_record("2", "b")]);
    assert!(state.loaded_success());
    assert_eq!(backend.records(), vec![named_record("2", "b")]);
}

#[tokio::test]
async fn test_delete_is_visible_before_server_answers() {
    let backend = MockBackend::with_records(vec![sample_record("1"), named_record("2", "b")]);
    let store = loaded_store(&backend).await;
    let hold = backend.hold(Method::Delete, "/counterparties/1");

    let task = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.handle_delete(&id("1")).await })
    };
    hold.arrived().await;

    assert!(store.state().record(&id("1")).is_none());

    hold.release();
    task.await.unwrap();
    assert_eq!(store.state().records.len(), 1);
}

#[tokio::test]
async fn test_failed_delete_restores_record_in_place() {
    let records = vec![
        named_record("1", "a"),
        named_record("2", "b"),
        named_record("3", "c"),
    ];
    let backend = MockBackend::with_records(records.clone());
    let store = loaded_store(&backend).await;

    backend.force_status(Some(500));
    store.handle_delete(&id("2")).await;

    let state = store.state();
    assert_eq!(state.records, records);
    assert!(!state.loaded_success());
    assert_eq!(state.error_message, Some(DELETE_ERROR));
}

#[tokio::test]
async fn test_failed_delete_uses_index_from_before_request() {
    let backend = MockBackend::with_records(vec![
        named_record("1", "a"),
        named_record("2", "b"),
        named_record("3", "c"),
        named_record("4", "d"),
    ]);
    let store = loaded_store(&backend).await;
    // Gone on the server, so the held delete answers 404
    backend.remove_direct(&id("3"));
    let hold = backend.hold(Method::Delete, "/counterparties/3");

    let failing = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.handle_delete(&id("3")).await })
    };
    hold.arrived().await;

    store.handle_delete(&id("1")).await;
    assert_eq!(store.state().records, vec![named_record("2", "b"), named_record("4", "d")]);

    hold.release();
    failing.await.unwrap();

    // Restored at its old index 2, which is now past "4"
    assert_eq!(
        store.state().records,
        vec![named_record("2", "b"), named_record("4", "d"), named_record("3", "c")]
    );
    assert_eq!(store.state().error_message, Some(DELETE_ERROR));

    store.load().await;
    assert_eq!(store.state().records, vec![named_record("2", "b"), named_record("4", "d")]);
}

#[tokio::test]
async fn test_delete_unknown_id_on_strict_backend() {
    let backend = MockBackend::with_records(vec![sample_record("1")]);
    let store = loaded_store(&backend).await;

    store.handle_delete(&id("ghost")).await;

    let state = store.state();
    assert_eq!(state.records, vec![sample_record("1")]);
    assert_eq!(state.error_message, Some(DELETE_ERROR));
}

#[tokio::test]
async fn test_invalid_save_sends_nothing() {
    let backend = MockBackend::new();
    let store = loaded_store(&backend).await;
    store.handle_add_new();

    let mut form = sample_form();
    form.inn = "123".to_string();
    let outcome = store.handle_save(form).await;

    let SaveOutcome::Rejected(errors) = outcome else {
        panic!("expected validation rejection, got {outcome:?}");
    };
    assert_eq!(errors.get(FormField::Inn), Some(INN_ERROR));
    assert_eq!(backend.request_count(), 0);
    assert!(store.state().is_modal_open());
}

#[tokio::test]
async fn test_save_creates_record_and_closes_modal() {
    let backend = MockBackend::new();
    let store = loaded_store(&backend).await;
    store.handle_add_new();

    let outcome = store.handle_save(sample_form()).await;

    assert!(outcome.is_saved());
    let state = store.state();
    assert!(!state.is_modal_open());
    assert_eq!(state.records.len(), 1);
    assert!(state.records[0].same_fields(&sample_record("x")));
}

#[tokio::test]
async fn test_two_identical_creates_are_distinct_records() {
    let backend = MockBackend::new();
    let store = loaded_store(&backend).await;

    assert!(store.handle_save(sample_form()).await.is_saved());
    assert!(store.handle_save(sample_form()).await.is_saved());

    let records = store.state().records;
    assert_eq!(records.len(), 2);
    assert_ne!(records[0].id, records[1].id);
}

#[tokio::test]
async fn test_save_update_reconciles_with_server_list() {
    let backend = MockBackend::with_records(vec![sample_record("1")]);
    let store = loaded_store(&backend).await;
    backend.insert_direct(named_record("2", "added elsewhere"));

    let mut form = CounterpartyFormData::from(sample_record("1"));
    form.name = "Updated".to_string();
    assert!(store.handle_save(form).await.is_saved());

    let state = store.state();
    assert_eq!(state.records.len(), 2);
    assert_eq!(state.records[0].name, "Updated");
    assert_eq!(state.records[1].name, "added elsewhere");
}

#[tokio::test]
async fn test_failed_update_restores_previous_and_closes_modal() {
    let backend = MockBackend::with_records(vec![sample_record("1")]);
    let store = loaded_store(&backend).await;
    store.handle_edit(&id("1")).await;

    backend.set_offline(true);
    let mut form = CounterpartyFormData::from(sample_record("1"));
    form.name = "Never saved".to_string();
    let outcome = store.handle_save(form).await;

    assert!(matches!(outcome, SaveOutcome::Failed(ref e) if e.is_network()));
    let state = store.state();
    assert_eq!(state.records, vec![sample_record("1")]);
    assert!(!state.is_modal_open());
    assert_eq!(state.error_message, Some(SAVE_ERROR));
}

#[tokio::test]
async fn test_refresh_overlapping_mutation_is_discarded() {
    let backend = MockBackend::with_records(vec![sample_record("1"), named_record("2", "b")]);
    let store = loaded_store(&backend).await;
    let hold = backend.hold(Method::Get, "/counterparties");

    // The held list is computed before the delete reaches the backend.
    let refresher = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.refresh().await })
    };
    hold.arrived().await;

    store.handle_delete(&id("1")).await;
    hold.release();

    assert_eq!(refresher.await.unwrap(), RefreshOutcome::Discarded);
    assert_eq!(store.state().records, vec![named_record("2", "b")]);
}

#[tokio::test]
async fn test_status_probe_updates_indicator() {
    let backend = MockBackend::new();
    let store = store_over(&backend);
    assert_eq!(store.state().server_status, ServerStatus::Loading);

    store.probe_status().await;
    assert_eq!(store.state().server_status, ServerStatus::Ok);

    backend.set_offline(true);
    store.probe_status().await;
    assert_eq!(store.state().server_status, ServerStatus::Error);
}
