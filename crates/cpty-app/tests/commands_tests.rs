use cpty_app::commands::{self, CLEAR_SCREEN};
use cpty_app::CommandError;
use cpty_client::{ClientConfig, CounterpartyService, Method, UpdateMethod};
use cpty_model::{CounterpartyFormData, CounterpartyPatch, FormField, KPP_ERROR, NAME_ERROR};
use cpty_store::{Store, DELETE_ERROR, LOAD_ERROR};
use cpty_test_utils::{
    id, named_record, sample_form, sample_record, service_for, service_with, MockBackend,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn text(out: Vec<u8>) -> String {
    String::from_utf8(out).unwrap()
}

fn store_with(service: CounterpartyService) -> Arc<Store> {
    let probe = service.status_probe();
    Arc::new(Store::new(Arc::new(service)).with_status_probe(probe))
}

fn store_over(backend: &Arc<MockBackend>) -> Arc<Store> {
    store_with(service_for(backend))
}

#[tokio::test]
async fn test_list_prints_table() {
    let backend = MockBackend::with_records(vec![sample_record("1"), named_record("2", "Ромашка")]);
    let service = service_for(&backend);
    let mut out = Vec::new();

    commands::list(&service, &mut out).await.unwrap();

    let text = text(out);
    assert!(text.starts_with("ID | Название"));
    assert!(text.contains("Ромашка"));
    assert!(text.contains("Test Name"));
}

#[tokio::test]
async fn test_list_empty_backend() {
    let backend = MockBackend::new();
    let mut out = Vec::new();
    commands::list(&service_for(&backend), &mut out).await.unwrap();
    assert_eq!(text(out), "Нет данных\n");
}

#[tokio::test]
async fn test_show_unknown_id_is_not_found() {
    let backend = MockBackend::new();
    let mut out = Vec::new();

    let err = commands::show(&service_for(&backend), &id("ghost"), &mut out)
        .await
        .unwrap_err();

    assert!(matches!(err, CommandError::NotFound(ref missing) if missing == &id("ghost")));
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn test_create_validates_before_sending() {
    let backend = MockBackend::new();
    let mut out = Vec::new();
    let input = CounterpartyFormData::new("", "22345678901", "Addr", "12345");

    let err = commands::create(&store_over(&backend), input, &mut out)
        .await
        .unwrap_err();

    let CommandError::Invalid(errors) = &err else {
        panic!("expected validation failure, got {err:?}");
    };
    assert_eq!(errors.get(FormField::Name), Some(NAME_ERROR));
    assert_eq!(errors.get(FormField::Kpp), Some(KPP_ERROR));
    assert_eq!(err.exit_code(), 2);
    assert_eq!(backend.request_count(), 0);
}

#[tokio::test]
async fn test_create_prints_new_id() {
    let backend = MockBackend::new();
    let mut out = Vec::new();

    let new_id = commands::create(&store_over(&backend), sample_form(), &mut out)
        .await
        .unwrap();

    assert_eq!(text(out), format!("Создан: {new_id}\n"));
    assert_eq!(backend.records().len(), 1);
    assert_eq!(backend.records()[0].id, new_id);
}

#[tokio::test]
async fn test_patch_method_sends_patch() {
    let backend = MockBackend::with_records(vec![sample_record("1")]);
    let mut out = Vec::new();
    let patch = CounterpartyPatch::default().with(FormField::Name, "Новое имя");

    let store = store_with(service_with(
        &backend,
        ClientConfig::new().with_update_method(UpdateMethod::Patch),
    ));
    commands::update(&store, &id("1"), patch, &mut out)
        .await
        .unwrap();

    assert!(backend.requests().iter().any(|r| r.method == Method::Patch));
    assert!(backend.requests().iter().all(|r| r.method != Method::Put));
    assert_eq!(backend.records()[0].name, "Новое имя");
    assert_eq!(backend.records()[0].inn, "22345678901");
    assert!(text(out).contains("Название: Новое имя"));
}

#[tokio::test]
async fn test_full_update_uses_put() {
    let backend = MockBackend::with_records(vec![sample_record("1")]);
    let mut out = Vec::new();
    let patch = CounterpartyPatch::from(&named_record("1", "Другое"));

    commands::update(&store_over(&backend), &id("1"), patch, &mut out)
        .await
        .unwrap();

    assert!(backend.requests().iter().any(|r| r.method == Method::Put));
    assert_eq!(backend.records(), vec![named_record("1", "Другое")]);
}

#[tokio::test]
async fn test_update_validates_merged_record() {
    let backend = MockBackend::with_records(vec![sample_record("1")]);
    let mut out = Vec::new();
    let patch = CounterpartyPatch::default().with(FormField::Kpp, "12");

    let err = commands::update(&store_over(&backend), &id("1"), patch, &mut out)
        .await
        .unwrap_err();

    assert!(matches!(err, CommandError::Invalid(_)));
    assert_eq!(backend.records(), vec![sample_record("1")]);
    assert!(backend.requests().iter().all(|r| r.method == Method::Get));
}

#[tokio::test]
async fn test_update_without_fields() {
    let backend = MockBackend::with_records(vec![sample_record("1")]);
    let mut out = Vec::new();

    let err = commands::update(
        &store_over(&backend),
        &id("1"),
        CounterpartyPatch::default(),
        &mut out,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CommandError::NothingToUpdate));
    assert_eq!(backend.request_count(), 0);
}

#[tokio::test]
async fn test_delete_removes_record() {
    let backend = MockBackend::with_records(vec![sample_record("1"), named_record("2", "b")]);
    let mut out = Vec::new();

    commands::delete(&store_over(&backend), &id("1"), &mut out)
        .await
        .unwrap();

    assert_eq!(text(out), "Удалён: 1\n");
    assert_eq!(backend.records(), vec![named_record("2", "b")]);
}

#[tokio::test]
async fn test_server_failure_maps_to_exit_one() {
    let backend = MockBackend::with_records(vec![sample_record("1")]);
    backend.set_offline(true);
    let mut out = Vec::new();

    let err = commands::list(&service_for(&backend), &mut out)
        .await
        .unwrap_err();

    assert!(matches!(err, CommandError::Service(ref e) if e.is_network()));
    assert_eq!(err.exit_code(), 1);
}

#[tokio::test]
async fn test_status_reports_indicator() {
    let backend = MockBackend::new();
    let service = service_for(&backend);
    let mut out = Vec::new();

    commands::status(&service.status_probe(), &mut out).await.unwrap();
    backend.set_offline(true);
    commands::status(&service.status_probe(), &mut out).await.unwrap();

    assert_eq!(text(out), "[Сервер: OK]\n[Сервер: ERROR]\n");
}

#[tokio::test]
async fn test_partial_update_puts_merged_record_by_default() {
    let backend = MockBackend::with_records(vec![sample_record("1")]);
    let mut out = Vec::new();
    let patch = CounterpartyPatch::default().with(FormField::Address, "Новый адрес");

    commands::update(&store_over(&backend), &id("1"), patch, &mut out)
        .await
        .unwrap();

    let put = backend
        .requests()
        .into_iter()
        .find(|r| r.method == Method::Put)
        .unwrap();
    let body = put.body.unwrap();
    assert_eq!(body["address"], "Новый адрес");
    assert_eq!(body["inn"], "22345678901");
    assert_eq!(backend.records()[0].address, "Новый адрес");
}

#[tokio::test]
async fn test_update_unknown_id_sends_no_write() {
    let backend = MockBackend::with_records(vec![sample_record("1")]);
    let mut out = Vec::new();
    let patch = CounterpartyPatch::default().with(FormField::Name, "Кто-то");

    let err = commands::update(&store_over(&backend), &id("ghost"), patch, &mut out)
        .await
        .unwrap_err();

    assert!(matches!(err, CommandError::NotFound(ref missing) if missing == &id("ghost")));
    assert!(backend.requests().iter().all(|r| r.method == Method::Get));
}

#[tokio::test]
async fn test_delete_unknown_id_is_not_found() {
    let backend = MockBackend::with_records(vec![sample_record("1")]);
    let mut out = Vec::new();

    let err = commands::delete(&store_over(&backend), &id("ghost"), &mut out)
        .await
        .unwrap_err();

    assert_eq!(err.exit_code(), 3);
    assert!(backend.requests().iter().all(|r| r.method == Method::Get));
}

#[tokio::test]
async fn test_failed_delete_reports_store_message() {
    let backend = MockBackend::with_records(vec![sample_record("1")]);
    let store = store_over(&backend);
    let hold = backend.hold(Method::Get, "/counterparties");

    let task = tokio::spawn(async move {
        let mut out = Vec::new();
        let result = commands::delete(&store, &id("1"), &mut out).await;
        (result, out)
    });
    // The list is already computed; only the DELETE after it fails
    hold.arrived().await;
    backend.fail_next(1);
    hold.release();

    let (result, out) = task.await.unwrap();
    let err = result.unwrap_err();
    assert!(matches!(err, CommandError::Failed(DELETE_ERROR)));
    assert_eq!(err.exit_code(), 1);
    assert!(out.is_empty());
    assert_eq!(backend.records(), vec![sample_record("1")]);
    assert!(backend.requests().iter().any(|r| r.method == Method::Delete));
}

#[tokio::test]
async fn test_create_against_offline_backend() {
    let backend = MockBackend::new();
    backend.set_offline(true);
    let mut out = Vec::new();

    let err = commands::create(&store_over(&backend), sample_form(), &mut out)
        .await
        .unwrap_err();

    assert!(matches!(err, CommandError::Failed(LOAD_ERROR)));
    assert_eq!(err.exit_code(), 1);
    assert!(backend.records().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_watch_redraws_until_shutdown() {
    let backend = MockBackend::with_records(vec![sample_record("1")]);
    let store = store_over(&backend);

    let writer = {
        let backend = Arc::clone(&backend);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            backend.insert_direct(named_record("2", "Позже"));
        })
    };
    let shutdown = tokio::time::sleep(Duration::from_secs(25));
    let mut out = Vec::new();

    commands::watch(&store, Duration::from_secs(10), shutdown, &mut out)
        .await
        .unwrap();
    writer.await.unwrap();

    let text = text(out);
    let frames: Vec<&str> = text.split(CLEAR_SCREEN).filter(|f| !f.is_empty()).collect();
    assert!(frames.len() >= 2);
    assert!(frames[0].contains("Контрагенты"));
    assert!(!frames[0].contains("Позже"));
    assert!(frames.last().unwrap().contains("Позже"));
    // The refresh task is gone once watch returns
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(Arc::strong_count(&store), 1);
}
