//! Testing utilities for the counterparty workspace
//!
//! Shared fixtures and an in-memory stand-in for the JSON mock server.

#![allow(missing_docs)]

mod backend;

pub use backend::{Hold, MissingDelete, MockBackend, RecordedRequest};

use cpty_client::{ClientConfig, CounterpartyService};
use cpty_model::{Counterparty, CounterpartyFormData, CounterpartyId};
use std::str::FromStr;
use std::sync::Arc;

pub fn sample_form() -> CounterpartyFormData {
    CounterpartyFormData::new("Test Name", "22345678901", "Test Address", "123456789")
}

pub fn sample_record(id: &str) -> Counterparty {
    sample_form().into_counterparty(CounterpartyId::from_str(id).unwrap())
}

pub fn named_record(id: &str, name: &str) -> Counterparty {
    let mut record = sample_record(id);
    record.name = name.to_string();
    record
}

pub fn id(raw: &str) -> CounterpartyId {
    CounterpartyId::from_str(raw).unwrap()
}

/// Service wired to the given backend with default paths
pub fn service_for(backend: &Arc<MockBackend>) -> CounterpartyService {
    CounterpartyService::new(ClientConfig::new(), backend.clone())
}

/// Service with a custom configuration
pub fn service_with(backend: &Arc<MockBackend>, config: ClientConfig) -> CounterpartyService {
    CounterpartyService::new(config, backend.clone())
}
