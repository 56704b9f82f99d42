//! Counterparty service
//!
//! CRUD operations over the HTTP client. Every write is followed by a full
//! re-list so callers always observe server-confirmed state rather than the
//! write endpoint's response body.

use crate::config::{ClientConfig, UpdateMethod};
use crate::error::{Operation, ServiceError};
use crate::http::{HttpClient, HttpResponse, HttpTransport, Method};
use crate::status::StatusProbe;
use async_trait::async_trait;
use cpty_model::{Counterparty, CounterpartyFormData, CounterpartyId, CounterpartyPatch};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Operations the application state layer needs from the backend
#[async_trait]
pub trait CounterpartyApi: Send + Sync + std::fmt::Debug {
    /// All records in server order
    async fn list_all(&self) -> Result<Vec<Counterparty>, ServiceError>;

    /// One record by id
    async fn get_by_id(&self, id: &CounterpartyId) -> Result<Counterparty, ServiceError>;

    /// Create a record under a fresh id and return the re-listed collection
    async fn create(&self, form: CounterpartyFormData) -> Result<Vec<Counterparty>, ServiceError>;

    /// Replace a record and return the re-listed collection
    async fn update(
        &self,
        id: &CounterpartyId,
        form: CounterpartyFormData,
    ) -> Result<Vec<Counterparty>, ServiceError>;

    /// Partially update a record and return the re-listed collection
    async fn patch(
        &self,
        id: &CounterpartyId,
        patch: &CounterpartyPatch,
    ) -> Result<Vec<Counterparty>, ServiceError>;

    /// Remove a record and return the re-listed collection
    async fn delete(&self, id: &CounterpartyId) -> Result<Vec<Counterparty>, ServiceError>;
}

/// HTTP-backed counterparty service
#[derive(Debug, Clone)]
pub struct CounterpartyService {
    http: HttpClient,
    config: ClientConfig,
}

impl CounterpartyService {
    /// Create service over a transport
    #[must_use]
    pub fn new(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            http: HttpClient::new(config.base_url.clone(), transport),
            config,
        }
    }

    /// Underlying HTTP client
    #[inline]
    #[must_use]
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Probe sharing this service's client and status path
    #[must_use]
    pub fn status_probe(&self) -> StatusProbe {
        StatusProbe::new(self.http.clone(), self.config.status_path.clone())
    }

    /// Create a record and report the id it was stored under
    ///
    /// Any id already on the form is replaced by a freshly generated one.
    ///
    /// # Errors
    /// `ServiceError` if the POST or the follow-up list fails
    pub async fn create_with_id(
        &self,
        form: CounterpartyFormData,
    ) -> Result<(CounterpartyId, Vec<Counterparty>), ServiceError> {
        let id = CounterpartyId::generate();
        let record = form.into_counterparty(id.clone());
        let body = to_body(&record);

        let response = self
            .http
            .post(&self.config.collection_path, &body)
            .await
            .map_err(|source| ServiceError::Network {
                op: Operation::Create,
                id: Some(id.clone()),
                source,
            })?;
        ensure_ok(&response, Operation::Create, Some(&id))?;
        tracing::info!(%id, "counterparty created");

        Ok((id, self.list_all().await?))
    }

    async fn write(
        &self,
        op: Operation,
        method: Method,
        id: &CounterpartyId,
        body: Option<serde_json::Value>,
    ) -> Result<Vec<Counterparty>, ServiceError> {
        let path = self.config.item_path(id.as_str());
        let response = self
            .http
            .send(method, &path, body.as_ref())
            .await
            .map_err(|source| ServiceError::Network {
                op,
                id: Some(id.clone()),
                source,
            })?;
        ensure_ok(&response, op, Some(id))?;
        tracing::info!(%id, %op, "counterparty written");

        self.list_all().await
    }
}

#[async_trait]
impl CounterpartyApi for CounterpartyService {
    async fn list_all(&self) -> Result<Vec<Counterparty>, ServiceError> {
        let response = self
            .http
            .get(&self.config.collection_path)
            .await
            .map_err(|source| ServiceError::Network {
                op: Operation::List,
                id: None,
                source,
            })?;
        ensure_ok(&response, Operation::List, None)?;
        decode(&response, Operation::List, None)
    }

    async fn get_by_id(&self, id: &CounterpartyId) -> Result<Counterparty, ServiceError> {
        let response = self
            .http
            .get(&self.config.item_path(id.as_str()))
            .await
            .map_err(|source| ServiceError::Network {
                op: Operation::Get,
                id: Some(id.clone()),
                source,
            })?;
        ensure_ok(&response, Operation::Get, Some(id))?;
        decode(&response, Operation::Get, Some(id))
    }

    async fn create(&self, form: CounterpartyFormData) -> Result<Vec<Counterparty>, ServiceError> {
        self.create_with_id(form).await.map(|(_, records)| records)
    }

    async fn update(
        &self,
        id: &CounterpartyId,
        form: CounterpartyFormData,
    ) -> Result<Vec<Counterparty>, ServiceError> {
        let record = form.into_counterparty(id.clone());
        match self.config.update_method {
            UpdateMethod::Put => {
                self.write(Operation::Update, Method::Put, id, Some(to_body(&record)))
                    .await
            }
            UpdateMethod::Patch => {
                let patch = CounterpartyPatch::from(&record);
                self.write(Operation::Update, Method::Patch, id, Some(to_body(&patch)))
                    .await
            }
        }
    }

    async fn patch(
        &self,
        id: &CounterpartyId,
        patch: &CounterpartyPatch,
    ) -> Result<Vec<Counterparty>, ServiceError> {
        self.write(Operation::Patch, Method::Patch, id, Some(to_body(patch)))
            .await
    }

    async fn delete(&self, id: &CounterpartyId) -> Result<Vec<Counterparty>, ServiceError> {
        self.write(Operation::Delete, Method::Delete, id, None).await
    }
}

fn to_body<T: serde::Serialize>(value: &T) -> serde_json::Value {
    // Model types only hold strings and options.
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}

fn ensure_ok(
    response: &HttpResponse,
    op: Operation,
    id: Option<&CounterpartyId>,
) -> Result<(), ServiceError> {
    if response.is_ok() {
        return Ok(());
    }
    tracing::warn!(%op, status = response.status, "backend rejected request");
    Err(ServiceError::Server {
        op,
        id: id.cloned(),
        status: response.status,
    })
}

fn decode<T: DeserializeOwned>(
    response: &HttpResponse,
    op: Operation,
    id: Option<&CounterpartyId>,
) -> Result<T, ServiceError> {
    response.json().map_err(|source| ServiceError::Decode {
        op,
        id: id.cloned(),
        source,
    })
}
