use async_trait::async_trait;
use cpty_client::{HttpRequest, HttpResponse, HttpTransport, Method, TransportError};
use cpty_model::{Counterparty, CounterpartyId, CounterpartyPatch};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Notify;

const COLLECTION: &str = "/counterparties";
const STATUS: &str = "/status";

/// What DELETE does for an id that does not exist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingDelete {
    /// Answer 404
    #[default]
    NotFound,
    /// Answer 200 and change nothing
    Ignore,
}

/// Request as seen by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub content_type: Option<String>,
    pub body: Option<Value>,
}

/// Gate holding back one matching response until released
///
/// The response is computed when the request arrives, so a held list
/// reflects the data at that moment even if it is delivered later.
#[derive(Debug, Clone)]
pub struct Hold {
    method: Method,
    path: String,
    arrived: Arc<Notify>,
    release: Arc<Notify>,
}

impl Hold {
    /// Wait until the held request reached the backend
    pub async fn arrived(&self) {
        self.arrived.notified().await;
    }

    /// Deliver the held response
    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[derive(Debug, Default)]
struct Inner {
    records: Vec<Counterparty>,
    requests: Vec<RecordedRequest>,
    offline: bool,
    offline_next: usize,
    forced_status: Option<u16>,
    missing_delete: MissingDelete,
    holds: VecDeque<Hold>,
}

/// In-memory REST backend with json-server semantics
#[derive(Debug, Default)]
pub struct MockBackend {
    inner: Mutex<Inner>,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_records(records: Vec<Counterparty>) -> Arc<Self> {
        let backend = Self::new();
        backend.inner.lock().records = records;
        backend
    }

    pub fn records(&self) -> Vec<Counterparty> {
        self.inner.lock().records.clone()
    }

    pub fn insert_direct(&self, record: Counterparty) {
        self.inner.lock().records.push(record);
    }

    pub fn remove_direct(&self, id: &CounterpartyId) {
        self.inner.lock().records.retain(|r| &r.id != id);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner.lock().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.inner.lock().requests.len()
    }

    pub fn clear_requests(&self) {
        self.inner.lock().requests.clear();
    }

    /// Every request fails at the transport level while set
    pub fn set_offline(&self, offline: bool) {
        self.inner.lock().offline = offline;
    }

    /// The next `count` requests fail at the transport level
    pub fn fail_next(&self, count: usize) {
        self.inner.lock().offline_next = count;
    }

    /// Every request is answered with this status and an empty object
    pub fn force_status(&self, status: Option<u16>) {
        self.inner.lock().forced_status = status;
    }

    pub fn set_missing_delete(&self, policy: MissingDelete) {
        self.inner.lock().missing_delete = policy;
    }

    /// Hold back the next response for `method` on `path`
    pub fn hold(&self, method: Method, path: &str) -> Hold {
        let hold = Hold {
            method,
            path: path.to_string(),
            arrived: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        };
        self.inner.lock().holds.push_back(hold.clone());
        hold
    }

    fn take_hold(inner: &mut Inner, method: Method, path: &str) -> Option<Hold> {
        let idx = inner
            .holds
            .iter()
            .position(|h| h.method == method && h.path == path)?;
        inner.holds.remove(idx)
    }

    fn handle(inner: &mut Inner, method: Method, path: &str, body: Option<&Value>) -> HttpResponse {
        if let Some(status) = inner.forced_status {
            return HttpResponse::new(status, b"{}".to_vec());
        }
        if path == STATUS {
            return json(200, &serde_json::json!({ "status": "ok" }));
        }
        if path == COLLECTION {
            return match method {
                Method::Get => json(200, &inner.records),
                Method::Post => Self::create(inner, body),
                _ => not_found(),
            };
        }
        let Some(raw_id) = path.strip_prefix(COLLECTION).and_then(|p| p.strip_prefix('/')) else {
            return not_found();
        };
        let Ok(id) = raw_id.parse::<CounterpartyId>() else {
            return not_found();
        };
        let position = inner.records.iter().position(|r| r.id == id);

        match (method, position) {
            (Method::Get, Some(idx)) => json(200, &inner.records[idx]),
            (Method::Put, Some(idx)) => {
                let Some(mut record) = body.and_then(|b| parse::<Counterparty>(b, Some(&id))) else {
                    return bad_request();
                };
                record.id = id;
                inner.records[idx] = record.clone();
                json(200, &record)
            }
            (Method::Patch, Some(idx)) => {
                let Some(patch) = body.and_then(|b| serde_json::from_value::<CounterpartyPatch>(b.clone()).ok())
                else {
                    return bad_request();
                };
                let record = patch.apply_to(&inner.records[idx]);
                inner.records[idx] = record.clone();
                json(200, &record)
            }
            (Method::Delete, Some(idx)) => {
                inner.records.remove(idx);
                json(200, &serde_json::json!({}))
            }
            (Method::Delete, None) if inner.missing_delete == MissingDelete::Ignore => {
                json(200, &serde_json::json!({}))
            }
            _ => not_found(),
        }
    }

    fn create(inner: &mut Inner, body: Option<&Value>) -> HttpResponse {
        let Some(body) = body else {
            return bad_request();
        };
        let fallback = CounterpartyId::generate();
        let Some(record) = parse::<Counterparty>(body, Some(&fallback)) else {
            return bad_request();
        };
        if inner.records.iter().any(|r| r.id == record.id) {
            return HttpResponse::new(500, b"{\"error\":\"duplicate id\"}".to_vec());
        }
        inner.records.push(record.clone());
        json(201, &record)
    }
}

fn parse<T: serde::de::DeserializeOwned>(body: &Value, default_id: Option<&CounterpartyId>) -> Option<T> {
    let mut body = body.clone();
    if let (Some(map), Some(id)) = (body.as_object_mut(), default_id) {
        map.entry("id").or_insert_with(|| Value::String(id.to_string()));
    }
    serde_json::from_value(body).ok()
}

fn json<T: serde::Serialize>(status: u16, value: &T) -> HttpResponse {
    HttpResponse::json_body(status, value).unwrap()
}

fn not_found() -> HttpResponse {
    HttpResponse::new(404, b"{}".to_vec())
}

fn bad_request() -> HttpResponse {
    HttpResponse::new(400, b"{}".to_vec())
}

#[async_trait]
impl HttpTransport for MockBackend {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let body: Option<Value> = request.body.as_deref().and_then(|b| serde_json::from_slice(b).ok());

        let (response, hold) = {
            let mut inner = self.inner.lock();
            inner.requests.push(RecordedRequest {
                method: request.method,
                path: request.path.clone(),
                content_type: request.header("content-type").map(str::to_string),
                body: body.clone(),
            });

            if inner.offline || inner.offline_next > 0 {
                inner.offline_next = inner.offline_next.saturating_sub(1);
                return Err(TransportError::new(
                    request.method.as_str(),
                    request.url,
                    "connection refused",
                ));
            }

            let response = Self::handle(&mut inner, request.method, &request.path, body.as_ref());
            let hold = Self::take_hold(&mut inner, request.method, &request.path);
            (response, hold)
        };

        if let Some(hold) = hold {
            hold.arrived.notify_one();
            hold.release.notified().await;
        }
        Ok(response)
    }
}
