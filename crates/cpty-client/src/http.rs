//! Thin JSON-over-HTTP client
//!
//! Provides a single best-effort round trip per call:
//! - Requests are built against one configured base URL
//! - `Content-Type: application/json` is sent by default, caller headers override it
//! - Non-2xx responses are returned as-is; only transport failures are errors
//!
//! No retry, timeout or backoff is applied here.

use crate::error::TransportError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Header sent with every request unless overridden
pub const JSON_CONTENT_TYPE: (&str, &str) = ("Content-Type", "application/json");

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
}

impl Method {
    /// Upper-case method name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully resolved request handed to a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Method
    pub method: Method,
    /// Absolute URL
    pub url: String,
    /// Path relative to the base URL
    pub path: String,
    /// Headers after merging defaults and overrides
    pub headers: Vec<(String, String)>,
    /// Encoded JSON body
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Header value by case-insensitive name
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Decode the body as JSON
    ///
    /// # Errors
    /// Returns the JSON error if the body is missing or malformed
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(self.body.as_deref().unwrap_or_default())
    }
}

/// Raw response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code
    pub status: u16,
    /// Body bytes
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create new response
    #[inline]
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Create JSON response
    ///
    /// # Errors
    /// Returns the JSON error if `value` cannot be serialized
    pub fn json_body<T: Serialize>(status: u16, value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::new(status, serde_json::to_vec(value)?))
    }

    /// Status is 2xx
    #[inline]
    #[must_use]
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON
    ///
    /// # Errors
    /// Returns the JSON error if the body does not match `T`
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Sends a request and returns whatever the server answered
#[async_trait]
pub trait HttpTransport: Send + Sync + std::fmt::Debug {
    /// Perform one round trip
    ///
    /// # Errors
    /// `TransportError` only when no response was received
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// JSON client bound to a base URL
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    default_headers: Vec<(String, String)>,
    transport: Arc<dyn HttpTransport>,
}

impl HttpClient {
    /// Create new client
    #[must_use]
    pub fn new(base_url: impl Into<String>, transport: Arc<dyn HttpTransport>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            default_headers: vec![(
                JSON_CONTENT_TYPE.0.to_string(),
                JSON_CONTENT_TYPE.1.to_string(),
            )],
            transport,
        }
    }

    /// Base URL without trailing slash
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a path
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// GET
    ///
    /// # Errors
    /// `TransportError` when no response was received
    pub async fn get(&self, path: &str) -> Result<HttpResponse, TransportError> {
        self.send(Method::Get, path, None).await
    }

    /// POST with JSON body
    ///
    /// # Errors
    /// `TransportError` when no response was received
    pub async fn post(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, TransportError> {
        self.send(Method::Post, path, Some(body)).await
    }

    /// PUT with JSON body
    ///
    /// # Errors
    /// `TransportError` when no response was received
    pub async fn put(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, TransportError> {
        self.send(Method::Put, path, Some(body)).await
    }

    /// PATCH with JSON body
    ///
    /// # Errors
    /// `TransportError` when no response was received
    pub async fn patch(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, TransportError> {
        self.send(Method::Patch, path, Some(body)).await
    }

    /// DELETE
    ///
    /// # Errors
    /// `TransportError` when no response was received
    pub async fn delete(&self, path: &str) -> Result<HttpResponse, TransportError> {
        self.send(Method::Delete, path, None).await
    }

    /// Send with default headers only
    ///
    /// # Errors
    /// `TransportError` when no response was received
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<HttpResponse, TransportError> {
        self.send_with_headers(method, path, body, &[]).await
    }

    /// Send with caller headers merged over the defaults
    ///
    /// # Errors
    /// `TransportError` when no response was received
    pub async fn send_with_headers(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        overrides: &[(&str, &str)],
    ) -> Result<HttpResponse, TransportError> {
        let url = self.url(path);
        let body = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| TransportError::new(method.as_str(), &url, e.to_string()))?;

        let request = HttpRequest {
            method,
            url,
            path: path.to_string(),
            headers: self.merge_headers(overrides),
            body,
        };

        tracing::debug!(method = %method, path, "sending request");
        let result = self.transport.send(request).await;
        match &result {
            Ok(response) => {
                tracing::debug!(method = %method, path, status = response.status, "response received");
            }
            Err(e) => tracing::warn!(method = %method, path, error = %e, "request failed"),
        }
        result
    }

    fn merge_headers(&self, overrides: &[(&str, &str)]) -> Vec<(String, String)> {
        let mut headers = self.default_headers.clone();
        for (name, value) in overrides {
            match headers
                .iter_mut()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
            {
                Some(existing) => existing.1 = (*value).to_string(),
                None => headers.push(((*name).to_string(), (*value).to_string())),
            }
        }
        headers
    }
}
