//! Error types for the counterparty client
//!
//! Two failure classes leave this crate:
//! - `TransportError` when the request never produced a response
//! - `ServiceError` when a domain operation could not complete

use cpty_model::CounterpartyId;

/// The request did not produce a response (connection refused, DNS, reset)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{method} {url}: {message}")]
pub struct TransportError {
    /// HTTP method
    pub method: String,
    /// Full request URL
    pub url: String,
    /// Transport-level description
    pub message: String,
}

impl TransportError {
    /// Create new transport error
    pub fn new(
        method: impl Into<String>,
        url: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            message: message.into(),
        }
    }
}

/// Domain operation issued against the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// List all records
    List,
    /// Fetch one record
    Get,
    /// Create a record
    Create,
    /// Replace a record
    Update,
    /// Partially update a record
    Patch,
    /// Remove a record
    Delete,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Operation::List => "list",
            Operation::Get => "get",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Patch => "patch",
            Operation::Delete => "delete",
        };
        f.write_str(name)
    }
}

fn describe_id(id: Option<&CounterpartyId>) -> String {
    id.map(|id| format!(" (id {id})")).unwrap_or_default()
}

/// Counterparty service errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Backend unreachable
    #[error("{op}{} failed: network error: {source}", describe_id(.id.as_ref()))]
    Network {
        /// Operation that failed
        op: Operation,
        /// Record involved, if any
        id: Option<CounterpartyId>,
        /// Underlying transport failure
        #[source]
        source: TransportError,
    },

    /// Backend answered with a non-2xx status
    #[error("{op}{} failed: server responded {status}", describe_id(.id.as_ref()))]
    Server {
        /// Operation that failed
        op: Operation,
        /// Record involved, if any
        id: Option<CounterpartyId>,
        /// HTTP status code
        status: u16,
    },

    /// Response body did not match the expected shape
    #[error("{op}{} failed: invalid response body: {source}", describe_id(.id.as_ref()))]
    Decode {
        /// Operation that failed
        op: Operation,
        /// Record involved, if any
        id: Option<CounterpartyId>,
        /// JSON error
        #[source]
        source: serde_json::Error,
    },
}

impl ServiceError {
    /// Operation that failed
    #[inline]
    #[must_use]
    pub fn operation(&self) -> Operation {
        match self {
            Self::Network { op, .. } | Self::Server { op, .. } | Self::Decode { op, .. } => *op,
        }
    }

    /// Record the operation targeted, if any
    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<&CounterpartyId> {
        match self {
            Self::Network { id, .. } | Self::Server { id, .. } | Self::Decode { id, .. } => {
                id.as_ref()
            }
        }
    }

    /// Backend reported the record as missing
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Server { status: 404, .. })
    }

    /// Backend could not be reached at all
    #[inline]
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}
