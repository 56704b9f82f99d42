//! Counterparty Client
//!
//! Talks to the counterparty REST backend:
//! - `HttpClient` performs single JSON round trips against a base URL
//! - `CounterpartyService` maps CRUD operations onto the collection resource
//! - `StatusProbe` drives the connectivity indicator
//!
//! # Example
//!
//! ```rust,ignore
//! use cpty_client::{ClientConfig, CounterpartyApi, CounterpartyService, ReqwestTransport};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = CounterpartyService::new(ClientConfig::new(), Arc::new(ReqwestTransport::new()));
//! let records = service.list_all().await?;
//! println!("{} counterparties", records.len());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

// Core modules
pub mod config;
pub mod error;
pub mod http;
pub mod service;
pub mod status;
pub mod transport;

// Re-exports for convenience
pub use config::{ClientConfig, UpdateMethod, DEFAULT_BASE_URL};
pub use error::{Operation, ServiceError, TransportError};
pub use http::{HttpClient, HttpRequest, HttpResponse, HttpTransport, Method};
pub use service::{CounterpartyApi, CounterpartyService};
pub use status::{ServerStatus, StatusProbe};
pub use transport::ReqwestTransport;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
