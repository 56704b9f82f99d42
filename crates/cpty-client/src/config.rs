//! Client configuration

use serde::{Deserialize, Serialize};

/// Default backend address
pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";

/// Default collection path
pub const DEFAULT_COLLECTION_PATH: &str = "/counterparties";

/// Default connectivity probe path
pub const DEFAULT_STATUS_PATH: &str = "/status";

/// HTTP method used to persist edits of an existing record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMethod {
    /// Replace the whole record
    #[default]
    Put,
    /// Send only the editable fields
    Patch,
}

/// Backend location and resource paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Scheme, host and port of the backend
    pub base_url: String,
    /// Collection path for counterparty records
    pub collection_path: String,
    /// Path answering the connectivity probe
    pub status_path: String,
    /// Method used for updates
    pub update_method: UpdateMethod,
}

impl ClientConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With base URL
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// With update method
    #[inline]
    #[must_use]
    pub fn with_update_method(mut self, method: UpdateMethod) -> Self {
        self.update_method = method;
        self
    }

    /// Path of a single record
    #[must_use]
    pub fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.collection_path.trim_end_matches('/'), id)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            collection_path: DEFAULT_COLLECTION_PATH.to_string(),
            status_path: DEFAULT_STATUS_PATH.to_string(),
            update_method: UpdateMethod::Put,
        }
    }
}
