//! Backend connectivity probe

use crate::http::HttpClient;
use serde::{Deserialize, Serialize};

/// Connectivity indicator state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServerStatus {
    /// Probe answered with 2xx
    Ok,
    /// Probe failed or answered non-2xx
    Error,
    /// No probe has completed yet
    #[default]
    Loading,
}

impl ServerStatus {
    /// Short indicator text
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ServerStatus::Ok => "OK",
            ServerStatus::Error => "ERROR",
            ServerStatus::Loading => "LOADING",
        }
    }
}

impl std::fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issues `GET <status_path>` to drive the connectivity indicator
#[derive(Debug, Clone)]
pub struct StatusProbe {
    http: HttpClient,
    path: String,
}

impl StatusProbe {
    /// Create probe
    #[inline]
    #[must_use]
    pub fn new(http: HttpClient, path: impl Into<String>) -> Self {
        Self {
            http,
            path: path.into(),
        }
    }

    /// Run one probe; never reports `Loading`
    pub async fn check(&self) -> ServerStatus {
        match self.http.get(&self.path).await {
            Ok(response) if response.is_ok() => ServerStatus::Ok,
            Ok(response) => {
                tracing::debug!(status = response.status, "status probe rejected");
                ServerStatus::Error
            }
            Err(e) => {
                tracing::debug!(error = %e, "status probe unreachable");
                ServerStatus::Error
            }
        }
    }
}
