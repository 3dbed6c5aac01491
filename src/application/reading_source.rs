// Source trait for the latest glucose reading
use crate::domain::reading::Reading;
use crate::infrastructure::config::ConnectionSettings;
use async_trait::async_trait;
use thiserror::Error;

/// Why a single fetch failed. An empty entry list is not an error.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Nightscout host and token must be configured")]
    ConfigMissing,

    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Request Failed. Status Code: {status}")]
    BadStatus { status: u16 },

    #[error("Invalid content-type. Expected application/json but received {}", .content_type.as_deref().unwrap_or("nothing"))]
    BadContentType { content_type: Option<String> },

    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),
}

#[async_trait]
pub trait ReadingSource: Send + Sync {
    /// Fetch the most recent entry. Exactly one request, no retry.
    async fn latest_reading(&self, connection: &ConnectionSettings) -> Result<Reading, FetchError>;
}
