// Nightscout REST client implementation
use crate::application::reading_source::{FetchError, ReadingSource};
use crate::domain::reading::Reading;
use crate::infrastructure::config::ConnectionSettings;
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

const ENTRIES_PATH: &str = "/api/v1/entries.json";

#[derive(Debug, Clone, Default)]
pub struct NightscoutClient {
    client: reqwest::Client,
}

impl NightscoutClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Bare hosts get `https://`; an explicit scheme is kept as-is.
    fn build_entries_url(connection: &ConnectionSettings) -> String {
        let host = connection.host.trim_end_matches('/');
        let base = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        };

        format!(
            "{}{}?count=1&{}={}",
            base,
            ENTRIES_PATH,
            connection.token_parameter.as_str(),
            urlencoding::encode(&connection.token)
        )
    }
}

/// Entry 0 of the list, or the sentinel when the list is empty or not a list.
/// Fields are read as-is; a missing or mistyped one falls back to zero/empty.
fn parse_entries(body: &str) -> Result<Reading, FetchError> {
    let data: Value = serde_json::from_str(body)?;

    let Some(entry) = data.as_array().and_then(|entries| entries.first()) else {
        return Ok(Reading::no_data());
    };

    Ok(Reading::new(
        entry.get("sgv").and_then(Value::as_f64).unwrap_or_default(),
        entry
            .get("direction")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        entry.get("date").and_then(Value::as_i64).unwrap_or_default(),
    ))
}

#[async_trait]
impl ReadingSource for NightscoutClient {
    async fn latest_reading(&self, connection: &ConnectionSettings) -> Result<Reading, FetchError> {
        if connection.host.is_empty() || connection.token.is_empty() {
            return Err(FetchError::ConfigMissing);
        }

        let url = Self::build_entries_url(connection);
        tracing::debug!("Requesting latest entry from {}", connection.host);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.without_url()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::BadStatus {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        match content_type.as_deref() {
            Some(ct) if ct.to_ascii_lowercase().starts_with("application/json") => {}
            _ => return Err(FetchError::BadContentType { content_type }),
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.without_url()))?;

        parse_entries(&body)
    }
}
