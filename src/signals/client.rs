use reqwest::header::CACHE_CONTROL;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignalsClientError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with `success: false`.
    #[error("{0}")]
    Api(String),
}

/// Envelope returned by the signals read API.
#[derive(Debug, Clone, Deserialize)]
pub struct SignalsEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl SignalsEnvelope {
    /// Raw records on success, otherwise the most specific failure text.
    pub fn into_records(self) -> Result<Vec<Value>, SignalsClientError> {
        if self.success {
            return Ok(self.data);
        }

        let reason = self
            .message
            .filter(|m| !m.is_empty())
            .or(self.error.filter(|e| !e.is_empty()))
            .unwrap_or_else(|| "Failed to load signals".into());
        Err(SignalsClientError::Api(reason))
    }
}

#[derive(Debug, Clone)]
pub struct SignalsClient {
    http: Client,
    url: String,
}

impl SignalsClient {
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the latest raw signal records, bypassing any HTTP cache.
    ///
    /// The API reports its own failures as a `success: false` body with a 5xx
    /// status, so the body is decoded regardless of status.
    pub async fn fetch_latest(&self) -> Result<Vec<Value>, SignalsClientError> {
        let resp = self
            .http
            .get(&self.url)
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await?;

        let status = resp.status();
        let envelope: SignalsEnvelope = resp.json().await?;

        tracing::debug!(
            status = %status,
            success = envelope.success,
            count = ?envelope.count,
            "Signals API responded"
        );

        envelope.into_records()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(value: Value) -> SignalsEnvelope {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_success_envelope_yields_records() {
        let records = envelope(json!({ "success": true, "data": [{ "_id": "a" }], "count": 1 }))
            .into_records()
            .unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_failure_prefers_message_over_error() {
        let err = envelope(json!({
            "success": false,
            "error": "Database configuration error",
            "message": "MongoDB URI not configured",
        }))
        .into_records()
        .unwrap_err();
        assert_eq!(err.to_string(), "MongoDB URI not configured");

        let err = envelope(json!({ "success": false, "error": "Failed to fetch latest signals" }))
            .into_records()
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch latest signals");

        let err = envelope(json!({})).into_records().unwrap_err();
        assert_eq!(err.to_string(), "Failed to load signals");
    }
}
