//! Client for the mailshield HTTP API.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const HEALTH_TIMEOUT: Duration = Duration::from_secs(2);

/// Below this confidence the printed result is flagged as low.
pub const LOW_CONFIDENCE: f64 = 0.5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailResponse {
    pub original_text: String,
    pub masked_text: String,
    pub category: String,
    pub confidence_score: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Access denied: the server rejected the API key")]
    AccessDenied,

    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Server unavailable at {url}: {source}")]
    Unavailable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected response from server: {0}")]
    Decode(#[source] reqwest::Error),
}

pub struct ApiClient {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str, api_key: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("mailshield/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// True when `GET /` answers with a success status within two seconds.
    pub async fn is_online(&self) -> bool {
        match self.http.get(self.url("/")).timeout(HEALTH_TIMEOUT).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "Health probe failed");
                false
            }
        }
    }

    pub async fn classify(&self, text: &str) -> Result<EmailResponse, ClientError> {
        let url = self.url("/classify");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .map_err(|source| ClientError::Unavailable { url: url.clone(), source })?;

        let status = response.status();
        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(ClientError::AccessDenied);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        response.json().await.map_err(ClientError::Decode)
    }
}

/// Human-readable summary of one classification.
pub fn render(response: &EmailResponse) -> String {
    let pct = response.confidence_score * 100.0;
    let flag = if response.confidence_score < LOW_CONFIDENCE {
        " (low confidence)"
    } else {
        ""
    };
    format!(
        "Category:   {}\nConfidence: {:.2}%{}\n\nMasked text:\n{}",
        response.category, pct, flag, response.masked_text
    )
}
