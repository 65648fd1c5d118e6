//! reqwest-backed [`Transport`] for the relay routes.

use std::time::Duration;

use agentboard_config::BoardConfig;
use reqwest::{Client, ClientBuilder};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::fetch::errors::FetchError;
use crate::fetch::traits::{Method, RelayRequest, Transport};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// `timeout` bounds each whole request; expiry surfaces as [`FetchError::Transport`].
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .pool_idle_timeout(Duration::from_secs(30))
            .user_agent(concat!("agentboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Transport {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &BoardConfig) -> Result<Self, FetchError> {
        Self::new(config.relay.base_url(), config.sync.fetch_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, request: &RelayRequest) -> String {
        format!("{}{}", self.base_url, request.path_and_query())
    }

    async fn execute(&self, request: RelayRequest) -> Result<Value, FetchError> {
        let url = self.url_for(&request);
        let builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self
                .client
                .post(&url)
                .json(&request.body.unwrap_or(Value::Null)),
        };

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Upstream {
                status: status.as_u16(),
                message: upstream_message(&body),
            });
        }

        let bytes = response.bytes().await.map_err(transport_error)?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| FetchError::Malformed {
            message: e.to_string(),
        })
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: RelayRequest, cancel: CancellationToken) -> Result<Value, FetchError> {
        let route = request.route();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(event = "core.http.request_abandoned", route = %route);
                Err(FetchError::Cancelled)
            }
            result = self.execute(request) => {
                if let Err(e) = &result {
                    debug!(event = "core.http.request_failed", route = %route, error = %e);
                }
                result
            }
        }
    }
}

fn transport_error(e: reqwest::Error) -> FetchError {
    let message = if e.is_timeout() {
        format!("request timed out: {}", e)
    } else {
        e.to_string()
    };
    FetchError::Transport { message }
}

/// Relay routes answer failures with `{"error": "..."}`; fall back to the raw body.
fn upstream_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
