use std::time::Duration;

use lambda_runtime::tracing::debug;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use crate::error::Error;

/// Default time to wait for Home Assistant to answer a POST.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the Home Assistant REST API.
pub struct HomeAssistant {
    base_url: String,
    client: Client,
}

impl HomeAssistant {
    /// `base_url` must already be normalized (see [`crate::utils::normalize_base_url`]).
    #[must_use]
    pub const fn new(base_url: String, client: Client) -> Self {
        Self { base_url, client }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the full API URL for `endpoint`, e.g. `states` →
    /// `http://hass:8123/api/states`.
    #[must_use]
    pub fn build_url(&self, endpoint: &str) -> String {
        format!("{}/api/{endpoint}", self.base_url)
    }

    /// Performs a GET request and returns the JSON body.
    ///
    /// # Errors
    ///
    /// - [`Error::Transport`] if Home Assistant cannot be reached.
    /// - [`Error::Http`] on a non-2xx status.
    /// - [`Error::Decode`] if the body is not JSON.
    pub async fn get(&self, endpoint: &str) -> Result<Value, Error> {
        debug!(endpoint = %endpoint, "Calling Home Assistant");
        send(self.client.get(self.build_url(endpoint))).await
    }

    /// Posts `body` to `endpoint` with the [`DEFAULT_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// See [`HomeAssistant::post_with_timeout`].
    pub async fn post(&self, endpoint: &str, body: &Value) -> Result<Option<Value>, Error> {
        self.post_with_timeout(endpoint, body, DEFAULT_TIMEOUT).await
    }

    /// Posts `body` as JSON to `endpoint`.
    ///
    /// Returns `Ok(None)` when the request was sent but no response arrived
    /// within `timeout`: the caller does not need the answer in that case.
    ///
    /// # Errors
    ///
    /// - [`Error::Transport`] if Home Assistant cannot be reached.
    /// - [`Error::Http`] on a non-2xx status.
    /// - [`Error::Decode`] if the body is not JSON.
    pub async fn post_with_timeout(
        &self,
        endpoint: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<Option<Value>, Error> {
        debug!(endpoint = %endpoint, payload = %body, "Calling Home Assistant");

        let request = self
            .client
            .post(self.build_url(endpoint))
            .json(body)
            .timeout(timeout);

        match send(request).await {
            Ok(response) => Ok(Some(response)),
            Err(Error::Transport(e)) if is_read_timeout(&e) => {
                debug!(
                    endpoint = %endpoint,
                    "Request sent without waiting for response"
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

async fn send(request: RequestBuilder) -> Result<Value, Error> {
    let response = request.send().await?;
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_else(|e| {
            debug!(status = %status, error = %e, "Failed to read error response body");
            format!("<failed to read response body: {e}>")
        });
        return Err(Error::Http { status, body });
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(Error::Decode)
}

// The connection was made but the deadline passed before the full response
// arrived. Connect failures are reported separately by reqwest.
fn is_read_timeout(error: &reqwest::Error) -> bool {
    error.is_timeout() && !error.is_connect()
}
