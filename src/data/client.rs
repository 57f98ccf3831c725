//! HTTP client for the cook telemetry service
//!
//! Fetches the raw CSV export of a cook. The body is returned as text and
//! not inspected here; parsing happens in the loader.

use reqwest::Client;

use super::loader::LoaderError;
use crate::config::{endpoint_url, DEFAULT_ENDPOINT_TEMPLATE};

/// Client for fetching raw cook telemetry
#[derive(Debug, Clone)]
pub struct CookClient {
    client: Client,
    endpoint_template: String,
}

impl Default for CookClient {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT_TEMPLATE)
    }
}

impl CookClient {
    /// Create a client for an endpoint template containing `{cook_id}`
    pub fn new(endpoint_template: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint_template: endpoint_template.into(),
        }
    }

    /// Create a client with a custom HTTP client
    pub fn with_client(client: Client, endpoint_template: impl Into<String>) -> Self {
        Self {
            client,
            endpoint_template: endpoint_template.into(),
        }
    }

    /// URL of the raw export for a cook
    pub fn raw_url(&self, cook_id: u64) -> String {
        endpoint_url(&self.endpoint_template, cook_id)
    }

    /// Fetch the raw CSV export for a cook
    ///
    /// # Returns
    /// * `Ok(String)` - The response body
    /// * `Err(LoaderError)` - If the request fails, the status is not 2xx, or
    ///   the body cannot be decoded
    pub async fn fetch_raw(&self, cook_id: u64) -> Result<String, LoaderError> {
        let url = self.raw_url(cook_id);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoaderError::Status {
                url,
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}
