//! HTTP client for the StoreGest quantities API.
//!
//! Authentication rides in the `domain`/`apikey` headers; the single
//! endpoint is a form POST with `act=qta` and an optional `time` epoch
//! lower bound (omitted → the full quantity snapshot).

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::StoregestError;
use crate::types::{QtaResponse, StockRow};

/// Client for the StoreGest API.
pub struct StoregestClient {
    client: Client,
    base_url: Url,
    domain: String,
    apikey: String,
}

impl StoregestClient {
    /// Creates a client for the given API base URL and credentials.
    ///
    /// # Errors
    ///
    /// Returns [`StoregestError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`StoregestError::InvalidBaseUrl`] when
    /// `base_url` does not parse.
    pub fn new(
        base_url: &str,
        domain: &str,
        apikey: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, StoregestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        let base_url = Url::parse(base_url).map_err(|e| StoregestError::InvalidBaseUrl {
            base_url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            client,
            base_url,
            domain: domain.to_string(),
            apikey: apikey.to_string(),
        })
    }

    /// Pulls quantity rows changed since `since_epoch_secs`, or the full
    /// snapshot when `None`.
    ///
    /// # Errors
    ///
    /// - [`StoregestError::Http`] on network failure.
    /// - [`StoregestError::UnexpectedStatus`] on a non-2xx response.
    /// - [`StoregestError::Deserialize`] when the body is not the expected
    ///   `{"data": [...]}` envelope.
    pub async fn get_quantities(
        &self,
        since_epoch_secs: Option<i64>,
    ) -> Result<Vec<StockRow>, StoregestError> {
        let mut form: Vec<(&str, String)> = vec![("act", "qta".to_string())];
        if let Some(time) = since_epoch_secs {
            form.push(("time", time.to_string()));
        }

        let response = self
            .client
            .post(self.base_url.clone())
            .header("domain", &self.domain)
            .header("apikey", &self.apikey)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoregestError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let parsed: QtaResponse =
            serde_json::from_str(&body).map_err(|e| StoregestError::Deserialize {
                context: "qta response".to_string(),
                source: e,
            })?;
        tracing::debug!(rows = parsed.data.len(), "StoreGest quantities fetched");
        Ok(parsed.data)
    }
}
