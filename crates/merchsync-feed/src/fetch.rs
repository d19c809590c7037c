//! Feed transport: local file path or `http(s)://` URL.

use std::time::Duration;

use crate::error::FeedError;

/// Returns `true` when `source` should be fetched over HTTP.
fn is_url(source: &str) -> bool {
    let lower = source.to_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Loads the raw feed text from a local path or URL.
///
/// # Errors
///
/// Returns [`FeedError::Http`] on a network failure or non-2xx response,
/// [`FeedError::Io`] when a local file cannot be read.
pub async fn load_feed(
    source: &str,
    timeout_secs: u64,
    user_agent: &str,
) -> Result<String, FeedError> {
    if is_url(source) {
        tracing::debug!(url = %source, "fetching feed over HTTP");
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        let response = client.get(source).send().await?.error_for_status()?;
        Ok(response.text().await?)
    } else {
        tracing::debug!(path = %source, "reading feed from disk");
        std::fs::read_to_string(source).map_err(|e| FeedError::Io {
            path: source.to_string(),
            source: e,
        })
    }
}
