//! Rate limiting for the Admin API: a fixed-delay pacer between successive
//! calls plus jittered exponential back-off on transient failures.
//!
//! The pacer is the "courtesy delay" — it is injected into the client so
//! every remote call is paced regardless of which engine drives it, and the
//! reconciliation/stock loops stay free of inline sleeps. Back-off handles
//! the cases the pacer cannot: 429 responses and transient network/5xx
//! errors.

use std::future::Future;
use std::time::Duration;

use crate::error::ShopifyError;

/// Fixed-delay pacing policy between successive remote calls.
#[derive(Debug, Clone)]
pub struct Pacer {
    delay: Duration,
}

impl Pacer {
    /// A pacer that sleeps `delay_ms` before each call.
    #[must_use]
    pub fn fixed_ms(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
        }
    }

    /// A no-op pacer (tests, or operators who disable pacing).
    #[must_use]
    pub fn none() -> Self {
        Self::fixed_ms(0)
    }

    /// Waits out the configured delay.
    pub async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// Returns `true` for errors worth retrying after a back-off delay.
///
/// **Retriable:**
/// - [`ShopifyError::RateLimited`] — HTTP 429; the server asked us to back off.
/// - [`ShopifyError::Http`] — network-level failure (connection reset, timeout).
/// - [`ShopifyError::UnexpectedStatus`] with a 5xx status — transient server error.
///
/// **Not retriable (propagated immediately):**
/// - [`ShopifyError::UnexpectedStatus`] with a 4xx status — retrying won't fix it.
/// - [`ShopifyError::Deserialize`] / [`ShopifyError::Api`] — malformed or
///   rejected payload; retrying won't fix it.
/// - [`ShopifyError::InvalidBaseUrl`] — configuration problem.
pub(crate) fn is_retriable(err: &ShopifyError) -> bool {
    match err {
        ShopifyError::RateLimited { .. } | ShopifyError::Http(_) => true,
        ShopifyError::UnexpectedStatus { status, .. } => *status >= 500,
        ShopifyError::Deserialize { .. }
        | ShopifyError::Api(_)
        | ShopifyError::InvalidBaseUrl { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on
/// transient errors.
///
/// Back-off before the n-th retry is `backoff_base_ms * 2^(n-1)` with
/// ±25 % jitter, capped at 60 s. Non-retriable errors return immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ShopifyError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ShopifyError>>,
{
    const MAX_DELAY_MS: u64 = 60_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient Admin API error — retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
