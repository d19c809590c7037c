use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    // The store domain historically lived under two names; accept either.
    let shop_domain = lookup("SHOPIFY_STORE")
        .or_else(|_| lookup("SHOPIFY_STORE_DOMAIN"))
        .map_err(|_| ConfigError::MissingEnvVar("SHOPIFY_STORE".to_string()))?;
    let admin_token = require("SHOPIFY_ADMIN_TOKEN")?;
    let api_version = or_default("SHOPIFY_API_VERSION", "2024-07");

    let location_id = match lookup("SHOPIFY_LOCATION_ID") {
        Ok(raw) => Some(raw.parse::<i64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: "SHOPIFY_LOCATION_ID".to_string(),
            reason: e.to_string(),
        })?),
        Err(_) => None,
    };

    let storegest_domain = lookup("STOREGEST_DOMAIN").ok();
    let storegest_apikey = lookup("STOREGEST_APIKEY").ok();
    let storegest_base_url = or_default(
        "STOREGEST_BASE_URL",
        "https://bonaccorsobrand.storegest.it/API/",
    );

    let request_timeout_secs = parse_u64("MERCHSYNC_REQUEST_TIMEOUT_SECS", "60")?;
    let storegest_timeout_secs = parse_u64("MERCHSYNC_STOREGEST_TIMEOUT_SECS", "180")?;
    let user_agent = or_default("MERCHSYNC_USER_AGENT", "merchsync/0.1 (feed-import)");
    let max_retries = parse_u32("MERCHSYNC_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("MERCHSYNC_RETRY_BACKOFF_BASE_MS", "1000")?;
    let inter_request_delay_ms = parse_u64("MERCHSYNC_INTER_REQUEST_DELAY_MS", "120")?;
    let log_level = or_default("MERCHSYNC_LOG_LEVEL", "info");

    Ok(AppConfig {
        shop_domain,
        admin_token,
        api_version,
        location_id,
        storegest_domain,
        storegest_apikey,
        storegest_base_url,
        request_timeout_secs,
        storegest_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        inter_request_delay_ms,
        log_level,
    })
}
