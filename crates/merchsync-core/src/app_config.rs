#[derive(Clone)]
pub struct AppConfig {
    /// Shopify store domain, e.g. `myshop.myshopify.com`.
    pub shop_domain: String,
    pub admin_token: String,
    /// Admin API version segment, e.g. `2024-07`.
    pub api_version: String,
    /// Numeric inventory location id. Only required for stock sync.
    pub location_id: Option<i64>,
    pub storegest_domain: Option<String>,
    pub storegest_apikey: Option<String>,
    pub storegest_base_url: String,
    pub request_timeout_secs: u64,
    pub storegest_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub inter_request_delay_ms: u64,
    pub log_level: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("shop_domain", &self.shop_domain)
            .field("admin_token", &"[redacted]")
            .field("api_version", &self.api_version)
            .field("location_id", &self.location_id)
            .field("storegest_domain", &self.storegest_domain)
            .field(
                "storegest_apikey",
                &self.storegest_apikey.as_ref().map(|_| "[redacted]"),
            )
            .field("storegest_base_url", &self.storegest_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("storegest_timeout_secs", &self.storegest_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("inter_request_delay_ms", &self.inter_request_delay_ms)
            .field("log_level", &self.log_level)
            .finish()
    }
}
