use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoregestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected HTTP status {status} from StoreGest")]
    UnexpectedStatus { status: u16 },

    #[error("invalid StoreGest base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
