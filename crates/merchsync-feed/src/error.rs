use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP error fetching feed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to read feed file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("XML parse error in feed: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("no <item> records found in feed")]
    EmptyFeed,

    #[error("failed to load mapping file {path}: {reason}")]
    MappingFile { path: String, reason: String },

    #[error("invalid grouping regex \"{pattern}\": {source}")]
    InvalidGroupRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
