use thiserror::Error;

/// Main error type for Diffsense operations
///
/// The core components (parser, filter, renderer, cache) never surface
/// errors — malformed diffs parse to fewer records and cache failures
/// degrade to misses. This type covers the configuration and CLI surface.
#[derive(Error, Debug)]
pub enum DiffsenseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DiffsenseError>;
