//! Application error types.

use thiserror::Error;

use crate::feed::FeedError;

/// Application-level errors for tagaffinity.
#[derive(Error, Debug)]
pub enum AppError {
    // Feed errors that survived throttling
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Candidate '{0}' has no hashtags to search for")]
    EmptyHashtags(String),

    #[error("Cannot build a search query from an empty hashtag list")]
    EmptyQuery,

    #[error("No candidates configured")]
    NoCandidates,

    // Graph errors
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Invalid graph document: {0}")]
    InvalidDocument(String),

    // I/O and serialization
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}
