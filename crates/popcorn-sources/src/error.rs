use thiserror::Error;

/// Failure talking to the catalog. Every variant is a network failure from the
/// caller's point of view; an empty search is not an error.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Catalog returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed catalog response: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The catalog answered but refused the request (e.g. "Invalid API key!")
    #[error("{0}")]
    Service(String),

    #[error("No OMDb API key configured")]
    MissingApiKey,
}
