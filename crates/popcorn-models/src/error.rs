use thiserror::Error;

/// Runtime text from the catalog did not start with a number (e.g. "N/A").
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Could not read a runtime from '{text}'")]
pub struct ParseError {
    pub text: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RatingError {
    #[error("Rating must be between 1 and 10, got {0}")]
    OutOfRange(u8),
}
