//! Unified error types for sieve.
//!
//! Every variant surfaces to the caller as a single HTTP 500 whose body is the
//! `Display` text, so messages are written to be read by a human.

/// Unified error types for the extraction pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The target URL could not be reached (DNS, connect, transport timeout).
    #[error("request failed: {0}")]
    Transport(String),

    /// The target answered with anything other than `200 OK`.
    #[error("status code error: {code} {reason}")]
    HttpStatus { code: u16, reason: String },

    /// The response body could not be turned into a document.
    #[error("failed to parse document: {0}")]
    Parse(String),

    /// The selector is not valid CSS selector syntax.
    #[error("invalid selector: {0}")]
    Selector(String),

    /// The response DTO could not be encoded.
    #[error("failed to encode response: {0}")]
    Serialization(#[from] serde_json::Error),
}
