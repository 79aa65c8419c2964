//! Cache keys for extraction responses.

use sha2::{Digest, Sha256};

/// Identity of an extraction request.
///
/// Equality is structural over `(url, selector, raw)`, so inputs that would
/// concatenate to the same string still map to different entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub url: String,
    pub selector: String,
    pub raw: bool,
}

impl CacheKey {
    /// Build a key from the normalized URL, the selector as given, and the mode flag.
    pub fn new(url: impl Into<String>, selector: impl Into<String>, raw: bool) -> Self {
        Self { url: url.into(), selector: selector.into(), raw }
    }

    /// Extraction mode label used in logs and digests.
    pub fn mode(&self) -> &'static str {
        if self.raw { "raw" } else { "text" }
    }

    /// Stable hex SHA-256 of the key, for log correlation.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.url.as_bytes());
        hasher.update(b"\n");
        hasher.update(self.selector.as_bytes());
        hasher.update(b"\n");
        hasher.update(self.mode().as_bytes());
        hex::encode(hasher.finalize())
    }
}
