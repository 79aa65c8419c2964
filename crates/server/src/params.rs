//! Form parameter decoding.
//!
//! Parameters are read from the query string and, for form-encoded bodies,
//! from the body. The query string wins on conflicts and the first occurrence
//! of a key wins within a source.

use axum::http::{HeaderMap, header};
use url::form_urlencoded;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Inputs of an extraction request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormParams {
    /// Target URL as supplied, before normalization.
    pub url: String,
    /// CSS selector as supplied.
    pub selector: String,
    /// Whether the `raw` key was present at all.
    pub raw: bool,
}

impl FormParams {
    pub fn parse(query: Option<&str>, headers: &HeaderMap, body: &[u8]) -> Self {
        let mut pairs: Vec<(String, String)> = query
            .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();

        if is_form_body(headers) {
            pairs.extend(form_urlencoded::parse(body).into_owned());
        }

        let value = |name: &str| {
            pairs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
                .unwrap_or_default()
        };

        Self { url: value("url"), selector: value("selector"), raw: pairs.iter().any(|(key, _)| key == "raw") }
    }
}

fn is_form_body(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| ct.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}
