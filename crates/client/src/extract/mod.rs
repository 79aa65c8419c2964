//! Selector-based element extraction using scraper.
//!
//! ### Modes
//! - Text: each match's text nodes flattened and trimmed.
//! - Raw: each match's inner markup, untouched.
//!
//! Matches are returned in document order. An empty selector short-circuits
//! to an empty list without touching the document.

use scraper::{ElementRef, Html, Selector};
use sieve_core::Error;

/// A parsed HTML document.
///
/// The underlying tree is not `Send`; build it after the last network await
/// and drop it before the next one.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parse an HTML document.
    ///
    /// The HTML parser recovers from malformed markup, so this never fails.
    pub fn parse(source: &str) -> Self {
        Self { html: Html::parse_document(source) }
    }

    /// Collect the content of every element matching `selector`.
    pub fn select(&self, selector: &str, raw: bool) -> Result<Vec<String>, Error> {
        if selector.is_empty() {
            return Ok(Vec::new());
        }

        let selector = Selector::parse(selector).map_err(|e| Error::Selector(e.to_string()))?;

        Ok(self
            .html
            .select(&selector)
            .map(|element| if raw { inner_markup(element) } else { trimmed_text(element) })
            .collect())
    }
}

fn inner_markup(element: ElementRef<'_>) -> String {
    element.inner_html()
}

fn trimmed_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Parse `html` and extract the matches for `selector`.
///
/// This is a convenience function over [`Document`].
pub fn extract(html: &str, selector: &str, raw: bool) -> Result<Vec<String>, Error> {
    Document::parse(html).select(selector, raw)
}
