//! URL normalization for user-supplied targets.

use regex::Regex;
use std::sync::LazyLock;

/// `http:` or `https:` followed by any run of slashes.
static SCHEME_SLASHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(https?):/+").expect("scheme pattern is valid"));

/// Normalize a raw URL string into something fetchable.
///
/// Normalization steps:
/// 1. Collapse every `http:`/`https:` slash run to exactly `//`
/// 2. Prefix `https://` when the result does not start with `http`
///
/// Total: the output is not validated here, a bad URL fails at fetch time.
pub fn normalize(raw: &str) -> String {
    let collapsed = SCHEME_SLASHES.replace_all(raw, "$1://");

    if collapsed.starts_with("http") { collapsed.into_owned() } else { format!("https://{collapsed}") }
}
