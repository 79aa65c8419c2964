//! Client code for sieve.
//!
//! This crate provides the HTTP fetch pipeline, URL normalization, and
//! selector extraction used by the server.

pub mod extract;
pub mod fetch;

pub use extract::{Document, extract};
pub use fetch::{FetchConfig, HttpFetcher, PageFetcher, normalize};
