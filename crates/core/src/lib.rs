//! Core types and shared functionality for sieve.
//!
//! This crate provides:
//! - Response cache with LRU eviction and TTL
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheEntry, CacheKey, ResponseCache};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
