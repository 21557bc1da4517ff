//! Core types and shared functionality for sitescan.
//!
//! This crate provides:
//! - Sitemap records and the aggregated resolution result
//! - In-memory TTL cache for resolution results
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod sitemap;

pub use cache::{CacheRecord, SitemapCache, Sweeper};
pub use config::{AppConfig, ConfigError, Transport};
pub use error::Error;
pub use sitemap::{ResolutionResult, SitemapEntry, SitemapIndexEntry};
