//! MCP tool implementations.
//!
//! This module contains all tools exposed by the sitescan server.

pub mod cache;
pub mod get_sitemap;

pub use get_sitemap::{GetSitemapOutput, GetSitemapParams, get_sitemap, get_sitemap_impl};
