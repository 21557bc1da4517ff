//! Client code for sitescan.
//!
//! This crate provides the HTTP fetch pipeline, robots.txt discovery,
//! sitemap parsing and recursive resolution, shared by the server and CLI.

pub mod fetch;
pub mod scan;
pub mod sitemap;

pub use fetch::{Fetch, FetchClient, FetchConfig, FetchResponse, RobotsResolver, Target, normalize_target};
pub use scan::{ScanConfig, SitemapScanner};
pub use sitemap::{ResolveLimits, SitemapDocument, SitemapResolver, parse_document};
