//! Sitemap resolution: fetch a sitemap, expand indexes, collect leaf entries.

pub mod parse;
pub mod resolve;

pub use parse::{ParseError, SitemapDocument, parse_document};
pub use resolve::{ResolveLimits, SitemapResolver, Traversal};
