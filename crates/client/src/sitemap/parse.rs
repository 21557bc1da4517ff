//! Sitemap XML parsing.
//!
//! Accepts the two document kinds of the sitemaps.org protocol:
//! `<urlset>` (leaf) and `<sitemapindex>` (references to other sitemaps).
//! Element names are matched on their local part so prefixed or namespaced
//! documents parse the same way.

use quick_xml::Reader;
use quick_xml::events::Event;

use sitescan_core::{SitemapEntry, SitemapIndexEntry};

/// A parsed sitemap document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapDocument {
    /// `<sitemapindex>`: references to other sitemap documents.
    Index(Vec<SitemapIndexEntry>),
    /// `<urlset>`: page entries tagged with the sitemap they came from.
    UrlSet(Vec<SitemapEntry>),
}

/// Error type for sitemap parsing.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    #[error("document has no root element")]
    Empty,

    #[error("expected <urlset> or <sitemapindex>, found <{0}>")]
    UnexpectedRoot(String),

    #[error("malformed XML at byte {position}: {reason}")]
    Malformed { position: u64, reason: String },
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Kind {
    Index,
    UrlSet,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Loc,
    LastMod,
    ChangeFreq,
    Priority,
}

impl Field {
    fn from_name(name: &[u8], kind: Kind) -> Option<Self> {
        match (name, kind) {
            (b"loc", _) => Some(Field::Loc),
            (b"lastmod", _) => Some(Field::LastMod),
            (b"changefreq", Kind::UrlSet) => Some(Field::ChangeFreq),
            (b"priority", Kind::UrlSet) => Some(Field::Priority),
            _ => None,
        }
    }
}

#[derive(Default)]
struct Pending {
    loc: String,
    lastmod: String,
    changefreq: String,
    priority: String,
}

impl Pending {
    fn slot(&mut self, field: Field) -> &mut String {
        match field {
            Field::Loc => &mut self.loc,
            Field::LastMod => &mut self.lastmod,
            Field::ChangeFreq => &mut self.changefreq,
            Field::Priority => &mut self.priority,
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Parse a sitemap document. Leaf entries are tagged with `source`.
///
/// Entries without a `<loc>` are skipped.
pub fn parse_document(bytes: &[u8], source: &str) -> Result<SitemapDocument, ParseError> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut kind: Option<Kind> = None;
    let mut depth = 0usize;
    let mut pending: Option<Pending> = None;
    let mut field: Option<Field> = None;

    let mut index = Vec::new();
    let mut urls = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| ParseError::Malformed {
            position: reader.error_position(),
            reason: e.to_string(),
        })?;

        match event {
            Event::Start(e) => {
                depth += 1;
                let name = e.local_name();
                match (depth, kind) {
                    (1, _) => {
                        kind = Some(match name.as_ref() {
                            b"sitemapindex" => Kind::Index,
                            b"urlset" => Kind::UrlSet,
                            other => {
                                return Err(ParseError::UnexpectedRoot(String::from_utf8_lossy(other).into_owned()));
                            }
                        });
                    }
                    (2, Some(Kind::Index)) if name.as_ref() == b"sitemap" => pending = Some(Pending::default()),
                    (2, Some(Kind::UrlSet)) if name.as_ref() == b"url" => pending = Some(Pending::default()),
                    (3, Some(k)) if pending.is_some() => field = Field::from_name(name.as_ref(), k),
                    _ => {}
                }
            }
            Event::Empty(e) if depth == 0 => {
                // a self-closing root holds no entries
                let name = e.local_name();
                return match name.as_ref() {
                    b"sitemapindex" => Ok(SitemapDocument::Index(Vec::new())),
                    b"urlset" => Ok(SitemapDocument::UrlSet(Vec::new())),
                    other => Err(ParseError::UnexpectedRoot(String::from_utf8_lossy(other).into_owned())),
                };
            }
            Event::Text(e) => {
                if let (Some(f), Some(p)) = (field, pending.as_mut()) {
                    let text = e.unescape().map_err(|err| ParseError::Malformed {
                        position: reader.buffer_position(),
                        reason: err.to_string(),
                    })?;
                    p.slot(f).push_str(&text);
                }
            }
            Event::CData(e) => {
                if let (Some(f), Some(p)) = (field, pending.as_mut()) {
                    p.slot(f).push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(_) => {
                match depth {
                    3 => field = None,
                    2 => {
                        if let Some(p) = pending.take() {
                            match (kind, non_empty(p.loc)) {
                                (Some(Kind::Index), Some(loc)) => {
                                    index.push(SitemapIndexEntry { loc, lastmod: non_empty(p.lastmod) })
                                }
                                (Some(Kind::UrlSet), Some(loc)) => urls.push(SitemapEntry {
                                    sitemap: source.to_string(),
                                    loc,
                                    lastmod: non_empty(p.lastmod),
                                    changefreq: non_empty(p.changefreq),
                                    priority: non_empty(p.priority),
                                }),
                                _ => {}
                            }
                        }
                    }
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof if depth > 0 => {
                return Err(ParseError::Malformed {
                    position: reader.buffer_position(),
                    reason: format!("unexpected end of document with {} element(s) open", depth),
                });
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    match kind {
        Some(Kind::Index) => Ok(SitemapDocument::Index(index)),
        Some(Kind::UrlSet) => Ok(SitemapDocument::UrlSet(urls)),
        None => Err(ParseError::Empty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "https://a.example/sitemap.xml";

    #[test]
    fn test_parse_urlset() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url>
    <loc>https://a.example/</loc>
    <lastmod>2024-05-01</lastmod>
    <changefreq>daily</changefreq>
    <priority>1.0</priority>
  </url>
  <url><loc>https://a.example/about</loc></url>
</urlset>"#;

        let SitemapDocument::UrlSet(urls) = parse_document(xml.as_bytes(), SOURCE).unwrap() else {
            panic!("expected urlset");
        };

        assert_eq!(urls.len(), 2);
        assert_eq!(urls[0].loc, "https://a.example/");
        assert_eq!(urls[0].lastmod.as_deref(), Some("2024-05-01"));
        assert_eq!(urls[0].changefreq.as_deref(), Some("daily"));
        assert_eq!(urls[0].priority.as_deref(), Some("1.0"));
        assert_eq!(urls[0].sitemap, SOURCE);
        assert_eq!(urls[1].loc, "https://a.example/about");
        assert!(urls[1].lastmod.is_none());
    }

    #[test]
    fn test_parse_index() {
        let xml = r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>https://a.example/posts.xml</loc><lastmod>2024-01-01</lastmod></sitemap>
  <sitemap><loc>https://a.example/pages.xml</loc></sitemap>
</sitemapindex>"#;

        let SitemapDocument::Index(entries) = parse_document(xml.as_bytes(), SOURCE).unwrap() else {
            panic!("expected index");
        };

        assert_eq!(
            entries,
            vec![
                SitemapIndexEntry { loc: "https://a.example/posts.xml".into(), lastmod: Some("2024-01-01".into()) },
                SitemapIndexEntry { loc: "https://a.example/pages.xml".into(), lastmod: None },
            ]
        );
    }

    #[test]
    fn test_parse_escaped_and_cdata_locations() {
        let xml = r#"<urlset>
  <url><loc>https://a.example/?a=1&amp;b=2</loc></url>
  <url><loc><![CDATA[https://a.example/cdata]]></loc></url>
</urlset>"#;

        let SitemapDocument::UrlSet(urls) = parse_document(xml.as_bytes(), SOURCE).unwrap() else {
            panic!("expected urlset");
        };
        assert_eq!(urls[0].loc, "https://a.example/?a=1&b=2");
        assert_eq!(urls[1].loc, "https://a.example/cdata");
    }

    #[test]
    fn test_parse_prefixed_elements() {
        let xml = r#"<sm:urlset xmlns:sm="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sm:url><sm:loc>https://a.example/prefixed</sm:loc></sm:url>
</sm:urlset>"#;

        let SitemapDocument::UrlSet(urls) = parse_document(xml.as_bytes(), SOURCE).unwrap() else {
            panic!("expected urlset");
        };
        assert_eq!(urls[0].loc, "https://a.example/prefixed");
    }

    #[test]
    fn test_parse_ignores_extension_elements() {
        let xml = r#"<urlset xmlns:image="http://www.google.com/schemas/sitemap-image/1.1">
  <url>
    <loc>https://a.example/gallery</loc>
    <image:image><image:loc>https://a.example/cat.jpg</image:loc></image:image>
  </url>
</urlset>"#;

        let SitemapDocument::UrlSet(urls) = parse_document(xml.as_bytes(), SOURCE).unwrap() else {
            panic!("expected urlset");
        };
        assert_eq!(urls.len(), 1);
        assert_eq!(urls[0].loc, "https://a.example/gallery");
    }

    #[test]
    fn test_parse_skips_entries_without_loc() {
        let xml = "<urlset><url><lastmod>2024-01-01</lastmod></url><url><loc> </loc></url></urlset>";
        assert_eq!(parse_document(xml.as_bytes(), SOURCE).unwrap(), SitemapDocument::UrlSet(Vec::new()));
    }

    #[test]
    fn test_parse_empty_index() {
        let xml = "<sitemapindex></sitemapindex>";
        assert_eq!(parse_document(xml.as_bytes(), SOURCE).unwrap(), SitemapDocument::Index(Vec::new()));
    }

    #[test]
    fn test_parse_self_closing_root() {
        assert_eq!(parse_document(b"<urlset/>", SOURCE).unwrap(), SitemapDocument::UrlSet(Vec::new()));
    }

    #[test]
    fn test_parse_html_is_rejected() {
        let html = "<!DOCTYPE html><html><body>Not found</body></html>";
        assert!(matches!(
            parse_document(html.as_bytes(), SOURCE),
            Err(ParseError::UnexpectedRoot(root)) if root == "html"
        ));
    }

    #[test]
    fn test_parse_empty_body() {
        assert!(matches!(parse_document(b"", SOURCE), Err(ParseError::Empty)));
        assert!(matches!(parse_document(b"   ", SOURCE), Err(ParseError::Empty)));
    }

    #[test]
    fn test_parse_truncated_urlset() {
        let xml = b"<urlset><url><loc>https://a.example/1</loc></url><url><loc>https://a.ex";
        assert!(matches!(parse_document(xml, SOURCE), Err(ParseError::Malformed { .. })));
    }

    #[test]
    fn test_parse_truncated_index() {
        let xml = b"<sitemapindex><sitemap><loc>https://a.example/posts.xml</loc></sitemap>";
        assert!(matches!(parse_document(xml, SOURCE), Err(ParseError::Malformed { .. })));
    }

    #[test]
    fn test_parse_mismatched_tags() {
        let xml = "<urlset><url><loc>https://a.example/</url></urlset>";
        assert!(matches!(parse_document(xml.as_bytes(), SOURCE), Err(ParseError::Malformed { .. })));
    }
}
