//! HTML Meta Tag Extraction
//!
//! Reads standard `<meta>` tags, Open Graph properties, Twitter cards and
//! Dublin Core names. Values only fill fields that are still empty, so the
//! caller decides precedence by the order it runs the sources in.

use chrono::{DateTime, Utc};

use super::Metadata;
use crate::dom::{NodeId, Tree};
use crate::text::normalize_whitespace;

/// Social preview declarations, most specific first.
const SOCIAL_IMAGE_PROPERTIES: &[&str] = &[
    "og:image:secure_url",
    "og:image:url",
    "og:image",
    "twitter:image",
    "twitter:image:src",
    "thumbnail",
];

/// Examine HTML meta tags for metadata.
///
/// A `property` attribute may list several space-separated names; each
/// is considered.
#[must_use]
pub fn examine_meta(tree: &Tree, original: Metadata) -> Metadata {
    let mut result = original;
    let mut images: Vec<(usize, String)> = Vec::new();

    for meta in tree.elements_by_tag(tree.root(), &["meta"]) {
        let content = normalize_whitespace(tree.attr(meta, "content").unwrap_or_default());
        if content.is_empty() {
            continue;
        }

        for name in meta_names(tree, meta) {
            if let Some(rank) = SOCIAL_IMAGE_PROPERTIES.iter().position(|&property| property == name) {
                images.push((rank, content.clone()));
                continue;
            }

            match name.as_str() {
                // Author
                "author" | "article:author" | "dc:creator" | "dc.creator" | "dcterm:creator"
                | "byl" | "sailthru.author" | "parsely-author" => {
                    if result.byline.is_none() && validate_metadata_name(&content) {
                        result.byline = Some(content.clone());
                    }
                }

                // Title
                "og:title" | "twitter:title" | "dc:title" | "dc.title" | "dcterm:title"
                | "parsely-title" | "sailthru.title" => {
                    if result.title.is_none() {
                        result.title = Some(content.clone());
                    }
                }

                // Description
                "description" | "og:description" | "twitter:description" | "dc:description"
                | "dc.description" | "dcterm:description" => {
                    if result.excerpt.is_none() {
                        result.excerpt = Some(content.clone());
                    }
                }

                // Site name
                "og:site_name" | "dc:publisher" | "dc.publisher" => {
                    if result.site_name.is_none() {
                        result.site_name = Some(content.clone());
                    }
                }

                // Publication date
                "article:published_time" | "og:article:published_time" | "article:published"
                | "dc:date" | "dc.date" | "dc.date.issued" | "dcterms.created" | "date"
                | "datepublished" | "parsely-pub-date" | "pubdate" | "publish_date"
                | "sailthru.date" => {
                    if result.published_time.is_none() {
                        result.published_time = parse_meta_date(&content);
                    }
                }

                _ => {}
            }
        }
    }

    // Stable sort: document order within one property
    images.sort_by_key(|(rank, _)| *rank);
    let mut ranked: Vec<String> = Vec::with_capacity(images.len() + result.images.len());
    for (_, url) in images {
        if !ranked.contains(&url) {
            ranked.push(url);
        }
    }
    for url in std::mem::take(&mut result.images) {
        if !ranked.contains(&url) {
            ranked.push(url);
        }
    }
    result.images = ranked;

    result
}

/// Lowercased names a meta tag is known by.
fn meta_names(tree: &Tree, meta: NodeId) -> Vec<String> {
    let mut names: Vec<String> = tree
        .attr(meta, "property")
        .map(|property| property.split_whitespace().map(str::to_ascii_lowercase).collect())
        .unwrap_or_default();

    for attr in ["name", "itemprop"] {
        if let Some(value) = tree.attr(meta, attr) {
            let value = value.trim().to_ascii_lowercase();
            if !value.is_empty() {
                names.push(value);
            }
        }
    }
    names
}

/// Validate that a metadata name looks like a real author name.
///
/// Rejects URLs, JSON blobs, numeric identifiers and strings too short or
/// too long to be a person.
#[must_use]
pub fn validate_metadata_name(name: &str) -> bool {
    let name = name.trim();
    let length = name.chars().count();

    if !(2..=120).contains(&length) {
        return false;
    }

    // Long single tokens are handles or slugs, not names
    if length > 20 && !name.contains(' ') {
        return false;
    }

    if name.starts_with("http://") || name.starts_with("https://") || name.starts_with("www.") {
        return false;
    }

    if name.starts_with('{') || name.starts_with('[') {
        return false;
    }

    let digit_count = name.chars().filter(char::is_ascii_digit).count();
    if digit_count > 3 {
        return false;
    }

    let special_count = name
        .chars()
        .filter(|c| !c.is_alphanumeric() && !c.is_whitespace() && !matches!(c, '-' | '\'' | '.' | ','))
        .count();
    special_count <= 2
}

/// Parse a date string from meta tags or JSON-LD.
///
/// Supports RFC 3339, ISO 8601 without offset, and common date-only
/// formats (interpreted as midnight UTC).
#[must_use]
pub fn parse_meta_date(date_str: &str) -> Option<DateTime<Utc>> {
    let date_str = date_str.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(date_str) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(date_str, fmt) {
            return Some(dt.and_utc());
        }
    }

    let formats = [
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%B %d, %Y", // January 15, 2024
        "%b %d, %Y", // Jan 15, 2024
        "%d %B %Y",  // 15 January 2024
    ];
    formats.into_iter().find_map(|fmt| {
        chrono::NaiveDate::parse_from_str(date_str, fmt)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse;
    use chrono::{Datelike, Timelike};

    fn meta(html: &str) -> Metadata {
        examine_meta(&parse(html), Metadata::default())
    }

    #[test]
    fn open_graph_fields() {
        let md = meta(
            r#"<head>
            <meta property="og:title" content="OG Title">
            <meta property="og:site_name" content="Example News">
            <meta property="og:description" content="A  summary.">
            <meta property="og:image" content="https://example.com/og.png">
            </head>"#,
        );
        assert_eq!(md.title.as_deref(), Some("OG Title"));
        assert_eq!(md.site_name.as_deref(), Some("Example News"));
        assert_eq!(md.excerpt.as_deref(), Some("A summary."));
        assert_eq!(md.images, vec!["https://example.com/og.png"]);
    }

    #[test]
    fn first_value_wins_and_existing_fields_are_kept() {
        let html = r#"<meta name="description" content="first"><meta name="twitter:description" content="second"><meta name="author" content="Jane Doe">"#;
        let md = examine_meta(
            &parse(html),
            Metadata {
                byline: Some("Existing".into()),
                ..Metadata::default()
            },
        );
        assert_eq!(md.excerpt.as_deref(), Some("first"));
        assert_eq!(md.byline.as_deref(), Some("Existing"));
    }

    #[test]
    fn multi_valued_property() {
        let md = meta(r#"<meta property="og:title twitter:title" content="Shared">"#);
        assert_eq!(md.title.as_deref(), Some("Shared"));
    }

    #[test]
    fn url_author_rejected() {
        let md = meta(r#"<meta property="article:author" content="https://facebook.com/someone">"#);
        assert_eq!(md.byline, None);
    }

    #[test]
    fn published_time_parsed() {
        let md = meta(r#"<meta property="article:published_time" content="2024-03-05T10:30:00+01:00">"#);
        let date = md.published_time.unwrap();
        assert_eq!((date.year(), date.month(), date.day(), date.hour()), (2024, 3, 5, 9));
    }

    #[test]
    fn test_validate_metadata_name() {
        assert!(validate_metadata_name("Jane Doe"));
        assert!(validate_metadata_name("O'Brien, Pat"));
        assert!(!validate_metadata_name("J"));
        assert!(!validate_metadata_name("https://example.com/jane"));
        assert!(!validate_metadata_name("user12345678"));
        assert!(!validate_metadata_name(r#"{"name": "x"}"#));
    }

    #[test]
    fn test_parse_meta_date_formats() {
        assert!(parse_meta_date("2024-01-15").is_some());
        assert!(parse_meta_date("January 15, 2024").is_some());
        assert!(parse_meta_date("2024-01-15T08:00:00").is_some());
        assert!(parse_meta_date("yesterday").is_none());
    }
}
