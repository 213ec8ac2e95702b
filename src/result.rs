//! Result types for pipeline output.
//!
//! The extractor produces an [`Article`]; the lead image selector an optional
//! URL. [`Page`] merges both for one processed document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized article record.
///
/// Serializes with camelCase keys (`textContent`, `siteName`) for template
/// collaborators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Article title with site-name suffixes stripped.
    pub title: String,

    /// Author line.
    pub byline: Option<String>,

    /// Text direction of the content container (`ltr`, `rtl`).
    pub dir: Option<String>,

    /// Document language from `<html lang>`.
    pub lang: Option<String>,

    /// Cleaned content markup, a self-contained subtree.
    pub content: String,

    /// Plain-text projection of `content`; block boundaries become newlines.
    pub text_content: String,

    /// Character count of `text_content`.
    pub length: usize,

    /// Short summary: the first paragraph, or the meta description when richer.
    pub excerpt: Option<String>,

    /// Publisher name.
    pub site_name: Option<String>,

    /// Publication date.
    pub published_time: Option<DateTime<Utc>>,
}

/// One processed document: article plus lead image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Extracted article.
    pub article: Article,

    /// Absolute URL of the representative image.
    pub image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_serializes_camel_case() {
        let article = Article {
            title: "T".into(),
            text_content: "abc".into(),
            length: 3,
            site_name: Some("Site".into()),
            ..Article::default()
        };
        let json = serde_json::to_value(&article).unwrap();
        assert_eq!(json["textContent"], "abc");
        assert_eq!(json["siteName"], "Site");
        assert!(json["byline"].is_null());
    }
}
