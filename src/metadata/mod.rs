//! Metadata extraction module.
//!
//! Document-level facts that do not depend on which subtree is chosen as
//! content: title, byline, summary, site name, language, direction,
//! publication date and the social preview image.

pub mod json_ld;
pub mod meta_tags;
pub mod title;

use chrono::{DateTime, Utc};

use crate::dom::{NodeId, Tree};
use crate::text::inner_text;

pub use json_ld::extract_json_ld;
pub use meta_tags::{examine_meta, parse_meta_date, validate_metadata_name};
pub use title::document_title;

/// Metadata gathered from the document head and structured data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub title: Option<String>,
    pub byline: Option<String>,
    /// Meta or JSON-LD description.
    pub excerpt: Option<String>,
    pub site_name: Option<String>,
    pub lang: Option<String>,
    pub dir: Option<String>,
    pub published_time: Option<DateTime<Utc>>,
    /// Social preview images, best first: `<meta>` declarations by
    /// property, then structured data. Relative until enhancement has run.
    pub images: Vec<String>,
}

/// Extract all metadata from a document.
///
/// Sources fill only empty fields, in this order:
/// 1. `<title>` with site-name affixes removed
/// 2. JSON-LD (Schema.org structured data)
/// 3. `<meta>` tags (Open Graph, Twitter, Dublin Core)
/// 4. A lone `<h1>` as the title of last resort
/// 5. `lang` and `dir` of the `<html>` element
///
/// Images are the exception: every source contributes, and `<meta>`
/// declarations are listed ahead of JSON-LD.
#[must_use]
pub fn extract_metadata(tree: &Tree) -> Metadata {
    let mut metadata = Metadata {
        title: document_title(tree),
        ..Metadata::default()
    };

    metadata = extract_json_ld(tree, metadata);
    metadata = examine_meta(tree, metadata);

    if metadata.title.is_none() {
        metadata.title = tree
            .find_first(tree.root(), |t, node| t.is_tag(node, "h1"))
            .map(|h1| inner_text(tree, h1))
            .filter(|title| !title.is_empty());
    }

    if let Some(html) = tree.document_element() {
        metadata.lang = non_empty_attr(tree, html, "lang");
        metadata.dir = non_empty_attr(tree, html, "dir");
    }

    metadata
}

fn non_empty_attr(tree: &Tree, node: NodeId, name: &str) -> Option<String> {
    tree.attr(node, name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
