//! # rs-percollate
//!
//! Document normalization and main-content extraction for web pages that
//! are about to be rendered for reading.
//!
//! A page goes through two stages. The enhancement stage rewrites the
//! parsed tree in place: AMP markup becomes standard HTML, lazy images get
//! real sources, relative URLs become absolute, thumbnails are upgraded,
//! lone images become figures, dead links are neutralized and a few sites
//! get specific fixups. The extractor then scores the enhanced tree to
//! find the article and returns it as cleaned markup with its metadata,
//! while the lead image selector picks one representative image.
//!
//! ## Quick Start
//!
//! ```rust
//! use rs_percollate::{process, Options};
//!
//! let html = r#"<html><head><title>Harbour Reopens</title></head>
//! <body><article><p>The old harbour reopened to ferries on Monday morning.</p></article></body></html>"#;
//!
//! let page = process(html, "https://example.com/news/harbour", &Options::default())?;
//! assert_eq!(page.article.title, "Harbour Reopens");
//! assert!(page.article.text_content.contains("reopened to ferries"));
//! # Ok::<(), rs_percollate::Error>(())
//! ```
//!
//! ## Stages
//!
//! The stages are also available on their own, for callers that keep the
//! tree around between them:
//!
//! ```rust
//! use rs_percollate::{enhance, extract_article, parse, select_lead_image, Options};
//! use url::Url;
//!
//! let base = Url::parse("https://example.com/a/").unwrap();
//! let mut tree = parse(r#"<body><article><img src="lead.jpg"><p>Some article text that is long enough.</p></article></body>"#);
//! enhance(&mut tree, &base, &Options::default());
//!
//! assert_eq!(
//!     select_lead_image(&tree, &Options::default()).as_deref(),
//!     Some("https://example.com/a/lead.jpg")
//! );
//! let article = extract_article(&tree, &Options::default()).unwrap();
//! assert!(article.length > 0);
//! ```

mod error;
mod options;
mod patterns;
mod result;

/// Arena document tree.
pub mod dom;

/// Enhancement stage passes.
pub mod enhance;

/// Main content extraction.
pub mod extractor;

/// Lead image selection.
pub mod image;

/// Metadata extraction (title, byline, JSON-LD).
pub mod metadata;

/// Text projection helpers.
pub mod text;

/// URL utilities.
pub mod url_utils;

/// Character encoding detection.
pub mod encoding;

/// Link density heuristics.
pub mod link_density;

use url::Url;

pub use dom::{parse, NodeId, Tree};
pub use enhance::enhance;
pub use error::{Error, Result};
pub use extractor::extract_article;
pub use image::select_lead_image;
pub use options::Options;
pub use result::{Article, Page};

/// Parses, enhances and extracts one document.
///
/// The article and the lead image come from the same enhanced tree.
///
/// # Errors
///
/// [`Error::InvalidBaseUrl`] when `base_url` does not parse, otherwise the
/// extraction failures of [`extract_article`].
pub fn process(html: &str, base_url: &str, options: &Options) -> Result<Page> {
    let url = Url::parse(base_url).map_err(|source| Error::InvalidBaseUrl {
        url: base_url.to_string(),
        source,
    })?;

    let mut tree = parse(html);
    enhance(&mut tree, &url, options);

    let article = extract_article(&tree, options)?;
    let image = select_lead_image(&tree, options);
    Ok(Page { article, image })
}

/// Like [`process`], for raw bytes in the encoding the document declares.
///
/// # Errors
///
/// Same as [`process`].
///
/// # Example
///
/// ```rust
/// use rs_percollate::{process_bytes, Options};
///
/// let html = b"<html><head><meta charset=\"ISO-8859-1\"></head><body><article><p>Caf\xE9 owners welcome the harbour reopening.</p></article></body></html>";
/// let page = process_bytes(html, "https://example.com/", &Options::default())?;
/// assert!(page.article.text_content.contains("Café"));
/// # Ok::<(), rs_percollate::Error>(())
/// ```
pub fn process_bytes(html: &[u8], base_url: &str, options: &Options) -> Result<Page> {
    let html = encoding::decode_html(html);
    process(&html, base_url, options)
}

/// The document's AMP alternate (`<link rel="amphtml">`), resolved.
///
/// A caller honoring [`Options::prefer_amp`] fetches this URL and runs the
/// pipeline on that document instead. Returns `None` when there is no
/// alternate or it points back at `base_url`.
#[must_use]
pub fn amp_alternate(tree: &Tree, base_url: &Url) -> Option<Url> {
    let link = tree.find_first(tree.root(), |t, node| {
        t.is_tag(node, "link")
            && t.attr(node, "rel")
                .is_some_and(|rel| rel.split_whitespace().any(|r| r.eq_ignore_ascii_case("amphtml")))
    })?;
    let href = tree.attr(link, "href").map(str::trim).filter(|href| !href.is_empty())?;

    let base = url_utils::document_base(base_url, enhance::declared_base(tree));
    let alternate = base.join(href).ok()?;
    (alternate != *base_url).then_some(alternate)
}
