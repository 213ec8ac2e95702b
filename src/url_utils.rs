//! URL Utility Functions
//!
//! Classification and resolution of the URL-valued attributes found in
//! fetched pages: absolutization against the document base, `srcset`
//! candidate parsing, and small path helpers used by the image heuristics.

use url::Url;

use crate::error::{Error, Result};

/// Schemes that are left untouched by absolutization.
const OPAQUE_PREFIXES: &[&str] = &["data:", "javascript:", "mailto:", "tel:", "about:", "blob:"];

/// File extensions treated as images.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "webp", "avif", "bmp"];

/// True when `s` already carries a scheme (`https://…`, `ftp:…`).
///
/// Relative and protocol-relative references are not absolute.
#[must_use]
pub fn is_absolute_url(s: &str) -> bool {
    let s = s.trim();
    !s.is_empty() && !s.starts_with("//") && Url::parse(s).is_ok()
}

/// True for `http`/`https` URLs with a host.
#[must_use]
pub fn is_http_url(s: &str) -> bool {
    Url::parse(s.trim())
        .is_ok_and(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some())
}

/// Effective base for a document: its `<base href>` resolved against the
/// fetch URL, or the fetch URL itself.
#[must_use]
pub fn document_base(document_url: &Url, base_href: Option<&str>) -> Url {
    base_href
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .and_then(|href| document_url.join(href).ok())
        .unwrap_or_else(|| document_url.clone())
}

/// Resolve a single URL reference against `base`.
///
/// Returns the input unchanged for already-absolute URLs, fragment-only
/// references (in-page anchors), empty values and opaque schemes such as
/// `javascript:` or `data:`. Applying it to its own output is a no-op.
///
/// # Errors
///
/// [`Error::MalformedNode`] when the reference cannot be joined to the base.
///
/// # Examples
///
/// ```
/// use rs_percollate::url_utils::absolutize;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/a/b").unwrap();
/// assert_eq!(absolutize("../c.html", &base).unwrap(), "https://example.com/c.html");
/// assert_eq!(absolutize("//cdn.example.com/x.png", &base).unwrap(), "https://cdn.example.com/x.png");
/// ```
pub fn absolutize(reference: &str, base: &Url) -> Result<String> {
    let trimmed = reference.trim();

    if trimmed.is_empty() || trimmed.starts_with('#') || is_absolute_url(trimmed) {
        return Ok(reference.to_string());
    }

    let lower = trimmed.to_ascii_lowercase();
    if OPAQUE_PREFIXES.iter().any(|prefix| lower.starts_with(prefix)) {
        return Ok(reference.to_string());
    }

    base.join(trimmed)
        .map(|resolved| resolved.to_string())
        .map_err(|err| Error::MalformedNode(format!("cannot resolve `{trimmed}`: {err}")))
}

/// One entry of a `srcset` attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct SrcsetCandidate {
    pub url: String,
    /// Raw descriptor such as `640w` or `2x`; empty when omitted.
    pub descriptor: String,
}

impl SrcsetCandidate {
    /// Width in pixels for `w` descriptors.
    #[must_use]
    pub fn width(&self) -> Option<f64> {
        self.descriptor.strip_suffix('w')?.parse().ok()
    }

    /// Pixel density for `x` descriptors; an omitted descriptor means `1x`.
    #[must_use]
    pub fn density(&self) -> Option<f64> {
        if self.descriptor.is_empty() {
            return Some(1.0);
        }
        self.descriptor.strip_suffix('x')?.parse().ok()
    }
}

/// Split a `srcset` value into candidates.
///
/// URLs may themselves contain commas (`/w_300,h_200/a.jpg`); a comma only
/// ends a candidate when it trails the URL or follows the descriptor.
#[must_use]
pub fn parse_srcset(value: &str) -> Vec<SrcsetCandidate> {
    let mut candidates = Vec::new();
    let mut rest = value;

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        if rest.is_empty() {
            break;
        }

        let url_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let raw_url = &rest[..url_end];
        rest = &rest[url_end..];

        let url = raw_url.trim_end_matches(',');
        let descriptor = if url.len() < raw_url.len() {
            String::new()
        } else {
            let desc_end = rest.find(',').unwrap_or(rest.len());
            let descriptor = rest[..desc_end].trim().to_string();
            rest = &rest[desc_end..];
            descriptor
        };

        if !url.is_empty() {
            candidates.push(SrcsetCandidate {
                url: url.to_string(),
                descriptor,
            });
        }
    }

    candidates
}

/// URL of the highest-resolution `srcset` candidate.
///
/// Width descriptors outrank density descriptors; among equals the first
/// candidate wins.
#[must_use]
pub fn best_srcset_candidate(value: &str) -> Option<String> {
    let candidates = parse_srcset(value);
    let mut best: Option<(&SrcsetCandidate, (f64, f64))> = None;

    for candidate in &candidates {
        let rank = match (candidate.width(), candidate.density()) {
            (Some(width), _) => (1.0, width),
            (None, Some(density)) => (0.0, density),
            (None, None) => (0.0, 0.0),
        };
        if best.is_none_or(|(_, best_rank)| rank > best_rank) {
            best = Some((candidate, rank));
        }
    }

    best.map(|(candidate, _)| candidate.url.clone())
}

/// Absolutize every URL of a `srcset` value, keeping descriptors.
///
/// # Errors
///
/// [`Error::MalformedNode`] when any candidate cannot be resolved.
pub fn absolutize_srcset(value: &str, base: &Url) -> Result<String> {
    let candidates = parse_srcset(value);
    let mut parts = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let url = absolutize(&candidate.url, base)?;
        if candidate.descriptor.is_empty() {
            parts.push(url);
        } else {
            parts.push(format!("{url} {}", candidate.descriptor));
        }
    }
    Ok(parts.join(", "))
}

/// Last path segment of a URL, without query or fragment.
///
/// # Examples
/// ```
/// use rs_percollate::url_utils::filename;
///
/// assert_eq!(filename("https://example.com/images/photo.jpg?v=123"), "photo.jpg");
/// assert_eq!(filename("/path/to/image.png#section"), "image.png");
/// assert_eq!(filename("https://example.com/"), "");
/// ```
#[must_use]
pub fn filename(url: &str) -> &str {
    let url = url.trim();
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    without_query.rsplit('/').next().unwrap_or_default()
}

/// True when the URL path ends in a known image extension.
#[must_use]
pub fn has_image_extension(url: &str) -> bool {
    filename(url)
        .rsplit_once('.')
        .is_some_and(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}
