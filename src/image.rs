//! Lead image selection.
//!
//! Picks one representative image for an enhanced document: the declared
//! social preview when it is usable, otherwise the first plausible image
//! of the region the extractor would take as content. Works on a private
//! copy, so the caller's tree is never modified.

use crate::dom::{NodeId, Tree};
use crate::extractor::locate_content_region;
use crate::metadata::extract_metadata;
use crate::patterns::TRACKING_IMAGE;
use crate::url_utils::is_http_url;
use crate::Options;

/// Returns the lead image URL, or `None` when nothing qualifies.
#[must_use]
pub fn select_lead_image(tree: &Tree, options: &Options) -> Option<String> {
    social_preview(tree).or_else(|| first_content_image(tree, options))
}

fn social_preview(tree: &Tree) -> Option<String> {
    extract_metadata(tree)
        .images
        .into_iter()
        .map(|url| url.trim().to_string())
        .find(|url| is_plausible_url(url))
}

fn first_content_image(tree: &Tree, options: &Options) -> Option<String> {
    let region = locate_content_region(tree, options)?;
    let tree = &region.tree;
    tree.elements_by_tag(region.content, &["img"])
        .into_iter()
        .filter(|&img| !declares_pixel_size(tree, img))
        .filter_map(|img| tree.attr(img, "src").map(str::trim))
        .find(|src| is_plausible_url(src))
        .map(str::to_string)
}

/// Absolute http(s) URL that is not a known tracker or spacer.
fn is_plausible_url(url: &str) -> bool {
    is_http_url(url) && !TRACKING_IMAGE.is_match(url)
}

/// `width` or `height` declared as 1 pixel or less.
fn declares_pixel_size(tree: &Tree, img: NodeId) -> bool {
    ["width", "height"].into_iter().any(|name| {
        tree.attr(img, name)
            .map(|value| value.trim().trim_end_matches("px").trim())
            .and_then(|value| value.parse::<f64>().ok())
            .is_some_and(|size| size <= 1.0)
    })
}
