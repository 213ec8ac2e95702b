//! Lazy-loaded image resolution.

use log::trace;

use super::{EnhanceContext, Enhancement};
use crate::dom::{NodeId, Tree};
use crate::url_utils::best_srcset_candidate;

/// Vendor attributes holding the real source of a deferred image, in
/// order of preference.
const DEFERRED_SRC_ATTRIBUTES: &[&str] = &[
    "data-src",
    "data-lazy-src",
    "data-original",
    "data-url",
    "data-lazyload",
    "data-hi-res-src",
    "data-echo",
    "data-actualsrc",
    "data-src-large",
];

/// Vendor attributes holding a deferred `srcset`.
const DEFERRED_SRCSET_ATTRIBUTES: &[&str] = &["data-srcset", "data-lazy-srcset", "srcset"];

/// Gives `src` to images that only carry a deferred source.
///
/// An image whose `src` is missing, empty, a `data:` placeholder or
/// `about:blank` takes the first deferred source attribute; failing that,
/// the widest candidate of a deferred `srcset`. Images with a real `src`
/// are left alone.
pub struct LazyImages;

impl Enhancement for LazyImages {
    fn name(&self) -> &'static str {
        "lazy-images"
    }

    fn apply(&self, tree: &mut Tree, _ctx: &EnhanceContext<'_>) {
        for img in tree.elements_by_tag(tree.root(), &["img"]) {
            if has_usable_src(tree, img) {
                continue;
            }
            if let Some(source) = deferred_source(tree, img) {
                trace!("lazy image resolved to {source}");
                tree.set_attr(img, "src", &source);
            }
        }
    }
}

fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    value.is_empty()
        || value.to_ascii_lowercase().starts_with("data:")
        || value.eq_ignore_ascii_case("about:blank")
}

fn has_usable_src(tree: &Tree, img: NodeId) -> bool {
    tree.attr(img, "src").is_some_and(|src| !is_placeholder(src))
}

fn deferred_source(tree: &Tree, img: NodeId) -> Option<String> {
    DEFERRED_SRC_ATTRIBUTES
        .iter()
        .filter_map(|name| tree.attr(img, name))
        .map(str::trim)
        .find(|value| !is_placeholder(value))
        .map(str::to_string)
        .or_else(|| {
            DEFERRED_SRCSET_ATTRIBUTES
                .iter()
                .filter_map(|name| tree.attr(img, name))
                .find_map(best_srcset_candidate)
                .filter(|url| !is_placeholder(url))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enhance::test_support::{body_after, is_idempotent};

    const URL: &str = "https://example.com/post";

    #[test]
    fn data_src_fills_missing_src() {
        assert_eq!(
            body_after(&LazyImages, r#"<img data-src="/real.jpg">"#, URL),
            r#"<img data-src="/real.jpg" src="/real.jpg">"#
        );
    }

    #[test]
    fn placeholder_src_is_replaced() {
        let html = r#"<img src="data:image/gif;base64,R0lGODlhAQABAAAAACw=" data-lazy-src="/real.jpg">"#;
        assert_eq!(
            body_after(&LazyImages, html, URL),
            r#"<img src="/real.jpg" data-lazy-src="/real.jpg">"#
        );
    }

    #[test]
    fn srcset_picks_widest_candidate() {
        let html = r#"<img data-srcset="/s.jpg 320w, /l.jpg 1024w, /m.jpg 640w">"#;
        assert!(body_after(&LazyImages, html, URL).contains(r#"src="/l.jpg""#));
    }

    #[test]
    fn real_src_is_never_overwritten() {
        let html = r#"<img src="/already.jpg" data-src="/other.jpg">"#;
        assert_eq!(body_after(&LazyImages, html, URL), html);
    }

    #[test]
    fn image_without_any_source_is_skipped() {
        let html = r#"<img alt="nothing">"#;
        assert_eq!(body_after(&LazyImages, html, URL), html);
    }

    #[test]
    fn idempotent() {
        assert!(is_idempotent(
            &LazyImages,
            r#"<img src="about:blank" data-original="/o.jpg"><img data-srcset="/a.jpg 1x, /b.jpg 2x">"#,
            URL
        ));
    }
}
