//! AMP custom elements to standard HTML.

use log::trace;

use super::{EnhanceContext, Enhancement};
use crate::dom::Tree;

/// AMP element and the standard element it stands for.
const AMP_ELEMENTS: &[(&str, &str)] = &[
    ("amp-img", "img"),
    ("amp-anim", "img"),
    ("amp-video", "video"),
    ("amp-audio", "audio"),
    ("amp-iframe", "iframe"),
];

/// AMP layout attributes with no meaning outside the AMP runtime.
const AMP_ONLY_ATTRIBUTES: &[&str] = &["layout", "heights", "noloading"];

/// Rewrites `amp-img`, `amp-anim`, `amp-video`, `amp-audio` and
/// `amp-iframe` into their HTML equivalents.
///
/// Attributes are copied over. An `amp-img` often nests a fallback
/// `<noscript><img></noscript>` and placeholder children; an `img` has no
/// children, so they are dropped. Media elements keep `<source>` and
/// `<track>` children.
pub struct AmpToHtml;

impl Enhancement for AmpToHtml {
    fn name(&self) -> &'static str {
        "amp-to-html"
    }

    fn apply(&self, tree: &mut Tree, _ctx: &EnhanceContext<'_>) {
        let tags: Vec<&str> = AMP_ELEMENTS.iter().map(|(amp, _)| *amp).collect();

        for node in tree.elements_by_tag(tree.root(), &tags) {
            if !tree.is_attached(node) {
                continue;
            }
            let Some(target) = tree
                .tag_name(node)
                .and_then(|name| AMP_ELEMENTS.iter().find(|(amp, _)| *amp == name))
                .map(|(_, html)| *html)
            else {
                continue;
            };

            trace!("amp: {:?} -> {target}", tree.tag_name(node));
            tree.rename(node, target);
            tree.retain_attrs(node, |attr| !AMP_ONLY_ATTRIBUTES.contains(&attr.name.as_str()));

            if target == "img" {
                tree.remove_children(node);
            } else {
                for child in tree.children(node).to_vec() {
                    if !tree.is_one_of(child, &["source", "track"]) {
                        tree.remove(child);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enhance::test_support::{body_after, is_idempotent};

    const URL: &str = "https://example.com/article.amp";

    #[test]
    fn amp_img_becomes_img_with_attributes() {
        let html = r#"<amp-img src="/hero.jpg" alt="Hero" width="800" height="400" layout="responsive"><noscript><img src="/hero.jpg"></noscript></amp-img>"#;
        assert_eq!(
            body_after(&AmpToHtml, html, URL),
            r#"<img src="/hero.jpg" alt="Hero" width="800" height="400">"#
        );
    }

    #[test]
    fn amp_video_keeps_sources() {
        let html = r#"<amp-video controls width="640" height="360"><source src="/v.mp4" type="video/mp4"><div placeholder>Loading</div></amp-video>"#;
        assert_eq!(
            body_after(&AmpToHtml, html, URL),
            r#"<video controls="" width="640" height="360"><source src="/v.mp4" type="video/mp4"></video>"#
        );
    }

    #[test]
    fn standard_markup_is_untouched() {
        let html = r#"<p><img src="/a.png"></p>"#;
        assert_eq!(body_after(&AmpToHtml, html, URL), html);
    }

    #[test]
    fn idempotent() {
        assert!(is_idempotent(
            &AmpToHtml,
            r#"<amp-anim src="/a.gif" width="1" height="1"></amp-anim><amp-iframe src="/frame"></amp-iframe>"#,
            URL
        ));
    }
}
