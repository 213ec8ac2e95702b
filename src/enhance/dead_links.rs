//! Dead-anchor neutralization.

use log::trace;

use super::{EnhanceContext, Enhancement};
use crate::dom::{NodeId, Tree};
use crate::Options;

/// Class given to protected anchors whose `href` was removed.
const NO_HREF_CLASS: &str = "no-href";

/// Unwraps anchors that lead nowhere.
///
/// An `href` that is empty, a bare `#` or a `javascript:` URL is dead. The
/// anchor is replaced by its contents unless it is an in-page target (it
/// has an `id` or `name`) or carries a preserved class; those keep the
/// element, lose the `href` and gain the `no-href` class. Anchors without
/// any `href` are named targets and are not touched.
pub struct DeadLinks;

impl Enhancement for DeadLinks {
    fn name(&self) -> &'static str {
        "dead-links"
    }

    fn apply(&self, tree: &mut Tree, ctx: &EnhanceContext<'_>) {
        let mut unwrapped = Vec::new();
        for anchor in tree.elements_by_tag(tree.root(), &["a"]) {
            if !tree.attr(anchor, "href").is_some_and(is_dead_href) {
                continue;
            }

            if is_protected(tree, anchor, ctx.options) {
                trace!("dead-links: marking protected anchor");
                tree.remove_attr(anchor, "href");
                tree.add_class(anchor, NO_HREF_CLASS);
            } else {
                unwrapped.push(anchor);
            }
        }

        // One rebuild per parent keeps long runs of dead anchors linear
        if !unwrapped.is_empty() {
            trace!("dead-links: unwrapping {} anchors", unwrapped.len());
            tree.unwrap_all(&unwrapped);
        }
    }
}

fn is_dead_href(href: &str) -> bool {
    let href = href.trim();
    href.is_empty()
        || href == "#"
        || href
            .get(..11)
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case("javascript:"))
}

fn is_protected(tree: &Tree, anchor: NodeId, options: &Options) -> bool {
    let has_target = ["id", "name"]
        .iter()
        .any(|name| tree.attr(anchor, name).is_some_and(|value| !value.trim().is_empty()));
    has_target
        || tree
            .attr(anchor, "class")
            .is_some_and(|class| class.split_whitespace().any(|c| options.preserves_class(c)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enhance::test_support::{body_after, is_idempotent};

    const URL: &str = "https://example.com/post";

    #[test]
    fn dead_anchors_are_unwrapped() {
        assert_eq!(
            body_after(
                &DeadLinks,
                r##"<p>a <a href="javascript:void(0)">b</a> <a href="#">c</a> <a href="">d</a></p>"##,
                URL
            ),
            "<p>a b c d</p>"
        );
    }

    #[test]
    fn in_page_targets_are_marked() {
        assert_eq!(
            body_after(&DeadLinks, r##"<h2><a id="intro" href="#">Intro</a></h2>"##, URL),
            r#"<h2><a id="intro" class="no-href">Intro</a></h2>"#
        );
    }

    #[test]
    fn preserved_class_protects_anchor() {
        assert_eq!(
            body_after(&DeadLinks, r#"<a class="anchor" href="JavaScript:go()">x</a>"#, URL),
            r#"<a class="anchor no-href">x</a>"#
        );
    }

    #[test]
    fn live_links_and_named_anchors_untouched() {
        let html = r##"<a href="https://example.com/x">x</a><a href="#notes">n</a><a name="top"></a>"##;
        assert_eq!(body_after(&DeadLinks, html, URL), html);
    }

    #[test]
    fn long_runs_of_dead_anchors_are_unwrapped() {
        let anchors = r##"<a href="#">x</a>"##.repeat(2000);
        let out = body_after(&DeadLinks, &format!("<p>{anchors}<a id=\"end\" href=\"#\">end</a></p>"), URL);
        assert_eq!(out, format!(r#"<p>{}<a id="end" class="no-href">end</a></p>"#, "x".repeat(2000)));
    }

    #[test]
    fn idempotent() {
        assert!(is_idempotent(
            &DeadLinks,
            r##"<a href="#" id="a">x</a><a href="javascript:;">y</a>"##,
            URL
        ));
    }
}
