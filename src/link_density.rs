//! Link Density
//!
//! Share of a node's text that sits inside links. Navigation blocks, tag
//! clouds and "related stories" lists are rich in links; article prose is
//! not. Scoring discounts candidates by this ratio and cleanup removes
//! link-heavy blocks.

use crate::dom::{NodeId, Tree};
use crate::text::text_length;

/// Weight of in-page (`#fragment`) link text; footnote links are part of
/// the prose.
const HASH_LINK_COEFFICIENT: f64 = 0.3;

/// Ratio of link text to all text, in `[0, 1]`.
///
/// Returns `0.0` for nodes without text.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn link_density(tree: &Tree, node: NodeId) -> f64 {
    let total = text_length(tree, node);
    if total == 0 {
        return 0.0;
    }

    let link_length: f64 = tree
        .elements_by_tag(node, &["a"])
        .into_iter()
        .map(|link| {
            let coefficient = if tree.attr(link, "href").is_some_and(|href| href.starts_with('#')) {
                HASH_LINK_COEFFICIENT
            } else {
                1.0
            };
            text_length(tree, link) as f64 * coefficient
        })
        .sum();

    (link_length / total as f64).min(1.0)
}

/// Collect heuristics on link text.
///
/// Returns (total link text length, links shorter than 10 chars, non-empty links)
fn collect_link_info(tree: &Tree, links: &[NodeId]) -> (usize, usize, usize) {
    let mut link_length = 0;
    let mut n_short_links = 0;
    let mut n_non_empty_links = 0;

    for &link in links {
        let len = text_length(tree, link);
        if len == 0 {
            continue;
        }
        link_length += len;
        if len < 10 {
            n_short_links += 1;
        }
        n_non_empty_links += 1;
    }

    (link_length, n_short_links, n_non_empty_links)
}

/// Whether a short block is made of links: a menu, a tag list, a row of
/// "next/previous" pointers.
///
/// Long blocks never qualify; the limit is lower for paragraphs and for
/// nodes followed by more content.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn is_link_heavy(tree: &Tree, node: NodeId) -> bool {
    let links = tree.elements_by_tag(node, &["a"]);
    if links.is_empty() {
        return false;
    }

    let text_len = text_length(tree, node);

    // Shortcut for a single link carrying nearly all the text
    if let [link] = links.as_slice() {
        let link_len = text_length(tree, *link);
        if link_len > 100 && link_len as f64 > text_len as f64 * 0.9 {
            return true;
        }
    }

    let has_next_sibling = tree.next_element_sibling(node).is_some();
    let limit_length: usize = if tree.is_tag(node, "p") {
        if has_next_sibling { 30 } else { 60 }
    } else if has_next_sibling {
        100
    } else {
        300
    };

    if text_len >= limit_length {
        return false;
    }

    let (link_length, n_short_links, n_non_empty_links) = collect_link_info(tree, &links);
    if n_non_empty_links == 0 {
        return true;
    }

    // Link text > 80% of total text
    if link_length as f64 > text_len as f64 * 0.8 {
        return true;
    }

    // More than 80% of links are short (< 10 chars), typical of menus
    n_non_empty_links > 1 && n_short_links as f64 / n_non_empty_links as f64 > 0.8
}
