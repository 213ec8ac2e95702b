//! Document preparation before scoring.
//!
//! Runs on the extractor's private copy of the tree: drops non-content
//! elements, turns `<br>` chains into paragraphs, takes out the byline,
//! strips unlikely candidates and hidden or empty blocks, and rewrites
//! `div`s that act as paragraphs into `p`.

use std::collections::HashSet;

use log::trace;

use crate::dom::{NodeId, Tree};
use crate::link_density::{is_link_heavy, link_density};
use crate::patterns::{
    BYLINE, DIV_TO_P_ELEMS, MAYBE_CANDIDATE, NON_CONTENT_TAGS, PHRASING_ELEMS, UNLIKELY_CANDIDATES,
    UNLIKELY_ROLES,
};
use crate::text::{inner_text, normalize_whitespace};

/// Ambiguous nodes (both unlikely and maybe signals) above this link
/// density are removed.
const AMBIGUOUS_LINK_DENSITY: f64 = 0.5;

/// A `div` with a single `p` child is replaced by the `p` below this
/// link density.
const SINGLE_P_LINK_DENSITY: f64 = 0.25;

/// Longest text accepted as a byline.
const MAX_BYLINE_CHARS: usize = 100;

/// Containers removed when they hold neither text nor content elements.
const EMPTY_CANDIDATES: &[&str] = &["div", "section", "header", "h1", "h2", "h3", "h4", "h5", "h6"];

/// Document-wide cleanup: non-content elements, `<font>`, `<br>` chains.
pub(crate) fn prepare_document(tree: &mut Tree) {
    let root = tree.root();
    for node in tree.elements_by_tag(root, NON_CONTENT_TAGS) {
        tree.remove(node);
    }
    for font in tree.elements_by_tag(root, &["font"]) {
        tree.rename(font, "span");
    }
    if let Some(body) = tree.body() {
        replace_brs(tree, body);
    }
}

/// Text node made only of whitespace, or a `<br>`.
pub(crate) fn is_whitespace(tree: &Tree, node: NodeId) -> bool {
    tree.text(node).map_or_else(|| tree.is_tag(node, "br"), |text| text.trim().is_empty())
}

/// Text, inline elements, and links or edits holding only inline content.
pub(crate) fn is_phrasing_content(tree: &Tree, node: NodeId) -> bool {
    if tree.is_text(node) || tree.is_one_of(node, PHRASING_ELEMS) {
        return true;
    }
    tree.is_one_of(node, &["a", "del", "ins"])
        && tree.children(node).iter().all(|&child| is_phrasing_content(tree, child))
}

/// Index of the first node at or after `from` that is not whitespace
/// text, or `nodes.len()`.
fn skip_whitespace_text(tree: &Tree, nodes: &[NodeId], from: usize) -> usize {
    nodes
        .iter()
        .skip(from)
        .position(|&node| tree.is_element(node) || !is_whitespace(tree, node))
        .map_or(nodes.len(), |offset| from + offset)
}

/// A `<br>` whose next non-whitespace sibling is another `<br>`.
fn starts_br_chain(tree: &Tree, nodes: &[NodeId], index: usize) -> bool {
    tree.is_tag(nodes[index], "br")
        && nodes
            .get(skip_whitespace_text(tree, nodes, index + 1))
            .is_some_and(|&next| tree.is_tag(next, "br"))
}

/// `<br><br>` chains become paragraph breaks: the chain is replaced by a
/// `p` that takes in the inline content following it.
fn replace_brs(tree: &mut Tree, body: NodeId) {
    let mut seen = HashSet::new();
    let parents: Vec<NodeId> = tree
        .elements_by_tag(body, &["br"])
        .into_iter()
        .filter_map(|br| tree.parent(br))
        .filter(|&parent| seen.insert(parent))
        .collect();

    for parent in parents {
        replace_br_chains_in(tree, parent);
    }
}

/// Rebuilds one parent's child list with its `<br>` chains turned into
/// paragraphs.
fn replace_br_chains_in(tree: &mut Tree, parent: NodeId) {
    let siblings = tree.children(parent).to_vec();
    if !(0..siblings.len()).any(|i| starts_br_chain(tree, &siblings, i)) {
        return;
    }

    let mut kept = Vec::with_capacity(siblings.len());
    let mut paragraphs = Vec::new();
    let mut i = 0;
    while i < siblings.len() {
        if !starts_br_chain(tree, &siblings, i) {
            kept.push(siblings[i]);
            i += 1;
            continue;
        }

        // Drop the chain's breaks; whitespace between them opens the
        // paragraph
        let mut inline = Vec::new();
        let mut next = i + 1;
        loop {
            let candidate = skip_whitespace_text(tree, &siblings, next);
            if candidate >= siblings.len() || !tree.is_tag(siblings[candidate], "br") {
                break;
            }
            inline.extend_from_slice(&siblings[next..candidate]);
            next = candidate + 1;
        }

        while next < siblings.len() {
            let node = siblings[next];
            if starts_br_chain(tree, &siblings, next) || !is_phrasing_content(tree, node) {
                break;
            }
            inline.push(node);
            next += 1;
        }
        while inline.last().is_some_and(|&last| is_whitespace(tree, last)) {
            inline.pop();
        }

        let p = tree.create_element("p");
        kept.push(p);
        paragraphs.push((p, inline));
        i = next;
    }

    tree.set_children(parent, kept);
    for (p, inline) in paragraphs {
        tree.set_children(p, inline);
    }
    if tree.is_tag(parent, "p") {
        tree.rename(parent, "div");
    }
}

fn trim_trailing_whitespace(tree: &mut Tree, node: NodeId) {
    while let Some(&last) = tree.children(node).last() {
        if !is_whitespace(tree, last) {
            break;
        }
        tree.remove(last);
    }
}

/// Finds the first author line in the body, removes it and returns its
/// text.
pub(crate) fn take_byline(tree: &mut Tree, body: NodeId) -> Option<String> {
    let node = tree.find_first(body, is_byline_candidate)?;
    let text = byline_text(tree, node);
    tree.remove(node);
    trace!("byline found in body: {text}");
    Some(text)
}

fn is_byline_candidate(tree: &Tree, node: NodeId) -> bool {
    let signals_author = tree.attr(node, "rel") == Some("author")
        || tree.attr(node, "itemprop").is_some_and(|prop| prop.contains("author"))
        || BYLINE.is_match(&tree.class_and_id(node));
    if !signals_author {
        return false;
    }
    let length = byline_text(tree, node).chars().count();
    length > 0 && length < MAX_BYLINE_CHARS
}

/// Text of a byline, preferring a nested `itemprop="name"`.
fn byline_text(tree: &Tree, node: NodeId) -> String {
    tree.find_first(node, |t, child| t.attr(child, "itemprop") == Some("name"))
        .map(|name| inner_text(tree, name))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| inner_text(tree, node))
}

/// Removes hidden elements, unlikely candidates and empty containers, and
/// converts paragraph-like `div`s.
pub(crate) fn strip_and_convert(tree: &mut Tree, body: NodeId) {
    for node in tree.descendants(body) {
        if !tree.is_element(node) || !tree.is_attached(node) {
            continue;
        }

        if !is_probably_visible(tree, node) {
            trace!("removing hidden <{}>", tree.tag_name(node).unwrap_or_default());
            tree.remove(node);
            continue;
        }

        if is_unlikely_candidate(tree, node) {
            trace!("removing unlikely candidate `{}`", normalize_whitespace(&tree.class_and_id(node)));
            tree.remove(node);
            continue;
        }

        if tree.is_one_of(node, EMPTY_CANDIDATES) && is_element_without_content(tree, node) {
            tree.remove(node);
            continue;
        }

        if tree.is_tag(node, "div") {
            convert_div(tree, node);
        }
    }

    // Containers emptied by the removals above, innermost first
    for node in tree.descendants(body).into_iter().rev() {
        if tree.is_one_of(node, EMPTY_CANDIDATES) && is_element_without_content(tree, node) {
            tree.remove(node);
        }
    }
}

fn is_probably_visible(tree: &Tree, node: NodeId) -> bool {
    let style: String = tree
        .attr(node, "style")
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    if style.contains("display:none") || style.contains("visibility:hidden") {
        return false;
    }
    if tree.has_attr(node, "hidden") {
        return false;
    }
    tree.attr(node, "aria-hidden") != Some("true") || tree.has_class(node, "fallback-image")
}

/// Class/id signals say boilerplate, or the ARIA role is a non-content
/// landmark.
pub(crate) fn is_unlikely_candidate(tree: &Tree, node: NodeId) -> bool {
    if tree.is_one_of(node, &["body", "a"])
        || tree.has_ancestor_tag(node, "table", 0)
        || tree.has_ancestor_tag(node, "code", 0)
    {
        return false;
    }

    if tree
        .attr(node, "role")
        .is_some_and(|role| UNLIKELY_ROLES.contains(&role.trim()))
    {
        return true;
    }

    let signals = tree.class_and_id(node);
    if !UNLIKELY_CANDIDATES.is_match(&signals) {
        return false;
    }
    if !MAYBE_CANDIDATE.is_match(&signals) {
        return true;
    }
    // Both vocabularies match: decide on links
    link_density(tree, node) > AMBIGUOUS_LINK_DENSITY || is_link_heavy(tree, node)
}

/// No text, and no children other than `<br>`/`<hr>`.
pub(crate) fn is_element_without_content(tree: &Tree, node: NodeId) -> bool {
    tree.text_content(node).trim().is_empty()
        && tree
            .element_children(node)
            .into_iter()
            .all(|child| tree.is_one_of(child, &["br", "hr"]))
}

/// The only element child when it has tag `tag` and no text sits next
/// to it.
pub(crate) fn single_child_with_tag(tree: &Tree, node: NodeId, tag: &str) -> Option<NodeId> {
    let children = tree.element_children(node);
    let [child] = children.as_slice() else {
        return None;
    };
    let has_text = tree
        .children(node)
        .iter()
        .any(|&c| tree.text(c).is_some_and(|text| !text.trim().is_empty()));
    (tree.is_tag(*child, tag) && !has_text).then_some(*child)
}

fn has_block_descendant(tree: &Tree, node: NodeId) -> bool {
    tree.find_first(node, |t, child| t.is_one_of(child, DIV_TO_P_ELEMS))
        .is_some()
}

fn convert_div(tree: &mut Tree, div: NodeId) {
    wrap_phrasing_runs(tree, div);

    if let Some(p) = single_child_with_tag(tree, div, "p") {
        if link_density(tree, div) < SINGLE_P_LINK_DENSITY {
            tree.replace(div, p);
            return;
        }
    }
    if !has_block_descendant(tree, div) {
        tree.rename(div, "p");
    }
}

/// Wraps each run of inline content inside a mixed `div` into a `p`.
fn wrap_phrasing_runs(tree: &mut Tree, div: NodeId) {
    let mut paragraph: Option<NodeId> = None;

    for child in tree.children(div).to_vec() {
        if is_phrasing_content(tree, child) {
            if let Some(p) = paragraph {
                tree.append_child(p, child);
            } else if !is_whitespace(tree, child) {
                let p = tree.create_element("p");
                tree.insert_before(child, p);
                tree.append_child(p, child);
                paragraph = Some(p);
            }
        } else if let Some(p) = paragraph.take() {
            trim_trailing_whitespace(tree, p);
        }
    }
    if let Some(p) = paragraph {
        trim_trailing_whitespace(tree, p);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse;

    fn body_html(tree: &Tree) -> String {
        tree.inner_html(tree.body().unwrap())
    }

    fn prepared(html: &str) -> Tree {
        let mut tree = parse(html);
        prepare_document(&mut tree);
        let body = tree.body().unwrap();
        strip_and_convert(&mut tree, body);
        tree
    }

    #[test]
    fn scripts_and_forms_removed() {
        let tree = prepared("<div><p>Text</p><script>x()</script><form><input></form><nav>menu</nav></div>");
        assert_eq!(body_html(&tree), "<p>Text</p>");
    }

    #[test]
    fn br_chains_become_paragraphs() {
        let mut tree = parse("<div>first part<br><br>second part<br>still second<br><br>third</div>");
        prepare_document(&mut tree);
        assert_eq!(
            body_html(&tree),
            "<div>first part<p>second part<br>still second</p><p>third</p></div>"
        );
    }

    #[test]
    fn br_chain_inside_paragraph_turns_it_into_div() {
        let mut tree = parse("<p>one<br> <br>two<br></p>");
        prepare_document(&mut tree);
        assert_eq!(body_html(&tree), "<div>one<p> two</p></div>");
    }

    #[test]
    fn long_br_runs_collapse() {
        let html = format!("<div>start{}end</div>", "<br>".repeat(5000));
        let mut tree = parse(&html);
        prepare_document(&mut tree);
        assert_eq!(body_html(&tree), "<div>start<p>end</p></div>");
    }

    #[test]
    fn unlikely_candidates_removed() {
        let tree = prepared(
            r#"<div class="sidebar">links</div><div class="advertisement">buy</div><div id="comment-section">hi</div><article><p>Story</p></article>"#,
        );
        assert_eq!(body_html(&tree), "<article><p>Story</p></article>");
    }

    #[test]
    fn maybe_signal_rescues_prose() {
        let prose = "A long paragraph of article prose without links. ".repeat(4);
        let tree = prepared(&format!(r#"<div class="comment-content"><p>{prose}</p><p>{prose}</p></div>"#));
        assert!(body_html(&tree).contains("article prose"));
    }

    #[test]
    fn ambiguous_link_lists_removed() {
        let tree = prepared(
            r#"<div class="main-menu"><a href="/a">Home</a> <a href="/b">World</a></div><p>Kept paragraph.</p>"#,
        );
        assert_eq!(body_html(&tree), "<p>Kept paragraph.</p>");
    }

    #[test]
    fn unlikely_roles_and_hidden_nodes_removed() {
        let tree = prepared(
            r#"<div role="navigation"><p>nav</p></div><p style="display: none">hidden</p><p hidden>also</p><p>shown</p>"#,
        );
        assert_eq!(body_html(&tree), "<p>shown</p>");
    }

    #[test]
    fn text_only_div_becomes_paragraph() {
        let tree = prepared("<div>Just some <b>inline</b> text.</div>");
        assert_eq!(body_html(&tree), "<p>Just some <b>inline</b> text.</p>");
    }

    #[test]
    fn mixed_div_wraps_inline_runs() {
        let tree = prepared("<div>Intro text <em>here</em><p>Block</p>tail</div>");
        assert_eq!(
            body_html(&tree),
            "<div><p>Intro text <em>here</em></p><p>Block</p><p>tail</p></div>"
        );
    }

    #[test]
    fn div_with_single_paragraph_is_replaced() {
        let tree = prepared(r#"<div class="wrap"><p>Only child.</p></div>"#);
        assert_eq!(body_html(&tree), "<p>Only child.</p>");
    }

    #[test]
    fn empty_containers_removed() {
        let tree = prepared("<section><div> </div><h2></h2></section><p>x</p>");
        assert_eq!(body_html(&tree), "<p>x</p>");
    }

    #[test]
    fn byline_taken_from_body() {
        let mut tree = parse(r#"<p class="byline">By <span itemprop="name">Jane Doe</span></p><p>Story</p>"#);
        let body = tree.body().unwrap();
        assert_eq!(take_byline(&mut tree, body).as_deref(), Some("Jane Doe"));
        assert_eq!(body_html(&tree), "<p>Story</p>");
    }

    #[test]
    fn long_author_bio_is_not_a_byline() {
        let bio = "Jane writes about boats and harbours and the people who keep them running. ".repeat(3);
        let mut tree = parse(&format!(r#"<div class="author-bio">{bio}</div>"#));
        let body = tree.body().unwrap();
        assert_eq!(take_byline(&mut tree, body), None);
    }
}
