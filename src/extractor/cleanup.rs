//! Cleanup of the assembled article.
//!
//! [`prep_article`] removes what does not belong in the article once its
//! extent is known: presentational attributes, non-video embeds, share
//! widgets, negative headers, and blocks that look like boilerplate on
//! closer inspection. [`post_process`] then tidies the markup for output.

use std::collections::HashSet;

use log::trace;

use super::prep::{is_element_without_content, is_phrasing_content, is_whitespace, single_child_with_tag};
use super::scoring::{class_weight, CLASS_WEIGHT};
use super::Flags;
use crate::dom::{NodeId, Tree};
use crate::link_density::link_density;
use crate::patterns::{
    COMMAS, DEPRECATED_SIZE_ATTRIBUTE_ELEMS, PRESENTATIONAL_ATTRIBUTES, SHARE_ELEMENTS, VIDEOS,
    WHITESPACE_RUN,
};
use crate::text::text_length;
use crate::Options;

/// Blocks with at least this many commas are prose and skip the
/// conditional checks.
const PROSE_COMMAS: usize = 10;

/// Shortest text a non-list block needs to survive conditional cleaning.
const MIN_BLOCK_CHARS: usize = 25;

/// A single embed survives only with this much text around it.
const MIN_EMBED_CONTEXT_CHARS: usize = 75;

/// Link density limits for conditional cleaning: ordinary blocks, and
/// blocks whose class or id says content.
const BLOCK_LINK_DENSITY: f64 = 0.2;
const POSITIVE_BLOCK_LINK_DENSITY: f64 = 0.5;

/// Share of text that list items must hold for a block to count as a list.
const LIST_TEXT_RATIO: f64 = 0.9;

/// Share of text in headings above which a short block is a section title.
const HEADING_DENSITY: f64 = 0.9;

/// Embeds checked against the video allow-list.
const EMBED_TAGS: &[&str] = &["object", "embed", "iframe"];

/// Removes everything that does not belong in the article.
pub(crate) fn prep_article(tree: &mut Tree, content: NodeId, flags: Flags, options: &Options) {
    clean_styles(tree, content);
    let data_tables = mark_data_tables(tree, content);

    clean_embeds(tree, content);
    remove_share_elements(tree, content, options.char_threshold);
    clean_headers(tree, content, flags);

    if flags.clean_conditionally {
        for tag in ["table", "ul", "div"] {
            clean_conditionally(tree, content, tag, flags, &data_tables);
        }
    }

    for h1 in tree.elements_by_tag(content, &["h1"]) {
        tree.rename(h1, "h2");
    }

    remove_empty_paragraphs(tree, content);
    remove_breaks_before_paragraphs(tree, content);
    unwrap_single_cell_tables(tree, content);
}

/// Simplifies wrappers, strips classes and normalizes whitespace.
pub(crate) fn post_process(tree: &mut Tree, content: NodeId, options: &Options) {
    simplify_nested(tree, content);
    if !options.keep_classes {
        clean_classes(tree, content, options);
    }
    normalize_text_whitespace(tree, content);
}

/// The node and its element descendants, outside `<svg>`.
fn styled_elements(tree: &Tree, root: NodeId) -> Vec<NodeId> {
    std::iter::once(root)
        .chain(tree.select(root, |t, node| !t.is_tag(node, "svg") && !t.has_ancestor_tag(node, "svg", 0)))
        .collect()
}

fn clean_styles(tree: &mut Tree, content: NodeId) {
    for node in styled_elements(tree, content) {
        let sized = tree.is_one_of(node, DEPRECATED_SIZE_ATTRIBUTE_ELEMS);
        tree.retain_attrs(node, |attr| {
            let name = attr.name.as_str();
            !PRESENTATIONAL_ATTRIBUTES.contains(&name) && !(sized && matches!(name, "width" | "height"))
        });
    }
}

/// Tables that hold data rather than layout.
fn mark_data_tables(tree: &Tree, content: NodeId) -> HashSet<NodeId> {
    tree.elements_by_tag(content, &["table"])
        .into_iter()
        .filter(|&table| is_data_table(tree, table))
        .collect()
}

fn is_data_table(tree: &Tree, table: NodeId) -> bool {
    if tree.attr(table, "role") == Some("presentation") || tree.attr(table, "datatable") == Some("0") {
        return false;
    }
    if tree.has_attr(table, "summary") {
        return true;
    }
    let has_caption = tree
        .element_children(table)
        .into_iter()
        .any(|child| tree.is_tag(child, "caption") && !tree.children(child).is_empty());
    if has_caption {
        return true;
    }
    if tree
        .find_first(table, |t, node| t.is_one_of(node, &["col", "colgroup", "tfoot", "thead", "th"]))
        .is_some()
    {
        return true;
    }
    if tree.find_first(table, |t, node| t.is_tag(node, "table")).is_some() {
        return false;
    }

    let (rows, columns) = table_size(tree, table);
    if rows == 1 || columns == 1 {
        return false;
    }
    rows >= 10 || columns > 4 || rows * columns > 10
}

/// Rows and the widest row's cell count, honoring `colspan`.
fn table_size(tree: &Tree, table: NodeId) -> (usize, usize) {
    let rows = tree.elements_by_tag(table, &["tr"]);
    let columns = rows
        .iter()
        .map(|&row| {
            tree.element_children(row)
                .into_iter()
                .filter(|&cell| tree.is_one_of(cell, &["td", "th"]))
                .map(|cell| {
                    tree.attr(cell, "colspan")
                        .and_then(|span| span.trim().parse::<usize>().ok())
                        .unwrap_or(1)
                        .max(1)
                })
                .sum::<usize>()
        })
        .max()
        .unwrap_or(0);
    (rows.len(), columns)
}

fn is_video_embed(tree: &Tree, node: NodeId) -> bool {
    tree.attrs(node).iter().any(|attr| VIDEOS.is_match(&attr.value))
        || (tree.is_tag(node, "object") && VIDEOS.is_match(&tree.inner_html(node)))
}

/// Removes `object`, `embed` and `iframe` elements except known video
/// players.
fn clean_embeds(tree: &mut Tree, content: NodeId) {
    for node in tree.elements_by_tag(content, EMBED_TAGS) {
        if tree.is_attached(node) && !is_video_embed(tree, node) {
            tree.remove(node);
        }
    }
}

fn remove_share_elements(tree: &mut Tree, content: NodeId, max_chars: usize) {
    for block in tree.element_children(content) {
        let matches = tree.select(block, |t, node| {
            SHARE_ELEMENTS.is_match(&t.class_and_id(node)) && text_length(t, node) < max_chars
        });
        for node in matches {
            tree.remove(node);
        }
    }
}

fn clean_headers(tree: &mut Tree, content: NodeId, flags: Flags) {
    for heading in tree.elements_by_tag(content, &["h1", "h2"]) {
        if class_weight(tree, heading, flags) < 0.0 {
            trace!("removing negative heading");
            tree.remove(heading);
        }
    }
}

/// Removes `tag` elements that look like boilerplate: link lists, image
/// galleries without text, forms, lone embeds.
fn clean_conditionally(tree: &mut Tree, content: NodeId, tag: &str, flags: Flags, data_tables: &HashSet<NodeId>) {
    for node in tree.elements_by_tag(content, &[tag]).into_iter().rev() {
        if tree.is_attached(node) && should_remove(tree, node, flags, data_tables) {
            trace!("conditionally removing <{tag}>");
            tree.remove(node);
        }
    }
}

fn count_tags(tree: &Tree, node: NodeId, tags: &[&str]) -> usize {
    tree.elements_by_tag(node, tags).len()
}

fn should_remove(tree: &Tree, node: NodeId, flags: Flags, data_tables: &HashSet<NodeId>) -> bool {
    if data_tables.contains(&node) {
        return false;
    }
    let ancestors = tree.ancestors(node, 0);
    if ancestors.iter().any(|a| data_tables.contains(a) || tree.is_tag(*a, "code")) {
        return false;
    }

    let text = crate::text::inner_text(tree, node);
    let length = text.chars().count();

    let mut is_list = tree.is_one_of(node, &["ul", "ol"]);
    if !is_list && length > 0 {
        let list_length: usize = tree
            .elements_by_tag(node, &["ul", "ol"])
            .into_iter()
            .map(|list| text_length(tree, list))
            .sum();
        is_list = list_length as f64 / length as f64 > LIST_TEXT_RATIO;
    }

    let weight = class_weight(tree, node, flags);
    if weight < 0.0 {
        return true;
    }
    if COMMAS.find_iter(&text).count() >= PROSE_COMMAS {
        return false;
    }

    let paragraphs = count_tags(tree, node, &["p"]);
    let images = count_tags(tree, node, &["img"]);
    let list_items = count_tags(tree, node, &["li"]).saturating_sub(100);
    let inputs = count_tags(tree, node, &["input"]);

    let heading_length: usize = tree
        .elements_by_tag(node, &["h1", "h2", "h3", "h4", "h5", "h6"])
        .into_iter()
        .map(|heading| text_length(tree, heading))
        .sum();
    let heading_density = if length == 0 { 0.0 } else { heading_length as f64 / length as f64 };

    let mut embeds = 0;
    for embed in tree.elements_by_tag(node, EMBED_TAGS) {
        if is_video_embed(tree, embed) {
            return false;
        }
        embeds += 1;
    }

    let density = link_density(tree, node);
    let in_figure = ancestors.iter().any(|a| tree.is_tag(*a, "figure"));

    let remove = (images > 1 && (paragraphs as f64 / images as f64) < 0.5 && !in_figure)
        || (!is_list && list_items > paragraphs)
        || (inputs > paragraphs / 3)
        || (!is_list
            && heading_density < HEADING_DENSITY
            && length < MIN_BLOCK_CHARS
            && (images == 0 || images > 2)
            && !in_figure)
        || (!is_list && weight < CLASS_WEIGHT && density > BLOCK_LINK_DENSITY)
        || (weight >= CLASS_WEIGHT && density > POSITIVE_BLOCK_LINK_DENSITY)
        || (embeds == 1 && length < MIN_EMBED_CONTEXT_CHARS)
        || embeds > 1;

    // Image galleries: one image per list item
    if is_list && remove {
        let simple_items = tree
            .element_children(node)
            .into_iter()
            .all(|child| tree.element_children(child).len() <= 1);
        if simple_items && images == count_tags(tree, node, &["li"]) {
            return false;
        }
    }
    remove
}

fn remove_empty_paragraphs(tree: &mut Tree, content: NodeId) {
    for p in tree.elements_by_tag(content, &["p"]) {
        let has_media = count_tags(tree, p, &["img", "embed", "object", "iframe"]) > 0;
        if !has_media && tree.text_content(p).trim().is_empty() {
            tree.remove(p);
        }
    }
}

fn remove_breaks_before_paragraphs(tree: &mut Tree, content: NodeId) {
    for br in tree.elements_by_tag(content, &["br"]) {
        let mut next = tree.next_sibling(br);
        while let Some(node) = next.filter(|&node| tree.is_text(node) && is_whitespace(tree, node)) {
            next = tree.next_sibling(node);
        }
        if next.is_some_and(|node| tree.is_tag(node, "p")) {
            tree.remove(br);
        }
    }
}

/// Layout tables with a single cell become the cell's content.
fn unwrap_single_cell_tables(tree: &mut Tree, content: NodeId) {
    for table in tree.elements_by_tag(content, &["table"]) {
        if !tree.is_attached(table) {
            continue;
        }
        let body = single_child_with_tag(tree, table, "tbody").unwrap_or(table);
        let Some(row) = single_child_with_tag(tree, body, "tr") else {
            continue;
        };
        let Some(cell) = single_child_with_tag(tree, row, "td") else {
            continue;
        };
        let inline = tree.children(cell).iter().all(|&child| is_phrasing_content(tree, child));
        tree.rename(cell, if inline { "p" } else { "div" });
        tree.replace(table, cell);
    }
}

/// Replaces `div`/`section` wrappers holding a single `div`/`section`
/// with that child, and drops empty ones.
fn simplify_nested(tree: &mut Tree, content: NodeId) {
    for node in tree.elements_by_tag(content, &["div", "section"]) {
        if !tree.is_attached(node) {
            continue;
        }
        if is_element_without_content(tree, node) {
            tree.remove(node);
            continue;
        }
        let child = single_child_with_tag(tree, node, "div")
            .or_else(|| single_child_with_tag(tree, node, "section"));
        if let Some(child) = child {
            for attr in tree.attrs(node).to_vec() {
                tree.set_attr(child, &attr.name, &attr.value);
            }
            tree.replace(node, child);
        }
    }
}

/// Drops every class token that is not preserved.
fn clean_classes(tree: &mut Tree, content: NodeId, options: &Options) {
    for node in std::iter::once(content).chain(tree.select(content, |_, _| true)) {
        let Some(class) = tree.attr(node, "class") else {
            continue;
        };
        let kept: Vec<&str> = class
            .split_whitespace()
            .filter(|token| options.preserves_class(token))
            .collect();
        if kept.is_empty() {
            tree.remove_attr(node, "class");
        } else {
            let kept = kept.join(" ");
            tree.set_attr(node, "class", &kept);
        }
    }
}

/// Collapses whitespace runs in text outside `pre` and `code`.
fn normalize_text_whitespace(tree: &mut Tree, content: NodeId) {
    for node in tree.descendants(content) {
        let Some(text) = tree.text(node) else {
            continue;
        };
        let preformatted = tree
            .ancestors(node, 0)
            .into_iter()
            .any(|a| tree.is_one_of(a, &["pre", "code"]));
        if preformatted {
            continue;
        }
        let collapsed = WHITESPACE_RUN.replace_all(text, " ");
        if collapsed != text {
            let collapsed = collapsed.into_owned();
            tree.set_text(node, &collapsed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse;

    const ALL: Flags = Flags {
        weight_classes: true,
        clean_conditionally: true,
    };

    /// Runs `f` on the first `div` of `html` and returns its markup.
    fn on_content(html: &str, f: impl FnOnce(&mut Tree, NodeId)) -> String {
        let mut tree = parse(html);
        let content = tree.elements_by_tag(tree.root(), &["div"])[0];
        f(&mut tree, content);
        tree.inner_html(content)
    }

    #[test]
    fn styles_and_presentational_attributes_removed() {
        let out = on_content(
            r#"<div><table width="100" border="1"><tr><td align="left" style="color:red">x</td></tr></table><img width="50" src="a.png"></div>"#,
            |tree, content| clean_styles(tree, content),
        );
        assert_eq!(
            out,
            r#"<table><tbody><tr><td>x</td></tr></tbody></table><img width="50" src="a.png">"#
        );
    }

    #[test]
    fn preserved_classes_survive() {
        let options = Options::default();
        let out = on_content(
            r#"<div><a class="anchor random-style" id="x">A</a><p class="random-style">B</p></div>"#,
            |tree, content| clean_classes(tree, content, &options),
        );
        assert_eq!(out, r#"<a class="anchor" id="x">A</a><p>B</p>"#);
    }

    #[test]
    fn video_embeds_kept_others_removed() {
        let out = on_content(
            r#"<div><iframe src="https://www.youtube.com/embed/abc"></iframe><iframe src="https://ads.example.com/frame"></iframe></div>"#,
            |tree, content| clean_embeds(tree, content),
        );
        assert_eq!(out, r#"<iframe src="https://www.youtube.com/embed/abc"></iframe>"#);
    }

    #[test]
    fn link_list_div_removed_conditionally() {
        let prose = "Plain article text that runs long enough to stand on its own. ".repeat(3);
        let out = on_content(
            &format!(
                r#"<div><p>{prose}</p><div><a href="/a">Related story one</a> <a href="/b">Related story two</a></div></div>"#
            ),
            |tree, content| clean_conditionally(tree, content, "div", ALL, &HashSet::new()),
        );
        assert!(out.contains("Plain article text"));
        assert!(!out.contains("Related story"));
    }

    #[test]
    fn data_tables_survive_conditional_cleaning() {
        let html = r#"<div><table><thead><tr><th>Port</th><th>Ships</th></tr></thead><tbody><tr><td><a href="/a">A</a></td><td><a href="/b">1</a></td></tr></tbody></table></div>"#;
        let mut tree = parse(html);
        let content = tree.elements_by_tag(tree.root(), &["div"])[0];
        let data_tables = mark_data_tables(&tree, content);
        assert_eq!(data_tables.len(), 1);
        clean_conditionally(&mut tree, content, "table", ALL, &data_tables);
        assert_eq!(tree.elements_by_tag(content, &["table"]).len(), 1);
    }

    #[test]
    fn negative_headers_removed() {
        let out = on_content(
            r#"<div><h2 class="share-title">Share</h2><h2>Real</h2></div>"#,
            |tree, content| clean_headers(tree, content, ALL),
        );
        assert_eq!(out, "<h2>Real</h2>");
    }

    #[test]
    fn single_cell_table_unwrapped() {
        let out = on_content(
            "<div><table><tr><td>Only <b>cell</b></td></tr></table></div>",
            |tree, content| unwrap_single_cell_tables(tree, content),
        );
        assert_eq!(out, "<p>Only <b>cell</b></p>");
    }

    #[test]
    fn nested_wrappers_collapse() {
        let out = on_content(
            r#"<div><div id="outer"><section><p>Text</p></section></div><div> </div></div>"#,
            |tree, content| simplify_nested(tree, content),
        );
        assert_eq!(out, r#"<section id="outer"><p>Text</p></section>"#);
    }

    #[test]
    fn whitespace_collapsed_outside_pre() {
        let out = on_content(
            "<div><p>a \n\n  b</p><pre>x\n    y</pre></div>",
            |tree, content| normalize_text_whitespace(tree, content),
        );
        assert_eq!(out, "<p>a b</p><pre>x\n    y</pre>");
    }

    #[test]
    fn empty_paragraphs_and_stray_breaks_removed() {
        let out = on_content(
            r#"<div><p> </p><p><img src="a.png"></p>text<br> <p>next</p></div>"#,
            |tree, content| {
                remove_empty_paragraphs(tree, content);
                remove_breaks_before_paragraphs(tree, content);
            },
        );
        assert_eq!(out, r#"<p><img src="a.png"></p>text <p>next</p>"#);
    }
}
