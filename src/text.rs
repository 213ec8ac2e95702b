//! Text helpers shared by scoring, metadata and output.

use crate::dom::{NodeId, Tree};
use crate::patterns::{BLOCK_ELEMS, WHITESPACE_RUN};

/// Collapse whitespace runs to single spaces and trim.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text.trim(), " ").into_owned()
}

/// Whitespace-normalized text of a node.
#[must_use]
pub fn inner_text(tree: &Tree, id: NodeId) -> String {
    normalize_whitespace(&tree.text_content(id))
}

/// Character count of a node's normalized text.
#[must_use]
pub fn text_length(tree: &Tree, id: NodeId) -> usize {
    inner_text(tree, id).chars().count()
}

#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Plain-text projection of a subtree.
///
/// Text node contents are concatenated with their whitespace collapsed;
/// every block boundary becomes exactly one newline. Leading and trailing
/// whitespace is removed.
#[must_use]
pub fn plain_text(tree: &Tree, id: NodeId) -> String {
    let mut out = String::new();
    // (node, leaving) pairs: leaving entries mark the end of a block.
    let mut stack: Vec<(NodeId, bool)> = vec![(id, false)];

    while let Some((node, leaving)) = stack.pop() {
        if leaving {
            push_break(&mut out);
            continue;
        }
        if let Some(text) = tree.text(node) {
            let preformatted = tree
                .ancestors(node, 0)
                .into_iter()
                .any(|ancestor| tree.is_tag(ancestor, "pre"));
            if preformatted {
                out.push_str(text);
            } else {
                push_collapsed(&mut out, text);
            }
            continue;
        }
        let block = tree.is_one_of(node, BLOCK_ELEMS);
        if block {
            push_break(&mut out);
            stack.push((node, true));
        }
        stack.extend(tree.children(node).iter().rev().map(|&child| (child, false)));
    }

    out.trim().to_string()
}

fn push_break(out: &mut String) {
    while out.ends_with(' ') {
        out.pop();
    }
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn push_collapsed(out: &mut String, text: &str) {
    for c in text.chars() {
        if c.is_whitespace() {
            if !(out.is_empty() || out.ends_with(' ') || out.ends_with('\n')) {
                out.push(' ');
            }
        } else {
            out.push(c);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse;

    #[test]
    fn inner_text_collapses_whitespace() {
        let tree = parse("<div>  a \n\n b <span> c </span></div>");
        let div = tree.elements_by_tag(tree.root(), &["div"])[0];
        assert_eq!(inner_text(&tree, div), "a b c");
        assert_eq!(text_length(&tree, div), 5);
    }

    #[test]
    fn plain_text_breaks_blocks_once() {
        let tree = parse("<div><p>First  para.</p><p>Second <b>bold</b> para.</p><ul><li>one</li><li>two</li></ul></div>");
        let div = tree.elements_by_tag(tree.root(), &["div"])[0];
        assert_eq!(
            plain_text(&tree, div),
            "First para.\nSecond bold para.\none\ntwo"
        );
    }

    #[test]
    fn plain_text_keeps_preformatted_text() {
        let tree = parse("<div><pre>fn main() {\n    run();\n}</pre></div>");
        let div = tree.elements_by_tag(tree.root(), &["div"])[0];
        assert_eq!(plain_text(&tree, div), "fn main() {\n    run();\n}");
    }

    #[test]
    fn word_count_splits_on_whitespace() {
        assert_eq!(word_count("  one two\tthree\n"), 3);
        assert_eq!(word_count(""), 0);
    }
}
