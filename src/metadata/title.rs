//! Title extraction from the `<title>` element.
//!
//! Page titles usually carry the site name (`Story | Site`, `Site: Story`,
//! `Section » Story`). The heuristics below strip that suffix or prefix
//! while refusing to shorten a title to something that is no longer
//! specific.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

use crate::dom::Tree;
use crate::patterns::{TITLE_HIERARCHY_SEPARATOR, TITLE_SEPARATOR};
use crate::text::{inner_text, normalize_whitespace, word_count};

/// Everything before the last separator.
static BEFORE_LAST_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*)[\|\-–—\\/>»] .*$").expect("BEFORE_LAST_SEPARATOR regex")
});

/// Everything after the first separator.
static AFTER_FIRST_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\|\-–—\\/>»]*[\|\-–—\\/>»](.*)$").expect("AFTER_FIRST_SEPARATOR regex")
});

/// Separator characters, removed to count the words of a title.
static SEPARATOR_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\|\-–—\\/>»]+").expect("SEPARATOR_CHARS regex"));

/// Titles outside this length range are suspect; a lone `<h1>` replaces them.
const MIN_TITLE_CHARS: usize = 15;
const MAX_TITLE_CHARS: usize = 150;

/// Article title from `<title>`, with site-name affixes removed.
///
/// Returns `None` when the document has no non-empty `<title>`.
#[must_use]
pub fn document_title(tree: &Tree) -> Option<String> {
    let title_node = tree.find_first(tree.root(), |t, node| {
        t.is_tag(node, "title") && !t.has_ancestor_tag(node, "svg", 0)
    })?;
    let original = normalize_whitespace(&tree.text_content(title_node));
    if original.is_empty() {
        return None;
    }
    Some(clean_title(tree, &original))
}

fn clean_title(tree: &Tree, original: &str) -> String {
    let mut title = original.to_string();
    let mut had_hierarchical_separator = false;

    if TITLE_SEPARATOR.is_match(original) {
        had_hierarchical_separator = TITLE_HIERARCHY_SEPARATOR.is_match(original);
        title = BEFORE_LAST_SEPARATOR.replace(original, "$1").into_owned();

        // A short remainder means the site name came first
        if word_count(&title) < 3 {
            title = AFTER_FIRST_SEPARATOR.replace(original, "$1").into_owned();
        }
    } else if let Some((before, after)) = colon_split(original) {
        let matches_heading = tree
            .elements_by_tag(tree.root(), &["h1", "h2"])
            .into_iter()
            .any(|heading| inner_text(tree, heading) == original);

        if !matches_heading {
            let after_last = original.rsplit_once(':').map_or(after, |(_, tail)| tail);
            title = after_last.to_string();

            if word_count(&title) < 3 {
                title = after.to_string();
            } else if word_count(before) > 5 {
                title = original.to_string();
            }
        }
    } else {
        let length = original.chars().count();
        if length > MAX_TITLE_CHARS || length < MIN_TITLE_CHARS {
            let headings = tree.elements_by_tag(tree.root(), &["h1"]);
            if let [heading] = headings.as_slice() {
                title = inner_text(tree, *heading);
            }
        }
    }

    let title = normalize_whitespace(&title);
    let words = word_count(&title);

    // Too short after cleanup: keep the original, unless the cut removed
    // exactly one hierarchy level
    let separator_words = word_count(&SEPARATOR_CHARS.replace_all(original, ""));
    if words <= 4 && (!had_hierarchical_separator || words + 1 != separator_words) {
        return original.to_string();
    }
    title
}

/// Splits `Site: Title` at the first `": "`.
fn colon_split(title: &str) -> Option<(&str, &str)> {
    title.split_once(": ")
}
