//! Main content extraction.
//!
//! Locates the main-content subtree of an enhanced document and turns it
//! into an [`Article`].
//!
//! # Module Structure
//!
//! - `prep`: document preparation (non-content removal, unlikely candidates,
//!   `div`-to-`p` conversion, byline detection)
//! - `scoring`: paragraph scoring, candidate ranking and top-candidate
//!   refinement, sibling absorption
//! - `cleanup`: conditional cleaning of the assembled article and output
//!   tidying
//!
//! Each attempt runs on a private copy of the tree, so the caller's tree
//! is never modified. When an attempt yields less than
//! [`Options::char_threshold`] characters, the next one retries with
//! relaxed heuristics; the longest attempt wins.

pub(crate) mod cleanup;
pub(crate) mod prep;
pub(crate) mod scoring;

use log::{debug, warn};

use crate::dom::{NodeId, Tree};
use crate::error::{Error, Result};
use crate::metadata::extract_metadata;
use crate::options::PAGE_CLASS;
use crate::patterns::MEDIA_TAGS;
use crate::text::{inner_text, plain_text};
use crate::{Article, Options};

/// Heuristics an attempt runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Flags {
    /// Class and id signals add to candidate scores.
    pub weight_classes: bool,
    /// Boilerplate-looking blocks are removed from the assembled article.
    pub clean_conditionally: bool,
}

/// Attempts in order, each more permissive than the last.
const ATTEMPTS: [Flags; 3] = [
    Flags {
        weight_classes: true,
        clean_conditionally: true,
    },
    Flags {
        weight_classes: false,
        clean_conditionally: true,
    },
    Flags {
        weight_classes: false,
        clean_conditionally: false,
    },
];

/// Content an attempt gathered into a fresh container, before cleanup.
pub(crate) struct Assembly {
    /// The attempt's private copy of the document.
    pub(crate) tree: Tree,
    /// Container holding the top candidate and its siblings, or the body's
    /// children when no candidate stood out.
    pub(crate) content: NodeId,
    byline: Option<String>,
    dir: Option<String>,
}

/// Outcome of one extraction attempt.
struct Attempt {
    tree: Tree,
    content: NodeId,
    byline: Option<String>,
    dir: Option<String>,
    length: usize,
}

/// Extracts the main article from an enhanced document.
///
/// # Errors
///
/// [`Error::EmptyInput`] when the body holds neither text nor media, and
/// [`Error::ExtractionFailed`] when even the best attempt found negligible
/// text or the document exceeds [`Options::max_elems_to_parse`].
pub fn extract_article(tree: &Tree, options: &Options) -> Result<Article> {
    let body = tree.body().ok_or(Error::EmptyInput)?;
    let has_media = tree
        .find_first(body, |t, node| t.is_one_of(node, MEDIA_TAGS))
        .is_some();
    if tree.text_content(body).trim().is_empty() && !has_media {
        return Err(Error::EmptyInput);
    }

    if options.max_elems_to_parse > 0 {
        let elements = tree.select(tree.root(), |_, _| true).len();
        if elements > options.max_elems_to_parse {
            warn!("document has {elements} elements, limit is {}", options.max_elems_to_parse);
            return Err(Error::ExtractionFailed { best_length: 0 });
        }
    }

    let metadata = extract_metadata(tree);

    let mut best: Option<Attempt> = None;
    for flags in ATTEMPTS {
        let Some(attempt) = run_attempt(tree, flags, options, metadata.byline.is_none()) else {
            continue;
        };
        debug!("attempt {flags:?} extracted {} chars", attempt.length);

        if attempt.length >= options.char_threshold {
            best = Some(attempt);
            break;
        }
        if best.as_ref().is_none_or(|b| attempt.length > b.length) {
            best = Some(attempt);
        }
    }

    let best = match best {
        Some(attempt) if attempt.length >= options.min_text_length => attempt,
        other => {
            let best_length = other.map_or(0, |attempt| attempt.length);
            warn!("extraction failed, best attempt had {best_length} chars");
            return Err(Error::ExtractionFailed { best_length });
        }
    };

    let Attempt {
        tree: article_tree,
        content,
        byline,
        dir,
        length,
    } = best;

    let paragraph = article_tree
        .find_first(content, |t, node| t.is_tag(node, "p"))
        .map(|p| inner_text(&article_tree, p))
        .filter(|text| !text.is_empty());
    let excerpt = match (paragraph, metadata.excerpt) {
        (Some(paragraph), Some(description)) if description.chars().count() > paragraph.chars().count() => {
            Some(description)
        }
        (Some(paragraph), _) => Some(paragraph),
        (None, description) => description,
    };

    Ok(Article {
        title: metadata.title.unwrap_or_default(),
        byline: metadata.byline.or(byline),
        dir: dir.or(metadata.dir),
        lang: metadata.lang,
        content: article_tree.outer_html(content),
        text_content: plain_text(&article_tree, content),
        length,
        excerpt,
        site_name: metadata.site_name,
        published_time: metadata.published_time,
    })
}

/// The content region the first attempt finds in `tree`: prepared,
/// scored and gathered, but not yet cleaned.
pub(crate) fn locate_content_region(tree: &Tree, options: &Options) -> Option<Assembly> {
    assemble(tree, ATTEMPTS[0], options, false)
}

/// Prepare, score, select and gather on a copy of `source`. `None` when
/// the copy has no body.
fn assemble(source: &Tree, flags: Flags, options: &Options, find_byline: bool) -> Option<Assembly> {
    let mut tree = source.clone();
    prep::prepare_document(&mut tree);
    let body = tree.body()?;

    let byline = if find_byline {
        prep::take_byline(&mut tree, body)
    } else {
        None
    };
    prep::strip_and_convert(&mut tree, body);

    let mut scores = scoring::score_paragraphs(&tree, body, flags);
    let ranked = scoring::rank_candidates(&tree, body, &mut scores);
    let top = scoring::select_top_candidate(&tree, body, &mut scores, &ranked, options, flags);

    // The article is assembled outside <html>, so cleanup sees it as a
    // tree of its own
    let content = tree.create_element("div");
    let root = tree.root();
    tree.append_child(root, content);

    let dir = match top {
        Some(top) => {
            let dir = text_direction(&tree, top);
            scoring::absorb_siblings(&mut tree, top, &scores, content);
            dir
        }
        None => {
            tree.move_children(body, content);
            None
        }
    };

    Some(Assembly {
        tree,
        content,
        byline,
        dir,
    })
}

/// One attempt: assemble, then clean. `None` when the copy has no body.
fn run_attempt(source: &Tree, flags: Flags, options: &Options, find_byline: bool) -> Option<Attempt> {
    let Assembly {
        mut tree,
        content,
        byline,
        dir,
    } = assemble(source, flags, options, find_byline)?;

    cleanup::prep_article(&mut tree, content, flags, options);
    tree.set_attr(content, "class", PAGE_CLASS);
    cleanup::post_process(&mut tree, content, options);

    let length = plain_text(&tree, content).chars().count();
    Some(Attempt {
        tree,
        content,
        byline,
        dir,
        length,
    })
}

/// `dir` of the node or its nearest ancestor declaring one.
fn text_direction(tree: &Tree, node: NodeId) -> Option<String> {
    std::iter::once(node)
        .chain(tree.ancestors(node, 0))
        .find_map(|n| tree.attr(n, "dir"))
        .map(str::trim)
        .filter(|dir| !dir.is_empty())
        .map(str::to_string)
}
