//! Candidate scoring and selection.
//!
//! Every paragraph-like node with enough text earns a score from its
//! length and comma count. The score is credited to its ancestors with a
//! decaying share per level; ancestors become candidates. Candidate scores
//! are discounted by link density, ranked, and the best one is refined by
//! looking at its relatives.

use std::collections::HashMap;

use log::{debug, trace};

use super::Flags;
use crate::dom::{NodeId, Tree};
use crate::link_density::link_density;
use crate::patterns::{
    ALTER_TO_DIV_EXCEPTIONS, COMMAS, NEGATIVE, POSITIVE, SENTENCE_END, TAGS_TO_SCORE,
};
use crate::text::inner_text;
use crate::Options;

/// Paragraphs shorter than this are not scored.
pub(crate) const MIN_PARAGRAPH_CHARS: usize = 25;

/// Ancestor levels a paragraph's score reaches.
pub(crate) const PROPAGATION_DEPTH: usize = 5;

/// One point per this many characters of paragraph text...
const CHARS_PER_POINT: usize = 100;

/// ...up to this many points.
const MAX_LENGTH_POINTS: usize = 3;

/// Bonus or penalty for a positive or negative class or id.
pub(crate) const CLASS_WEIGHT: f64 = 25.0;

/// Runners-up within this share of the best score vote for a common
/// ancestor.
const ALTERNATIVE_SCORE_RATIO: f64 = 0.75;

/// Votes an ancestor needs to replace the top candidate.
const MIN_ALTERNATIVE_VOTES: usize = 3;

/// A sibling joins the article when its score reaches this share of the
/// top candidate's score...
const SIBLING_SCORE_RATIO: f64 = 0.2;

/// ...and at least this absolute score.
const SIBLING_SCORE_FLOOR: f64 = 10.0;

/// Sibling paragraphs at least this long join when nearly link-free;
/// shorter ones must be link-free sentences.
const SIBLING_PARAGRAPH_CHARS: usize = 80;

/// Link density ceiling for long sibling paragraphs.
const SIBLING_PARAGRAPH_LINK_DENSITY: f64 = 0.25;

/// Content scores of the candidates. A node present in the map has had its
/// score initialized.
#[derive(Debug, Default)]
pub(crate) struct Scores {
    scores: HashMap<NodeId, f64>,
}

impl Scores {
    pub(crate) fn get(&self, node: NodeId) -> Option<f64> {
        self.scores.get(&node).copied()
    }

    pub(crate) fn is_scored(&self, node: NodeId) -> bool {
        self.scores.contains_key(&node)
    }

    /// Starts a candidate at its tag's base score plus class weight.
    pub(crate) fn initialize(&mut self, tree: &Tree, node: NodeId, flags: Flags) {
        self.scores
            .insert(node, tag_score(tree, node) + class_weight(tree, node, flags));
    }

    fn add(&mut self, tree: &Tree, node: NodeId, flags: Flags, points: f64) {
        if !self.is_scored(node) {
            self.initialize(tree, node, flags);
        }
        if let Some(score) = self.scores.get_mut(&node) {
            *score += points;
        }
    }

    fn set(&mut self, node: NodeId, score: f64) {
        self.scores.insert(node, score);
    }

    pub(crate) fn len(&self) -> usize {
        self.scores.len()
    }

    fn nodes(&self) -> Vec<NodeId> {
        self.scores.keys().copied().collect()
    }
}

/// Base score by tag: containers of prose up, lists and headings down.
fn tag_score(tree: &Tree, node: NodeId) -> f64 {
    match tree.tag_name(node).unwrap_or_default() {
        "div" => 5.0,
        "pre" | "td" | "blockquote" => 3.0,
        "address" | "ol" | "ul" | "dl" | "dd" | "dt" | "li" | "form" => -3.0,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th" => -5.0,
        _ => 0.0,
    }
}

/// Class and id signals, each worth plus or minus [`CLASS_WEIGHT`].
pub(crate) fn class_weight(tree: &Tree, node: NodeId, flags: Flags) -> f64 {
    if !flags.weight_classes {
        return 0.0;
    }
    let mut weight = 0.0;
    for name in ["class", "id"] {
        let Some(value) = tree.attr(node, name).filter(|value| !value.is_empty()) else {
            continue;
        };
        if NEGATIVE.is_match(value) {
            weight -= CLASS_WEIGHT;
        }
        if POSITIVE.is_match(value) {
            weight += CLASS_WEIGHT;
        }
    }
    weight
}

/// Points a paragraph earns: one, plus its commas, plus one per hundred
/// characters (capped).
fn paragraph_points(text: &str) -> f64 {
    let length = text.chars().count();
    let commas = COMMAS.find_iter(text).count();
    1.0 + commas as f64 + (length / CHARS_PER_POINT).min(MAX_LENGTH_POINTS) as f64
}

/// Share of a paragraph's points credited to the ancestor `level` steps
/// up: all of it to the parent, half to the grandparent, then a third of
/// the level.
fn level_divider(level: usize) -> f64 {
    match level {
        0 => 1.0,
        1 => 2.0,
        _ => (level * 3) as f64,
    }
}

/// Scores every paragraph-like node under `body` and credits its ancestors.
pub(crate) fn score_paragraphs(tree: &Tree, body: NodeId, flags: Flags) -> Scores {
    let mut scores = Scores::default();

    for node in tree.elements_by_tag(body, TAGS_TO_SCORE) {
        let text = inner_text(tree, node);
        if text.chars().count() < MIN_PARAGRAPH_CHARS {
            continue;
        }
        let ancestors = tree.ancestors(node, PROPAGATION_DEPTH);
        if ancestors.is_empty() {
            continue;
        }

        let points = paragraph_points(&text);
        for (level, ancestor) in ancestors.into_iter().enumerate() {
            // The <html> element is never a candidate
            if !tree.parent(ancestor).is_some_and(|parent| tree.is_element(parent)) {
                continue;
            }
            scores.add(tree, ancestor, flags, points / level_divider(level));
        }
    }

    scores
}

/// Discounts every candidate by its link density and ranks them: highest
/// score first, earlier in the document on ties.
pub(crate) fn rank_candidates(tree: &Tree, body: NodeId, scores: &mut Scores) -> Vec<(NodeId, f64)> {
    let order: HashMap<NodeId, usize> = std::iter::once(body)
        .chain(tree.descendants(body))
        .enumerate()
        .map(|(position, node)| (node, position))
        .collect();

    let mut ranked: Vec<(NodeId, f64)> = Vec::with_capacity(scores.len());
    for node in scores.nodes() {
        let Some(score) = scores.get(node).filter(|_| order.contains_key(&node)) else {
            continue;
        };
        let score = score * (1.0 - link_density(tree, node));
        scores.set(node, score);
        ranked.push((node, score));
    }

    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| order[&a.0].cmp(&order[&b.0])));

    for (node, score) in ranked.iter().take(8) {
        trace!("candidate <{}> {score:.2}", tree.tag_name(*node).unwrap_or_default());
    }
    ranked
}

/// The refined top candidate, or `None` when the document body has to
/// stand in.
pub(crate) fn select_top_candidate(
    tree: &Tree,
    body: NodeId,
    scores: &mut Scores,
    ranked: &[(NodeId, f64)],
    options: &Options,
    flags: Flags,
) -> Option<NodeId> {
    let (mut top, top_score) = *ranked.first()?;
    if top == body || top_score < options.min_candidate_score {
        debug!("no candidate above {} (best {top_score:.2}), using body", options.min_candidate_score);
        return None;
    }

    // Several strong runners-up sharing an ancestor: the ancestor is the
    // article and the runners-up are its sections
    let runner_up_ancestors: Vec<Vec<NodeId>> = ranked
        .iter()
        .take(options.nb_top_candidates.max(1))
        .skip(1)
        .filter(|(_, score)| *score / top_score >= ALTERNATIVE_SCORE_RATIO)
        .map(|(node, _)| tree.ancestors(*node, 0))
        .collect();
    if runner_up_ancestors.len() >= MIN_ALTERNATIVE_VOTES {
        let mut parent = tree.parent(top);
        while let Some(candidate) = parent.filter(|&p| p != body && tree.is_element(p)) {
            let votes = runner_up_ancestors
                .iter()
                .filter(|ancestors| ancestors.contains(&candidate))
                .count();
            if votes >= MIN_ALTERNATIVE_VOTES {
                top = candidate;
                break;
            }
            parent = tree.parent(candidate);
        }
    }
    if !scores.is_scored(top) {
        scores.initialize(tree, top, flags);
    }

    // Climb while the parent holds comparable or more content
    let mut last_score = scores.get(top).unwrap_or_default();
    let threshold = last_score / 3.0;
    let mut parent = tree.parent(top);
    while let Some(candidate) = parent.filter(|&p| p != body && tree.is_element(p)) {
        let Some(parent_score) = scores.get(candidate) else {
            parent = tree.parent(candidate);
            continue;
        };
        if parent_score < threshold {
            break;
        }
        if parent_score > last_score {
            top = candidate;
            break;
        }
        last_score = parent_score;
        parent = tree.parent(candidate);
    }

    // An only child stands for its parent
    while let Some(parent) = tree
        .parent(top)
        .filter(|&p| p != body && tree.is_element(p) && tree.element_children(p).len() == 1)
    {
        top = parent;
    }
    if !scores.is_scored(top) {
        scores.initialize(tree, top, flags);
    }

    debug!(
        "top candidate <{}> score {:.2}",
        tree.tag_name(top).unwrap_or_default(),
        scores.get(top).unwrap_or_default()
    );
    Some(top)
}

/// Moves the top candidate and the siblings that belong with it into
/// `content`, in document order.
///
/// A sibling belongs when its own score is close enough to the top
/// candidate's (siblings sharing the top candidate's class get a bonus),
/// or when it is a paragraph that reads like prose.
pub(crate) fn absorb_siblings(tree: &mut Tree, top: NodeId, scores: &Scores, content: NodeId) {
    let top_score = scores.get(top).unwrap_or_default();
    let threshold = SIBLING_SCORE_FLOOR.max(top_score * SIBLING_SCORE_RATIO);
    let top_class = tree.attr(top, "class").unwrap_or_default().to_string();

    let Some(parent) = tree.parent(top) else {
        tree.append_child(content, top);
        return;
    };

    for sibling in tree.element_children(parent) {
        let append = sibling == top || {
            let bonus = if !top_class.is_empty() && tree.attr(sibling, "class") == Some(top_class.as_str()) {
                top_score * SIBLING_SCORE_RATIO
            } else {
                0.0
            };
            scores.get(sibling).is_some_and(|score| score + bonus >= threshold)
                || (tree.is_tag(sibling, "p") && is_prose_paragraph(tree, sibling))
        };
        if !append {
            continue;
        }

        trace!("absorbing sibling <{}>", tree.tag_name(sibling).unwrap_or_default());
        if !tree.is_one_of(sibling, ALTER_TO_DIV_EXCEPTIONS) {
            tree.rename(sibling, "div");
        }
        tree.append_child(content, sibling);
    }
}

fn is_prose_paragraph(tree: &Tree, node: NodeId) -> bool {
    let density = link_density(tree, node);
    let text = inner_text(tree, node);
    let length = text.chars().count();

    if length >= SIBLING_PARAGRAPH_CHARS {
        density < SIBLING_PARAGRAPH_LINK_DENSITY
    } else {
        length > 0 && density <= 0.0 && SENTENCE_END.is_match(&text)
    }
}
