//! Single-image containers to `<figure>`.

use super::{EnhanceContext, Enhancement};
use crate::dom::{NodeId, Tree};
use crate::text::normalize_whitespace;

/// Containers promoted when they hold a lone image.
const IMAGE_CONTAINERS: &[&str] = &["p", "div", "center"];

/// Longest leftover text still treated as a caption.
const MAX_CAPTION_CHARS: usize = 200;

/// Turns a block holding one image (and at most a short caption) into a
/// `figure` with a `figcaption`.
///
/// Extraction drops sparse blocks; a figure survives. The caption comes
/// from the block's own text, falling back to the image's `alt`. The
/// container's `id` moves to the figure so in-page links keep working.
pub struct SingleImageFigures;

impl Enhancement for SingleImageFigures {
    fn name(&self) -> &'static str {
        "single-image-figures"
    }

    fn apply(&self, tree: &mut Tree, _ctx: &EnhanceContext<'_>) {
        for img in tree.elements_by_tag(tree.root(), &["img"]) {
            if !tree.is_attached(img) {
                continue;
            }
            let Some(container) = tree.parent(img) else {
                continue;
            };
            if !tree.is_one_of(container, IMAGE_CONTAINERS) || !holds_single_image(tree, container, img) {
                continue;
            }

            let text = normalize_whitespace(&tree.text_content(container));
            if text.chars().count() > MAX_CAPTION_CHARS {
                continue;
            }
            let caption = if text.is_empty() {
                tree.attr(img, "alt").map(normalize_whitespace).unwrap_or_default()
            } else {
                text
            };

            promote(tree, container, img, &caption);
        }
    }
}

/// True when `img` is the container's only element child (line breaks
/// aside).
fn holds_single_image(tree: &Tree, container: NodeId, img: NodeId) -> bool {
    tree.element_children(container)
        .into_iter()
        .all(|child| child == img || tree.is_tag(child, "br"))
}

fn promote(tree: &mut Tree, container: NodeId, img: NodeId, caption: &str) {
    let figure = tree.create_element("figure");
    if let Some(id) = tree.attr(container, "id").map(str::to_string) {
        tree.set_attr(figure, "id", &id);
    }
    tree.replace(container, figure);
    tree.append_child(figure, img);

    if !caption.is_empty() {
        let figcaption = tree.create_element("figcaption");
        tree.set_text(figcaption, caption);
        tree.append_child(figure, figcaption);
    }
}
