//! URL absolutization.

use log::debug;

use super::{EnhanceContext, Enhancement};
use crate::dom::{NodeId, Tree};
use crate::url_utils::{absolutize, absolutize_srcset};

/// Attributes holding a single URL.
const URL_ATTRIBUTES: &[&str] = &[
    "href",
    "src",
    "poster",
    "cite",
    "action",
    "data",
    "longdesc",
    "background",
];

/// Attributes holding a `srcset` list.
const SRCSET_ATTRIBUTES: &[&str] = &["srcset"];

/// `<meta>` properties whose `content` is an image URL.
const META_IMAGE_PROPERTIES: &[&str] = &[
    "og:image",
    "og:image:url",
    "og:image:secure_url",
    "twitter:image",
    "twitter:image:src",
    "thumbnail",
];

/// Rewrites every relative URL attribute against the document base.
///
/// Fragment-only references, `javascript:` and `data:` URLs, and URLs that
/// are already absolute are left as they are, which also makes a second
/// run a no-op. A value that cannot be resolved is logged and kept.
pub struct AbsoluteUrls;

impl Enhancement for AbsoluteUrls {
    fn name(&self) -> &'static str {
        "absolute-urls"
    }

    fn apply(&self, tree: &mut Tree, ctx: &EnhanceContext<'_>) {
        for node in tree.select(tree.root(), |_, _| true) {
            let mut updates: Vec<(String, String)> = Vec::new();

            for attr in tree.attrs(node) {
                let name = attr.name.as_str();
                let resolved = if URL_ATTRIBUTES.contains(&name) {
                    absolutize(&attr.value, &ctx.base_url)
                } else if SRCSET_ATTRIBUTES.contains(&name) {
                    absolutize_srcset(&attr.value, &ctx.base_url)
                } else if name == "content" && is_meta_image(tree, node) {
                    absolutize(&attr.value, &ctx.base_url)
                } else {
                    continue;
                };

                match resolved {
                    Ok(value) if value != attr.value => updates.push((attr.name.clone(), value)),
                    Ok(_) => {}
                    Err(err) => debug!("absolute-urls: skipping <{}>: {err}", attr.name),
                }
            }

            for (name, value) in updates {
                tree.set_attr(node, &name, &value);
            }
        }
    }
}

fn is_meta_image(tree: &Tree, node: NodeId) -> bool {
    tree.is_tag(node, "meta")
        && tree
            .attr(node, "property")
            .or_else(|| tree.attr(node, "name"))
            .is_some_and(|property| {
                META_IMAGE_PROPERTIES.contains(&property.trim().to_ascii_lowercase().as_str())
            })
}
