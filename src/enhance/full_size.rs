//! Full-size image upgrade.
//!
//! Two sources of a bigger image: a thumbnail wrapped in a link to the
//! original file, and CDN URLs whose path or query encodes a resize.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use log::trace;
use regex::Regex;

use super::{EnhanceContext, Enhancement};
use crate::dom::{NodeId, Tree};
use crate::url_utils::{has_image_extension, is_http_url};

/// Wiki pages about a file (`/wiki/File:Photo.jpg`) look like image links
/// but are HTML pages.
static WIKI_FILE_PAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)/wiki/[^/]+:[^/]+$").expect("WIKI_FILE_PAGE regex")
});

/// Repository file viewers (`/owner/repo/blob/main/logo.png`).
static REPOSITORY_BLOB_PAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(www\.)?(github\.com|gitlab\.com)/[^/]+/[^/]+/(-/)?blob/")
        .expect("REPOSITORY_BLOB_PAGE regex")
});

/// Thumbnail URL pattern and the replacement producing the original.
struct ThumbnailRule {
    pattern: LazyLock<Regex>,
    replacement: &'static str,
}

static THUMBNAIL_RULES: [ThumbnailRule; 3] = [
    // upload.wikimedia.org/wikipedia/commons/thumb/a/ab/Name.jpg/320px-Name.jpg
    ThumbnailRule {
        pattern: LazyLock::new(|| {
            Regex::new(r"^(https?://upload\.wikimedia\.org/.+?)/thumb(/[0-9a-f]/[0-9a-f]{2}/[^/]+)/[^/]+$")
                .expect("wikimedia thumbnail regex")
        }),
        replacement: "${1}${2}",
    },
    // blogger.googleusercontent.com/img/b/.../s320/photo.jpg
    ThumbnailRule {
        pattern: LazyLock::new(|| {
            Regex::new(r"^(https?://[^/]*(?:blogger\.googleusercontent\.com|bp\.blogspot\.com)/.+)/[swh]\d{2,4}(?:-[a-z0-9-]+)?(/[^/]+)$")
                .expect("blogger thumbnail regex")
        }),
        replacement: "${1}/s0${2}",
    },
    // i0.wp.com/example.com/photo.jpg?resize=300%2C200
    ThumbnailRule {
        pattern: LazyLock::new(|| {
            Regex::new(r"^(https?://i\d\.wp\.com/[^?#]+)\?(?:resize|w|fit)=[^#]*$")
                .expect("wp.com thumbnail regex")
        }),
        replacement: "${1}",
    },
];

/// Points images at their largest available version.
///
/// An `<a href="big.jpg"><img src="small.jpg"></a>` pair collapses into
/// `<img src="big.jpg">` when the link targets an image file. Known
/// thumbnail URL schemes are rewritten to the original. The old `srcset`
/// and `sizes` are dropped once `src` changes, since they describe the
/// thumbnail.
pub struct FullSizeImages;

impl Enhancement for FullSizeImages {
    fn name(&self) -> &'static str {
        "full-size-images"
    }

    fn apply(&self, tree: &mut Tree, _ctx: &EnhanceContext<'_>) {
        for img in tree.elements_by_tag(tree.root(), &["img"]) {
            if !tree.is_attached(img) {
                continue;
            }
            if let Some(link) = linked_original(tree, img) {
                let Some(href) = tree.attr(link, "href").map(str::to_string) else {
                    continue;
                };
                trace!("full-size: unwrapping link to {href}");
                tree.replace(link, img);
                set_src(tree, img, &href);
            }

            if let Some(src) = tree.attr(img, "src").and_then(upgrade_thumbnail) {
                set_src(tree, img, &src);
            }
        }
    }
}

/// The enclosing link when it wraps only this image and targets an image
/// file.
fn linked_original(tree: &Tree, img: NodeId) -> Option<NodeId> {
    let link = tree.parent(img).filter(|&parent| tree.is_tag(parent, "a"))?;
    let only_child = tree.children(link).iter().all(|&child| {
        child == img || tree.text(child).is_some_and(|text| text.trim().is_empty())
    });
    if !only_child {
        return None;
    }

    let href = tree.attr(link, "href")?.trim();
    let is_original = is_http_url(href)
        && has_image_extension(href)
        && !WIKI_FILE_PAGE.is_match(href)
        && !REPOSITORY_BLOB_PAGE.is_match(href);
    is_original.then_some(link)
}

/// Original-size URL for a known thumbnail URL.
fn upgrade_thumbnail(src: &str) -> Option<String> {
    THUMBNAIL_RULES.iter().find_map(|rule| {
        let upgraded = rule.pattern.replace(src, rule.replacement);
        (upgraded != src).then(|| upgraded.into_owned())
    })
}

fn set_src(tree: &mut Tree, img: NodeId, src: &str) {
    if tree.attr(img, "src") == Some(src) {
        return;
    }
    tree.set_attr(img, "src", src);
    tree.remove_attr(img, "srcset");
    tree.remove_attr(img, "sizes");
}
