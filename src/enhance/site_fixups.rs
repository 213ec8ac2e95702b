//! Host-specific cleanups.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use super::{EnhanceContext, Enhancement};
use crate::dom::{NodeId, Tree};

/// One site's rewrite: the hosts it applies to and the clutter it removes.
struct SiteFixup {
    name: &'static str,
    host: LazyLock<Regex>,
    /// Classes of elements removed outright.
    remove_classes: &'static [&'static str],
}

static SITE_FIXUPS: [SiteFixup; 1] = [SiteFixup {
    name: "wikimedia",
    host: LazyLock::new(|| {
        Regex::new(r"(?i)(^|\.)(wikipedia|wiktionary|wikibooks|wikivoyage|wikinews|wikiquote|wikisource)\.org$")
            .expect("wikimedia host regex")
    }),
    remove_classes: &["mw-editsection", "mw-jump-link", "noprint", "mw-empty-elt"],
}];

/// Applies the fixups whose host pattern matches the document URL.
///
/// Unknown hosts are a no-op.
pub struct SiteFixups;

impl Enhancement for SiteFixups {
    fn name(&self) -> &'static str {
        "site-fixups"
    }

    fn apply(&self, tree: &mut Tree, ctx: &EnhanceContext<'_>) {
        let Some(host) = ctx.host.as_deref() else {
            return;
        };

        for fixup in SITE_FIXUPS.iter().filter(|fixup| fixup.host.is_match(host)) {
            debug!("site-fixups: applying {} to {host}", fixup.name);

            for node in with_any_class(tree, fixup.remove_classes) {
                tree.remove(node);
            }
        }
    }
}

fn with_any_class(tree: &Tree, classes: &[&str]) -> Vec<NodeId> {
    tree.select(tree.root(), |t, node| classes.iter().any(|class| t.has_class(node, class)))
}
