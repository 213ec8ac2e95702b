//! Enhancement Stage
//!
//! An ordered list of structural rewrites applied to a freshly parsed
//! document before extraction. Each pass is a unit struct implementing
//! [`Enhancement`]; [`PASSES`] fixes their order, which is load-bearing:
//! AMP markup must be standard HTML before images are resolved, image
//! sources must exist before they are absolutized, and so on.
//!
//! Every pass is idempotent. Running the stage twice over one tree leaves
//! the tree as the first run left it. A pass that meets a node it cannot
//! handle logs the problem and moves on to the next node.

mod absolute_urls;
mod amp;
mod dead_links;
mod figures;
mod full_size;
mod lazy_images;
mod site_fixups;

pub use absolute_urls::AbsoluteUrls;
pub use amp::AmpToHtml;
pub use dead_links::DeadLinks;
pub use figures::SingleImageFigures;
pub use full_size::FullSizeImages;
pub use lazy_images::LazyImages;
pub use site_fixups::SiteFixups;

use log::debug;
use url::Url;

use crate::dom::Tree;
use crate::url_utils::document_base;
use crate::Options;

/// Per-document inputs shared by every pass.
#[derive(Debug, Clone)]
pub struct EnhanceContext<'a> {
    /// URL relative references resolve against: the `<base href>` when the
    /// document declares one, otherwise the fetch URL.
    pub base_url: Url,

    /// Host of the fetch URL, matched by site-specific fixups.
    pub host: Option<String>,

    /// Caller configuration (preserved classes).
    pub options: &'a Options,
}

impl<'a> EnhanceContext<'a> {
    /// Builds the context for one document.
    #[must_use]
    pub fn new(tree: &Tree, url: &Url, options: &'a Options) -> Self {
        Self {
            base_url: document_base(url, declared_base(tree)),
            host: url.host_str().map(str::to_ascii_lowercase),
            options,
        }
    }
}

/// `href` of the document's `<base>` element.
pub(crate) fn declared_base(tree: &Tree) -> Option<&str> {
    tree.head()
        .and_then(|head| tree.find_first(head, |t, node| t.is_tag(node, "base")))
        .and_then(|base| tree.attr(base, "href"))
}

/// One idempotent rewrite over the whole tree.
pub trait Enhancement {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Rewrites the tree in place.
    fn apply(&self, tree: &mut Tree, ctx: &EnhanceContext<'_>);
}

/// Every pass, in the order it runs.
pub const PASSES: [&dyn Enhancement; 7] = [
    &AmpToHtml,
    &LazyImages,
    &AbsoluteUrls,
    &FullSizeImages,
    &SingleImageFigures,
    &DeadLinks,
    &SiteFixups,
];

/// Runs every pass over the tree.
pub fn enhance(tree: &mut Tree, base_url: &Url, options: &Options) {
    let ctx = EnhanceContext::new(tree, base_url, options);
    run_passes(tree, &ctx);
}

/// Runs every pass with a prepared context.
pub fn run_passes(tree: &mut Tree, ctx: &EnhanceContext<'_>) {
    for pass in PASSES {
        debug!("enhance: running {}", pass.name());
        pass.apply(tree, ctx);
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::dom::parse;

    /// Parses `html`, runs one pass against `url` and returns the tree.
    pub fn apply_to(pass: &dyn Enhancement, html: &str, url: &str) -> Tree {
        let options = Options::default();
        let mut tree = parse(html);
        let url = Url::parse(url).unwrap();
        let ctx = EnhanceContext::new(&tree, &url, &options);
        pass.apply(&mut tree, &ctx);
        tree
    }

    /// Body markup after running one pass.
    pub fn body_after(pass: &dyn Enhancement, html: &str, url: &str) -> String {
        let tree = apply_to(pass, html, url);
        tree.inner_html(tree.body().unwrap())
    }

    /// True when a second run of the pass changes nothing.
    pub fn is_idempotent(pass: &dyn Enhancement, html: &str, url: &str) -> bool {
        let options = Options::default();
        let url = Url::parse(url).unwrap();
        let mut tree = parse(html);
        let ctx = EnhanceContext::new(&tree, &url, &options);
        pass.apply(&mut tree, &ctx);
        let once = tree.html();
        pass.apply(&mut tree, &ctx);
        once == tree.html()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse;

    #[test]
    fn passes_run_in_fixed_order() {
        let names: Vec<_> = PASSES.iter().map(|pass| pass.name()).collect();
        assert_eq!(
            names,
            vec![
                "amp-to-html",
                "lazy-images",
                "absolute-urls",
                "full-size-images",
                "single-image-figures",
                "dead-links",
                "site-fixups",
            ]
        );
    }

    #[test]
    fn context_uses_base_href() {
        let tree = parse(r#"<html><head><base href="/docs/"></head><body></body></html>"#);
        let url = Url::parse("https://example.com/a/b").unwrap();
        let options = Options::default();
        let ctx = EnhanceContext::new(&tree, &url, &options);
        assert_eq!(ctx.base_url.as_str(), "https://example.com/docs/");
        assert_eq!(ctx.host.as_deref(), Some("example.com"));
    }

    #[test]
    fn whole_stage_is_idempotent() {
        let html = r##"<html><head><meta property="og:image" content="/og.png"></head><body>
            <amp-img src="/hero.jpg" width="800" height="400"></amp-img>
            <p><img data-src="/lazy.jpg" src="data:image/gif;base64,R0lGOD"></p>
            <a href="/big.png"><img src="/small.png"></a>
            <p><a href="javascript:void(0)">dead</a> and <a id="top" href="#">top</a></p>
            <a href="../c.html">next</a>
        </body></html>"##;
        let url = Url::parse("https://example.com/a/b").unwrap();
        let options = Options::default();

        let mut tree = parse(html);
        enhance(&mut tree, &url, &options);
        let once = tree.html();
        enhance(&mut tree, &url, &options);
        assert_eq!(once, tree.html());
        assert!(once.contains("https://example.com/c.html"));
    }
}
