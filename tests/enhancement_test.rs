//! Enhancement stage behavior on whole documents, passes interacting.

use rs_percollate::enhance::{EnhanceContext, Enhancement, PASSES};
use rs_percollate::{enhance, parse, Options, Tree};
use url::Url;

fn enhanced(html: &str, url: &str) -> Tree {
    let mut tree = parse(html);
    let base = Url::parse(url).unwrap();
    enhance(&mut tree, &base, &Options::default());
    tree
}

fn body_html(tree: &Tree) -> String {
    tree.inner_html(tree.body().unwrap())
}

#[test]
fn amp_image_is_resolved_and_promoted_to_figure() {
    let tree = enhanced(
        r#"<p><amp-img src="/photos/harbour.jpg" alt="The harbour" layout="responsive" width="800" height="400"></amp-img></p>"#,
        "https://example.com/news/story",
    );
    assert_eq!(
        body_html(&tree),
        r#"<figure><img src="https://example.com/photos/harbour.jpg" alt="The harbour" width="800" height="400"><figcaption>The harbour</figcaption></figure>"#
    );
}

#[test]
fn lazy_image_source_is_made_absolute() {
    let tree = enhanced(
        r#"<div><img src="data:image/gif;base64,R0lGOD" data-src="img/full.jpg"><p>text</p></div>"#,
        "https://example.com/news/story",
    );
    assert!(body_html(&tree).contains(r#"src="https://example.com/news/img/full.jpg""#));
}

#[test]
fn base_element_sets_resolution_base() {
    let tree = enhanced(
        r#"<html><head><base href="https://cdn.example.org/assets/"></head><body><a href="doc.html">doc</a></body></html>"#,
        "https://example.com/news/story",
    );
    assert_eq!(
        body_html(&tree),
        r#"<a href="https://cdn.example.org/assets/doc.html">doc</a>"#
    );
}

#[test]
fn linked_thumbnail_becomes_full_size_image() {
    let tree = enhanced(
        r#"<p><a href="/media/big.jpg"><img src="/media/small.jpg" srcset="/media/small-2x.jpg 2x"></a></p>"#,
        "https://example.com/gallery",
    );
    let html = body_html(&tree);
    assert!(html.contains(r#"<img src="https://example.com/media/big.jpg">"#), "{html}");
    assert!(!html.contains("small"));
}

#[test]
fn dead_links_are_neutralized() {
    let tree = enhanced(
        r##"<p>Go <a href="#">nowhere</a>, <a href="javascript:void(0)">run</a> or
        <a id="fn1" href="#">back</a> to <a href="/next">next</a>.</p>"##,
        "https://example.com/post",
    );
    let html = body_html(&tree);
    assert!(html.contains("Go nowhere, run or"));
    assert!(html.contains(r#"<a id="fn1" class="no-href">back</a>"#), "{html}");
    assert!(html.contains(r#"<a href="https://example.com/next">next</a>"#));
}

#[test]
fn wikipedia_clutter_is_removed_only_on_wikipedia() {
    let page = r#"<h2>History<span class="mw-editsection">[edit]</span></h2><p>Text.</p>"#;
    let wiki = enhanced(page, "https://en.wikipedia.org/wiki/Harbour");
    assert_eq!(body_html(&wiki), "<h2>History</h2><p>Text.</p>");

    let other = enhanced(page, "https://example.com/wiki/Harbour");
    assert!(body_html(&other).contains("mw-editsection"));
}

#[test]
fn malformed_url_is_skipped_without_aborting_the_pass() {
    let tree = enhanced(
        r#"<a href="//exa mple.com/x">bad</a><a href="ok.html">good</a>"#,
        "https://example.com/dir/",
    );
    let html = body_html(&tree);
    assert!(html.contains(r#"href="//exa mple.com/x""#));
    assert!(html.contains(r#"href="https://example.com/dir/ok.html""#));
}

#[test]
fn passes_can_run_individually() {
    let mut tree = parse(r#"<img data-src="/a.jpg">"#);
    let url = Url::parse("https://example.com/").unwrap();
    let options = Options::default();
    let ctx = EnhanceContext::new(&tree, &url, &options);

    let lazy = PASSES.iter().find(|pass| pass.name() == "lazy-images").unwrap();
    lazy.apply(&mut tree, &ctx);
    assert_eq!(body_html(&tree), r#"<img data-src="/a.jpg" src="/a.jpg">"#);
}
