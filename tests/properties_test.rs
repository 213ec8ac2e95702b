//! Behavioral guarantees of the pipeline, one test per property.

use rs_percollate::url_utils::absolutize;
use rs_percollate::{enhance, extract_article, parse, process, select_lead_image, Error, Options, Tree};
use url::Url;

const BASE: &str = "https://example.com/a/b";

fn enhanced(html: &str) -> Tree {
    let mut tree = parse(html);
    enhance(&mut tree, &Url::parse(BASE).unwrap(), &Options::default());
    tree
}

/// Prose of exactly `len` characters, made of `word` and spaces.
fn prose(word: &str, len: usize) -> String {
    let mut text = format!("{word} ").repeat(len / (word.len() + 1) + 1);
    text.truncate(len);
    if text.ends_with(' ') {
        text.pop();
        text.push('x');
    }
    text
}

#[test]
fn enhancement_is_idempotent() {
    let html = r##"<html><head><base href="/a/"><meta property="og:image" content="lead.jpg"></head><body>
        <p><amp-img src="hero.jpg" alt="Hero" layout="responsive"></amp-img></p>
        <div><img data-src="lazy.jpg" src="data:image/gif;base64,R0lGOD"> Caption text</div>
        <p><a href="//cdn.example.com/full.png"><img src="thumb.png" srcset="thumb.png 1x, thumb@2x.png 2x"></a></p>
        <img src="https://upload.wikimedia.org/wikipedia/commons/thumb/a/ab/Quay.jpg/320px-Quay.jpg">
        <p>Read <a href="../c.html">more</a>, <a href="#">nothing</a>, <a name="top" href="">top</a>,
           <a class="anchor" href="javascript:void(0)">kept</a>.</p>
        </body></html>"##;

    let mut tree = enhanced(html);
    let once = tree.html();
    enhance(&mut tree, &Url::parse(BASE).unwrap(), &Options::default());
    assert_eq!(tree.html(), once);
}

#[test]
fn url_absolutization_cases() {
    let base = Url::parse(BASE).unwrap();
    assert_eq!(absolutize("../c.html", &base).unwrap(), "https://example.com/c.html");
    assert_eq!(absolutize("https://other.org/x", &base).unwrap(), "https://other.org/x");
    assert_eq!(
        absolutize("//cdn.example.com/x.png", &base).unwrap(),
        "https://cdn.example.com/x.png"
    );

    let tree = enhanced(r#"<a href="../c.html">c</a><img src="//cdn.example.com/x.png">"#);
    let body = tree.inner_html(tree.body().unwrap());
    assert!(body.contains(r#"href="https://example.com/c.html""#));
    assert!(body.contains(r#"src="https://cdn.example.com/x.png""#));
}

#[test]
fn absolutization_is_idempotent() {
    let base = Url::parse(BASE).unwrap();
    let once = absolutize("https://example.com/c.html", &base).unwrap();
    let twice = absolutize(&once, &base).unwrap();
    assert_eq!(once, "https://example.com/c.html");
    assert_eq!(once, twice);
}

#[test]
fn minimum_viable_extraction() {
    let paragraphs: String = (0..5)
        .map(|i| format!("<p>{}</p>", prose(&format!("harbour{i}"), 200)))
        .collect();
    let html = format!("<html><body><article>{paragraphs}</article></body></html>");

    let article = extract_article(&enhanced(&html), &Options::default()).unwrap();
    assert!(article.length >= 1000, "length {}", article.length);
}

#[test]
fn boilerplate_only_document_is_rejected() {
    let html = r#"<html><body>
        <div class="sidebar"><p>Browse our sections and archives for more stories from the region.</p></div>
        <div class="advertisement"><p>Subscribe today and save on a full year of unlimited access.</p></div>
        <div class="comment-section"><p>What a lovely story, I remember the ferry from my childhood.</p></div>
        </body></html>"#;

    let err = process(html, BASE, &Options::default()).unwrap_err();
    assert!(matches!(err, Error::ExtractionFailed { .. }), "{err:?}");
}

#[test]
fn link_dense_container_loses_to_prose() {
    // Same text in both containers: nine tenths linked in one, one
    // twentieth in the other
    let linked: String = (0..4)
        .map(|_| format!(r#"<p><a href="/l">{}</a>{}</p>"#, prose("LINKED", 225), prose("z", 25)))
        .collect();
    let plain: String = (0..4)
        .map(|_| format!(r#"<p>{}<a href="/p">{}</a></p>"#, prose("PLAIN", 237), prose("z", 13)))
        .collect();
    let html = format!(r#"<html><body><div>{linked}</div><div>{plain}</div></body></html>"#);

    let article = extract_article(&enhanced(&html), &Options::default()).unwrap();
    assert!(article.text_content.contains("PLAIN"));
    assert!(!article.text_content.contains("LINKED"));
}

#[test]
fn preserved_classes_and_stripped_styles() {
    let body: String = (0..3)
        .map(|i| {
            format!(
                r#"<p class="random-style" style="color: red" align="left">{} <a class="anchor" id="s{i}" href="/s">ref</a></p>"#,
                prose("story", 200)
            )
        })
        .collect();
    let html = format!("<html><body><article>{body}</article></body></html>");

    let article = extract_article(&enhanced(&html), &Options::default()).unwrap();
    assert!(article.content.contains(r#"class="anchor""#));
    assert!(!article.content.contains("random-style"));
    assert!(!article.content.contains("style="));
    assert!(!article.content.contains("align="));

    let options = Options {
        classes_to_preserve: vec!["random-style".to_string()],
        ..Options::default()
    };
    let article = extract_article(&enhanced(&html), &options).unwrap();
    assert!(article.content.contains(r#"class="random-style""#));
    assert!(!article.content.contains(r#"class="anchor""#));
    assert!(!article.content.contains("style="));
}

#[test]
fn lead_image_is_stable() {
    let tree = enhanced(
        r#"<body><article><img src="first.jpg"><p>Text</p><img src="second.jpg"></article></body>"#,
    );
    let first = select_lead_image(&tree, &Options::default());
    assert_eq!(first.as_deref(), Some("https://example.com/a/first.jpg"));
    assert_eq!(select_lead_image(&tree, &Options::default()), first);
}

#[test]
fn ties_resolve_to_earlier_container() {
    let text = prose("even", 250);
    let first = prose("FIRST", 250);
    let second = prose("SECND", 250);
    let html = format!(
        r#"<html><body><section><div><p>{first}</p><p>{text}</p></div></section>
           <section><div><p>{second}</p><p>{text}</p></div></section></body></html>"#
    );
    let tree = enhanced(&html);

    let runs: Vec<String> = (0..3)
        .map(|_| extract_article(&tree, &Options::default()).unwrap().content)
        .collect();
    assert!(runs[0].contains("FIRST"));
    assert!(!runs[0].contains("SECND"));
    assert!(runs.iter().all(|content| *content == runs[0]));
}
