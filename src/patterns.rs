//! Compiled regex patterns and tag tables for enhancement and extraction.
//!
//! All patterns are compiled once at first use via `LazyLock`. They are pure
//! constant data consumed by the scoring and cleanup functions.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Candidate Signal Vocabulary (matched against "class id")
// =============================================================================

/// Class/id fragments of page furniture that is almost never article content.
pub static UNLIKELY_CANDIDATES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)-ad-|advert|ai2html|banner|breadcrumbs|combx|comment|community|cover-wrap|disqus|extra|footer|gdpr|header|legends|menu|related|remark|replies|rss|shoutbox|sidebar|skyscraper|social|sponsor|supplemental|ad-break|agegate|pagination|pager|popup|yom-remote",
    )
    .expect("UNLIKELY_CANDIDATES regex")
});

/// Class/id fragments that override an unlikely match.
pub static MAYBE_CANDIDATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)and|article|body|column|content|main|mathjax|shadow")
        .expect("MAYBE_CANDIDATE regex")
});

/// Class/id fragments that raise a node's class weight.
pub static POSITIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)article|body|content|entry|hentry|h-entry|main|page|pagination|post|text|blog|story",
    )
    .expect("POSITIVE regex")
});

/// Class/id fragments that lower a node's class weight.
pub static NEGATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)-ad-|advert|hidden|^hid$| hid$| hid |^hid |banner|combx|comment|com-|contact|footer|gdpr|masthead|media|meta|outbrain|promo|related|scroll|share|shoutbox|sidebar|skyscraper|sponsor|shopping|tags|widget",
    )
    .expect("NEGATIVE regex")
});

/// Class/id fragments of author lines.
pub static BYLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)byline|author|dateline|writtenby|p-author").expect("BYLINE regex")
});

/// Social sharing widgets.
pub static SHARE_ELEMENTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\b|_)(share|sharedaddy)(\b|_)").expect("SHARE_ELEMENTS regex")
});

/// Embeds from video hosts, kept by cleanup.
pub static VIDEOS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)//(www\.)?((dailymotion|youtube|youtube-nocookie|player\.vimeo|v\.qq|bilibili|live\.bilibili)\.com|(archive|upload\.wikimedia)\.org|player\.twitch\.tv)",
    )
    .expect("VIDEOS regex")
});

/// ARIA roles of non-content landmarks.
pub const UNLIKELY_ROLES: &[&str] = &[
    "menu",
    "menubar",
    "complementary",
    "navigation",
    "alert",
    "alertdialog",
    "dialog",
];

// =============================================================================
// Text Patterns
// =============================================================================

/// Comma-like separators across scripts.
pub static COMMAS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\u{002C}\u{060C}\u{FE50}\u{FE10}\u{FE11}\u{2E41}\u{2E34}\u{2E32}\u{FF0C}]")
        .expect("COMMAS regex")
});

/// Runs of whitespace.
pub static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("WHITESPACE_RUN regex"));

/// Sentence end: a period followed by a space or end of text.
pub static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.( |$)").expect("SENTENCE_END regex"));

/// Separators between an article title and a site name.
pub static TITLE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" [\|\-–—\\/>»] ").expect("TITLE_SEPARATOR regex"));

/// Separators implying a hierarchy (`Section / Article`).
pub static TITLE_HIERARCHY_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" [\\/>»] ").expect("TITLE_HIERARCHY_SEPARATOR regex"));

// =============================================================================
// Tag Tables
// =============================================================================

/// Tags whose text is scored directly.
pub const TAGS_TO_SCORE: &[&str] = &["section", "h2", "h3", "h4", "h5", "h6", "p", "td", "pre"];

/// Block-level tags: a `div` containing none of these is a paragraph.
pub const DIV_TO_P_ELEMS: &[&str] = &[
    "blockquote", "dl", "div", "img", "ol", "p", "pre", "table", "ul",
];

/// Elements that stay as-is when absorbed as siblings.
pub const ALTER_TO_DIV_EXCEPTIONS: &[&str] = &["div", "article", "section", "p"];

/// Non-content elements removed before scoring.
pub const NON_CONTENT_TAGS: &[&str] = &[
    "script", "noscript", "style", "template", "link", "meta", "form", "fieldset", "input",
    "button", "select", "textarea", "nav", "aside", "footer", "dialog", "menu",
];

/// Elements that carry content without text.
pub const MEDIA_TAGS: &[&str] = &[
    "img", "picture", "video", "audio", "iframe", "embed", "object", "svg", "math", "canvas",
];

/// Phrasing content, wrapped into paragraphs inside mixed containers.
pub const PHRASING_ELEMS: &[&str] = &[
    "abbr", "audio", "b", "bdo", "br", "button", "cite", "code", "data", "datalist", "dfn", "em",
    "embed", "i", "img", "input", "kbd", "label", "mark", "math", "meter", "noscript", "object",
    "output", "progress", "q", "ruby", "samp", "script", "select", "small", "span", "strong",
    "sub", "sup", "textarea", "time", "var", "wbr",
];

/// Presentational attributes stripped by cleanup.
pub const PRESENTATIONAL_ATTRIBUTES: &[&str] = &[
    "align", "background", "bgcolor", "border", "cellpadding", "cellspacing", "frame", "hspace",
    "rules", "style", "valign", "vspace",
];

/// Elements where `width`/`height` are presentational.
pub const DEPRECATED_SIZE_ATTRIBUTE_ELEMS: &[&str] = &["table", "th", "td", "hr", "pre"];

/// Block elements: text projection puts line breaks around them.
pub const BLOCK_ELEMS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "details", "div", "dl", "dt",
    "figcaption", "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li",
    "main", "ol", "p", "pre", "section", "summary", "table", "tbody", "thead", "tfoot", "tr",
    "ul",
];

// =============================================================================
// Image Patterns
// =============================================================================

/// URLs of tracking pixels, spacers and placeholders.
pub static TRACKING_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(pixel|spacer|blank|transparent|placeholder|1x1|tracking|beacon)\.(gif|png|jpe?g|webp)|/(pixel|track|beacon|ping)(\.php|/|\?)|doubleclick\.net|facebook\.com/tr|google-analytics\.com|scorecardresearch\.com|/b/ss/|feeds\.feedburner\.com/~r/",
    )
    .expect("TRACKING_IMAGE regex")
});
