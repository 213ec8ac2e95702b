//! Character encoding detection for fetched pages.
//!
//! Fetch collaborators hand over raw bytes. Before parsing, the bytes are
//! decoded to UTF-8 using, in order: a byte order mark, a `<meta charset>`
//! declaration, a `<meta http-equiv="Content-Type">` declaration, and finally
//! UTF-8.

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use std::sync::LazyLock;

/// Bytes examined for a charset declaration.
const PRESCAN_LIMIT: usize = 1024;

/// `<meta charset="...">`
#[allow(clippy::expect_used)]
static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s;/>]+)"#).expect("valid regex")
});

/// `<meta http-equiv="Content-Type" content="text/html; charset=...">`
#[allow(clippy::expect_used)]
static HTTP_EQUIV_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+http-equiv\s*=\s*["']?content-type["']?[^>]+content\s*=\s*["']?[^"'>]*;\s*charset\s*=\s*([^"'\s;>]+)"#)
        .expect("valid regex")
});

/// Detect the encoding of an HTML byte stream.
#[must_use]
pub fn sniff_encoding(html: &[u8]) -> &'static Encoding {
    if let Some((encoding, _bom_len)) = Encoding::for_bom(html) {
        return encoding;
    }

    let head = String::from_utf8_lossy(&html[..html.len().min(PRESCAN_LIMIT)]);
    declared_charset(&head)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        // A UTF-16 label inside an ASCII-compatible prescan is a lie.
        .filter(|encoding| encoding.is_ascii_compatible())
        .unwrap_or(UTF_8)
}

/// Charset label declared in the document head, if any.
fn declared_charset(head: &str) -> Option<String> {
    HTTP_EQUIV_CHARSET
        .captures(head)
        .or_else(|| META_CHARSET.captures(head))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Decode HTML bytes to a UTF-8 string.
///
/// Malformed sequences become U+FFFD; decoding never fails.
///
/// # Examples
///
/// ```
/// use rs_percollate::encoding::decode_html;
///
/// let html = b"<html><head><meta charset=\"ISO-8859-1\"></head><body>Caf\xE9</body></html>";
/// assert!(decode_html(html).contains("Café"));
/// ```
#[must_use]
pub fn decode_html(html: &[u8]) -> String {
    let encoding = sniff_encoding(html);
    // `decode` strips a matching BOM and replaces malformed input.
    let (decoded, _used, had_errors) = encoding.decode(html);
    if had_errors {
        log::debug!("replaced malformed {} sequences while decoding", encoding.name());
    }
    decoded.into_owned()
}
