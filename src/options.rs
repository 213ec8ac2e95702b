//! Configuration options for the normalization and extraction pipeline.
//!
//! The `Options` struct carries the caller-provided configuration (preserved
//! classes, AMP preference) and the tunable extraction thresholds.

/// Configuration options for enhancement and extraction.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use rs_percollate::Options;
///
/// let options = Options {
///     classes_to_preserve: vec!["anchor".to_string(), "no-href".to_string(), "math".to_string()],
///     ..Options::default()
/// };
/// assert!(options.preserves_class("math"));
/// assert!(options.preserves_class("page"));
/// ```
#[derive(Debug, Clone)]
pub struct Options {
    /// CSS classes exempt from class stripping during cleanup.
    ///
    /// Anchors marked with one of these classes also survive dead-link
    /// neutralization. The content wrapper class `page` is always kept.
    ///
    /// Default: `["no-href", "anchor"]`
    pub classes_to_preserve: Vec<String>,

    /// Keep every `class` attribute in the extracted content.
    ///
    /// Default: `false`
    pub keep_classes: bool,

    /// Prefer the AMP version of a page when it advertises one.
    ///
    /// The pipeline itself never fetches; callers check [`crate::amp_alternate`]
    /// and re-run the whole pipeline on the AMP document.
    ///
    /// Default: `true`
    pub prefer_amp: bool,

    /// Text length an extraction attempt must reach before relaxed retries
    /// stop.
    ///
    /// Default: `500`
    pub char_threshold: usize,

    /// Number of top candidates compared when looking for a shared ancestor.
    ///
    /// Default: `5`
    pub nb_top_candidates: usize,

    /// Extraction fails when the best attempt has fewer characters than this.
    ///
    /// Default: `25`
    pub min_text_length: usize,

    /// Score the top candidate must reach; weaker candidates fall back to
    /// the whole body.
    ///
    /// Default: `5.0`
    pub min_candidate_score: f64,

    /// Maximum number of elements to process (`0` = unlimited).
    ///
    /// Larger documents fail extraction instead of being scored.
    ///
    /// Default: `0`
    pub max_elems_to_parse: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            classes_to_preserve: vec!["no-href".to_string(), "anchor".to_string()],
            keep_classes: false,
            prefer_amp: true,
            char_threshold: 500,
            nb_top_candidates: 5,
            min_text_length: 25,
            min_candidate_score: 5.0,
            max_elems_to_parse: 0,
        }
    }
}

/// Class of the wrapper element around extracted content.
pub(crate) const PAGE_CLASS: &str = "page";

impl Options {
    /// True when `class` survives cleanup.
    #[must_use]
    pub fn preserves_class(&self, class: &str) -> bool {
        class == PAGE_CLASS || self.classes_to_preserve.iter().any(|c| c == class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_preserve_anchor_classes() {
        let options = Options::default();
        assert!(options.preserves_class("anchor"));
        assert!(options.preserves_class("no-href"));
        assert!(options.preserves_class("page"));
        assert!(!options.preserves_class("random-style"));
        assert!(options.prefer_amp);
    }

    #[test]
    fn custom_preserved_classes_replace_defaults() {
        let options = Options {
            classes_to_preserve: vec!["keep".to_string()],
            ..Options::default()
        };
        assert!(options.preserves_class("keep"));
        assert!(!options.preserves_class("anchor"));
    }
}
