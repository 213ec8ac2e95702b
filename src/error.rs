//! Error types for rs-percollate.
//!
//! Only the extraction-threshold failures and a bad base URL ever leave the
//! crate. `MalformedNode` is produced by per-node helpers and absorbed by the
//! pass that called them.

/// Error type for pipeline operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The caller-supplied base URL could not be parsed.
    #[error("invalid base URL `{url}`: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A single node carried missing or unparseable data.
    #[error("malformed node: {0}")]
    MalformedNode(String),

    /// The document has no body or no content at all.
    #[error("document has no body content")]
    EmptyInput,

    /// No candidate met the minimum content threshold.
    #[error("no content candidate met the minimum threshold (best attempt: {best_length} chars)")]
    ExtractionFailed { best_length: usize },
}

impl Error {
    /// True for the terminal per-document outcomes a batch caller records
    /// before moving on to the next document.
    #[must_use]
    pub fn is_extraction_failure(&self) -> bool {
        matches!(self, Self::EmptyInput | Self::ExtractionFailed { .. })
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;
