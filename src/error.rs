//! Error types for the layoutir library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for layoutir operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building or comparing canonical IR.
///
/// Data-quality problems in raw elements (unknown kinds, missing boxes,
/// ragged tables) are never reported here. The normalizer absorbs them
/// with a log entry and a best-effort default.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The source document could not be read. Normalization of that
    /// document is aborted.
    #[error("cannot read source file {}: {source}", path.display())]
    SourceUnreadable {
        /// Path of the source file
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A block-kind label is not part of the closed block type set.
    #[error("Unknown block type: {0}")]
    UnknownBlockType(String),

    /// No extractor is registered for the input format.
    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    /// The extraction collaborator failed to produce raw elements.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Two documents are not semantically equal.
    #[error(transparent)]
    SemanticMismatch(#[from] SemanticMismatch),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Wrap an I/O failure on a source file.
    pub fn source_unreadable(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::SourceUnreadable {
            path: path.into(),
            source,
        }
    }
}

/// First difference between two canonical projections.
///
/// `line` is 1-indexed. When one projection is a strict prefix of the
/// other, the shorter side reports `(missing)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("documents not semantically equal; first difference at line {line}:\n  left:  {left}\n  right: {right}")]
pub struct SemanticMismatch {
    /// Line number of the first difference (1-indexed)
    pub line: usize,
    /// Line content on the left-hand document
    pub left: String,
    /// Line content on the right-hand document
    pub right: String,
}
