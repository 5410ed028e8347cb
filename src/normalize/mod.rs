//! Normalization of raw extraction output into canonical IR.
//!
//! Within one document the steps run strictly in sequence: map raw
//! elements and mint IDs, sort by `order`, validate spatial ordering, build
//! the heading hierarchy, assemble metadata. Separate documents share no
//! state and can be normalized concurrently with [`normalize_batch`].

mod normalizer;
mod options;
mod ordering;
mod relationships;

pub use normalizer::Normalizer;
pub use options::NormalizeOptions;
pub use ordering::{OrderingReport, OrderingValidator};
pub use relationships::build_relationships;

use std::path::PathBuf;

use rayon::prelude::*;

use crate::error::Result;
use crate::extract::RawDocument;
use crate::model::Document;

/// One document of a batch: its source file and what the extractor produced.
#[derive(Debug, Clone)]
pub struct BatchItem {
    /// Source file, hashed for the document ID
    pub source_path: PathBuf,
    /// Extracted raw elements
    pub raw: RawDocument,
    /// Extraction engine version
    pub parser_version: String,
}

impl BatchItem {
    /// Create a batch item.
    pub fn new(source_path: impl Into<PathBuf>, raw: RawDocument, parser_version: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            raw,
            parser_version: parser_version.into(),
        }
    }

    fn normalize(self, options: &NormalizeOptions) -> Result<Document> {
        let normalizer = Normalizer::open(&self.source_path, self.parser_version)?;
        Ok(normalizer.normalize(self.raw, options))
    }
}

/// Normalize many documents (parallel if `options.parallel = true`).
///
/// Results come back in input order. A source that cannot be read fails
/// only its own entry.
pub fn normalize_batch(items: Vec<BatchItem>, options: &NormalizeOptions) -> Vec<Result<Document>> {
    if options.parallel {
        items
            .into_par_iter()
            .map(|item| item.normalize(options))
            .collect()
    } else {
        items.into_iter().map(|item| item.normalize(options)).collect()
    }
}
