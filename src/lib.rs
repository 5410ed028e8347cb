//! # layoutir
//!
//! Deterministic canonical intermediate representation for extracted
//! document layouts.
//!
//! An extraction engine turns a source document into raw elements (text
//! blocks, tables, images). This library normalizes those elements into a
//! canonical [`Document`] whose identifiers, ordering and serialization are
//! reproducible: the same source file and the same raw elements always give
//! the same block IDs and the same semantic hash, independent of when or
//! where the run happened.
//!
//! ## Quick Start
//!
//! ```no_run
//! use layoutir::{normalize_file, semantic_hash, NormalizeOptions, RawJsonExtractor};
//!
//! fn main() -> layoutir::Result<()> {
//!     let extractor = RawJsonExtractor::new();
//!     let doc = normalize_file("elements.json", &extractor, &NormalizeOptions::default())?;
//!
//!     println!("{} blocks", doc.block_count());
//!     println!("semantic hash: {}", semantic_hash(&doc)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Stable identifiers**: content-derived IDs for documents, blocks,
//!   tables, images and chunks
//! - **Canonical JSON**: sorted keys, fixed separators, byte-reproducible
//! - **Semantic equality**: hash and diff that ignore run-specific fields
//! - **Ordering validation**: spatial reading order checked, never imposed
//! - **Heading hierarchy**: parent/child relationships from heading levels
//! - **Parallel batches**: independent documents normalized with Rayon

pub mod canonical;
pub mod error;
pub mod extract;
pub mod hashing;
pub mod model;
pub mod normalize;
pub mod stability;

// Re-export commonly used types
pub use canonical::{
    assert_semantically_equal, canonical_json, canonical_projection, from_json, semantic_diff,
    semantic_hash, to_json, JsonFormat, SemanticEqualityChecker,
};
pub use error::{Error, Result, SemanticMismatch};
pub use extract::{
    Extractor, ExtractorRegistry, RawBlock, RawBoundingBox, RawDocument, RawImage, RawJsonExtractor,
    RawTable,
};
pub use hashing::{
    hash_bytes, hash_dict, hash_file, hash_string, mint_block_id, mint_chunk_id, mint_document_id,
    mint_image_id, mint_table_id,
};
pub use model::{
    Block, BlockType, BoundingBox, CellSpan, Chunk, Document, DocumentMetadata, DocumentStats,
    FontProperties, FormattingData, ImageData, Manifest, MetadataMap, OrderingMetadata,
    RelationType, Relationship, StagedImage, TableData, TextStyle,
};
pub use normalize::{
    build_relationships, normalize_batch, BatchItem, NormalizeOptions, Normalizer, OrderingReport,
    OrderingValidator,
};
pub use stability::{HashAlgorithm, IdPrefixes, JsonProfile, StabilityContract};

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Extract and normalize one source file.
///
/// The extractor reads `path`; the same file is hashed for the document ID.
/// `options.parser_version` overrides the extractor's own version string.
///
/// # Example
///
/// ```no_run
/// use layoutir::{normalize_file, NormalizeOptions, RawJsonExtractor};
///
/// let options = NormalizeOptions::new().with_config_value("ocr", false);
/// let doc = normalize_file("elements.json", &RawJsonExtractor::new(), &options).unwrap();
/// println!("{}", doc.document_id);
/// ```
pub fn normalize_file<P: AsRef<Path>>(
    path: P,
    extractor: &dyn Extractor,
    options: &NormalizeOptions,
) -> Result<Document> {
    let path = path.as_ref();
    let normalizer = Normalizer::open(path, extractor.parser_version())?;
    let raw = extractor.extract(path)?;
    Ok(normalizer.normalize(raw, options))
}

/// Normalize raw elements that were extracted from `source_path` elsewhere.
///
/// `parser_version` is used unless `options.parser_version` is set.
pub fn normalize_raw<P: AsRef<Path>>(
    source_path: P,
    raw: RawDocument,
    parser_version: &str,
    options: &NormalizeOptions,
) -> Result<Document> {
    let normalizer = Normalizer::open(source_path, parser_version)?;
    Ok(normalizer.normalize(raw, options))
}

/// Builder for normalizing documents through an extractor registry.
///
/// # Example
///
/// ```no_run
/// use layoutir::LayoutIr;
///
/// let doc = LayoutIr::new()
///     .with_parser_version("engine-2.1")
///     .with_config_value("ocr", true)
///     .normalize("elements.json")?;
/// # Ok::<(), layoutir::Error>(())
/// ```
pub struct LayoutIr {
    registry: ExtractorRegistry,
    options: NormalizeOptions,
}

impl LayoutIr {
    /// Create a builder with the built-in extractors.
    pub fn new() -> Self {
        Self {
            registry: ExtractorRegistry::with_defaults(),
            options: NormalizeOptions::default(),
        }
    }

    /// Register an additional extractor.
    pub fn with_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.registry.register(extractor);
        self
    }

    /// Replace the normalization options.
    pub fn with_options(mut self, options: NormalizeOptions) -> Self {
        self.options = options;
        self
    }

    /// Override the recorded parser version.
    pub fn with_parser_version(mut self, version: impl Into<String>) -> Self {
        self.options = self.options.with_parser_version(version);
        self
    }

    /// Record one run configuration entry.
    pub fn with_config_value(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.options = self.options.with_config_value(key, value);
        self
    }

    /// Pin the processing timestamp.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.options = self.options.with_timestamp(timestamp);
        self
    }

    /// Disable parallel batch processing.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Current normalization options.
    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Extract and normalize a file, choosing the extractor by extension.
    pub fn normalize<P: AsRef<Path>>(&self, path: P) -> Result<Document> {
        let path = path.as_ref();
        let extractor = self.registry.for_path(path)?;
        normalize_file(path, extractor.as_ref(), &self.options)
    }

    /// Normalize already extracted elements of `source_path`.
    pub fn normalize_raw<P: AsRef<Path>>(&self, source_path: P, raw: RawDocument) -> Result<Document> {
        let parser_version = self
            .options
            .parser_version
            .clone()
            .unwrap_or_else(|| format!("layoutir/{}", env!("CARGO_PKG_VERSION")));
        normalize_raw(source_path, raw, &parser_version, &self.options)
    }
}

impl Default for LayoutIr {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;

    fn write_raw(dir: &tempfile::TempDir, name: &str, raw: &RawDocument) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(serde_json::to_string(raw).unwrap().as_bytes())
            .unwrap();
        path
    }

    fn sample_raw() -> RawDocument {
        let mut raw = RawDocument::new(1);
        raw.blocks.push(RawBlock::new("Intro", "heading", 1, 0).with_metadata("level", 1));
        raw.blocks.push(RawBlock::new("Body text", "paragraph", 1, 1));
        raw
    }

    #[test]
    fn test_normalize_file_with_raw_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_raw(&dir, "elements.json", &sample_raw());

        let doc = normalize_file(&path, &RawJsonExtractor::new(), &NormalizeOptions::default()).unwrap();
        assert_eq!(doc.block_count(), 2);
        assert_eq!(doc.relationships.len(), 1);
        assert_eq!(doc.parser_version, RawJsonExtractor::new().parser_version());
        assert!(doc.document_id.starts_with("doc_"));
    }

    #[test]
    fn test_normalize_file_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let result = normalize_file(
            dir.path().join("absent.json"),
            &RawJsonExtractor::new(),
            &NormalizeOptions::default(),
        );
        assert!(matches!(result, Err(Error::SourceUnreadable { .. })));
    }

    #[test]
    fn test_builder_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.tiff");
        std::fs::write(&path, b"II*\0").unwrap();
        let result = LayoutIr::new().normalize(&path);
        assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn test_builder_options() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let builder = LayoutIr::new()
            .with_parser_version("engine-3")
            .with_config_value("dpi", 300)
            .with_timestamp(ts)
            .sequential();

        assert_eq!(builder.options().parser_version.as_deref(), Some("engine-3"));
        assert_eq!(builder.options().run_config["dpi"], 300);
        assert!(!builder.options().parallel);
    }

    #[test]
    fn test_builder_runs_are_semantically_equal() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_raw(&dir, "elements.json", &sample_raw());

        let first = LayoutIr::new().with_config_value("run", 1).normalize(&path).unwrap();
        let second = LayoutIr::new().with_config_value("run", 2).normalize(&path).unwrap();

        assert_ne!(first.config_used, second.config_used);
        assert_eq!(semantic_hash(&first).unwrap(), semantic_hash(&second).unwrap());
        assert!(assert_semantically_equal(&first, &second).is_ok());
    }

    #[test]
    fn test_builder_normalize_raw_uses_default_version() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.pdf");
        std::fs::write(&source, b"%PDF-1.4 test").unwrap();

        let doc = LayoutIr::new().normalize_raw(&source, sample_raw()).unwrap();
        assert_eq!(doc.document_id, "doc_d663640088750cf1");
        assert!(doc.parser_version.starts_with("layoutir/"));
    }
}
