//! Extraction boundary providing a plugin architecture for extraction engines.
//!
//! The normalizer never talks to an extraction engine directly. It consumes
//! a [`RawDocument`], and anything that can produce one implements
//! [`Extractor`]. Extractors are registered by file extension and dispatched
//! through an [`ExtractorRegistry`].
//!
//! # Example
//!
//! ```no_run
//! use layoutir::extract::ExtractorRegistry;
//! use std::path::Path;
//!
//! fn main() -> layoutir::Result<()> {
//!     let registry = ExtractorRegistry::with_defaults();
//!     let raw = registry.extract(Path::new("elements.json"))?;
//!     println!("{} raw elements", raw.element_count());
//!     Ok(())
//! }
//! ```

mod raw;

pub use raw::{RawBlock, RawBoundingBox, RawDocument, RawImage, RawTable};

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Trait for extraction engines.
///
/// Implement this trait to feed a new engine's output into the normalizer.
pub trait Extractor: Send + Sync {
    /// Get the supported file extensions for this extractor.
    ///
    /// Extensions should be lowercase without the leading dot (e.g., `["pdf"]`).
    fn supported_extensions(&self) -> &[&str];

    /// Get the name of this extractor.
    fn name(&self) -> &str;

    /// Version string recorded as the document's `parser_version`.
    fn parser_version(&self) -> &str;

    /// Extract raw elements from a file.
    fn extract(&self, path: &Path) -> Result<RawDocument>;

    /// Extract raw elements from bytes.
    fn extract_bytes(&self, bytes: &[u8]) -> Result<RawDocument>;

    /// Check if this extractor supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Reads a [`RawDocument`] that was serialized to JSON.
///
/// Lets an engine running out of process hand its output over as a file.
#[derive(Debug, Clone, Default)]
pub struct RawJsonExtractor {
    _private: (),
}

impl RawJsonExtractor {
    /// Create a new raw JSON extractor.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl Extractor for RawJsonExtractor {
    fn supported_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn name(&self) -> &str {
        "raw-json"
    }

    fn parser_version(&self) -> &str {
        concat!("layoutir-raw-json/", env!("CARGO_PKG_VERSION"))
    }

    fn extract(&self, path: &Path) -> Result<RawDocument> {
        let bytes = std::fs::read(path).map_err(|e| Error::source_unreadable(path, e))?;
        self.extract_bytes(&bytes)
            .map_err(|e| Error::Extraction(format!("{}: {}", path.display(), e)))
    }

    fn extract_bytes(&self, bytes: &[u8]) -> Result<RawDocument> {
        let raw: RawDocument = serde_json::from_slice(bytes)?;
        log::debug!(
            "Read {} blocks, {} tables, {} images",
            raw.blocks.len(),
            raw.tables.len(),
            raw.images.len()
        );
        Ok(raw)
    }
}

/// Registry for extractors.
///
/// The registry maps file extensions to extractors.
pub struct ExtractorRegistry {
    extractors: HashMap<String, Arc<dyn Extractor>>,
    by_name: HashMap<String, Arc<dyn Extractor>>,
}

impl ExtractorRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            extractors: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the built-in extractors.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(RawJsonExtractor::new()));
        registry
    }

    /// Register an extractor for all its supported extensions.
    ///
    /// A later registration for the same extension replaces the earlier one.
    pub fn register(&mut self, extractor: Arc<dyn Extractor>) {
        for ext in extractor.supported_extensions() {
            self.extractors.insert(ext.to_lowercase(), extractor.clone());
        }
        self.by_name.insert(extractor.name().to_lowercase(), extractor);
    }

    /// Get an extractor by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn Extractor>> {
        self.extractors.get(&ext.to_lowercase()).cloned()
    }

    /// Get an extractor by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn Extractor>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.extractors.contains_key(&ext.to_lowercase())
    }

    /// Get all supported extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.extractors.keys().map(|s| s.as_str()).collect();
        exts.sort_unstable();
        exts
    }

    /// Find the extractor responsible for a path.
    pub fn for_path(&self, path: &Path) -> Result<Arc<dyn Extractor>> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| Error::UnsupportedFormat(format!("{} has no extension", path.display())))?;

        self.get_by_extension(ext)
            .ok_or_else(|| Error::UnsupportedFormat(ext.to_string()))
    }

    /// Extract a file using the appropriate extractor.
    pub fn extract(&self, path: &Path) -> Result<RawDocument> {
        self.for_path(path)?.extract(path)
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
