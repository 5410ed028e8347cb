//! Run manifest.

use super::{Document, DocumentStats, MetadataMap};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Record binding a document ID to its input and output artifacts.
///
/// Describes a run, so it is never part of semantic hashing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Document ID
    pub document_id: String,

    /// SHA-256 hex digest of the input file
    pub input_file_hash: String,

    /// Extraction engine version
    pub parser_version: String,

    /// IR schema version
    pub schema_version: String,

    /// Run configuration
    #[serde(default)]
    pub config_used: MetadataMap,

    /// When the manifest was written
    pub created_at: DateTime<Utc>,

    /// Extraction statistics
    pub stats: DocumentStats,

    /// Output type to relative path
    #[serde(default)]
    pub output_files: BTreeMap<String, String>,
}

impl Manifest {
    /// Describe a normalized document and the files written for it.
    pub fn for_document(
        document: &Document,
        run_config: MetadataMap,
        output_files: BTreeMap<String, String>,
    ) -> Self {
        Self {
            document_id: document.document_id.clone(),
            input_file_hash: document.metadata.source_hash.clone(),
            parser_version: document.parser_version.clone(),
            schema_version: document.schema_version.clone(),
            config_used: run_config,
            created_at: Utc::now(),
            stats: document.stats,
            output_files,
        }
    }

    /// Add an output file entry and return self.
    pub fn with_output(mut self, kind: impl Into<String>, path: impl Into<String>) -> Self {
        self.output_files.insert(kind.into(), path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DocumentMetadata;

    #[test]
    fn test_manifest_for_document() {
        let metadata = DocumentMetadata {
            page_count: 2,
            source_format: "pdf".into(),
            source_path: "in.pdf".into(),
            source_hash: "d663640088750cf1".into(),
            ..Default::default()
        };
        let mut doc = Document::new("doc_d663640088750cf1", "engine-2.1", metadata);
        doc.stats.page_count = 2;

        let manifest = Manifest::for_document(&doc, MetadataMap::new(), BTreeMap::new())
            .with_output("ir", "ir.json");

        assert_eq!(manifest.document_id, "doc_d663640088750cf1");
        assert_eq!(manifest.input_file_hash, "d663640088750cf1");
        assert_eq!(manifest.schema_version, "1.0.0");
        assert_eq!(manifest.stats.page_count, 2);
        assert_eq!(manifest.output_files["ir"], "ir.json");
    }
}
