//! Chunk records.

use super::{Block, MetadataMap};
use crate::hashing::mint_chunk_id;
use serde::{Deserialize, Serialize};

/// Segment of a document handed to downstream consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Deterministic chunk ID
    pub chunk_id: String,

    /// Parent document ID
    pub document_id: String,

    /// Blocks included in this chunk, in block order
    pub block_ids: Vec<String>,

    /// Concatenated block content
    pub content: String,

    /// Chunk metadata (`page_range`, `block_count`, `char_count`, ...)
    #[serde(default)]
    pub metadata: MetadataMap,

    /// Position in the chunk sequence
    pub order: u32,
}

impl Chunk {
    /// Build a chunk over a run of blocks.
    ///
    /// The ID depends only on the document, the set of block IDs and `order`,
    /// not on the sequence the blocks are passed in.
    pub fn from_blocks(document_id: &str, blocks: &[&Block], order: u32) -> Self {
        let block_ids: Vec<String> = blocks.iter().map(|b| b.block_id.clone()).collect();
        let content = blocks
            .iter()
            .map(|b| b.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let page_range = match (
            blocks.iter().map(|b| b.page_number).min(),
            blocks.iter().map(|b| b.page_number).max(),
        ) {
            (Some(first), Some(last)) => format!("{}-{}", first, last),
            _ => "0".to_string(),
        };

        let mut metadata = MetadataMap::new();
        metadata.insert("page_range".into(), page_range.into());
        metadata.insert("block_count".into(), blocks.len().into());
        metadata.insert("char_count".into(), content.chars().count().into());

        Self {
            chunk_id: mint_chunk_id(document_id, &block_ids, order),
            document_id: document_id.to_string(),
            block_ids,
            content,
            metadata,
            order,
        }
    }

    /// Attach an extra metadata entry and return self.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
