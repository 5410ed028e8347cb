//! Document-level types.

use super::{Block, BlockType, MetadataMap};
use crate::stability::StabilityContract;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical IR document.
///
/// Field order here is the field order of the pretty-printed IR artifact.
/// Semantic hashing never depends on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Deterministic document ID derived from the source file hash
    pub document_id: String,

    /// IR schema version
    pub schema_version: String,

    /// Version of the extraction engine that produced the raw elements
    pub parser_version: String,

    /// Document metadata
    pub metadata: DocumentMetadata,

    /// Blocks in canonical order
    #[serde(default)]
    pub blocks: Vec<Block>,

    /// Inter-block relationships
    #[serde(default)]
    pub relationships: Vec<Relationship>,

    /// Extraction statistics
    #[serde(default)]
    pub stats: DocumentStats,

    /// When this IR was produced (not hashed)
    pub processing_timestamp: DateTime<Utc>,

    /// Run configuration snapshot (not hashed)
    #[serde(default)]
    pub config_used: MetadataMap,

    /// Image payloads waiting for an asset writer
    #[serde(skip)]
    pub staged_images: Vec<StagedImage>,
}

impl Document {
    /// Create an empty document stamped with the active schema version.
    pub fn new(
        document_id: impl Into<String>,
        parser_version: impl Into<String>,
        metadata: DocumentMetadata,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            schema_version: StabilityContract::current().schema_version.to_string(),
            parser_version: parser_version.into(),
            metadata,
            blocks: Vec::new(),
            relationships: Vec::new(),
            stats: DocumentStats::default(),
            processing_timestamp: Utc::now(),
            config_used: MetadataMap::new(),
            staged_images: Vec::new(),
        }
    }

    /// Get the number of blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the document has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Find a block by ID.
    pub fn get_block(&self, block_id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.block_id == block_id)
    }

    /// Iterate over blocks of one type.
    pub fn blocks_of_type(&self, block_type: BlockType) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(move |b| b.block_type == block_type)
    }

    /// IDs of the direct children of a block, in relationship order.
    pub fn children_of<'a>(&'a self, block_id: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.relationships
            .iter()
            .filter(move |r| {
                r.relation_type == RelationType::ParentChild && r.source_block_id == block_id
            })
            .map(|r| r.target_block_id.as_str())
    }

    /// Drain the staged image payloads for writing.
    pub fn take_staged_images(&mut self) -> Vec<StagedImage> {
        std::mem::take(&mut self.staged_images)
    }

    /// Record where the asset writer put an image.
    ///
    /// Returns `false` when no block carries that image ID.
    pub fn set_image_path(&mut self, image_id: &str, path: impl Into<String>) -> bool {
        let image = self
            .blocks
            .iter_mut()
            .filter_map(|b| b.image_data.as_mut())
            .find(|img| img.image_id == image_id);

        match image {
            Some(image) => {
                image.extracted_path = Some(path.into());
                true
            }
            None => false,
        }
    }

    /// Get plain text content of all blocks.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.content.as_str())
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Document metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Document title
    #[serde(default)]
    pub title: Option<String>,

    /// Document author
    #[serde(default)]
    pub author: Option<String>,

    /// Creation date
    #[serde(default)]
    pub creation_date: Option<DateTime<Utc>>,

    /// Last modification date
    #[serde(default)]
    pub modification_date: Option<DateTime<Utc>>,

    /// Number of pages
    pub page_count: u32,

    /// Original format (source file extension)
    pub source_format: String,

    /// Path to the source file
    pub source_path: String,

    /// SHA-256 hex digest of the source file
    pub source_hash: String,

    /// Extra metadata supplied by the extractor
    #[serde(flatten)]
    pub extra: MetadataMap,
}

/// Extraction statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStats {
    /// Total number of blocks
    pub block_count: usize,
    /// Number of tables
    pub table_count: usize,
    /// Number of images
    pub image_count: usize,
    /// Number of pages
    pub page_count: u32,
}

/// Kind of edge between two blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    /// Heading to the blocks in its section
    ParentChild,
    /// Caption to the figure or table it describes
    CaptionOf,
    /// Block continued from a previous block
    Continuation,
    /// Cross reference
    Reference,
}

impl RelationType {
    /// Label used in serialized IR.
    pub fn as_str(self) -> &'static str {
        match self {
            RelationType::ParentChild => "parent_child",
            RelationType::CaptionOf => "caption_of",
            RelationType::Continuation => "continuation",
            RelationType::Reference => "reference",
        }
    }
}

impl std::fmt::Display for RelationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directed edge between two blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Source block ID
    pub source_block_id: String,
    /// Target block ID
    pub target_block_id: String,
    /// Edge kind
    pub relation_type: RelationType,
    /// Edge metadata
    #[serde(default)]
    pub metadata: MetadataMap,
}

impl Relationship {
    /// Create a `parent_child` edge.
    pub fn parent_child(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source_block_id: source.into(),
            target_block_id: target.into(),
            relation_type: RelationType::ParentChild,
            metadata: MetadataMap::new(),
        }
    }
}

/// Image bytes detached from the IR, waiting to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedImage {
    /// Image ID the payload belongs to
    pub image_id: String,
    /// Block that references the image
    pub block_id: String,
    /// Image format, if known
    pub format: Option<String>,
    /// Raw image bytes
    pub data: Vec<u8>,
}

impl StagedImage {
    /// Get the payload size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// File name derived from the image ID.
    pub fn suggested_filename(&self) -> String {
        let ext = super::image::extension_for(self.format.as_deref());
        format!("{}.{}", self.image_id, ext)
    }

    /// Path relative to the document output directory.
    pub fn relative_path(&self) -> String {
        format!("assets/images/{}", self.suggested_filename())
    }
}
