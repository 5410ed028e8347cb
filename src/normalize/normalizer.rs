//! Raw elements to canonical IR.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::ordering::OrderingValidator;
use super::relationships::build_relationships;
use super::NormalizeOptions;
use crate::error::Result;
use crate::extract::{RawBlock, RawBoundingBox, RawDocument, RawImage, RawTable};
use crate::hashing::{
    hash_bytes, hash_file, mint_block_id, mint_document_id, mint_image_id, mint_table_id,
};
use crate::model::{
    Block, BlockType, BoundingBox, Document, DocumentMetadata, DocumentStats, ImageData,
    MetadataMap, StagedImage, TableData,
};

/// Raw document metadata keys that the normalizer sets itself.
const RESERVED_METADATA_KEYS: &[&str] = &["page_count", "source_format", "source_path", "source_hash"];

/// Converts the raw elements of one source document into a [`Document`].
///
/// A normalizer is bound to a single source file: its document ID is derived
/// from that file's content hash when the normalizer is created.
#[derive(Debug, Clone)]
pub struct Normalizer {
    source_path: PathBuf,
    source_hash: String,
    document_id: String,
    parser_version: String,
}

impl Normalizer {
    /// Create a normalizer for a source file, hashing its content.
    ///
    /// Fails with [`Error::SourceUnreadable`](crate::Error::SourceUnreadable)
    /// when the file cannot be read.
    pub fn open(source_path: impl AsRef<Path>, parser_version: impl Into<String>) -> Result<Self> {
        let source_path = source_path.as_ref();
        let source_hash = hash_file(source_path)?;
        Ok(Self::with_source_hash(source_path, source_hash, parser_version))
    }

    /// Create a normalizer for source content already in memory.
    pub fn from_bytes(source_path: impl Into<PathBuf>, content: &[u8], parser_version: impl Into<String>) -> Self {
        Self::with_source_hash(source_path, hash_bytes(content), parser_version)
    }

    /// Create a normalizer from a precomputed source hash.
    pub fn with_source_hash(
        source_path: impl Into<PathBuf>,
        source_hash: impl Into<String>,
        parser_version: impl Into<String>,
    ) -> Self {
        let source_hash = source_hash.into();
        let document_id = mint_document_id(&source_hash);
        log::info!("Initialized normalizer for document {}", document_id);

        Self {
            source_path: source_path.into(),
            source_hash,
            document_id,
            parser_version: parser_version.into(),
        }
    }

    /// Document ID of the bound source.
    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// Content hash of the bound source.
    pub fn source_hash(&self) -> &str {
        &self.source_hash
    }

    /// Path of the bound source.
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Normalize raw elements into a canonical document.
    ///
    /// Never fails: unknown labels, missing geometry and ragged tables are
    /// absorbed with a log entry. Image bytes are moved into
    /// [`Document::staged_images`].
    pub fn normalize(&self, raw: RawDocument, options: &NormalizeOptions) -> Document {
        let RawDocument {
            blocks: raw_blocks,
            tables: raw_tables,
            images: raw_images,
            page_count,
            metadata: raw_metadata,
        } = raw;

        let table_count = raw_tables.len();
        let image_count = raw_images.len();

        let mut blocks = self.normalize_blocks(raw_blocks);
        blocks.extend(self.normalize_tables(raw_tables));
        let (image_blocks, staged_images) = self.normalize_images(raw_images);
        blocks.extend(image_blocks);

        // Stable: equal orders keep text, table, image sequence.
        blocks.sort_by_key(|b| b.order);

        OrderingValidator::new().validate_and_annotate(&mut blocks);
        let relationships = build_relationships(&mut blocks);

        let stats = DocumentStats {
            block_count: blocks.len(),
            table_count,
            image_count,
            page_count,
        };

        let parser_version = options
            .parser_version
            .clone()
            .unwrap_or_else(|| self.parser_version.clone());

        let mut document = Document::new(
            self.document_id.clone(),
            parser_version,
            self.document_metadata(page_count, raw_metadata),
        );
        document.blocks = blocks;
        document.relationships = relationships;
        document.stats = stats;
        document.processing_timestamp = options.timestamp();
        document.config_used = options.run_config.clone();
        document.staged_images = staged_images;

        log::info!(
            "Normalized document {}: {} blocks, {} tables, {} images",
            self.document_id,
            stats.block_count,
            table_count,
            image_count
        );

        document
    }

    fn normalize_blocks(&self, raw_blocks: Vec<RawBlock>) -> Vec<Block> {
        let mut unknown: BTreeMap<String, usize> = BTreeMap::new();

        let blocks: Vec<Block> = raw_blocks
            .into_iter()
            .map(|raw| {
                let block_id = mint_block_id(&raw.block_type, raw.page_number, raw.order, &raw.text);
                let block_type = BlockType::from_label(&raw.block_type).unwrap_or_else(|| {
                    *unknown.entry(raw.block_type.clone()).or_default() += 1;
                    BlockType::Paragraph
                });

                let level = metadata_u8(&raw.metadata, "level");
                let list_level = if block_type == BlockType::List {
                    metadata_u8(&raw.metadata, "list_level")
                } else {
                    None
                };

                let mut block = Block::new(block_id, block_type, raw.page_number, raw.text, raw.order);
                block.bbox = raw.bbox.map(normalize_bbox);
                block.metadata = raw.metadata;
                block.formatting_data = raw.formatting;
                block.level = level;
                block.list_level = list_level;
                block
            })
            .collect();

        for (label, count) in &unknown {
            log::warn!(
                "Unknown block type '{}' on {} block(s), defaulting to paragraph",
                label,
                count
            );
        }

        blocks
    }

    fn normalize_tables(&self, raw_tables: Vec<RawTable>) -> Vec<Block> {
        raw_tables
            .into_iter()
            .enumerate()
            .map(|(idx, raw)| {
                let table_id = mint_table_id(&self.document_id, raw.page_number, idx, &raw.raw_text);

                let mut table = TableData::new(table_id.clone(), raw.data, raw.raw_text.clone());
                table.headers = raw.headers;
                table.cell_spans = raw.cell_spans;
                if table.is_ragged() {
                    log::debug!(
                        "Table {} has ragged rows (widest {}); missing cells read as empty",
                        table_id,
                        table.columns
                    );
                }

                let block_id = mint_block_id(BlockType::Table.as_str(), raw.page_number, raw.order, &raw.raw_text);
                let mut block = Block::new(block_id, BlockType::Table, raw.page_number, raw.raw_text, raw.order);
                block.bbox = raw.bbox.map(normalize_bbox);
                block.metadata.insert("table_id".into(), Value::from(table_id));
                block.table_data = Some(table);
                block
            })
            .collect()
    }

    fn normalize_images(&self, raw_images: Vec<RawImage>) -> (Vec<Block>, Vec<StagedImage>) {
        let mut blocks = Vec::with_capacity(raw_images.len());
        let mut staged = Vec::new();

        for (idx, raw) in raw_images.into_iter().enumerate() {
            let image_id = mint_image_id(&self.document_id, raw.page_number, idx, &raw.image_bytes);
            let bbox = raw.bbox.map(normalize_bbox);

            let content = match raw.caption.as_deref() {
                Some(caption) if !caption.is_empty() => caption.to_string(),
                _ => format!("[Image {}]", image_id),
            };
            let block_id = mint_block_id(BlockType::Image.as_str(), raw.page_number, raw.order, &content);

            let mut image = ImageData::new(image_id.clone(), raw.page_number);
            image.bbox = bbox;
            image.caption = raw.caption;
            image.format = raw.format.clone();
            image.width = raw.width;
            image.height = raw.height;

            if !raw.image_bytes.is_empty() {
                staged.push(StagedImage {
                    image_id: image_id.clone(),
                    block_id: block_id.clone(),
                    format: raw.format,
                    data: raw.image_bytes,
                });
            }

            let mut block = Block::new(block_id, BlockType::Image, raw.page_number, content, raw.order);
            block.bbox = bbox;
            block.metadata.insert("image_id".into(), Value::from(image_id));
            block.image_data = Some(image);
            blocks.push(block);
        }

        (blocks, staged)
    }

    fn document_metadata(&self, page_count: u32, mut raw: MetadataMap) -> DocumentMetadata {
        for key in RESERVED_METADATA_KEYS {
            raw.remove(*key);
        }

        DocumentMetadata {
            title: take_string(&mut raw, "title"),
            author: take_string(&mut raw, "author"),
            creation_date: take_datetime(&mut raw, "creation_date"),
            modification_date: take_datetime(&mut raw, "modification_date"),
            page_count,
            source_format: self
                .source_path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or_default()
                .to_string(),
            source_path: self.source_path.display().to_string(),
            source_hash: self.source_hash.clone(),
            extra: raw,
        }
    }
}

fn normalize_bbox(raw: RawBoundingBox) -> BoundingBox {
    BoundingBox {
        x0: raw.x0,
        y0: raw.y0,
        x1: raw.x1,
        y1: raw.y1,
        page_width: raw.page_width,
        page_height: raw.page_height,
    }
}

fn metadata_u8(metadata: &MetadataMap, key: &str) -> Option<u8> {
    metadata
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|v| u8::try_from(v).ok())
}

/// Remove a string entry. Values of another type are kept in string form.
fn take_string(map: &mut MetadataMap, key: &str) -> Option<String> {
    match map.remove(key)? {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => {
            log::warn!("Metadata {} is not a string ({}); stored as text", key, other);
            Some(other.to_string())
        }
    }
}

/// Remove an RFC 3339 timestamp entry.
///
/// Anything else moves to `{key}_raw` so the typed key never reappears in
/// the extra map.
fn take_datetime(map: &mut MetadataMap, key: &str) -> Option<DateTime<Utc>> {
    let value = map.remove(key)?;
    if let Value::String(s) = &value {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(s) {
            return Some(parsed.with_timezone(&Utc));
        }
    }
    if !value.is_null() {
        log::warn!("Metadata {} is not an RFC 3339 timestamp: {}", key, value);
        map.insert(format!("{}_raw", key), value);
    }
    None
}
