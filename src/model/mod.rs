//! Canonical IR model types.
//!
//! This module defines the document representation produced by the
//! normalizer. Every identifier in it is derived deterministically from
//! content, so two runs over the same input yield the same records.

mod block;
mod chunk;
mod document;
mod image;
mod manifest;
mod table;

pub use block::{
    Block, BlockType, BoundingBox, FontProperties, FormattingData, MetadataMap, OrderingMetadata,
    TextStyle,
};
pub use chunk::Chunk;
pub use document::{
    Document, DocumentMetadata, DocumentStats, RelationType, Relationship, StagedImage,
};
pub use image::ImageData;
pub use manifest::Manifest;
pub use table::{CellSpan, TableData};
