//! Block-level types.

use super::{ImageData, TableData};
use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Free-form metadata attached to blocks, documents and chunks.
///
/// A `BTreeMap` keeps iteration and serialization order independent of
/// insertion order.
pub type MetadataMap = BTreeMap<String, serde_json::Value>;

/// Closed set of block types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    /// Section heading
    Heading,
    /// Body text
    Paragraph,
    /// List item or list
    List,
    /// Table
    Table,
    /// Figure or picture
    Image,
    /// Formula
    Equation,
    /// Source code listing
    Code,
    /// Caption of a figure or table
    Caption,
    /// Running page header
    Header,
    /// Running page footer
    Footer,
}

impl BlockType {
    /// Every block type, in declaration order.
    pub const ALL: [BlockType; 10] = [
        BlockType::Heading,
        BlockType::Paragraph,
        BlockType::List,
        BlockType::Table,
        BlockType::Image,
        BlockType::Equation,
        BlockType::Code,
        BlockType::Caption,
        BlockType::Header,
        BlockType::Footer,
    ];

    /// Label used in serialized IR and composite keys.
    pub fn as_str(self) -> &'static str {
        match self {
            BlockType::Heading => "heading",
            BlockType::Paragraph => "paragraph",
            BlockType::List => "list",
            BlockType::Table => "table",
            BlockType::Image => "image",
            BlockType::Equation => "equation",
            BlockType::Code => "code",
            BlockType::Caption => "caption",
            BlockType::Header => "header",
            BlockType::Footer => "footer",
        }
    }

    /// Map a loosely-typed label onto the closed set.
    ///
    /// Only exact lowercase labels match; anything else is `None` and left
    /// to the caller's fallback policy.
    pub fn from_label(label: &str) -> Option<Self> {
        BlockType::ALL.into_iter().find(|t| t.as_str() == label)
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockType::from_label(s).ok_or_else(|| Error::UnknownBlockType(s.to_string()))
    }
}

/// Bounding box of a block on its page.
///
/// Coordinates are kept exactly as extracted; comparisons go through
/// [`StabilityContract::round_coordinate`](crate::StabilityContract::round_coordinate).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left x coordinate
    pub x0: f64,
    /// Top y coordinate
    pub y0: f64,
    /// Right x coordinate
    pub x1: f64,
    /// Bottom y coordinate
    pub y1: f64,
    /// Page width, when known
    #[serde(default)]
    pub page_width: Option<f64>,
    /// Page height, when known
    #[serde(default)]
    pub page_height: Option<f64>,
}

impl BoundingBox {
    /// Create a box without page dimensions.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0,
            y0,
            x1,
            y1,
            page_width: None,
            page_height: None,
        }
    }

    /// Attach page dimensions.
    pub fn with_page_size(mut self, width: f64, height: f64) -> Self {
        self.page_width = Some(width);
        self.page_height = Some(height);
        self
    }

    /// Box width.
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Box height.
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

/// Outcome of comparing canonical and spatial order for one block.
///
/// Advisory only: it never feeds back into [`Block::order`] and is excluded
/// from the semantic hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderingMetadata {
    /// Canonical order assigned by the extraction engine
    pub docling_order: u32,
    /// Position in the geometry-derived reading order
    #[serde(default)]
    pub spatial_order: Option<u32>,
    /// `true` when the two orders disagree
    #[serde(default)]
    pub order_discrepancy: Option<bool>,
}

/// Font properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontProperties {
    /// Font family name
    pub name: Option<String>,
    /// Font size in points
    pub size: Option<f64>,
    /// Font weight (100-900)
    pub weight: Option<u16>,
    /// Font color as hex (#RRGGBB)
    pub color: Option<String>,
}

/// Text style flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Bold text
    pub bold: Option<bool>,
    /// Italic text
    pub italic: Option<bool>,
    /// Underlined text
    pub underline: Option<bool>,
}

/// Presentational data for a block. Excluded from the semantic hash.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormattingData {
    /// Font properties
    #[serde(default)]
    pub font: Option<FontProperties>,
    /// Text style
    #[serde(default)]
    pub style: Option<TextStyle>,
    /// URLs linked from the block
    #[serde(default)]
    pub links: Vec<String>,
}

/// A canonical block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Deterministic block ID
    pub block_id: String,

    /// Block type
    #[serde(rename = "type")]
    pub block_type: BlockType,

    /// ID of the enclosing heading, if any
    #[serde(default)]
    pub parent_id: Option<String>,

    /// Page number (1-indexed)
    pub page_number: u32,

    /// Bounding box on the page
    #[serde(default)]
    pub bbox: Option<BoundingBox>,

    /// Text content
    pub content: String,

    /// Additional block metadata
    #[serde(default)]
    pub metadata: MetadataMap,

    /// Presentational data (not hashed)
    #[serde(default)]
    pub formatting_data: Option<FormattingData>,

    /// Ordering validation result (not hashed)
    #[serde(default)]
    pub ordering_metadata: Option<OrderingMetadata>,

    /// Populated for table blocks
    #[serde(default)]
    pub table_data: Option<TableData>,

    /// Populated for image blocks
    #[serde(default)]
    pub image_data: Option<ImageData>,

    /// Heading level (1 = top)
    #[serde(default)]
    pub level: Option<u8>,

    /// Nesting level for list blocks
    #[serde(default)]
    pub list_level: Option<u8>,

    /// Canonical order assigned by the extraction engine
    pub order: u32,
}

impl Block {
    /// Create a block with no optional data.
    pub fn new(
        block_id: impl Into<String>,
        block_type: BlockType,
        page_number: u32,
        content: impl Into<String>,
        order: u32,
    ) -> Self {
        Self {
            block_id: block_id.into(),
            block_type,
            parent_id: None,
            page_number,
            bbox: None,
            content: content.into(),
            metadata: MetadataMap::new(),
            formatting_data: None,
            ordering_metadata: None,
            table_data: None,
            image_data: None,
            level: None,
            list_level: None,
            order,
        }
    }

    /// Set the bounding box and return self.
    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    /// Set the heading level and return self.
    pub fn with_level(mut self, level: u8) -> Self {
        self.level = Some(level);
        self
    }

    /// Check if this block opens a section.
    ///
    /// Headings without a level (or with level 0) do not open sections.
    pub fn is_section_heading(&self) -> bool {
        self.block_type == BlockType::Heading && self.heading_level().is_some()
    }

    /// Heading level, if this is a heading with a non-zero level.
    pub fn heading_level(&self) -> Option<u8> {
        match (self.block_type, self.level) {
            (BlockType::Heading, Some(level)) if level > 0 => Some(level),
            _ => None,
        }
    }

    /// Check if the block carries geometry.
    pub fn has_bbox(&self) -> bool {
        self.bbox.is_some()
    }
}
