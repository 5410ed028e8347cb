//! Raw elements as produced by an extraction engine, before normalization.
//!
//! These types are deliberately lenient: labels are free-form strings,
//! geometry and metadata are optional, and table rows may be ragged.

use serde::{Deserialize, Serialize};

use crate::model::{CellSpan, FormattingData, MetadataMap};

/// Bounding box as reported by the extractor. Missing edges read as `0.0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBoundingBox {
    /// Left x coordinate
    #[serde(default)]
    pub x0: f64,
    /// Top y coordinate
    #[serde(default)]
    pub y0: f64,
    /// Right x coordinate
    #[serde(default)]
    pub x1: f64,
    /// Bottom y coordinate
    #[serde(default)]
    pub y1: f64,
    /// Page width
    #[serde(default)]
    pub page_width: Option<f64>,
    /// Page height
    #[serde(default)]
    pub page_height: Option<f64>,
}

impl RawBoundingBox {
    /// Create a box from its four edges.
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
}

/// Raw text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBlock {
    /// Text content
    pub text: String,

    /// Loosely-typed kind label
    #[serde(alias = "kind_label")]
    pub block_type: String,

    /// Page number (1-indexed)
    pub page_number: u32,

    /// Bounding box, if known
    #[serde(default)]
    pub bbox: Option<RawBoundingBox>,

    /// Canonical order assigned by the extractor
    pub order: u32,

    /// Free-form metadata (`level`, `list_level`, `label`, ...)
    #[serde(default)]
    pub metadata: MetadataMap,

    /// Presentational data
    #[serde(default)]
    pub formatting: Option<FormattingData>,
}

impl RawBlock {
    /// Create a raw text element.
    pub fn new(text: impl Into<String>, block_type: impl Into<String>, page_number: u32, order: u32) -> Self {
        Self {
            text: text.into(),
            block_type: block_type.into(),
            page_number,
            bbox: None,
            order,
            metadata: MetadataMap::new(),
            formatting: None,
        }
    }

    /// Set the bounding box and return self.
    pub fn with_bbox(mut self, bbox: RawBoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    /// Add a metadata entry and return self.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Set formatting data and return self.
    pub fn with_formatting(mut self, formatting: FormattingData) -> Self {
        self.formatting = Some(formatting);
        self
    }
}

/// Raw table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    /// Page number (1-indexed)
    pub page_number: u32,

    /// Bounding box, if known
    #[serde(default)]
    pub bbox: Option<RawBoundingBox>,

    /// Rows of cell text; rows may differ in length
    #[serde(default, alias = "rows")]
    pub data: Vec<Vec<String>>,

    /// Column headers
    #[serde(default)]
    pub headers: Option<Vec<String>>,

    /// Plain-text fallback
    #[serde(default)]
    pub raw_text: String,

    /// Canonical order assigned by the extractor
    pub order: u32,

    /// Cell spanning metadata
    #[serde(default)]
    pub cell_spans: Option<Vec<CellSpan>>,
}

impl RawTable {
    /// Create a raw table.
    pub fn new(page_number: u32, data: Vec<Vec<String>>, raw_text: impl Into<String>, order: u32) -> Self {
        Self {
            page_number,
            bbox: None,
            data,
            headers: None,
            raw_text: raw_text.into(),
            order,
            cell_spans: None,
        }
    }

    /// Set the bounding box and return self.
    pub fn with_bbox(mut self, bbox: RawBoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    /// Set headers and return self.
    pub fn with_headers(mut self, headers: Vec<String>) -> Self {
        self.headers = Some(headers);
        self
    }
}

/// Raw image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawImage {
    /// Page number (1-indexed)
    pub page_number: u32,

    /// Bounding box, if known
    #[serde(default)]
    pub bbox: Option<RawBoundingBox>,

    /// Encoded image bytes
    #[serde(default)]
    pub image_bytes: Vec<u8>,

    /// Image format (png, jpg, ...)
    #[serde(default)]
    pub format: Option<String>,

    /// Width in pixels
    #[serde(default)]
    pub width: Option<u32>,

    /// Height in pixels
    #[serde(default)]
    pub height: Option<u32>,

    /// Canonical order assigned by the extractor
    pub order: u32,

    /// Associated caption
    #[serde(default)]
    pub caption: Option<String>,
}

impl RawImage {
    /// Create a raw image.
    pub fn new(page_number: u32, image_bytes: Vec<u8>, format: impl Into<String>, order: u32) -> Self {
        Self {
            page_number,
            bbox: None,
            image_bytes,
            format: Some(format.into()),
            width: None,
            height: None,
            order,
            caption: None,
        }
    }

    /// Set the caption and return self.
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Set the bounding box and return self.
    pub fn with_bbox(mut self, bbox: RawBoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }
}

/// Everything an extractor produced for one source document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    /// Text elements
    #[serde(default)]
    pub blocks: Vec<RawBlock>,

    /// Tables
    #[serde(default)]
    pub tables: Vec<RawTable>,

    /// Images
    #[serde(default)]
    pub images: Vec<RawImage>,

    /// Number of pages
    #[serde(default)]
    pub page_count: u32,

    /// Document-level metadata (`title`, `author`, ...)
    #[serde(default)]
    pub metadata: MetadataMap,
}

impl RawDocument {
    /// Create an empty raw document.
    pub fn new(page_count: u32) -> Self {
        Self {
            page_count,
            ..Default::default()
        }
    }

    /// Total number of raw elements.
    pub fn element_count(&self) -> usize {
        self.blocks.len() + self.tables.len() + self.images.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_block_accepts_kind_label() {
        let json = r#"{"text":"Hi","kind_label":"heading","page_number":1,"order":0,"metadata":{"level":1}}"#;
        let block: RawBlock = serde_json::from_str(json).unwrap();
        assert_eq!(block.block_type, "heading");
        assert_eq!(block.metadata["level"], 1);
        assert!(block.bbox.is_none());
    }

    #[test]
    fn test_raw_bbox_missing_edges_default() {
        let bbox: RawBoundingBox = serde_json::from_str(r#"{"x0":3.5,"y1":9}"#).unwrap();
        assert_eq!(bbox, RawBoundingBox::new(3.5, 0.0, 0.0, 9.0));
    }

    #[test]
    fn test_raw_table_accepts_rows_alias() {
        let json = r#"{"page_number":2,"rows":[["a","b"],["c"]],"raw_text":"a b c","order":4}"#;
        let table: RawTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.data.len(), 2);
        assert_eq!(table.data[1].len(), 1);
    }

    #[test]
    fn test_raw_document_defaults() {
        let doc: RawDocument = serde_json::from_str(r#"{"page_count":3}"#).unwrap();
        assert_eq!(doc.page_count, 3);
        assert_eq!(doc.element_count(), 0);
    }
}
