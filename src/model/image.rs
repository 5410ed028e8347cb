//! Image types.

use super::BoundingBox;
use serde::{Deserialize, Serialize};

/// Image metadata attached to an IMAGE block.
///
/// The binary payload is not part of this record; it travels separately as a
/// [`StagedImage`](super::StagedImage) until an asset writer persists it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    /// Deterministic image ID
    pub image_id: String,

    /// Page number where the image appears
    pub page_number: u32,

    /// Bounding box on the page
    #[serde(default)]
    pub bbox: Option<BoundingBox>,

    /// Relative path of the written image file, set by the asset writer
    #[serde(default)]
    pub extracted_path: Option<String>,

    /// Associated caption
    #[serde(default)]
    pub caption: Option<String>,

    /// Image format (png, jpg, ...)
    #[serde(default)]
    pub format: Option<String>,

    /// Width in pixels
    #[serde(default)]
    pub width: Option<u32>,

    /// Height in pixels
    #[serde(default)]
    pub height: Option<u32>,
}

impl ImageData {
    /// Create image metadata with no optional fields.
    pub fn new(image_id: impl Into<String>, page_number: u32) -> Self {
        Self {
            image_id: image_id.into(),
            page_number,
            bbox: None,
            extracted_path: None,
            caption: None,
            format: None,
            width: None,
            height: None,
        }
    }

    /// Set pixel dimensions.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// File extension for the image format, defaulting to `png`.
    pub fn extension(&self) -> &str {
        extension_for(self.format.as_deref())
    }
}

pub(crate) fn extension_for(format: Option<&str>) -> &str {
    match format {
        Some("jpeg") | Some("jpg") => "jpg",
        Some(format) if !format.is_empty() => format,
        _ => "png",
    }
}
