//! Canonical serialization and semantic hashing.

mod equality;
mod json;

pub use equality::SemanticEqualityChecker;
pub use json::{from_json, sort_keys, to_json, to_profile_string, JsonFormat};

use crate::error::{Result, SemanticMismatch};
use crate::model::Document;
use serde_json::Value;

/// Content-relevant projection of a document.
pub fn canonical_projection(doc: &Document) -> Result<Value> {
    SemanticEqualityChecker::new().canonical_projection(doc)
}

/// Canonical JSON of a document's projection.
pub fn canonical_json(doc: &Document) -> Result<String> {
    SemanticEqualityChecker::new().canonical_json(doc)
}

/// Semantic hash of a document.
pub fn semantic_hash(doc: &Document) -> Result<String> {
    SemanticEqualityChecker::new().semantic_hash(doc)
}

/// First semantic difference between two documents, if any.
pub fn semantic_diff(left: &Document, right: &Document) -> Result<Option<SemanticMismatch>> {
    SemanticEqualityChecker::new().diff(left, right)
}

/// Fail unless two documents are semantically equal.
pub fn assert_semantically_equal(left: &Document, right: &Document) -> Result<()> {
    SemanticEqualityChecker::new().assert_equal(left, right)
}
