//! Semantic equality and hashing via canonical JSON.
//!
//! A document is reduced to its content-relevant projection before it is
//! serialized: run-specific fields, presentational block data and volatile
//! metadata keys are dropped, blocks are ordered by `order` and
//! relationships by `(source_block_id, target_block_id)`. Two documents are
//! semantically equal exactly when their projections serialize to the same
//! canonical string.

use serde_json::Value;

use super::json::to_profile_string;
use crate::error::{Result, SemanticMismatch};
use crate::model::Document;
use crate::stability::{JsonProfile, StabilityContract};

/// Shown in a diff for the side that ran out of lines.
const MISSING_LINE: &str = "(missing)";

/// Projects documents to canonical form and compares or hashes them.
#[derive(Debug, Clone, Copy)]
pub struct SemanticEqualityChecker {
    contract: &'static StabilityContract,
}

impl SemanticEqualityChecker {
    /// Document fields that describe a run, not content.
    pub const DOCUMENT_EXCLUDE_FIELDS: &'static [&'static str] =
        &["processing_timestamp", "config_used"];

    /// Block fields that are presentational or advisory.
    pub const BLOCK_EXCLUDE_FIELDS: &'static [&'static str] =
        &["formatting_data", "ordering_metadata"];

    /// Volatile keys removed from document and block metadata.
    pub const METADATA_EXCLUDE_KEYS: &'static [&'static str] = &["processing_time", "image_bytes"];

    /// Create a checker bound to the current contract.
    pub fn new() -> Self {
        Self {
            contract: StabilityContract::current(),
        }
    }

    /// Content-relevant projection of a document.
    pub fn canonical_projection(&self, doc: &Document) -> Result<Value> {
        let mut value = serde_json::to_value(doc)?;

        if let Value::Object(fields) = &mut value {
            for field in Self::DOCUMENT_EXCLUDE_FIELDS {
                fields.remove(*field);
            }

            if let Some(Value::Object(metadata)) = fields.get_mut("metadata") {
                for key in Self::METADATA_EXCLUDE_KEYS {
                    metadata.remove(*key);
                }
            }

            if let Some(Value::Array(blocks)) = fields.get_mut("blocks") {
                for block in blocks.iter_mut() {
                    clean_block(block);
                }
                blocks.sort_by_key(|b| b.get("order").and_then(Value::as_u64).unwrap_or(0));
            }

            if let Some(Value::Array(relationships)) = fields.get_mut("relationships") {
                relationships.sort_by(|a, b| relationship_key(a).cmp(&relationship_key(b)));
            }
        }

        Ok(value)
    }

    /// Canonical JSON string of a document's projection.
    pub fn canonical_json(&self, doc: &Document) -> Result<String> {
        let projection = self.canonical_projection(doc)?;
        to_profile_string(&projection, &self.contract.canonical_json)
    }

    /// Hex digest of the canonical JSON.
    pub fn semantic_hash(&self, doc: &Document) -> Result<String> {
        let canonical = self.canonical_json(doc)?;
        Ok(self
            .contract
            .semantic_hash_algorithm
            .digest_hex(canonical.as_bytes()))
    }

    /// First difference between two documents, or `None` when they are
    /// semantically equal.
    ///
    /// Equality is decided on the canonical strings. The reported line comes
    /// from the indented display rendering of both projections.
    pub fn diff(&self, left: &Document, right: &Document) -> Result<Option<SemanticMismatch>> {
        let left_projection = self.canonical_projection(left)?;
        let right_projection = self.canonical_projection(right)?;

        let left_canonical = to_profile_string(&left_projection, &self.contract.canonical_json)?;
        let right_canonical = to_profile_string(&right_projection, &self.contract.canonical_json)?;
        if left_canonical == right_canonical {
            return Ok(None);
        }

        let left_display = to_profile_string(&left_projection, &JsonProfile::DISPLAY)?;
        let right_display = to_profile_string(&right_projection, &JsonProfile::DISPLAY)?;
        Ok(Some(
            first_difference(&left_display, &right_display)
                .unwrap_or_else(|| SemanticMismatch {
                    line: 1,
                    left: left_canonical,
                    right: right_canonical,
                }),
        ))
    }

    /// Fail with [`Error::SemanticMismatch`](crate::Error::SemanticMismatch)
    /// unless both documents are semantically equal.
    pub fn assert_equal(&self, left: &Document, right: &Document) -> Result<()> {
        match self.diff(left, right)? {
            Some(mismatch) => Err(mismatch.into()),
            None => Ok(()),
        }
    }
}

impl Default for SemanticEqualityChecker {
    fn default() -> Self {
        Self::new()
    }
}

fn clean_block(block: &mut Value) {
    if let Value::Object(fields) = block {
        for field in SemanticEqualityChecker::BLOCK_EXCLUDE_FIELDS {
            fields.remove(*field);
        }
        if let Some(Value::Object(metadata)) = fields.get_mut("metadata") {
            for key in SemanticEqualityChecker::METADATA_EXCLUDE_KEYS {
                metadata.remove(*key);
            }
        }
    }
}

fn relationship_key(rel: &Value) -> (&str, &str) {
    let field = |name: &str| rel.get(name).and_then(Value::as_str).unwrap_or("");
    (field("source_block_id"), field("target_block_id"))
}

fn first_difference(left: &str, right: &str) -> Option<SemanticMismatch> {
    let left_lines: Vec<&str> = left.lines().collect();
    let right_lines: Vec<&str> = right.lines().collect();

    let shared = left_lines.len().min(right_lines.len());
    if let Some(idx) = (0..shared).find(|&i| left_lines[i] != right_lines[i]) {
        return Some(SemanticMismatch {
            line: idx + 1,
            left: left_lines[idx].to_string(),
            right: right_lines[idx].to_string(),
        });
    }

    if left_lines.len() == right_lines.len() {
        return None;
    }
    let line_at = |lines: &[&str]| {
        lines
            .get(shared)
            .map(|l| l.to_string())
            .unwrap_or_else(|| MISSING_LINE.to_string())
    };
    Some(SemanticMismatch {
        line: shared + 1,
        left: line_at(&left_lines),
        right: line_at(&right_lines),
    })
}
