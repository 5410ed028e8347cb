//! The stability contract: frozen constants behind every identifier and hash.
//!
//! Every value that influences a block, table, image, chunk or document ID,
//! the spatial ordering annotation, or the semantic hash lives in
//! [`StabilityContract`]. Other modules read these values through
//! [`StabilityContract::current`] and never restate them.
//!
//! # Change protocol
//!
//! Changing any field invalidates previously issued IDs or hashes. A change
//! must:
//!
//! 1. introduce a new contract constant with a bumped `schema_version`;
//! 2. point [`StabilityContract::current`] at it;
//! 3. regenerate the golden values in `tests/determinism.rs`;
//! 4. record old value, new value and whether stored vectors need
//!    re-indexing in the changelog.
//!
//! Existing entries of `block_type_priority` are never renumbered; new
//! block types are appended.

use std::io::{self, Read};

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::model::BlockType;

/// Read buffer size used when hashing streams.
const STREAM_CHUNK_SIZE: usize = 8192;

/// Priority assigned to a block type missing from the priority table.
const UNLISTED_TYPE_PRIORITY: u8 = 99;

static CURRENT: StabilityContract = StabilityContract::V1;

/// Cryptographic hash used for IDs and semantic hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SHA-256
    Sha256,
}

impl HashAlgorithm {
    /// Algorithm name as recorded in manifests.
    pub fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
        }
    }

    /// Hash a byte slice and return the lowercase hex digest.
    pub fn digest_hex(self, data: &[u8]) -> String {
        match self {
            HashAlgorithm::Sha256 => hex::encode(Sha256::digest(data)),
        }
    }

    /// Hash everything a reader yields, reading sequentially in fixed chunks.
    pub fn digest_reader<R: Read>(self, mut reader: R) -> io::Result<String> {
        match self {
            HashAlgorithm::Sha256 => {
                let mut hasher = Sha256::new();
                let mut buf = [0u8; STREAM_CHUNK_SIZE];
                loop {
                    let n = reader.read(&mut buf)?;
                    if n == 0 {
                        break;
                    }
                    hasher.update(&buf[..n]);
                }
                Ok(hex::encode(hasher.finalize()))
            }
        }
    }
}

/// A named JSON serialization profile.
///
/// Profiles are fixed data: callers select one, they never pass formatting
/// options ad hoc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JsonProfile {
    /// Profile name
    pub name: &'static str,
    /// Sort object keys lexicographically
    pub sort_keys: bool,
    /// Separator written between array items and object members
    pub item_separator: &'static str,
    /// Separator written between an object key and its value
    pub key_separator: &'static str,
    /// Escape every character outside printable ASCII as `\uXXXX`
    pub ensure_ascii: bool,
    /// Indentation width; `None` produces single-line output
    pub indent: Option<usize>,
}

impl JsonProfile {
    /// Input of the semantic hash: sorted, compact, UTF-8 preserved, single line.
    pub const CANONICAL: JsonProfile = JsonProfile {
        name: "canonical",
        sort_keys: true,
        item_separator: ",",
        key_separator: ":",
        ensure_ascii: false,
        indent: None,
    };

    /// General-purpose dictionary hashing (internal cache keys).
    ///
    /// Differs from [`JsonProfile::CANONICAL`] in separators and ASCII
    /// escaping. The two must not be unified: either change rewrites every
    /// value previously computed under one of them.
    pub const HASH_DICT: JsonProfile = JsonProfile {
        name: "hash_dict",
        sort_keys: true,
        item_separator: ", ",
        key_separator: ": ",
        ensure_ascii: true,
        indent: None,
    };

    /// Human-readable rendering used for semantic diffs. Never hashed.
    pub const DISPLAY: JsonProfile = JsonProfile {
        name: "display",
        sort_keys: true,
        item_separator: ",",
        key_separator: ": ",
        ensure_ascii: false,
        indent: Some(2),
    };
}

/// Type tags prefixed to minted identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IdPrefixes {
    /// Document IDs
    pub document: &'static str,
    /// Block IDs
    pub block: &'static str,
    /// Table IDs
    pub table: &'static str,
    /// Image IDs
    pub image: &'static str,
    /// Chunk IDs
    pub chunk: &'static str,
}

/// The versioned set of algorithmic constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StabilityContract {
    /// IR schema version; bumped on any change to this contract
    pub schema_version: &'static str,
    /// Algorithm for block, document, table, image and chunk IDs
    pub id_hash_algorithm: HashAlgorithm,
    /// Algorithm applied to canonical JSON for the semantic hash
    pub semantic_hash_algorithm: HashAlgorithm,
    /// Hex characters kept from a digest when minting an ID
    pub id_hex_length: usize,
    /// Characters of block content included in the block composite key
    pub block_content_truncation: usize,
    /// Characters of table raw text included in the table composite key
    pub table_text_truncation: usize,
    /// Encoding of strings before hashing
    pub string_encoding: &'static str,
    /// Decimal places kept when comparing coordinates
    pub spatial_round_precision: usize,
    /// Spatial tiebreak priority per block type (lower sorts first)
    pub block_type_priority: &'static [(BlockType, u8)],
    /// Identifier type tags
    pub id_prefixes: IdPrefixes,
    /// Profile used for canonical JSON and the semantic hash
    pub canonical_json: JsonProfile,
    /// Profile used by general-purpose dictionary hashing
    pub hash_dict_json: JsonProfile,
}

impl StabilityContract {
    /// Contract for schema version 1.0.0.
    pub const V1: StabilityContract = StabilityContract {
        schema_version: "1.0.0",
        id_hash_algorithm: HashAlgorithm::Sha256,
        semantic_hash_algorithm: HashAlgorithm::Sha256,
        id_hex_length: 16,
        block_content_truncation: 500,
        table_text_truncation: 200,
        string_encoding: "utf-8",
        // 3 decimals drifted on multi-column layouts; 5+ reintroduces float noise.
        spatial_round_precision: 4,
        block_type_priority: &[
            (BlockType::Heading, 1),
            (BlockType::Paragraph, 2),
            (BlockType::List, 3),
            (BlockType::Table, 4),
            (BlockType::Image, 5),
            (BlockType::Equation, 6),
            (BlockType::Code, 7),
            (BlockType::Caption, 8),
            (BlockType::Header, 9),
            (BlockType::Footer, 10),
        ],
        id_prefixes: IdPrefixes {
            document: "doc_",
            block: "blk_",
            table: "tbl_",
            image: "img_",
            chunk: "chk_",
        },
        canonical_json: JsonProfile::CANONICAL,
        hash_dict_json: JsonProfile::HASH_DICT,
    };

    /// The contract in force for this build.
    pub fn current() -> &'static StabilityContract {
        &CURRENT
    }

    /// Spatial tiebreak priority of a block type.
    pub fn type_priority(&self, block_type: BlockType) -> u8 {
        self.block_type_priority
            .iter()
            .find(|(t, _)| *t == block_type)
            .map(|(_, p)| *p)
            .unwrap_or(UNLISTED_TYPE_PRIORITY)
    }

    /// Round a coordinate to the contract precision.
    ///
    /// Rounding is decided on the exact binary value, so `10.00005`
    /// (stored as `10.0000499…`) rounds to `10.0` at four places. Negative
    /// zero collapses to zero.
    pub fn round_coordinate(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return value;
        }
        let rounded = format!("{:.*}", self.spatial_round_precision, value)
            .parse::<f64>()
            .unwrap_or(value);
        if rounded == 0.0 {
            0.0
        } else {
            rounded
        }
    }

    /// Keep at most `id_hex_length` characters of a hex digest.
    pub fn truncate_digest<'a>(&self, digest: &'a str) -> &'a str {
        truncate_chars(digest, self.id_hex_length)
    }

    /// Digest of this contract under the hash_dict profile.
    ///
    /// Two builds agree on every ID and hash only if their fingerprints
    /// match.
    pub fn fingerprint(&self) -> Result<String> {
        crate::hashing::hash_dict(self)
    }
}

impl Default for StabilityContract {
    fn default() -> Self {
        Self::V1
    }
}

/// Prefix of `text` holding at most `max_chars` characters.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_v1_values() {
        let c = StabilityContract::current();
        assert_eq!(c.schema_version, "1.0.0");
        assert_eq!(c.id_hash_algorithm.name(), "sha256");
        assert_eq!(c.semantic_hash_algorithm.name(), "sha256");
        assert_eq!(c.id_hex_length, 16);
        assert_eq!(c.block_content_truncation, 500);
        assert_eq!(c.table_text_truncation, 200);
        assert_eq!(c.string_encoding, "utf-8");
        assert_eq!(c.spatial_round_precision, 4);
    }

    #[test]
    fn test_priority_table_covers_every_block_type() {
        let c = StabilityContract::current();
        for block_type in BlockType::ALL {
            assert_ne!(
                c.type_priority(block_type),
                UNLISTED_TYPE_PRIORITY,
                "{:?} has no priority",
                block_type
            );
        }
        let mut priorities: Vec<u8> = c.block_type_priority.iter().map(|(_, p)| *p).collect();
        priorities.sort_unstable();
        priorities.dedup();
        assert_eq!(priorities.len(), c.block_type_priority.len());
    }

    #[test]
    fn test_heading_sorts_before_paragraph() {
        let c = StabilityContract::current();
        assert!(c.type_priority(BlockType::Heading) < c.type_priority(BlockType::Paragraph));
        assert_eq!(c.type_priority(BlockType::Footer), 10);
    }

    #[test]
    fn test_json_profiles_diverge_on_ascii() {
        let c = StabilityContract::current();
        assert!(c.canonical_json.sort_keys && c.hash_dict_json.sort_keys);
        assert!(!c.canonical_json.ensure_ascii);
        assert!(c.hash_dict_json.ensure_ascii);
        assert_eq!(c.canonical_json.item_separator, ",");
        assert_eq!(c.canonical_json.key_separator, ":");
        assert!(c.canonical_json.indent.is_none());
    }

    #[test]
    fn test_round_coordinate() {
        let c = StabilityContract::current();
        assert_eq!(c.round_coordinate(10.00005), 10.0);
        assert_eq!(c.round_coordinate(10.00004), 10.0);
        assert_eq!(c.round_coordinate(72.123456), 72.1235);
        assert_eq!(c.round_coordinate(-0.00001), 0.0);
        assert!(c.round_coordinate(-0.00001).is_sign_positive());
        assert!(c.round_coordinate(f64::NAN).is_nan());
    }

    #[test]
    fn test_digest_reader_matches_digest_hex() {
        let data = vec![7u8; STREAM_CHUNK_SIZE * 2 + 13];
        let streamed = HashAlgorithm::Sha256
            .digest_reader(std::io::Cursor::new(&data))
            .unwrap();
        assert_eq!(streamed, HashAlgorithm::Sha256.digest_hex(&data));
    }

    #[test]
    fn test_empty_digest() {
        assert_eq!(
            HashAlgorithm::Sha256.digest_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_truncate_chars_counts_characters() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a = StabilityContract::V1.fingerprint().unwrap();
        let b = StabilityContract::current().fingerprint().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }
}
