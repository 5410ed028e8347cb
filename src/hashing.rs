//! Identifier minting and general-purpose hashing.
//!
//! Every ID is `prefix + first N hex chars of hash(composite key)`, with the
//! prefix, N, the hash and all truncation lengths taken from the
//! [`StabilityContract`].
//!
//! | ID       | Composite key                                             |
//! |----------|-----------------------------------------------------------|
//! | block    | `{type}:{page}:{order}:{content[..500 chars]}`            |
//! | document | file digest (no extra key)                                |
//! | table    | `{doc_id}:table:{page}:{index}:{raw_text[..200 chars]}`   |
//! | image    | `{doc_id}:img:{page}:{index}:{hash(bytes)[..16]}`         |
//! | chunk    | `{doc_id}:chunk:{order}:{sorted block ids joined by ','}` |
//!
//! Truncation counts characters, not bytes, so multi-byte content never
//! splits inside a code point.

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::canonical::to_profile_string;
use crate::error::{Error, Result};
use crate::stability::{truncate_chars, StabilityContract};

fn contract() -> &'static StabilityContract {
    StabilityContract::current()
}

fn mint(prefix: &str, composite_key: &str) -> String {
    let c = contract();
    let digest = c.id_hash_algorithm.digest_hex(composite_key.as_bytes());
    format!("{}{}", prefix, c.truncate_digest(&digest))
}

/// Hash raw bytes and return the full hex digest.
pub fn hash_bytes(data: &[u8]) -> String {
    contract().id_hash_algorithm.digest_hex(data)
}

/// Hash a string's UTF-8 bytes and return the full hex digest.
pub fn hash_string(text: &str) -> String {
    hash_bytes(text.as_bytes())
}

/// Hash a file's content, streaming it in fixed-size chunks.
///
/// Any failure to open or read the file is reported as
/// [`Error::SourceUnreadable`].
pub fn hash_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::source_unreadable(path, e))?;
    contract()
        .id_hash_algorithm
        .digest_reader(file)
        .map_err(|e| Error::source_unreadable(path, e))
}

/// Hash a file's content without blocking the async runtime.
#[cfg(feature = "async")]
pub async fn hash_file_async(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let data = tokio::fs::read(path)
        .await
        .map_err(|e| Error::source_unreadable(path, e))?;
    Ok(hash_bytes(&data))
}

/// Hash any serializable value under the `hash_dict` JSON profile.
///
/// Used for internal cache keys. Its output is intentionally different from
/// [`semantic_hash`](crate::semantic_hash) on the same data.
pub fn hash_dict<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let c = contract();
    let value = serde_json::to_value(value)?;
    let text = to_profile_string(&value, &c.hash_dict_json)?;
    Ok(hash_string(&text))
}

/// Mint a block ID.
///
/// `block_type` is the kind label as supplied by the extractor.
pub fn mint_block_id(block_type: &str, page_number: u32, order: u32, content: &str) -> String {
    let c = contract();
    let content = truncate_chars(content, c.block_content_truncation);
    let key = format!("{}:{}:{}:{}", block_type, page_number, order, content);
    mint(c.id_prefixes.block, &key)
}

/// Mint a document ID from the source file digest.
pub fn mint_document_id(file_hash: &str) -> String {
    let c = contract();
    format!("{}{}", c.id_prefixes.document, c.truncate_digest(file_hash))
}

/// Mint a table ID.
pub fn mint_table_id(document_id: &str, page_number: u32, table_index: usize, raw_text: &str) -> String {
    let c = contract();
    let sample = truncate_chars(raw_text, c.table_text_truncation);
    let key = format!("{}:table:{}:{}:{}", document_id, page_number, table_index, sample);
    mint(c.id_prefixes.table, &key)
}

/// Truncated digest of an image payload.
///
/// Identical bytes give the same value in every document.
pub fn image_content_hash(image_bytes: &[u8]) -> String {
    let digest = hash_bytes(image_bytes);
    contract().truncate_digest(&digest).to_string()
}

/// Mint an image ID. The document ID is part of the key, so the same image
/// in two documents gets two IDs.
pub fn mint_image_id(document_id: &str, page_number: u32, image_index: usize, image_bytes: &[u8]) -> String {
    let key = format!(
        "{}:img:{}:{}:{}",
        document_id,
        page_number,
        image_index,
        image_content_hash(image_bytes)
    );
    mint(contract().id_prefixes.image, &key)
}

/// Mint a chunk ID. Block IDs are sorted first, so their order is irrelevant.
pub fn mint_chunk_id<S: AsRef<str>>(document_id: &str, block_ids: &[S], order: u32) -> String {
    let mut sorted: Vec<&str> = block_ids.iter().map(AsRef::as_ref).collect();
    sorted.sort_unstable();
    let key = format!("{}:chunk:{}:{}", document_id, order, sorted.join(","));
    mint(contract().id_prefixes.chunk, &key)
}
