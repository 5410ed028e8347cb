//! Integration tests for semantic equality and canonical JSON.

use chrono::TimeZone;
use chrono::Utc;
use serde_json::json;

use layoutir::{
    assert_semantically_equal, canonical_json, from_json, hash_dict, semantic_diff, semantic_hash,
    to_json, Document, Error, FormattingData, JsonFormat, MetadataMap, NormalizeOptions,
    Normalizer, RawBlock, RawDocument,
};

fn raw() -> RawDocument {
    let mut raw = RawDocument::new(1);
    raw.blocks.push(RawBlock::new("Intro", "heading", 1, 0).with_metadata("level", 1));
    raw.blocks.push(RawBlock::new("First paragraph.", "paragraph", 1, 1));
    raw.blocks.push(RawBlock::new("Second paragraph.", "paragraph", 1, 2));
    raw
}

fn normalize(raw: RawDocument, options: &NormalizeOptions) -> Document {
    Normalizer::from_bytes("report.pdf", b"report bytes", "engine-1.0").normalize(raw, options)
}

#[test]
fn test_run_fields_do_not_affect_hash() {
    let early = NormalizeOptions::new()
        .with_timestamp(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap())
        .with_config_value("ocr", true);
    let late = NormalizeOptions::new()
        .with_timestamp(Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0).unwrap())
        .with_config_value("ocr", false)
        .with_config_value("dpi", 300);

    let a = normalize(raw(), &early);
    let b = normalize(raw(), &late);

    assert_ne!(a.processing_timestamp, b.processing_timestamp);
    assert_eq!(semantic_hash(&a).unwrap(), semantic_hash(&b).unwrap());
    assert!(assert_semantically_equal(&a, &b).is_ok());
}

#[test]
fn test_formatting_and_advisory_metadata_do_not_affect_hash() {
    let plain = normalize(raw(), &NormalizeOptions::default());

    let mut styled_raw = raw();
    styled_raw.blocks[1] = styled_raw.blocks[1]
        .clone()
        .with_formatting(FormattingData {
            links: vec!["https://example.com".into()],
            ..Default::default()
        })
        .with_metadata("processing_time", 0.42)
        .with_metadata("image_bytes", "AAAA");
    styled_raw.metadata.insert("processing_time".into(), json!(1.5));
    let styled = normalize(styled_raw, &NormalizeOptions::default());

    assert!(styled.blocks[1].formatting_data.is_some());
    assert_eq!(semantic_hash(&plain).unwrap(), semantic_hash(&styled).unwrap());
}

#[test]
fn test_content_change_affects_hash() {
    let a = normalize(raw(), &NormalizeOptions::default());
    let mut changed = raw();
    changed.blocks[2].text = "Second paragraph!".into();
    let b = normalize(changed, &NormalizeOptions::default());

    assert_ne!(semantic_hash(&a).unwrap(), semantic_hash(&b).unwrap());
}

#[test]
fn test_insertion_order_does_not_affect_canonical_json() {
    let mut forward = MetadataMap::new();
    forward.insert("alpha".into(), json!(1));
    forward.insert("beta".into(), json!({"y": 2, "x": 1}));

    let mut reversed = MetadataMap::new();
    reversed.insert("beta".into(), json!({"x": 1, "y": 2}));
    reversed.insert("alpha".into(), json!(1));

    let mut a = normalize(raw(), &NormalizeOptions::default());
    let mut b = a.clone();
    a.blocks[0].metadata.extend(forward);
    b.blocks[0].metadata.extend(reversed);

    assert_eq!(canonical_json(&a).unwrap(), canonical_json(&b).unwrap());
}

#[test]
fn test_relationship_order_does_not_affect_hash() {
    let a = normalize(raw(), &NormalizeOptions::default());
    let mut b = a.clone();
    b.relationships.reverse();
    b.blocks.reverse();

    assert_eq!(semantic_hash(&a).unwrap(), semantic_hash(&b).unwrap());
}

#[test]
fn test_canonical_json_is_compact_and_sorted() {
    let doc = normalize(raw(), &NormalizeOptions::default());
    let canonical = canonical_json(&doc).unwrap();

    assert!(!canonical.contains('\n'));
    assert!(!canonical.contains(", "));
    assert!(!canonical.contains("processing_timestamp"));
    assert!(!canonical.contains("config_used"));
    assert!(!canonical.contains("ordering_metadata"));
    let blocks = canonical.find("\"blocks\"").unwrap();
    let document_id = canonical.find("\"document_id\"").unwrap();
    assert!(blocks < document_id);
}

#[test]
fn test_mismatch_reports_first_differing_line() {
    let a = normalize(raw(), &NormalizeOptions::default());
    let mut b = a.clone();
    b.blocks[1].content = "Changed paragraph.".into();

    let mismatch = semantic_diff(&a, &b).unwrap().unwrap();
    assert!(mismatch.line > 1);
    assert!(mismatch.left.contains("First paragraph."));
    assert!(mismatch.right.contains("Changed paragraph."));

    match assert_semantically_equal(&a, &b) {
        Err(Error::SemanticMismatch(m)) => assert_eq!(m, mismatch),
        other => panic!("expected mismatch, got {:?}", other),
    }
}

#[test]
fn test_mismatch_on_extra_block() {
    let a = normalize(raw(), &NormalizeOptions::default());
    let mut more = raw();
    more.blocks.push(RawBlock::new("Third paragraph.", "paragraph", 1, 3));
    let b = normalize(more, &NormalizeOptions::default());

    let mismatch = semantic_diff(&a, &b).unwrap().unwrap();
    assert_ne!(mismatch.left, mismatch.right);
}

#[test]
fn test_hash_survives_json_round_trip() {
    let doc = normalize(raw(), &NormalizeOptions::default());
    let restored = from_json(&to_json(&doc, JsonFormat::Compact).unwrap()).unwrap();

    assert_eq!(restored.document_id, doc.document_id);
    assert_eq!(semantic_hash(&restored).unwrap(), semantic_hash(&doc).unwrap());
}

#[test]
fn test_hash_dict_and_semantic_profiles_differ() {
    let value = json!({"name": "café", "n": 1});
    let dict_hash = hash_dict(&value).unwrap();

    // Same data through the canonical profile: compact separators, raw UTF-8.
    let canonical = r#"{"n":1,"name":"café"}"#;
    let canonical_hash = layoutir::hash_string(canonical);

    assert_ne!(dict_hash, canonical_hash);
    assert_eq!(dict_hash, layoutir::hash_string(r#"{"n": 1, "name": "caf\u00e9"}"#));
}

#[test]
fn test_odd_metadata_survives_json_round_trip() {
    let mut odd = raw();
    odd.metadata.insert("author".into(), json!(42));
    odd.metadata.insert("title".into(), json!(["Draft", 2]));
    odd.metadata.insert("creation_date".into(), json!("March 2024"));
    let doc = normalize(odd, &NormalizeOptions::default());

    for format in [JsonFormat::Compact, JsonFormat::Pretty] {
        let json = to_json(&doc, format).unwrap();
        assert_eq!(json.matches("\"author\"").count(), 1);
        assert_eq!(json.matches("\"creation_date\"").count(), 1);

        let restored = from_json(&json).unwrap();
        assert_eq!(restored.metadata, doc.metadata);
        assert_eq!(semantic_hash(&restored).unwrap(), semantic_hash(&doc).unwrap());
    }
    assert_eq!(doc.metadata.author.as_deref(), Some("42"));
    assert_eq!(doc.metadata.extra["creation_date_raw"], "March 2024");
}
