//! Benchmarks for layoutir normalization and hashing.
//!
//! Run with: cargo bench
//!
//! These benchmarks use synthetic raw layouts.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use layoutir::{
    canonical_json, mint_block_id, semantic_hash, NormalizeOptions, Normalizer, RawBlock,
    RawBoundingBox, RawDocument, RawTable,
};

/// Creates a synthetic layout with a heading, paragraphs and a table per page.
fn create_test_layout(page_count: u32) -> RawDocument {
    let mut raw = RawDocument::new(page_count);
    let mut order = 0;

    for page in 1..=page_count {
        raw.blocks.push(
            RawBlock::new(format!("Section {}", page), "heading", page, order)
                .with_metadata("level", 1)
                .with_bbox(RawBoundingBox::new(72.0, 60.0, 540.0, 80.0)),
        );
        order += 1;

        for i in 0..8u32 {
            let y = 100.0 + f64::from(i) * 60.0;
            raw.blocks.push(
                RawBlock::new(
                    format!("Paragraph {} on page {} with benchmark content for layoutir.", i, page),
                    "paragraph",
                    page,
                    order,
                )
                .with_bbox(RawBoundingBox::new(72.0, y, 540.0, y + 50.0)),
            );
            order += 1;
        }

        raw.tables.push(RawTable::new(
            page,
            vec![
                vec!["Name".into(), "Value".into()],
                vec!["alpha".into(), page.to_string()],
            ],
            format!("Name Value\nalpha {}", page),
            order,
        ));
        order += 1;
    }

    raw
}

/// Benchmark block ID minting.
fn bench_block_ids(c: &mut Criterion) {
    let long = "x".repeat(2_000);

    c.bench_function("mint_block_id_short", |b| {
        b.iter(|| mint_block_id(black_box("paragraph"), 1, 0, black_box("Hello")));
    });

    c.bench_function("mint_block_id_truncated", |b| {
        b.iter(|| mint_block_id(black_box("paragraph"), 1, 0, black_box(&long)));
    });
}

/// Benchmark normalization at various sizes.
fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    let normalizer = Normalizer::from_bytes("bench.pdf", b"benchmark source", "bench/1.0");
    let options = NormalizeOptions::default();

    for page_count in [1, 10, 50].iter() {
        let raw = create_test_layout(*page_count);

        group.bench_function(format!("{}_pages", page_count), |b| {
            b.iter(|| normalizer.normalize(black_box(raw.clone()), &options));
        });
    }

    group.finish();
}

/// Benchmark canonical serialization and semantic hashing.
fn bench_semantic_hash(c: &mut Criterion) {
    let normalizer = Normalizer::from_bytes("bench.pdf", b"benchmark source", "bench/1.0");
    let doc = normalizer.normalize(create_test_layout(10), &NormalizeOptions::default());

    c.bench_function("canonical_json_10_pages", |b| {
        b.iter(|| canonical_json(black_box(&doc)).unwrap());
    });

    c.bench_function("semantic_hash_10_pages", |b| {
        b.iter(|| semantic_hash(black_box(&doc)).unwrap());
    });
}

criterion_group!(benches, bench_block_ids, bench_normalize, bench_semantic_hash);
criterion_main!(benches);
