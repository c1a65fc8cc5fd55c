//! Benchmarks for pdfdesk document operations.
//!
//! Run with: cargo bench
//!
//! These benchmarks run against synthetic in-memory PDFs so results do
//! not depend on files lying around.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, StringFormat};
use pdfdesk::ops;
use pdfdesk::{CompressionLevel, PageSet, SplitOptions};

/// Build a synthetic PDF with the given number of text pages.
fn sample_pdf(num_pages: u32) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut page_ids = Vec::new();
    for i in 0..num_pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new(
                    "Tf",
                    vec![Object::Name(b"F1".to_vec()), Object::Integer(12)],
                ),
                Operation::new("Td", vec![Object::Integer(100), Object::Integer(700)]),
                Operation::new(
                    "Tj",
                    vec![Object::String(
                        format!("Page {} benchmark content", i + 1).into_bytes(),
                        StringFormat::Literal,
                    )],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id =
            doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));

        let page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
            ("Contents", Object::Reference(content_id)),
        ]);
        page_ids.push(doc.add_object(page));
    }

    let pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(num_pages as i64)),
        (
            "Kids",
            Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
        ),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]);
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// Benchmark header probing.
fn bench_header_probe(c: &mut Criterion) {
    let pdf_data = sample_pdf(1);
    let non_pdf_data = b"Not a PDF file at all, just random text content";

    c.bench_function("probe_valid_pdf", |b| {
        b.iter(|| pdfdesk::probe_version_bytes(black_box(&pdf_data)).unwrap());
    });

    c.bench_function("probe_non_pdf", |b| {
        b.iter(|| pdfdesk::is_pdf_bytes(black_box(non_pdf_data)));
    });
}

/// Benchmark page expression parsing.
fn bench_page_expression(c: &mut Criterion) {
    let expression = "1-10, 15, 20-40, 55, 60-90, 101, 110-140";

    c.bench_function("page_set_parse", |b| {
        b.iter(|| PageSet::parse(black_box(expression)).unwrap());
    });
}

/// Benchmark splitting at various document sizes.
fn bench_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_single");

    for page_count in [5u32, 20, 50] {
        let doc = ops::load_document_bytes(&sample_pdf(page_count)).unwrap();
        let options = SplitOptions::single();

        group.bench_function(format!("{}_pages", page_count), |b| {
            b.iter(|| ops::split_document(black_box(&doc), &options).unwrap());
        });
    }

    group.finish();
}

/// Benchmark merging two documents.
fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_two");

    for page_count in [5u32, 20] {
        let first = ops::load_document_bytes(&sample_pdf(page_count)).unwrap();
        let second = ops::load_document_bytes(&sample_pdf(page_count)).unwrap();

        group.bench_function(format!("{}_pages_each", page_count), |b| {
            b.iter(|| {
                ops::merge_documents(
                    vec![black_box(first.clone()), black_box(second.clone())],
                    true,
                )
                .unwrap()
            });
        });
    }

    group.finish();
}

/// Benchmark stream compression.
fn bench_compress(c: &mut Criterion) {
    let doc = ops::load_document_bytes(&sample_pdf(20)).unwrap();

    c.bench_function("compress_balanced_20_pages", |b| {
        b.iter(|| {
            let mut working = black_box(doc.clone());
            ops::compress_document(&mut working, CompressionLevel::Balanced).unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_header_probe,
    bench_page_expression,
    bench_split,
    bench_merge,
    bench_compress,
);
criterion_main!(benches);
