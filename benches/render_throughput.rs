//! Layout + render throughput for both backends.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use folio::{DocumentInfo, Node, OutputFormat, PipelineBuilder};
use std::hint::black_box;

fn report(sections: usize) -> Node {
    let children = (0..sections)
        .map(|i| {
            Node::section(
                format!("Section {}", i + 1),
                vec![
                    Node::text_paragraph(
                        "Throughput benchmark paragraph with enough words to wrap over a few lines \
                         so that line breaking and pagination both get exercised on every section.",
                    ),
                    Node::simple_table(
                        vec!["Item", "Quantity", "Price"],
                        vec![vec!["Bolts", "12", "0.40"], vec!["Nuts", "30", "0.10"], vec!["Washers", "50", "0.05"]],
                    ),
                    Node::bullet_list(vec!["first point", "second point"]),
                ],
            )
        })
        .collect();
    Node::document(DocumentInfo::titled("Benchmark"), children)
}

fn bench_render(c: &mut Criterion) {
    let pipeline = PipelineBuilder::new().build().expect("default options are valid");
    let mut group = c.benchmark_group("render");
    for sections in [10, 100] {
        let doc = report(sections);
        group.throughput(Throughput::Elements(sections as u64));
        for format in [OutputFormat::Pdf, OutputFormat::Docx, OutputFormat::Html] {
            group.bench_with_input(BenchmarkId::new(format.to_string(), sections), &doc, |b, doc| {
                b.iter(|| pipeline.render(black_box(doc), format).expect("render"))
            });
        }
    }
    group.finish();
}

fn bench_layout_only(c: &mut Criterion) {
    let pipeline = PipelineBuilder::new().build().expect("default options are valid");
    let doc = report(100);
    c.bench_function("layout_100_sections", |b| {
        b.iter(|| pipeline.layout(black_box(&doc)).expect("layout"))
    });
}

criterion_group!(benches, bench_render, bench_layout_only);
criterion_main!(benches);
