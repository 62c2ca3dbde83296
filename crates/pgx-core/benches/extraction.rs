//! Benchmarks for VCF extraction and drug evaluation
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pgx_core::{EvaluationPipeline, KnowledgeBase, VcfExtractor};
use std::sync::Arc;

const GENES: [(&str, &str); 6] = [
    ("CYP2D6", "*4"),
    ("CYP2C19", "*2"),
    ("CYP2C9", "*3"),
    ("SLCO1B1", "*5"),
    ("TPMT", "*3A"),
    ("BRCA1", "*1"),
];

fn synthetic_vcf(rows: usize) -> String {
    let mut text = String::from("##fileformat=VCFv4.2\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n");
    for i in 0..rows {
        let (gene, star) = GENES[i % GENES.len()];
        text.push_str(&format!(
            "chr{}\t{}\trs{}\tA\tG\t50\tPASS\tGENE={};STAR={};DP=30\n",
            i % 22 + 1,
            1000 + i,
            i,
            gene,
            star
        ));
    }
    text
}

fn bench_extraction(c: &mut Criterion) {
    let extractor = VcfExtractor::new();
    let mut group = c.benchmark_group("vcf_extraction");

    for rows in [100, 1_000, 10_000] {
        let vcf = synthetic_vcf(rows);
        group.bench_with_input(BenchmarkId::new("extract", rows), &vcf, |b, v| {
            b.iter(|| extractor.extract_from_reader(black_box(v.as_bytes())))
        });
    }

    group.finish();
}

fn bench_evaluation(c: &mut Criterion) {
    let pipeline = EvaluationPipeline::new(Arc::new(KnowledgeBase::builtin().unwrap()));
    let variants = VcfExtractor::new()
        .extract_from_reader(synthetic_vcf(1_000).as_bytes())
        .unwrap();

    c.bench_function("evaluate_single_drug", |b| {
        b.iter(|| pipeline.evaluate(black_box(&variants), "clopidogrel"))
    });

    let drugs = pipeline.knowledge().supported_drugs();
    c.bench_function("evaluate_all_drugs", |b| {
        b.iter(|| pipeline.evaluate_drugs(black_box(&variants), &drugs))
    });
}

criterion_group!(benches, bench_extraction, bench_evaluation);
criterion_main!(benches);
