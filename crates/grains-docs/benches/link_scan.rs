use criterion::{black_box, criterion_group, criterion_main, Criterion};
use grains_docs::{parse_links, script_mentions};

fn scan_bench(c: &mut Criterion) {
    let readme: String = (0..500)
        .map(|i| format!("- [Finite Manual {i}](manual/finite_manual_{i}.pdf) see grain_agg.py\n"))
        .collect();
    c.bench_function("parse_links_500", |b| {
        b.iter(|| black_box(parse_links(&readme)));
    });
    c.bench_function("script_mentions_500", |b| {
        b.iter(|| black_box(script_mentions(&readme)));
    });
}

criterion_group!(benches, scan_bench);
criterion_main!(benches);
