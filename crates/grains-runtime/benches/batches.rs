use criterion::{black_box, criterion_group, criterion_main, Criterion};
use grains_core::Grain;
use grains_runtime::{ConcurrencyConfig, ConcurrencyManager};

fn batch_bench(c: &mut Criterion) {
    let config = ConcurrencyConfig::default();
    c.bench_function("run_batches_100", |b| {
        b.iter(|| {
            let mut manager = ConcurrencyManager::new(&config).unwrap();
            let tasks: Vec<u64> = (0..100).collect();
            black_box(
                manager
                    .run_batches(tasks, |_| Grain::ratio(7, 10), |t| t.wrapping_mul(31))
                    .unwrap(),
            )
        });
    });
}

criterion_group!(benches, batch_bench);
criterion_main!(benches);
