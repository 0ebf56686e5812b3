use criterion::{black_box, criterion_group, criterion_main, Criterion};
use grains_core::RngHandle;
use grains_prob::{pagerank, BlockFlowConfig, BlockTree, Graph, PageRankConfig};

fn block_bench(c: &mut Criterion) {
    let config = BlockFlowConfig::default();
    c.bench_function("block_flow_16x16", |b| {
        b.iter(|| black_box(BlockTree::run(&config).unwrap()));
    });

    let graph: Graph = [("A", vec!["B", "C"]), ("B", vec!["C", "D"]), ("C", vec!["A"]), ("D", vec!["B", "C"])]
        .into_iter()
        .map(|(node, out)| (node.to_string(), out.into_iter().map(String::from).collect()))
        .collect();
    let walk = PageRankConfig::default();
    c.bench_function("pagerank_walk", |b| {
        b.iter(|| black_box(pagerank(&graph, &walk, &mut RngHandle::from_seed(7)).unwrap()));
    });
}

criterion_group!(benches, block_bench);
criterion_main!(benches);
