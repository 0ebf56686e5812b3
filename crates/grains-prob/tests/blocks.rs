use grains_core::Grain;
use grains_prob::{BlockFlowConfig, BlockNode, BlockRect, BlockTree, Boundary};
use num_bigint::BigInt;

fn square_tree(side: u32, probability: Grain) -> BlockTree {
    let rect = BlockRect::new(0, side - 1, 0, side - 1).unwrap();
    BlockTree::new(rect, probability, BigInt::from(50)).unwrap()
}

fn leaf_area(tree: &BlockTree) -> u64 {
    tree.leaves().iter().map(|leaf| leaf.rect.area()).sum()
}

#[test]
fn split_shares_probability_among_quadrants() {
    let mut tree = square_tree(16, Grain::one());
    assert!(tree.root_mut().split());
    let leaves = tree.leaves();
    assert_eq!(leaves.len(), 4);
    assert!(leaves.iter().all(|leaf| leaf.probability == Grain::ratio(1, 4)));
    assert_eq!(leaves[1].rect, BlockRect::new(8, 15, 0, 7).unwrap());
    assert_eq!(leaves[2].rect, BlockRect::new(0, 7, 8, 15).unwrap());
    assert_eq!(leaf_area(&tree), 256);
    assert_eq!(tree.total(), Grain::one());
}

#[test]
fn unit_blocks_do_not_split() {
    let mut tree = square_tree(1, Grain::one());
    assert!(!tree.root_mut().split());
    assert_eq!(tree.leaves().len(), 1);
}

#[test]
fn vantage_grows_to_resolve_small_probabilities() {
    let rect = BlockRect::new(0, 0, 0, 0).unwrap();
    let mut leaf = BlockNode::leaf(rect, Grain::zero(), BigInt::from(50));
    leaf.set_probability(Grain::ratio(1, 200));
    assert_eq!(leaf.vantage, BigInt::from(200));

    leaf.set_probability(Grain::ratio(1, 150));
    assert_eq!(leaf.vantage, BigInt::from(200));

    let mut edge = BlockNode::leaf(rect, Grain::zero(), BigInt::from(50));
    edge.set_probability(Grain::ratio(1, 51));
    assert_eq!(edge.vantage, BigInt::from(51));
    edge.set_probability(Grain::ratio(2, 103));
    assert_eq!(edge.vantage, BigInt::from(52));
}

#[test]
fn closed_flow_conserves_mass() {
    let mut tree = square_tree(2, Grain::zero());
    tree.root_mut().split();
    tree.root_mut().children[0].set_probability(Grain::one());
    tree.flow_step(&Grain::ratio(1, 10), Boundary::Closed).unwrap();
    let probs: Vec<Grain> = tree.leaves().iter().map(|l| l.probability.clone()).collect();
    assert_eq!(
        probs,
        vec![Grain::ratio(9, 10), Grain::ratio(1, 20), Grain::ratio(1, 20), Grain::zero()]
    );
    assert_eq!(tree.total(), Grain::one());
    assert_eq!(tree.neighbours()[3], vec![1, 2]);
}

#[test]
fn lone_leaf_loses_outflow_only_when_open() {
    let mut open = square_tree(4, Grain::one());
    open.flow_step(&Grain::ratio(1, 10), Boundary::Open).unwrap();
    assert_eq!(open.total(), Grain::ratio(9, 10));
    open.normalize().unwrap();
    assert_eq!(open.total(), Grain::one());

    let mut closed = square_tree(4, Grain::one());
    closed.flow_step(&Grain::ratio(1, 10), Boundary::Closed).unwrap();
    assert_eq!(closed.total(), Grain::one());
}

#[test]
fn normalize_leaves_empty_tree_alone() {
    let mut tree = square_tree(4, Grain::zero());
    tree.normalize().unwrap();
    assert_eq!(tree.total(), Grain::zero());
}

#[test]
fn faint_subtrees_merge() {
    let mut tree = square_tree(8, Grain::ratio(1, 1_000));
    tree.root_mut().split();
    let counts = tree.adaptive_split_merge(&Grain::ratio(1, 5), &Grain::ratio(1, 300));
    assert_eq!(counts.merges, 1);
    assert_eq!(tree.leaves().len(), 1);
    assert_eq!(tree.total(), Grain::ratio(1, 1_000));
}

#[test]
fn default_run_keeps_unit_mass_and_tiles_domain() {
    let report = BlockTree::run(&BlockFlowConfig::default()).unwrap();
    assert_eq!(report.steps.len(), 10);
    assert!(report.steps.iter().all(|s| s.total == Grain::one()));
    assert_eq!(report.steps[0].splits, 1);
    assert_eq!(report.total, Grain::one());
    assert_eq!(leaf_area(&report.tree), 256);
}

#[test]
fn config_reads_fractions_from_yaml() {
    let config: BlockFlowConfig =
        serde_yaml::from_str("alpha: 1/20\nboundary: closed\nwidth: 8\nheight: 4\n").unwrap();
    assert_eq!(config.alpha, Grain::ratio(1, 20));
    assert_eq!(config.boundary, Boundary::Closed);
    assert_eq!(config.steps, 10);
    let report = BlockTree::run(&config).unwrap();
    assert_eq!(leaf_area(&report.tree), 32);
}

#[test]
fn single_leaf_snapshot_restores_the_tree() {
    let rect = BlockRect::new(0, 3, 0, 3).unwrap();
    let tree = BlockTree::new(rect, Grain::one(), BigInt::from(50)).unwrap();
    let restored = BlockTree::from_bytes(&tree.to_bytes().unwrap()).unwrap();
    assert_eq!(restored, tree);
    assert_eq!(restored.total(), Grain::one());
    assert_eq!(restored.root().rect, rect);
    assert!(restored.root().is_leaf());
}

#[test]
fn split_tree_snapshot_keeps_mass_and_leaf_rects() {
    let mut tree = square_tree(4, Grain::ratio(3, 4));
    assert!(tree.root_mut().split());
    assert!(tree.root_mut().children[0].split());
    let restored = BlockTree::from_bytes(&tree.to_bytes().unwrap()).unwrap();
    assert_eq!(restored, tree);
    assert_eq!(restored.total(), Grain::ratio(3, 4));
    let rects = |t: &BlockTree| t.leaves().iter().map(|leaf| leaf.rect).collect::<Vec<_>>();
    assert_eq!(rects(&restored), rects(&tree));
    assert_eq!(rects(&restored).len(), 7);
}

#[test]
fn default_run_snapshot_roundtrips() {
    let report = BlockTree::run(&BlockFlowConfig::default()).unwrap();
    let bytes = report.tree.to_bytes().unwrap();
    assert_eq!(BlockTree::from_bytes(&bytes).unwrap(), report.tree);
}

#[test]
fn inverted_rect_is_rejected_when_deserialized() {
    let err = serde_json::from_str::<BlockRect>(r#"{"x_min": 3, "x_max": 1, "y_min": 0, "y_max": 0}"#)
        .unwrap_err();
    assert!(err.to_string().contains("inverted"), "{err}");
    let ok: BlockRect =
        serde_json::from_str(r#"{"x_min": 0, "x_max": 1, "y_min": 0, "y_max": 2}"#).unwrap();
    assert_eq!(ok.area(), 6);
}
