use grains_core::errors::GrainsError;
use grains_core::{Grain, RngHandle};
use grains_prob::{
    build_transitions, pagerank, run_scenario, GrainKey, GrainStore, Graph, PageRankConfig,
    ScenarioConfig, SignalCatalog,
};

fn catalog() -> SignalCatalog {
    SignalCatalog::new()
        .with_environment("envA", ["sig1", "sig2"])
        .with_environment("envB", ["sig2", "sig3"])
        .with_environment("envC", ["sigX"])
        .with_pattern("patternX", ["sig1"])
        .with_pattern("patternY", ["sig2", "sig3"])
        .with_pattern("patternZ", ["sigX"])
}

fn graph(edges: &[(&str, &[&str])]) -> Graph {
    edges
        .iter()
        .map(|(node, out)| (node.to_string(), out.iter().map(|o| o.to_string()).collect()))
        .collect()
}

#[test]
fn compatibility_is_feature_subset() {
    let catalog = catalog();
    assert!(catalog.is_compatible("patternX", "envA"));
    assert!(!catalog.is_compatible("patternX", "envB"));
    assert!(catalog.is_compatible("patternY", "envB"));
    assert!(catalog.is_compatible("unlisted", "envC"));
    assert!(!catalog.is_compatible("patternZ", "nowhere"));
}

#[test]
fn transition_zeroes_incompatible_patterns() {
    let catalog = catalog();
    let mut store = GrainStore::new();
    let patterns: Vec<String> = ["patternX", "patternY", "patternZ"]
        .iter()
        .map(|p| p.to_string())
        .collect();
    for (pattern, grains) in patterns.iter().zip([5, 3, 2]) {
        store
            .set(GrainKey::new("obs", "envA", pattern.as_str()), grains, 10)
            .unwrap();
    }
    let report = catalog
        .transition(&mut store, "obs", "envA", "envB", &patterns, 10)
        .unwrap();
    assert_eq!(report.zeroed, vec!["patternX".to_string(), "patternZ".to_string()]);
    assert_eq!(store.count(&GrainKey::new("obs", "envB", "patternY")), 3);
    assert_eq!(store.count(&GrainKey::new("obs", "envB", "patternX")), 0);
    assert_eq!(store.count(&GrainKey::new("obs", "envA", "patternX")), 5);
}

#[test]
fn scenario_with_transition_reports_moved_distribution() {
    let yaml = r#"
capacity: 10
patterns:
  - { pattern: patternX, grains: 5 }
  - { pattern: patternY, grains: 3 }
  - { pattern: patternZ, grains: 2 }
updates: []
environment: envA
transition: envB
signals:
  environments:
    envA: [sig1, sig2]
    envB: [sig2, sig3]
  patterns:
    patternX: [sig1]
    patternY: [sig2, sig3]
    patternZ: [sigX]
"#;
    let config: ScenarioConfig = serde_yaml::from_str(yaml).unwrap();
    let report = run_scenario(&config, &mut RngHandle::from_seed(1)).unwrap();
    let moved = report.moved.unwrap();
    assert_eq!(moved.environment, "envB");
    assert_eq!(moved.total, 3);
    assert!(moved.samples.iter().all(|s| s == "patternY"));
}

#[test]
fn transitions_spread_capacity_over_outlinks() {
    let g = graph(&[
        ("A", &["B", "C"]),
        ("B", &["A", "C", "D"]),
        ("C", &["A"]),
        ("D", &[]),
    ]);
    let t = build_transitions(&g, 10).unwrap();
    let grains = |node: &str| t[node].iter().map(|l| (l.target.as_str(), l.grains)).collect::<Vec<_>>();
    assert_eq!(grains("A"), vec![("B", 5), ("C", 5)]);
    assert_eq!(grains("B"), vec![("A", 4), ("C", 3), ("D", 3)]);
    assert_eq!(grains("C"), vec![("A", 10)]);
    assert_eq!(grains("D"), vec![("D", 10)]);

    let small = build_transitions(&g, 2).unwrap();
    assert_eq!(small["B"].iter().map(|l| l.grains).sum::<u64>(), 3);
}

#[test]
fn repeated_outlinks_are_assigned_once() {
    let g = graph(&[("A", &["B", "B", "C"]), ("B", &[]), ("C", &[])]);
    let t = build_transitions(&g, 10).unwrap();
    let links: Vec<(&str, u64)> = t["A"].iter().map(|l| (l.target.as_str(), l.grains)).collect();
    // degree 3 gives 3 grains each, the leftover grain goes to the first link
    assert_eq!(links, vec![("B", 4), ("C", 3)]);
}

#[test]
fn unknown_outlink_is_rejected() {
    let g = graph(&[("A", &["missing"])]);
    let err = build_transitions(&g, 10).unwrap_err();
    assert!(matches!(err, GrainsError::Probability(_)));
    assert_eq!(err.info().code, "unknown-node");
}

#[test]
fn pagerank_ranks_sum_to_one_and_repeat_per_seed() {
    let g = graph(&[
        ("A", &["B", "C"]),
        ("B", &["C", "D"]),
        ("C", &["A"]),
        ("D", &["B", "C"]),
    ]);
    let config = PageRankConfig::default();
    let a = pagerank(&g, &config, &mut RngHandle::from_seed(42)).unwrap();
    let b = pagerank(&g, &config, &mut RngHandle::from_seed(42)).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.visits.values().sum::<u64>(), 2_000);
    assert_eq!(a.ranks.values().sum::<Grain>(), Grain::one());
    // C receives links from every other node
    assert!(a.ranks["C"] > a.ranks["D"]);
}

#[test]
fn undamped_walk_alternates_on_a_two_cycle() {
    let g = graph(&[("A", &["B"]), ("B", &["A"])]);
    let config = PageRankConfig {
        steps: 1_000,
        damping_grains: 100,
        ..PageRankConfig::default()
    };
    let report = pagerank(&g, &config, &mut RngHandle::from_seed(9)).unwrap();
    assert_eq!(report.visits["A"], 500);
    assert_eq!(report.ranks["B"], Grain::ratio(1, 2));
}

#[test]
fn pagerank_rejects_empty_inputs() {
    let config = PageRankConfig::default();
    let err = pagerank(&Graph::new(), &config, &mut RngHandle::from_seed(0)).unwrap_err();
    assert!(matches!(err, GrainsError::Config(_)));

    let g = graph(&[("A", &[])]);
    let zero = PageRankConfig {
        steps: 0,
        ..PageRankConfig::default()
    };
    assert!(matches!(
        pagerank(&g, &zero, &mut RngHandle::from_seed(0)),
        Err(GrainsError::Config(_))
    ));
}
