use grains_core::errors::GrainsError;
use grains_core::{Grain, RngHandle};
use grains_prob::{run_scenario, GrainDistribution, GrainKey, GrainStore, ScenarioConfig};

fn demo_entries() -> Vec<(String, u64)> {
    vec![("A".into(), 5), ("B".into(), 15), ("C".into(), 5)]
}

#[test]
fn set_rejects_counts_above_capacity() {
    let mut store = GrainStore::new();
    let err = store
        .set(GrainKey::new("obs1", "env1", "A"), 41, 40)
        .unwrap_err();
    assert!(matches!(err, GrainsError::Probability(_)));
    assert_eq!(err.info().code, "over-capacity");
    assert!(store.is_empty());
}

#[test]
fn probability_needs_positive_capacity() {
    let store = GrainStore::new();
    let key = GrainKey::new("obs1", "env1", "A");
    assert!(matches!(store.probability(&key, 0), Err(GrainsError::Arithmetic(_))));
    assert_eq!(store.probability(&key, 40).unwrap(), Grain::zero());
}

#[test]
fn distribution_keeps_partial_sums_and_exact_probabilities() {
    let mut store = GrainStore::new();
    let dist = GrainDistribution::new(&mut store, "obs1", "env1", 40, &demo_entries()).unwrap();
    assert_eq!(dist.partial_sums(), &[5, 20, 25]);
    assert_eq!(dist.total(), 25);
    let probs = dist.probabilities().unwrap();
    assert_eq!(probs[0], ("A".to_string(), Grain::ratio(1, 8)));
    assert_eq!(probs[1], ("B".to_string(), Grain::ratio(3, 8)));
    assert_eq!(store.count(&GrainKey::new("obs1", "env1", "B")), 15);
}

#[test]
fn distribution_total_may_not_exceed_capacity() {
    let mut store = GrainStore::new();
    let err = GrainDistribution::new(&mut store, "obs1", "env1", 24, &demo_entries()).unwrap_err();
    assert_eq!(err.info().code, "over-capacity");
}

#[test]
fn rejected_distributions_leave_the_store_untouched() {
    let mut store = GrainStore::new();
    store.set(GrainKey::new("obs1", "env1", "A"), 2, 40).unwrap();
    let before = store.entries();

    let err = GrainDistribution::new(&mut store, "obs1", "env1", 24, &demo_entries()).unwrap_err();
    assert_eq!(err.info().code, "over-capacity");
    assert_eq!(store.entries(), before);

    let duplicated = vec![("B".to_string(), 1), ("C".to_string(), 1), ("B".to_string(), 2)];
    let err = GrainDistribution::new(&mut store, "obs1", "env1", 40, &duplicated).unwrap_err();
    assert_eq!(err.info().code, "duplicate-pattern");
    assert_eq!(store.entries(), before);
}

#[test]
fn sampling_skips_empty_patterns_and_handles_zero_total() {
    let mut store = GrainStore::new();
    let entries = vec![("Z".to_string(), 0), ("Y".to_string(), 3)];
    let dist = GrainDistribution::new(&mut store, "o", "e", 10, &entries).unwrap();
    let mut rng = RngHandle::from_seed(11);
    for _ in 0..100 {
        assert_eq!(dist.sample(&mut rng), Some("Y"));
    }

    let empty = GrainDistribution::new(&mut store, "o", "f", 10, &[("Z".to_string(), 0)]).unwrap();
    assert_eq!(empty.sample(&mut rng), None);
}

#[test]
fn from_store_reflects_updates() {
    let mut store = GrainStore::new();
    GrainDistribution::new(&mut store, "obs1", "env1", 40, &demo_entries()).unwrap();
    store.update(GrainKey::new("obs1", "env1", "B"), 5, 40);
    store.update(GrainKey::new("obs1", "env1", "C"), -3, 40);
    let patterns: Vec<String> = ["A", "B", "C"].iter().map(|p| p.to_string()).collect();
    let dist = GrainDistribution::from_store(&store, "obs1", "env1", 40, &patterns).unwrap();
    assert_eq!(dist.grains(), &[5, 20, 2]);
    let probs = dist.probabilities().unwrap();
    assert_eq!(probs[1].1, Grain::ratio(1, 2));
    assert_eq!(probs[2].1, Grain::ratio(1, 20));
}

#[test]
fn default_scenario_is_reproducible() {
    let config = ScenarioConfig::default();
    let a = run_scenario(&config, &mut RngHandle::from_seed(3)).unwrap();
    let b = run_scenario(&config, &mut RngHandle::from_seed(3)).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.initial.total, 25);
    assert_eq!(a.updated.total, 27);
    assert_eq!(a.initial.samples.len(), config.draws as usize);
    assert!(a.transition.is_none());
}

#[test]
fn entries_serialize_flat() {
    let mut store = GrainStore::new();
    store.set(GrainKey::new("obs1", "env1", "B"), 15, 40).unwrap();
    let json = serde_json::to_value(store.entries()).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {"observer": "obs1", "environment": "env1", "pattern": "B", "grains": 15}
        ])
    );
}

proptest::proptest! {
    #[test]
    fn updates_never_leave_the_capacity_band(
        capacity in 1u64..500,
        deltas in proptest::collection::vec(-1_000i64..1_000, 1..20),
    ) {
        let mut store = GrainStore::new();
        let key = GrainKey::new("obs", "env", "A");
        for delta in deltas {
            let grains = store.update(key.clone(), delta, capacity);
            proptest::prop_assert!(grains <= capacity);
            proptest::prop_assert_eq!(store.count(&key), grains);
        }
    }
}
