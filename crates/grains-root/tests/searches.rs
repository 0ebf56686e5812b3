use grains_core::Grain;
use grains_root::{
    grain_error, search, ExpansionTrigger, RootConfig, SearchMethod, StopReason, TraceEvent,
};

#[test]
fn greedy_finds_exact_perfect_squares() {
    let out = search(&RootConfig::for_target(4), 0).unwrap();
    assert_eq!(out.stop, StopReason::Exact);
    assert_eq!((out.k, out.m), (20, 10));
    assert_eq!(out.error, 0);
    assert_eq!(out.expansions, 0);
    assert_eq!(out.approximation(), Grain::from(2));

    let out = search(&RootConfig::for_target(9), 0).unwrap();
    assert_eq!((out.k, out.m, out.stop), (30, 10, StopReason::Exact));

    let out = search(&RootConfig::for_target(1), 0).unwrap();
    assert_eq!((out.k, out.m, out.stop), (10, 10, StopReason::Exact));
}

#[test]
fn greedy_exhausts_capacity_for_irrational_roots() {
    let out = search(&RootConfig::for_target(2), 0).unwrap();
    assert_eq!(out.stop, StopReason::CapacityExhausted);
    assert_eq!(out.m, 200_000);
    assert!((out.approximation().to_f64() - 2f64.sqrt()).abs() < 1e-5);
    assert_eq!(out.error, grain_error(out.k, out.m, 2).unwrap());
    // local minimum over k ± 1
    assert!(grain_error(out.k + 1, out.m, 2).unwrap() >= out.error);
    assert!(grain_error(out.k - 1, out.m, 2).unwrap() >= out.error);
    assert!(out.trace.iter().any(|e| matches!(e, TraceEvent::Expand { .. })));
}

#[test]
fn slope_matches_greedy_on_perfect_square() {
    let config = RootConfig::for_target(16).with_method(SearchMethod::Slope);
    let out = search(&config, 0).unwrap();
    assert_eq!((out.k, out.m, out.stop), (40, 10, StopReason::Exact));
}

#[test]
fn slope_never_exceeds_max_capacity() {
    let config = RootConfig::for_target(3).with_method(SearchMethod::Slope);
    let out = search(&config, 0).unwrap();
    assert_eq!(out.stop, StopReason::CapacityExhausted);
    assert!(out.m <= config.max_capacity);
    assert!((out.approximation().to_f64() - 3f64.sqrt()).abs() < 1e-5);
}

#[test]
fn layered_stops_within_tolerance() {
    let config = RootConfig::for_target(2).with_method(SearchMethod::layered(1, 1_000));
    let out = search(&config, 0).unwrap();
    assert_eq!(out.stop, StopReason::WithinTolerance);
    assert_eq!((out.k, out.m), (1_414, 1_000));
}

#[test]
fn layered_accepts_rational_targets() {
    // sqrt(9/4) = 3/2 = 15/10
    let config = RootConfig::for_target(9).with_method(SearchMethod::layered(4, 1_000));
    let out = search(&config, 0).unwrap();
    assert_eq!(out.stop, StopReason::Exact);
    assert_eq!((out.k, out.m), (15, 10));
}

#[test]
fn adaptive_is_deterministic_under_seed() {
    let config = RootConfig::for_target(4).with_method(SearchMethod::adaptive());
    let a = search(&config, 42).unwrap();
    let b = search(&config, 42).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.stop, StopReason::Exact);
    assert_eq!(a.k * 10, a.m * 20);
}

#[test]
fn adaptive_collapse_trigger_expands() {
    let config = RootConfig::for_target(2).with_method(SearchMethod::Adaptive {
        reward_cap: 10,
        penalty_floor: 0,
        trigger: ExpansionTrigger::Collapse,
    });
    let out = search(&config, 7).unwrap();
    assert!(out.expansions > 0);
    assert!(out.m <= config.max_capacity);
    assert_eq!(out.error, grain_error(out.k, out.m, 2).unwrap());
}

#[test]
fn invalid_configs_are_rejected() {
    let mut config = RootConfig::for_target(2);
    config.expansion_factor = 1;
    assert_eq!(search(&config, 0).unwrap_err().info().code, "invalid-config");

    let mut config = RootConfig::for_target(2);
    config.max_capacity = 5;
    assert!(search(&config, 0).is_err());

    let config = RootConfig::for_target(2).with_method(SearchMethod::layered(0, 10));
    assert!(search(&config, 0).is_err());
}

#[test]
fn iteration_limit_is_reported() {
    let mut config = RootConfig::for_target(2);
    config.allowed_iterations = 2;
    let out = search(&config, 0).unwrap();
    assert_eq!(out.stop, StopReason::IterationLimit);
    assert_eq!(out.iterations, 2);
}

#[test]
fn config_loads_from_yaml() {
    let yaml = b"target: 5\nmethod:\n  type: adaptive\n  trigger:\n    type: collapse\n";
    let config: RootConfig = grains_core::from_yaml_slice(yaml).unwrap();
    assert_eq!(config.initial_k, 14);
    assert_eq!(config.max_capacity, 200_000);
    assert_eq!(
        config.method,
        SearchMethod::Adaptive {
            reward_cap: 100,
            penalty_floor: 1,
            trigger: ExpansionTrigger::Collapse,
        }
    );
}

#[test]
fn stepping_past_u64_max_is_an_overflow_error() {
    for method in [SearchMethod::Greedy, SearchMethod::Slope] {
        let mut config = RootConfig::for_target(2).with_method(method);
        config.initial_k = u64::MAX;
        let err = search(&config, 0).unwrap_err();
        assert_eq!(err.info().code, "overflow");
        assert_eq!(err.info().context.get("operation").map(String::as_str), Some("step_up"));
    }
}
