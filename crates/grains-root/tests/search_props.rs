use grains_root::{grain_error, search, RootConfig, SearchMethod, StopReason};
use proptest::prelude::*;

fn method() -> impl Strategy<Value = SearchMethod> {
    prop_oneof![
        Just(SearchMethod::Greedy),
        Just(SearchMethod::Slope),
        Just(SearchMethod::adaptive()),
        Just(SearchMethod::layered(1, 10_000)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 48, .. ProptestConfig::default() })]

    #[test]
    fn searches_respect_capacity_and_error(target in 0u64..500, k in 0u64..60, method in method(), seed in any::<u64>()) {
        let mut config = RootConfig::for_target(target).with_method(method);
        config.initial_k = k;
        config.max_capacity = 10_000;
        config.allowed_iterations = 300;
        let out = search(&config, seed).unwrap();
        prop_assert!(out.m <= config.max_capacity);
        prop_assert_eq!(out.error, grain_error(out.k, out.m, target).unwrap());
        if out.stop == StopReason::Exact {
            prop_assert_eq!(u128::from(out.k).pow(2), u128::from(target) * u128::from(out.m).pow(2));
        }
    }
}
