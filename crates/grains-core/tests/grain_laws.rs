use grains_core::Grain;
use num_bigint::BigInt;
use num_integer::Integer;
use proptest::prelude::*;

fn grain() -> impl Strategy<Value = Grain> {
    (-1_000i64..1_000, 1i64..500).prop_map(|(n, d)| Grain::new(n, d).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn addition_commutes_and_associates(a in grain(), b in grain(), c in grain()) {
        prop_assert_eq!(&a + &b, &b + &a);
        prop_assert_eq!((&a + &b) + &c, &a + (&b + &c));
    }

    #[test]
    fn multiplication_distributes(a in grain(), b in grain(), c in grain()) {
        prop_assert_eq!(&a * (&b + &c), &a * &b + &a * &c);
    }

    #[test]
    fn division_inverts_multiplication(a in grain(), b in grain()) {
        prop_assume!(!b.is_zero());
        let q = a.checked_div(&b).unwrap();
        prop_assert_eq!(q * &b, a);
    }

    #[test]
    fn denominators_stay_reduced_and_positive(a in grain(), b in grain()) {
        let sum = &a + &b;
        prop_assert!(*sum.denom() > BigInt::from(0));
        prop_assert_eq!(sum.numer().gcd(sum.denom()), BigInt::from(1));
    }

    #[test]
    fn display_parses_back(a in grain()) {
        let parsed: Grain = a.to_string().parse().unwrap();
        prop_assert_eq!(parsed, a);
    }
}

#[test]
fn parses_integers_and_fractions() {
    assert_eq!(" 3 ".parse::<Grain>().unwrap(), Grain::from(3));
    assert_eq!("6/-4".parse::<Grain>().unwrap(), Grain::new(-3, 2).unwrap());
    assert!("1/0".parse::<Grain>().is_err());
    assert!("x/2".parse::<Grain>().is_err());
}

#[test]
fn ordering_follows_value() {
    let third = Grain::new(1, 3).unwrap();
    let half = Grain::new(1, 2).unwrap();
    assert!(third < half);
    assert!(-half.clone() < -third.clone());
    assert_eq!(vec![third.clone(), half.clone()].into_iter().sum::<Grain>(), Grain::new(5, 6).unwrap());
}

#[test]
fn decimal_encoding_rounds_to_denominator() {
    let g = Grain::from_f64_rounded(0.333, 100).unwrap();
    assert_eq!(g, Grain::new(33, 100).unwrap());
    assert!(Grain::from_f64_rounded(f64::NAN, 10).is_err());
    assert!((Grain::new(1, 8).unwrap().to_f64() - 0.125).abs() < 1e-12);
}

#[test]
fn grains_serialize_as_strings() {
    let g = Grain::new(7, 3).unwrap();
    assert_eq!(serde_json::to_string(&g).unwrap(), "\"7/3\"");
    let back: Grain = serde_json::from_str("\"14/6\"").unwrap();
    assert_eq!(back, g);
}
