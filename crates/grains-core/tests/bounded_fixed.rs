use grains_core::capacity::{expand_clamped, refine_capacity, rescale_round, CapacityStep};
use grains_core::{BoundedGrain, FixedGrain, GrainsError, RefinePolicy, DEFAULT_OMEGA};

#[test]
fn bounded_addition_uses_lcm() {
    let a = BoundedGrain::new(2, 3).unwrap();
    let b = BoundedGrain::new(3, 4).unwrap();
    assert_eq!(a.unify(&b).unwrap(), 12);
    let c = a.add(&b).unwrap();
    assert_eq!((c.numer(), c.denom()), (17, 12));
    assert_eq!(c.omega(), DEFAULT_OMEGA);
}

#[test]
fn bounded_rejects_denominators_above_omega() {
    let err = BoundedGrain::new(1, 20_001).unwrap_err();
    assert_eq!(err.info().code, "omega-exceeded");
    // reduction happens before the bound is checked
    assert!(BoundedGrain::new(2, 40_000).is_ok());

    let a = BoundedGrain::with_omega(1, 7, 50).unwrap();
    let b = BoundedGrain::with_omega(1, 11, 50).unwrap();
    assert!(matches!(a.unify(&b), Err(GrainsError::Capacity(_))));
    assert!(a.mul(&b).is_err());
}

#[test]
fn bounded_division_and_overflow() {
    let a = BoundedGrain::new(3, 4).unwrap();
    let b = BoundedGrain::new(-3, 8).unwrap();
    let q = a.div(&b).unwrap();
    assert_eq!((q.numer(), q.denom()), (-2, 1));
    assert!(a.div(&BoundedGrain::from_integer(0)).is_err());

    let big = BoundedGrain::from_integer(i64::MAX);
    assert_eq!(big.add(&big).unwrap_err().info().code, "overflow");
    assert_eq!(a.to_grain().to_string(), "3/4");
}

#[test]
fn fixed_encode_and_usage() {
    let v = FixedGrain::encode(1.0, 20, 2).unwrap();
    assert_eq!(v.k, 10);
    assert!((v.usage_fraction() - 0.5).abs() < 1e-12);
    assert!((v.to_f64() - 1.0).abs() < 1e-12);
    assert!(FixedGrain::encode(1.0, 0, 2).is_err());
}

#[test]
fn fixed_unify_floors_onto_larger_capacity() {
    let a = FixedGrain::new(-3, 4, 1).unwrap();
    let b = FixedGrain::new(1, 10, 1).unwrap();
    let (ua, ub) = FixedGrain::unify(&a, &b).unwrap();
    assert_eq!((ua.k, ua.ncap), (-8, 10));
    assert_eq!(ub, b);
    assert_eq!(a.add(&b).unwrap().k, -7);
    let c = FixedGrain::new(1, 10, 2).unwrap();
    assert_eq!(a.sub(&c).unwrap_err().info().code, "scale-mismatch");
}

#[test]
fn fixed_mul_keeps_capacity() {
    // 0.5 * 0.5 at capacity 20, scale 1
    let a = FixedGrain::new(10, 20, 1).unwrap();
    let p = a.mul(&a, RefinePolicy::default()).unwrap();
    assert_eq!((p.k, p.ncap), (5, 20));
    assert!((p.to_f64() - 0.25).abs() < 1e-12);
}

#[test]
fn fixed_mul_refines_vanishing_product() {
    // (1/20)^2 = 1/400 rounds to zero at capacity 20
    let a = FixedGrain::new(1, 20, 1).unwrap();
    let p = a.mul(&a, RefinePolicy::default()).unwrap();
    assert!(p.k != 0);
    assert_eq!(p.ncap, 20 * 16);
    assert_eq!(p.k, 1);

    let capped = a
        .mul(&a, RefinePolicy { factor: 2, max_steps: 1 })
        .unwrap();
    assert_eq!((capped.k, capped.ncap), (0, 40));
}

#[test]
fn fixed_scale_by_refines() {
    let a = FixedGrain::new(1, 10, 1).unwrap();
    let s = a.scale_by(0.3, RefinePolicy::default()).unwrap();
    assert_eq!((s.k, s.ncap), (1, 20));
}

#[test]
fn capacity_refinement_caps() {
    assert_eq!(
        refine_capacity(10, 10, 1_000).unwrap(),
        CapacityStep::Expanded { from: 10, to: 100 }
    );
    assert_eq!(refine_capacity(500, 10, 1_000).unwrap(), CapacityStep::Capped { at: 500 });
    assert!(refine_capacity(10, 1, 1_000).is_err());
    assert_eq!(expand_clamped(50_000, 10, 200_000), 200_000);
    assert_eq!(rescale_round(14, 10, 100).unwrap(), 140);
    assert_eq!(rescale_round(15, 10, 1).unwrap(), 2);
    assert_eq!(rescale_round(-15, 10, 1).unwrap(), -2);
}

#[test]
fn bounded_rejects_i64_min_instead_of_panicking() {
    for (num, den) in [(i64::MIN, 1), (1, i64::MIN), (i64::MIN, -1)] {
        let err = BoundedGrain::with_omega(num, den, DEFAULT_OMEGA).unwrap_err();
        assert!(matches!(err, GrainsError::Arithmetic(_)));
        assert_eq!(err.info().code, "overflow");
    }
    assert_eq!(BoundedGrain::new(i64::MAX, -1).unwrap().numer(), -i64::MAX);
}

#[test]
fn bounded_deserialization_goes_through_the_constructor() {
    let value: BoundedGrain = serde_json::from_str(r#"{"num": 2, "den": -4, "omega": 10}"#).unwrap();
    assert_eq!((value.numer(), value.denom(), value.omega()), (-1, 2, 10));
    assert!(serde_json::from_str::<BoundedGrain>(r#"{"num": 1, "den": 30, "omega": 10}"#).is_err());
    assert!(serde_json::from_str::<BoundedGrain>(r#"{"num": 1, "den": 0, "omega": 10}"#).is_err());
}
