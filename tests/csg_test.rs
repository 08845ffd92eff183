use approx::assert_relative_eq;
use lattix::csg::{
    difference, intersection, smooth_union, soft_min, union, BooleanKind, SOFT_MIN_FLOOR,
};
use lattix::primitives::sdf_sphere;
use nalgebra::Vector3;
use proptest::prelude::*;

#[test]
fn union_takes_minimum() {
    let a = sdf_sphere(Vector3::new(2.0, 0.0, 0.0), Vector3::zeros(), 1.0);
    let b = sdf_sphere(Vector3::new(2.0, 0.0, 0.0), Vector3::new(5.0, 0.0, 0.0), 1.0);
    assert_relative_eq!(union(a, b), 1.0, epsilon = 1e-12);
}

#[test]
fn intersection_takes_maximum() {
    let a = sdf_sphere(Vector3::new(0.5, 0.0, 0.0), Vector3::zeros(), 1.0);
    let b = sdf_sphere(Vector3::new(0.5, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0), 1.0);
    assert_relative_eq!(intersection(a, b), -0.5, epsilon = 1e-12);
}

#[test]
fn difference_negates_second_operand() {
    assert_relative_eq!(difference(-2.0, -1.0), 1.0);
    assert_relative_eq!(difference(-2.0, 3.0), -2.0);
}

#[test]
fn smooth_union_blends_below_minimum() {
    let d = smooth_union(1.0, 1.0, 0.5);
    assert!(d < 1.0, "smooth union should dip below the minimum, got {d}");
}

#[test]
fn smooth_kinds_with_zero_blend_are_hard() {
    for (d1, d2) in [(0.3, -0.2), (-1.0, 2.0), (0.0, 0.0)] {
        assert_eq!(BooleanKind::SmoothUnion(0.0).apply(d1, d2), union(d1, d2));
        assert_eq!(BooleanKind::SmoothIntersection(0.0).apply(d1, d2), intersection(d1, d2));
        assert_eq!(BooleanKind::SmoothDifference(0.0).apply(d1, d2), difference(d1, d2));
    }
}

#[test]
fn smooth_union_converges_as_blend_shrinks() {
    let (d1, d2) = (0.25, 0.26);
    let mut previous = f64::INFINITY;
    for k in [1.0, 0.1, 0.01, 0.001, 0.0001] {
        let gap = (smooth_union(d1, d2, k) - union(d1, d2)).abs();
        assert!(gap <= k / 4.0 + 1e-15, "k={k} gap={gap}");
        assert!(gap <= previous);
        previous = gap;
    }
    assert!(previous < 1e-4);
}

#[test]
fn soft_min_with_zero_blend_is_min() {
    assert_eq!(soft_min(0.4, -0.1, 0.0), -0.1);
}

#[test]
fn soft_min_is_bounded_by_hard_min() {
    let b = 20.0;
    for (d1, d2) in [(0.0, 0.0), (0.5, -0.5), (3.0, 3.1), (-2.0, 1.0)] {
        let s = soft_min(d1, d2, b);
        let m = d1.min(d2);
        assert!(s <= m);
        assert!(s >= m - std::f64::consts::LN_2 / b - 1e-12);
    }
}

#[test]
fn soft_min_survives_far_field_values() {
    // exp(-b * d) underflows for both operands; the result must stay finite.
    let s = soft_min(1.0e3, 1.0e3 + 1.0, 50.0);
    assert!(s.is_finite());
    assert_relative_eq!(s, 1.0e3, epsilon = 1e-6);
}

#[test]
fn soft_min_far_field_keeps_growing() {
    let b = 50.0;
    // Level at which the unscaled floored form would saturate.
    let cap = -SOFT_MIN_FLOOR.ln() / b;
    let near = soft_min(20.0, 21.0, b);
    let far = soft_min(40.0, 41.0, b);
    assert!(near > cap, "{near} <= {cap}");
    assert!(far > near);
    assert_relative_eq!(soft_min(30.0, 30.0, b), 30.0 - std::f64::consts::LN_2 / b, epsilon = 1e-12);
}

#[test]
fn associativity_flags() {
    assert!(BooleanKind::Union.is_associative());
    assert!(BooleanKind::Intersection.is_associative());
    assert!(!BooleanKind::Difference.is_associative());
    assert!(!BooleanKind::SmoothUnion(0.1).is_associative());
    assert_eq!(BooleanKind::SmoothUnion(0.1).blend(), Some(0.1));
    assert_eq!(BooleanKind::Union.blend(), None);
}

proptest! {
    #[test]
    fn union_is_commutative(a in -10.0..10.0f64, b in -10.0..10.0f64) {
        prop_assert_eq!(union(a, b), union(b, a));
        prop_assert_eq!(intersection(a, b), intersection(b, a));
    }

    #[test]
    fn union_is_associative(a in -10.0..10.0f64, b in -10.0..10.0f64, c in -10.0..10.0f64) {
        prop_assert_eq!(union(union(a, b), c), union(a, union(b, c)));
        prop_assert_eq!(intersection(intersection(a, b), c), intersection(a, intersection(b, c)));
    }

    #[test]
    fn smooth_union_error_bounded_by_quarter_k(
        a in -5.0..5.0f64,
        b in -5.0..5.0f64,
        k in 0.0..2.0f64,
    ) {
        let gap = (smooth_union(a, b, k) - union(a, b)).abs();
        prop_assert!(gap <= k / 4.0 + 1e-12);
    }
}
