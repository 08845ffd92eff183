use std::sync::Arc;

use approx::assert_relative_eq;
use lattix::{BooleanKind, DesignSpace, FieldCache, LatticeError, Shape, TpmsParams};
use nalgebra::Vector3;
use proptest::prelude::*;

fn space() -> Arc<DesignSpace> {
    DesignSpace::cube(-1.0, 1.0, 21).unwrap()
}

#[test]
fn sphere_is_negative_inside() {
    let ds = space();
    let s = Shape::sphere(&ds, Vector3::zeros(), 0.5);
    assert_relative_eq!(s.evaluate(Vector3::zeros()), -0.5, epsilon = 1e-12);
    assert!(s.contains(Vector3::new(0.3, 0.0, 0.0)));
    assert!(!s.contains(Vector3::new(0.6, 0.0, 0.0)));
}

#[test]
fn composition_keeps_operands_usable() {
    let ds = space();
    let a = Shape::sphere(&ds, Vector3::new(-0.3, 0.0, 0.0), 0.4);
    let b = Shape::sphere(&ds, Vector3::new(0.3, 0.0, 0.0), 0.4);
    let before = a.evaluate(Vector3::zeros());
    let u = a.union(&b).unwrap();
    let _ = u.intersect(&a).unwrap();
    assert_eq!(a.evaluate(Vector3::zeros()), before);
    assert_ne!(u.id(), a.id());
}

#[test]
fn combining_different_domains_fails() {
    let a = Shape::sphere(&space(), Vector3::zeros(), 0.5);
    let other = DesignSpace::cube(-2.0, 2.0, 21).unwrap();
    let b = Shape::sphere(&other, Vector3::zeros(), 0.5);
    assert_eq!(a.union(&b).unwrap_err(), LatticeError::DomainMismatch);
    assert_eq!(
        Shape::combine(BooleanKind::SmoothUnion(0.1), &a, &b).unwrap_err(),
        LatticeError::DomainMismatch
    );
}

#[test]
fn negative_blend_is_rejected() {
    let ds = space();
    let a = Shape::sphere(&ds, Vector3::zeros(), 0.5);
    let b = Shape::cube(&ds, Vector3::zeros(), 0.3);
    let err = a.smooth_union(&b, -0.1).unwrap_err();
    assert!(matches!(err, LatticeError::InvalidParameter { name: "k", .. }));
}

#[test]
fn grid_union_is_elementwise_min() {
    let ds = space();
    let a = Shape::sphere(&ds, Vector3::new(-0.2, 0.0, 0.0), 0.5);
    let b = Shape::torus(&ds, Vector3::new(0.2, 0.1, 0.0), 0.5, 0.1);
    let u = a.union(&b).unwrap().evaluate_grid();
    let (ga, gb) = (a.evaluate_grid(), b.evaluate_grid());
    for i in 0..u.len() {
        assert_eq!(u.data()[i], ga.data()[i].min(gb.data()[i]));
    }
}

#[test]
fn combine_all_folds_left() {
    let ds = space();
    let shapes: Vec<Shape> = (0..4)
        .map(|i| Shape::sphere(&ds, Vector3::new(-0.6 + 0.4 * i as f64, 0.0, 0.0), 0.15))
        .collect();
    let all = Shape::combine_all(BooleanKind::Union, &shapes).unwrap();
    for s in &shapes {
        let (center, _) = s.as_sphere().unwrap();
        assert!(all.contains(center));
    }
    assert!(Shape::combine_all(BooleanKind::Union, &[]).is_err());
}

#[test]
fn difference_removes_inner_sphere() {
    let ds = space();
    let shell = Shape::hollow_sphere(&ds, Vector3::zeros(), 0.8, 0.2);
    assert!(!shell.contains(Vector3::zeros()));
    assert!(shell.contains(Vector3::new(0.7, 0.0, 0.0)));
    assert!(!shell.contains(Vector3::new(0.9, 0.0, 0.0)));
}

#[test]
fn transforms_move_and_resize() {
    let ds = space();
    let s = Shape::sphere(&ds, Vector3::zeros(), 0.2);
    let moved = s.translate(Vector3::new(0.5, 0.0, 0.0));
    assert_relative_eq!(moved.evaluate(Vector3::new(0.5, 0.0, 0.0)), -0.2, epsilon = 1e-12);
    let big = s.scale(2.0).unwrap();
    assert_relative_eq!(big.evaluate(Vector3::zeros()), -0.4, epsilon = 1e-12);
    assert!(s.scale(0.0).is_err());
    let onion = s.shell(0.05);
    assert!(onion.contains(Vector3::new(0.2, 0.0, 0.0)));
    assert!(!onion.contains(Vector3::zeros()));
}

#[test]
fn bounding_box_is_clipped_to_domain() {
    let ds = space();
    let s = Shape::sphere(&ds, Vector3::new(0.9, 0.0, 0.0), 0.5);
    let b = s.bounding_box();
    assert_relative_eq!(b.max.x, 1.0);
    assert_relative_eq!(b.min.x, 0.4, epsilon = 1e-12);
    let half = Shape::half_space(&ds, Vector3::new(0.0, 0.0, 2.0), 0.0).unwrap();
    assert_eq!(half.bounding_box(), ds.bounds());
}

#[test]
fn sampled_shape_reproduces_its_grid() {
    let ds = space();
    let s = Shape::capsule(&ds, Vector3::new(-0.5, 0.0, 0.0), Vector3::new(0.5, 0.0, 0.0), 0.1);
    let grid = s.evaluate_grid();
    let sampled = Shape::from_field(grid.clone());
    assert_eq!(sampled.evaluate_grid().data(), grid.data());
    // Grid points interpolate to their stored values.
    let p = ds.point(3, 10, 10);
    assert_relative_eq!(sampled.evaluate(p), grid.value_at(3, 10, 10), epsilon = 1e-12);
}

#[test]
fn tpms_solid_share_tracks_volume_fraction() {
    let ds = DesignSpace::cube(0.0, 1.0, 30).unwrap();
    let fraction = |vf: f64| {
        Shape::gyroid(&ds, &TpmsParams::cubic(1.0).with_volume_fraction(vf))
            .unwrap()
            .evaluate_grid()
            .solid_fraction()
    };
    let (low, mid, high) = (fraction(0.3), fraction(0.5), fraction(0.7));
    assert!(low < mid && mid < high, "{low} {mid} {high}");
    assert!((mid - 0.5).abs() < 0.05, "{mid}");
    assert!(Shape::schwarz_p(&ds, &TpmsParams::default().with_volume_fraction(1.0)).is_err());
}

#[test]
fn tpms_cell_lengths_set_the_period() {
    let ds = DesignSpace::cube(0.0, 1.0, 12).unwrap();
    let lengths = Vector3::new(0.5, 1.0, 2.0);
    let params = TpmsParams::default().with_cell_lengths(lengths);
    assert_eq!(params.cell_lengths, lengths);
    let lattice = Shape::schwarz_p(&ds, &params).unwrap();
    let p = Vector3::new(0.1, 0.2, 0.3);
    assert_relative_eq!(
        lattice.evaluate(p),
        lattice.evaluate(p + Vector3::new(0.5, 1.0, 2.0)),
        epsilon = 1e-9
    );
    let flat = TpmsParams::default().with_cell_lengths(Vector3::new(1.0, 0.0, 1.0));
    assert!(matches!(
        Shape::gyroid(&ds, &flat),
        Err(LatticeError::InvalidParameter { name: "cell_lengths", .. })
    ));
}

#[test]
fn tpms_intersects_with_primitives() {
    let ds = space();
    let ball = Shape::sphere(&ds, Vector3::zeros(), 0.8);
    let gyroid = Shape::diamond(&ds, &TpmsParams::cubic(0.5)).unwrap();
    let part = ball.intersect(&gyroid).unwrap();
    let bbox = part.bounding_box();
    assert_relative_eq!(bbox.max.x, 0.8, epsilon = 1e-12);
    assert!(!part.contains(Vector3::new(0.95, 0.95, 0.95)));
}

#[test]
fn cache_evaluates_once_per_shape() {
    let ds = space();
    let cache = FieldCache::new();
    let a = Shape::sphere(&ds, Vector3::zeros(), 0.5);
    let b = Shape::cube(&ds, Vector3::zeros(), 0.5);
    let first = cache.get_or_evaluate(&a);
    let again = cache.get_or_evaluate(&a);
    assert!(Arc::ptr_eq(&first, &again));
    assert!(cache.get(&b).is_none());
    cache.get_or_evaluate(&b);
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.invalidate(a.id()), 1);
    assert!(cache.get(&a).is_none());
    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn clones_share_cache_entries() {
    let ds = space();
    let cache = FieldCache::new();
    let a = Shape::sphere(&ds, Vector3::zeros(), 0.5);
    let copy = a.clone();
    let first = cache.get_or_evaluate(&a);
    assert!(Arc::ptr_eq(&first, &cache.get_or_evaluate(&copy)));
}

proptest! {
    #[test]
    fn union_matches_min_of_operands(
        c in prop::array::uniform3(-0.5..0.5f64),
        r in 0.05..0.6f64,
        p in prop::array::uniform3(-1.0..1.0f64),
    ) {
        let ds = DesignSpace::cube(-1.0, 1.0, 4).unwrap();
        let a = Shape::sphere(&ds, Vector3::from(c), r);
        let b = Shape::cube(&ds, Vector3::zeros(), 0.3);
        let p = Vector3::from(p);
        let ab = a.union(&b).unwrap();
        let ba = b.union(&a).unwrap();
        prop_assert_eq!(ab.evaluate(p), a.evaluate(p).min(b.evaluate(p)));
        prop_assert_eq!(ab.evaluate(p), ba.evaluate(p));
    }

    #[test]
    fn union_regroups_freely(p in prop::array::uniform3(-1.0..1.0f64)) {
        let ds = DesignSpace::cube(-1.0, 1.0, 4).unwrap();
        let a = Shape::sphere(&ds, Vector3::new(0.2, 0.0, 0.0), 0.3);
        let b = Shape::cube(&ds, Vector3::new(-0.2, 0.1, 0.0), 0.2);
        let c = Shape::cylinder(&ds, Vector3::zeros(), 0.1, 0.6);
        let left = a.union(&b).unwrap().union(&c).unwrap();
        let right = a.union(&b.union(&c).unwrap()).unwrap();
        let p = Vector3::from(p);
        prop_assert_eq!(left.evaluate(p), right.evaluate(p));
    }
}
