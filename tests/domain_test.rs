use approx::assert_relative_eq;
use lattix::{BBox3, DesignSpace, LatticeError};
use nalgebra::Vector3;

#[test]
fn zero_resolution_is_invalid() {
    let err = DesignSpace::from_limits([0.0, 1.0], [0.0, 1.0], [0.0, 1.0], [4, 0, 4]).unwrap_err();
    assert!(matches!(err, LatticeError::InvalidDomain { .. }));
}

#[test]
fn inverted_or_flat_bounds_are_invalid() {
    for (x, y, z) in [
        ([1.0, 0.0], [0.0, 1.0], [0.0, 1.0]),
        ([0.0, 1.0], [2.0, 2.0], [0.0, 1.0]),
        ([0.0, 1.0], [0.0, 1.0], [0.5, -0.5]),
    ] {
        let err = DesignSpace::from_limits(x, y, z, [3, 3, 3]).unwrap_err();
        assert!(matches!(err, LatticeError::InvalidDomain { .. }), "{x:?} {y:?} {z:?}");
    }
}

#[test]
fn non_finite_bounds_are_invalid() {
    let bounds = BBox3::new(Vector3::new(f64::NAN, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0));
    assert!(DesignSpace::new(bounds, [2, 2, 2]).is_err());
}

#[test]
fn error_message_names_the_axis() {
    let err = DesignSpace::from_limits([0.0, 1.0], [3.0, 1.0], [0.0, 1.0], [2, 2, 2]).unwrap_err();
    assert!(err.to_string().contains("ymax"), "{err}");
}

#[test]
fn grid_spans_the_bounds() {
    let ds = DesignSpace::from_limits([-1.0, 1.0], [0.0, 4.0], [2.0, 3.0], [5, 3, 2]).unwrap();
    assert_eq!(ds.len(), 30);
    assert_eq!(ds.point(0, 0, 0), Vector3::new(-1.0, 0.0, 2.0));
    let far = ds.point(4, 2, 1);
    assert_relative_eq!(far.x, 1.0, epsilon = 1e-12);
    assert_relative_eq!(far.y, 4.0, epsilon = 1e-12);
    assert_relative_eq!(far.z, 3.0, epsilon = 1e-12);
    assert_relative_eq!(ds.spacing().x, 0.5, epsilon = 1e-12);
}

#[test]
fn coordinate_grids_visit_every_sample_once() {
    let ds = DesignSpace::from_limits([0.0, 1.0], [0.0, 1.0], [0.0, 1.0], [3, 4, 5]).unwrap();
    let [gx, gy, gz] = ds.coordinate_grids();
    assert_eq!(gx.len(), ds.len());
    assert_eq!(gy.len(), ds.len());
    assert_eq!(gz.len(), ds.len());
    let mut seen = std::collections::HashSet::new();
    for idx in 0..ds.len() {
        let p = ds.point_at(idx);
        assert_eq!(p, Vector3::new(gx[idx], gy[idx], gz[idx]));
        assert!(seen.insert((gx[idx].to_bits(), gy[idx].to_bits(), gz[idx].to_bits())));
    }
}

#[test]
fn nearest_sample_clamps_outside_points() {
    let ds = DesignSpace::cube(-1.0, 1.0, 5).unwrap();
    assert_eq!(ds.nearest(Vector3::new(-5.0, 0.1, 9.0)), (0, 2, 4));
}

#[test]
fn single_sample_axis_is_allowed() {
    let ds = DesignSpace::from_limits([0.0, 1.0], [0.0, 1.0], [0.0, 1.0], [1, 1, 3]).unwrap();
    assert_eq!(ds.len(), 3);
    assert_eq!(ds.axis(0), vec![0.0]);
}

#[test]
fn same_grid_different_instances_match() {
    let a = DesignSpace::cube(0.0, 1.0, 8).unwrap();
    let b = DesignSpace::cube(0.0, 1.0, 8).unwrap();
    let c = DesignSpace::cube(0.0, 2.0, 8).unwrap();
    assert!(a.ensure_same(&b).is_ok());
    assert_eq!(a.ensure_same(&c), Err(LatticeError::DomainMismatch));
}
