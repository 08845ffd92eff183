use std::f64::consts::PI;

use nalgebra::Vector3;

/// Squared segment length below which a capsule is treated as a sphere.
const DEGENERATE_SEGMENT_SQ: f64 = 1e-24;

/// Exact distance field of a ball.
pub fn sdf_sphere(point: Vector3<f64>, center: Vector3<f64>, radius: f64) -> f64 {
    (point - center).norm() - radius
}

/// Exact distance field of an axis-aligned cuboid with the given half sizes.
pub fn sdf_box(point: Vector3<f64>, center: Vector3<f64>, half_extents: Vector3<f64>) -> f64 {
    let d = (point - center).abs() - half_extents;
    let outside = Vector3::new(d.x.max(0.0), d.y.max(0.0), d.z.max(0.0)).norm();
    let inside = d.x.max(d.y).max(d.z).min(0.0);
    outside + inside
}

/// Signed distance to a capped cylinder aligned with Z.
/// `center` is the middle of the axis, `half_height` the distance from the
/// center to either cap.
pub fn sdf_cylinder(point: Vector3<f64>, center: Vector3<f64>, radius: f64, half_height: f64) -> f64 {
    let p = point - center;
    let d_radial = (p.x * p.x + p.y * p.y).sqrt() - radius;
    let d_axial = p.z.abs() - half_height;
    if d_radial > 0.0 && d_axial > 0.0 {
        (d_radial * d_radial + d_axial * d_axial).sqrt()
    } else {
        d_radial.max(d_axial)
    }
}

/// Signed distance to a torus centered at `center`, lying in the XY plane.
/// The tube of radius `minor_radius` circles the Z axis at `major_radius`.
pub fn sdf_torus(
    point: Vector3<f64>,
    center: Vector3<f64>,
    major_radius: f64,
    minor_radius: f64,
) -> f64 {
    let p = point - center;
    let q_x = (p.x * p.x + p.y * p.y).sqrt() - major_radius;
    let q_y = p.z;
    (q_x * q_x + q_y * q_y).sqrt() - minor_radius
}

/// Distance field of the segment `a..b` inflated by `radius`. This is the
/// strut primitive.
///
/// A zero-length segment is a sphere of `radius` around `a`; the projection
/// onto the segment is skipped instead of dividing by its length.
pub fn sdf_capsule(
    point: Vector3<f64>,
    a: Vector3<f64>,
    b: Vector3<f64>,
    radius: f64,
) -> f64 {
    let pa = point - a;
    let ba = b - a;
    let baba = ba.dot(&ba);
    if baba <= DEGENERATE_SEGMENT_SQ {
        return pa.norm() - radius;
    }
    let h = (pa.dot(&ba) / baba).clamp(0.0, 1.0);
    (pa - ba * h).norm() - radius
}

/// Plane distance: negative on the side opposite to `normal`.
pub fn sdf_half_space(point: Vector3<f64>, normal: Vector3<f64>, d: f64) -> f64 {
    normal.dot(&point) + d
}

// ---------------------------------------------------------------------------
// Triply periodic minimal surfaces
// ---------------------------------------------------------------------------

/// Which triply periodic minimal surface a network lattice follows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TpmsKind {
    Gyroid,
    /// Schwarz P ("primitive") surface.
    SchwarzP,
    Diamond,
}

impl TpmsKind {
    /// Implicit surface value at phase-space point `(x, y, z)` (already
    /// scaled by `2π / period`). The surface is the zero set.
    pub fn surface(self, x: f64, y: f64, z: f64) -> f64 {
        match self {
            TpmsKind::Gyroid => x.sin() * y.cos() + y.sin() * z.cos() + z.sin() * x.cos(),
            TpmsKind::SchwarzP => x.cos() + y.cos() + z.cos(),
            TpmsKind::Diamond => {
                let (sx, cx) = x.sin_cos();
                let (sy, cy) = y.sin_cos();
                let (sz, cz) = z.sin_cos();
                sx * sy * sz + sx * cy * cz + cx * sy * cz + cx * cy * sz
            }
        }
    }

    /// Approximate level-set threshold giving the requested solid volume
    /// fraction for the network (`surface <= threshold` is solid).
    pub fn threshold(self, volume_fraction: f64) -> f64 {
        let vf = volume_fraction.clamp(0.0, 1.0);
        match self {
            TpmsKind::Gyroid | TpmsKind::Diamond => (vf - 0.5) * 3.0,
            TpmsKind::SchwarzP => (vf - 0.5) * 6.0,
        }
    }
}

/// Network TPMS field: negative inside the solid network.
///
/// `cells` is the number of unit cells per cell length and `cell_lengths`
/// the length of a unit cell on each axis, so the period along an axis is
/// `cell_length / cells`.
pub fn sdf_tpms_network(
    point: Vector3<f64>,
    kind: TpmsKind,
    center: Vector3<f64>,
    cells: Vector3<f64>,
    cell_lengths: Vector3<f64>,
    volume_fraction: f64,
) -> f64 {
    let p = point - center;
    let phase = |axis: usize| 2.0 * PI * cells[axis] * p[axis] / cell_lengths[axis];
    kind.surface(phase(0), phase(1), phase(2)) - kind.threshold(volume_fraction)
}
