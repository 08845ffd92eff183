//! The sampled design space every shape is evaluated over.
//!
//! A [`DesignSpace`] is an axis-aligned box split into `nx * ny * nz` sample
//! points. Sample coordinates include both bounds on each axis
//! (`x_i = xmin + i * (xmax - xmin) / (nx - 1)`); a single-sample axis sits
//! at its lower bound. Flat grid storage is row-major `[x][y][z]`, i.e.
//! index = `ix * ny * nz + iy * nz + iz`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use nalgebra::Vector3;

use crate::error::{LatticeError, LatticeResult};
use crate::types::BBox3;

static NEXT_DOMAIN_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one constructed design space, used as a cache key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomainId(u64);

impl DomainId {
    fn next() -> Self {
        Self(NEXT_DOMAIN_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A discretized 3D sample domain. Immutable once constructed.
///
/// Equality compares bounds and resolution, not identity: two separately
/// built spaces with the same grid are interchangeable for evaluation but
/// keep distinct [`DomainId`]s.
#[derive(Debug)]
pub struct DesignSpace {
    id: DomainId,
    bounds: BBox3,
    resolution: [usize; 3],
}

impl PartialEq for DesignSpace {
    fn eq(&self, other: &Self) -> bool {
        self.bounds == other.bounds && self.resolution == other.resolution
    }
}

impl DesignSpace {
    /// Build a design space from explicit bounds and per-axis resolution.
    ///
    /// # Errors
    ///
    /// [`LatticeError::InvalidDomain`] if any resolution is zero, any bound is
    /// non-finite, or `max <= min` on some axis.
    pub fn new(bounds: BBox3, resolution: [usize; 3]) -> LatticeResult<Arc<Self>> {
        const AXES: [&str; 3] = ["x", "y", "z"];
        for (axis, &n) in resolution.iter().enumerate() {
            if n == 0 {
                return Err(LatticeError::InvalidDomain {
                    reason: format!("{} resolution must be positive", AXES[axis]),
                });
            }
            let (lo, hi) = (bounds.min[axis], bounds.max[axis]);
            if !lo.is_finite() || !hi.is_finite() {
                return Err(LatticeError::InvalidDomain {
                    reason: format!("{} bounds must be finite, got [{lo}, {hi}]", AXES[axis]),
                });
            }
            if hi <= lo {
                return Err(LatticeError::InvalidDomain {
                    reason: format!("{}max ({hi}) must exceed {}min ({lo})", AXES[axis], AXES[axis]),
                });
            }
        }
        Ok(Arc::new(Self { id: DomainId::next(), bounds, resolution }))
    }

    /// Per-axis bounds `[min, max]` with a per-axis resolution.
    pub fn from_limits(
        x: [f64; 2],
        y: [f64; 2],
        z: [f64; 2],
        resolution: [usize; 3],
    ) -> LatticeResult<Arc<Self>> {
        Self::new(
            BBox3::new(Vector3::new(x[0], y[0], z[0]), Vector3::new(x[1], y[1], z[1])),
            resolution,
        )
    }

    /// A cube `[min, max]^3` sampled with the same resolution on every axis.
    pub fn cube(min: f64, max: f64, resolution: usize) -> LatticeResult<Arc<Self>> {
        Self::from_limits([min, max], [min, max], [min, max], [resolution; 3])
    }

    pub fn id(&self) -> DomainId {
        self.id
    }

    pub fn bounds(&self) -> BBox3 {
        self.bounds
    }

    pub fn resolution(&self) -> [usize; 3] {
        self.resolution
    }

    /// Total number of sample points.
    pub fn len(&self) -> usize {
        self.resolution.iter().product()
    }

    /// Always `false`: construction rejects zero resolution.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distance between neighbouring samples along each axis
    /// (zero on a single-sample axis).
    pub fn spacing(&self) -> Vector3<f64> {
        let size = self.bounds.size();
        Vector3::from_fn(|axis, _| {
            let n = self.resolution[axis];
            if n > 1 { size[axis] / (n - 1) as f64 } else { 0.0 }
        })
    }

    /// Sample coordinates along one axis (0 = x, 1 = y, 2 = z).
    pub fn axis(&self, axis: usize) -> Vec<f64> {
        let n = self.resolution[axis];
        let lo = self.bounds.min[axis];
        let step = self.spacing()[axis];
        (0..n).map(|i| lo + i as f64 * step).collect()
    }

    /// Flat index of grid sample `(ix, iy, iz)`.
    pub fn index(&self, ix: usize, iy: usize, iz: usize) -> usize {
        let [_, ny, nz] = self.resolution;
        ix * ny * nz + iy * nz + iz
    }

    /// Inverse of [`DesignSpace::index`].
    pub fn unravel(&self, idx: usize) -> (usize, usize, usize) {
        let [_, ny, nz] = self.resolution;
        (idx / (ny * nz), (idx / nz) % ny, idx % nz)
    }

    /// World-space position of grid sample `(ix, iy, iz)`.
    pub fn point(&self, ix: usize, iy: usize, iz: usize) -> Vector3<f64> {
        self.bounds.min + self.spacing().component_mul(&Vector3::new(ix as f64, iy as f64, iz as f64))
    }

    /// World-space position of the sample at flat index `idx`.
    pub fn point_at(&self, idx: usize) -> Vector3<f64> {
        let (ix, iy, iz) = self.unravel(idx);
        self.point(ix, iy, iz)
    }

    /// Grid indices of the sample nearest to `world`, clamped into the grid.
    pub fn nearest(&self, world: Vector3<f64>) -> (usize, usize, usize) {
        let spacing = self.spacing();
        let rel = world - self.bounds.min;
        let snap = |axis: usize| -> usize {
            let n = self.resolution[axis];
            if n == 1 {
                return 0;
            }
            let i = (rel[axis] / spacing[axis]).round();
            i.clamp(0.0, (n - 1) as f64) as usize
        };
        (snap(0), snap(1), snap(2))
    }

    /// Flat index of the sample nearest to `world`.
    pub fn nearest_index(&self, world: Vector3<f64>) -> usize {
        let (ix, iy, iz) = self.nearest(world);
        self.index(ix, iy, iz)
    }

    /// The three broadcast coordinate arrays (X, Y, Z), each holding one value
    /// per sample in flat grid order.
    pub fn coordinate_grids(&self) -> [Vec<f64>; 3] {
        let [xs, ys, zs] = [self.axis(0), self.axis(1), self.axis(2)];
        let n = self.len();
        let mut grids = [Vec::with_capacity(n), Vec::with_capacity(n), Vec::with_capacity(n)];
        for &x in &xs {
            for &y in &ys {
                for &z in &zs {
                    grids[0].push(x);
                    grids[1].push(y);
                    grids[2].push(z);
                }
            }
        }
        grids
    }

    /// Fails with [`LatticeError::DomainMismatch`] unless both spaces sample
    /// the same grid.
    pub fn ensure_same(&self, other: &DesignSpace) -> LatticeResult<()> {
        if self.id == other.id || self == other {
            Ok(())
        } else {
            Err(LatticeError::DomainMismatch)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trips_through_unravel() {
        let ds = DesignSpace::from_limits([0.0, 1.0], [0.0, 2.0], [0.0, 3.0], [3, 4, 5]).unwrap();
        for idx in 0..ds.len() {
            let (ix, iy, iz) = ds.unravel(idx);
            assert_eq!(ds.index(ix, iy, iz), idx);
        }
    }

    #[test]
    fn spacing_includes_both_bounds() {
        let ds = DesignSpace::cube(-1.0, 1.0, 5).unwrap();
        let xs = ds.axis(0);
        assert_eq!(xs.len(), 5);
        assert!((xs[0] + 1.0).abs() < 1e-12);
        assert!((xs[4] - 1.0).abs() < 1e-12);
        assert!((xs[2]).abs() < 1e-12);
    }

    #[test]
    fn ids_are_unique() {
        let a = DesignSpace::cube(0.0, 1.0, 4).unwrap();
        let b = DesignSpace::cube(0.0, 1.0, 4).unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(*a, *b);
    }
}
