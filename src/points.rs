//! Point clouds sampled on or inside a reference shape.
//!
//! Box samplers draw unit-cube designs, rescale them onto the reference
//! shape's bounding box and keep only points where the shape's field is
//! `<= 0`. The sphere sampler places points exactly on a sphere's surface
//! and needs no filtering.

use std::f64::consts::PI;

use nalgebra::Vector3;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::error::{LatticeError, LatticeResult};
use crate::shape::Shape;
use crate::types::BBox3;

/// Deterministic RNG for reproducible sampling.
pub fn seeded(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// An ordered set of 3D points plus the bounds of the shape they were drawn
/// from (used to clip Voronoi cells).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    points: Vec<Vector3<f64>>,
    bounds: Option<BBox3>,
}

impl PointCloud {
    /// A cloud from explicit points, with no reference bounds.
    pub fn new(points: Vec<Vector3<f64>>) -> Self {
        Self { points, bounds: None }
    }

    /// Attach reference bounds.
    #[must_use]
    pub fn with_bounds(mut self, bounds: BBox3) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn points(&self) -> &[Vector3<f64>] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Vector3<f64>> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Reference bounds if known.
    pub fn bounds(&self) -> Option<BBox3> {
        self.bounds
    }

    /// Reference bounds, falling back to the points' own bounding box.
    pub fn reference_bounds(&self) -> LatticeResult<BBox3> {
        match self.bounds {
            Some(b) => Ok(b),
            None => BBox3::from_points(&self.points).ok_or(LatticeError::EmptyPointCloud),
        }
    }

    /// # Errors
    ///
    /// [`LatticeError::EmptyPointCloud`] if there are no points.
    pub fn ensure_not_empty(&self) -> LatticeResult<()> {
        if self.points.is_empty() {
            Err(LatticeError::EmptyPointCloud)
        } else {
            Ok(())
        }
    }

    /// Pointwise union: `self`'s points followed by `other`'s, no dedup.
    /// Reference bounds are merged.
    #[must_use]
    pub fn concat(mut self, other: PointCloud) -> PointCloud {
        self.points.extend(other.points);
        self.bounds = match (self.bounds, other.bounds) {
            (Some(a), Some(b)) => Some(a.merge(&b)),
            (a, b) => a.or(b),
        };
        self
    }
}

impl Extend<Vector3<f64>> for PointCloud {
    fn extend<I: IntoIterator<Item = Vector3<f64>>>(&mut self, iter: I) {
        self.points.extend(iter);
    }
}

impl FromIterator<Vector3<f64>> for PointCloud {
    fn from_iter<I: IntoIterator<Item = Vector3<f64>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Samplers
// ---------------------------------------------------------------------------

impl PointCloud {
    /// Independent uniform samples per axis over the shape's bounding box.
    ///
    /// # Errors
    ///
    /// [`LatticeError::EmptyPointCloud`] if no sample lands inside `shape`.
    pub fn random<R: Rng + ?Sized>(n_points: usize, shape: &Shape, rng: &mut R) -> LatticeResult<Self> {
        let unit = (0..n_points)
            .map(|_| Vector3::new(rng.gen::<f64>(), rng.gen::<f64>(), rng.gen::<f64>()))
            .collect();
        Self::place_in(unit, shape)
    }

    /// Latin-hypercube design: each axis is split into `n_points` strata and
    /// every stratum holds exactly one sample before filtering.
    pub fn latin_hypercube<R: Rng + ?Sized>(
        n_points: usize,
        shape: &Shape,
        rng: &mut R,
    ) -> LatticeResult<Self> {
        let n = n_points as f64;
        let mut columns: [Vec<f64>; 3] = Default::default();
        for column in &mut columns {
            let mut strata: Vec<usize> = (0..n_points).collect();
            strata.shuffle(rng);
            *column = strata.into_iter().map(|s| (s as f64 + rng.gen::<f64>()) / n).collect();
        }
        let unit = (0..n_points)
            .map(|i| Vector3::new(columns[0][i], columns[1][i], columns[2][i]))
            .collect();
        Self::place_in(unit, shape)
    }

    /// The largest full-factorial grid with at most `n_points` nodes, levels
    /// spread as evenly as possible across the three axes. Levels include
    /// both box faces; a single level sits mid-box.
    pub fn full_factorial(n_points: usize, shape: &Shape) -> LatticeResult<Self> {
        let levels = factorial_levels(n_points);
        let spread = |count: usize| -> Vec<f64> {
            if count == 1 {
                vec![0.5]
            } else {
                (0..count).map(|i| i as f64 / (count - 1) as f64).collect()
            }
        };
        let (xs, ys, zs) = (spread(levels[0]), spread(levels[1]), spread(levels[2]));
        let mut unit = Vec::with_capacity(levels.iter().product());
        if n_points > 0 {
            for &x in &xs {
                for &y in &ys {
                    for &z in &zs {
                        unit.push(Vector3::new(x, y, z));
                    }
                }
            }
        }
        Self::place_in(unit, shape)
    }

    /// Evenly spread points on the surface of a sphere shape (golden-angle
    /// spiral). No containment filter is applied.
    ///
    /// # Errors
    ///
    /// - [`LatticeError::InvalidParameter`] if `shape` is not a sphere.
    /// - [`LatticeError::EmptyPointCloud`] if `n_points == 0`.
    pub fn on_sphere(n_points: usize, shape: &Shape) -> LatticeResult<Self> {
        let (center, radius) = shape.as_sphere().ok_or_else(|| {
            LatticeError::invalid_parameter("shape", "surface sampling needs a sphere")
        })?;
        let cloud = Self::new(fibonacci_sphere(n_points, center, radius))
            .with_bounds(shape.bounding_box());
        cloud.ensure_not_empty()?;
        Ok(cloud)
    }

    /// Rescale unit-cube samples onto the shape's bounding box and keep the
    /// ones inside the shape.
    fn place_in(unit: Vec<Vector3<f64>>, shape: &Shape) -> LatticeResult<Self> {
        let bounds = shape.bounding_box();
        let size = bounds.size();
        let candidates: Vec<Vector3<f64>> = unit
            .into_iter()
            .map(|u| bounds.min + u.component_mul(&size))
            .collect();
        let values = shape.evaluate_points(&candidates);
        let drawn = candidates.len();
        let points: Vec<Vector3<f64>> = candidates
            .into_iter()
            .zip(values)
            .filter(|(_, v)| *v <= 0.0)
            .map(|(p, _)| p)
            .collect();
        debug!(drawn, kept = points.len(), "filtered point cloud against reference shape");
        let cloud = Self { points, bounds: Some(bounds) };
        cloud.ensure_not_empty()?;
        Ok(cloud)
    }
}

/// Per-axis level counts of the largest grid with at most `n` nodes.
fn factorial_levels(n: usize) -> [usize; 3] {
    let mut levels = [1usize; 3];
    loop {
        let axis = (0..3).min_by_key(|&a| levels[a]).unwrap_or(0);
        let mut grown = levels;
        grown[axis] += 1;
        if grown.iter().product::<usize>() > n {
            return levels;
        }
        levels = grown;
    }
}

/// `n` points spread evenly over a sphere with a golden-angle spiral,
/// from the +Y pole to the -Y pole.
pub fn fibonacci_sphere(n: usize, center: Vector3<f64>, radius: f64) -> Vec<Vector3<f64>> {
    let golden_angle = PI * (3.0 - 5.0_f64.sqrt());
    (0..n)
        .map(|i| {
            let y = if n == 1 { 1.0 } else { 1.0 - 2.0 * i as f64 / (n - 1) as f64 };
            let ring = (1.0 - y * y).max(0.0).sqrt();
            let theta = golden_angle * i as f64;
            center + Vector3::new(theta.cos() * ring, y, theta.sin() * ring) * radius
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factorial_levels_never_exceed_request() {
        for n in 0..200 {
            let levels = factorial_levels(n);
            let total: usize = levels.iter().product();
            assert!(total <= n.max(1), "n={n} gave {levels:?}");
        }
        assert_eq!(factorial_levels(27), [3, 3, 3]);
        assert_eq!(factorial_levels(12), [3, 2, 2]);
    }
}
