//! Scalar fields sampled over a design space.
//!
//! A [`ScalarField`] stores one `f64` per design-space sample in the same
//! row-major `[x][y][z]` order as [`DesignSpace::index`]. It is the hand-off
//! format for mesh extraction: resolution, bounds and the flat data array.

use std::sync::Arc;

use nalgebra::Vector3;
use rayon::prelude::*;

use crate::domain::DesignSpace;
use crate::error::{LatticeError, LatticeResult};
use crate::types::BBox3;

/// A dense grid of field values over a [`DesignSpace`].
#[derive(Clone, Debug)]
pub struct ScalarField {
    space: Arc<DesignSpace>,
    data: Vec<f64>,
}

impl ScalarField {
    /// Wrap precomputed values. `data.len()` must equal the number of samples.
    pub fn from_data(space: Arc<DesignSpace>, data: Vec<f64>) -> LatticeResult<Self> {
        if data.len() != space.len() {
            return Err(LatticeError::invalid_parameter(
                "data",
                format!("expected {} samples, got {}", space.len(), data.len()),
            ));
        }
        Ok(Self { space, data })
    }

    /// Evaluate `f` at every sample point. Parallelized across samples.
    pub fn from_fn<F>(space: Arc<DesignSpace>, f: F) -> Self
    where
        F: Fn(Vector3<f64>) -> f64 + Send + Sync,
    {
        let total = space.len();
        let ds = &space;
        let data: Vec<f64> = (0..total)
            .into_par_iter()
            .map(|idx| f(ds.point_at(idx)))
            .collect();
        Self { space, data }
    }

    pub fn space(&self) -> &Arc<DesignSpace> {
        &self.space
    }

    pub fn resolution(&self) -> [usize; 3] {
        self.space.resolution()
    }

    pub fn bounds(&self) -> BBox3 {
        self.space.bounds()
    }

    /// Flat field values in `[x][y][z]` order.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<f64> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value at grid sample `(ix, iy, iz)`.
    pub fn value_at(&self, ix: usize, iy: usize, iz: usize) -> f64 {
        self.data[self.space.index(ix, iy, iz)]
    }

    /// Flat index of the sample nearest to `world`, clamped to the grid.
    pub fn index_at(&self, world: Vector3<f64>) -> usize {
        self.space.nearest_index(world)
    }

    /// Value at the sample nearest to `world`.
    pub fn nearest_value(&self, world: Vector3<f64>) -> f64 {
        self.data[self.index_at(world)]
    }

    /// Trilinear interpolation of the field at `world`. Points outside the
    /// domain are clamped onto its boundary.
    pub fn sample(&self, world: Vector3<f64>) -> f64 {
        let bounds = self.space.bounds();
        let spacing = self.space.spacing();
        let res = self.space.resolution();

        // Per axis: lower cell index and fractional offset inside the cell.
        let mut lo = [0usize; 3];
        let mut t = [0.0f64; 3];
        for axis in 0..3 {
            let n = res[axis];
            if n == 1 {
                continue;
            }
            let u = ((world[axis] - bounds.min[axis]) / spacing[axis]).clamp(0.0, (n - 1) as f64);
            let i = (u.floor() as usize).min(n - 2);
            lo[axis] = i;
            t[axis] = u - i as f64;
        }
        let hi = |axis: usize| (lo[axis] + 1).min(res[axis] - 1);

        let mut acc = 0.0;
        for corner in 0..8 {
            let pick = [corner & 1 != 0, corner & 2 != 0, corner & 4 != 0];
            let mut w = 1.0;
            let mut ijk = [0usize; 3];
            for axis in 0..3 {
                if pick[axis] {
                    w *= t[axis];
                    ijk[axis] = hi(axis);
                } else {
                    w *= 1.0 - t[axis];
                    ijk[axis] = lo[axis];
                }
            }
            if w != 0.0 {
                acc += w * self.value_at(ijk[0], ijk[1], ijk[2]);
            }
        }
        acc
    }

    pub fn min_value(&self) -> f64 {
        self.data.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max_value(&self) -> f64 {
        self.data.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Share of samples inside the solid (value <= 0).
    pub fn solid_fraction(&self) -> f64 {
        let inside = self.data.iter().filter(|&&v| v <= 0.0).count();
        inside as f64 / self.data.len() as f64
    }
}
