use nalgebra::Vector3;
use tracing::debug;

use super::{Edge, EdgeList, TopologyBuilder};
use crate::error::{LatticeError, LatticeResult};
use crate::shape::Shape;
use crate::types::BBox3;

/// Largest supported `iterations * dims`; keeps the index within `u64`
/// and the point count sane.
const MAX_INDEX_BITS: u32 = 30;

/// Hilbert space-filling curve through a reference box.
///
/// The curve visits the `2^(iterations * dims)` cells of a regular grid over
/// the box, placing one point at each cell center, and joins consecutive
/// points. For `dims < 3` the unused axes sit at the box center.
#[derive(Debug, Clone, Copy)]
pub struct HilbertPath {
    bounds: BBox3,
    dims: u32,
    iterations: u32,
}

impl HilbertPath {
    /// A curve filling the bounding box of `reference`.
    pub fn new(reference: &Shape, dims: u32, iterations: u32) -> Self {
        Self::in_bounds(reference.bounding_box(), dims, iterations)
    }

    pub fn in_bounds(bounds: BBox3, dims: u32, iterations: u32) -> Self {
        Self { bounds, dims, iterations }
    }

    /// Number of points on the curve.
    ///
    /// # Errors
    ///
    /// [`LatticeError::InvalidParameter`] for the same parameters that make
    /// [`points`](Self::points) fail.
    pub fn point_count(&self) -> LatticeResult<u64> {
        Ok(1u64 << self.index_bits()?)
    }

    /// Bits in a curve index, `iterations * dims`, once both are in range.
    fn index_bits(&self) -> LatticeResult<u32> {
        self.validate()?;
        Ok(self.iterations * self.dims)
    }

    fn validate(&self) -> LatticeResult<()> {
        if !(1..=3).contains(&self.dims) {
            return Err(LatticeError::invalid_parameter(
                "dims",
                format!("must be 1, 2 or 3, got {}", self.dims),
            ));
        }
        if self.iterations == 0 {
            return Err(LatticeError::invalid_parameter("iterations", "must be at least 1"));
        }
        let bits = self.iterations.checked_mul(self.dims);
        if bits.map_or(true, |b| b > MAX_INDEX_BITS) {
            return Err(LatticeError::invalid_parameter(
                "iterations",
                format!("iterations * dims must not exceed {MAX_INDEX_BITS}"),
            ));
        }
        Ok(())
    }

    /// Curve points in visiting order, mapped into the box.
    pub fn points(&self) -> LatticeResult<Vec<Vector3<f64>>> {
        let count = self.point_count()?;
        let side = (1u64 << self.iterations) as f64;
        let size = self.bounds.size();
        let center = self.bounds.center();
        let points = (0..count)
            .map(|h| {
                let cell = hilbert_point(h, self.iterations, self.dims);
                let mut p = center;
                for (axis, &c) in cell.iter().enumerate() {
                    p[axis] = self.bounds.min[axis] + (c as f64 + 0.5) / side * size[axis];
                }
                p
            })
            .collect();
        Ok(points)
    }
}

impl TopologyBuilder for HilbertPath {
    fn name(&self) -> &'static str {
        "hilbert"
    }

    fn build_edges(&self) -> LatticeResult<EdgeList> {
        let points = self.points()?;
        let edges: Vec<Edge> = points.windows(2).map(|w| Edge::new(w[0], w[1])).collect();
        debug!(
            dims = self.dims,
            iterations = self.iterations,
            edges = edges.len(),
            "built hilbert path"
        );
        Ok(EdgeList::new(edges, self.bounds))
    }
}

/// Integer grid coordinates of the `h`-th cell on a Hilbert curve with
/// `order` bits per axis in `dims` dimensions (Skilling's transpose
/// method). Consecutive indices map to cells sharing a face.
pub fn hilbert_point(h: u64, order: u32, dims: u32) -> Vec<u64> {
    let n = dims as usize;
    let p = order;
    if n == 0 || p == 0 {
        return vec![0; n];
    }

    // Deinterleave: bit k of axis i comes from bit (k * n + n - 1 - i) of h.
    let mut x = vec![0u64; n];
    for k in 0..p {
        for (i, xi) in x.iter_mut().enumerate() {
            let bit = (h >> (k as usize * n + (n - 1 - i))) & 1;
            *xi |= bit << k;
        }
    }

    // Gray decode.
    let t = x[n - 1] >> 1;
    for i in (1..n).rev() {
        x[i] ^= x[i - 1];
    }
    x[0] ^= t;

    // Undo excess work.
    let top = 1u64 << p;
    let mut q = 2u64;
    while q != top {
        let mask = q - 1;
        for i in (0..n).rev() {
            if x[i] & q != 0 {
                x[0] ^= mask;
            } else {
                let t = (x[0] ^ x[i]) & mask;
                x[0] ^= t;
                x[i] ^= t;
            }
        }
        q <<= 1;
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consecutive_cells_are_face_neighbours() {
        for dims in 1..=3 {
            let order = 3;
            let count = 1u64 << (order * dims);
            let cells: Vec<Vec<u64>> = (0..count).map(|h| hilbert_point(h, order, dims)).collect();
            for w in cells.windows(2) {
                let step: u64 = w[0].iter().zip(&w[1]).map(|(a, b)| a.abs_diff(*b)).sum();
                assert_eq!(step, 1, "dims={dims} {:?} -> {:?}", w[0], w[1]);
            }
            let mut sorted = cells.clone();
            sorted.sort();
            sorted.dedup();
            assert_eq!(sorted.len() as u64, count);
        }
    }

    #[test]
    fn curve_starts_at_origin_cell() {
        assert_eq!(hilbert_point(0, 2, 3), vec![0, 0, 0]);
    }
}
