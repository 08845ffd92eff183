//! Strut topologies: turning point sets or reference shapes into edge lists.
//!
//! Every builder implements [`TopologyBuilder`] and yields an [`EdgeList`]
//! carrying the bounds it was built in. The strut evaluator consumes any of
//! them through that one trait.

mod delaunay;
mod hilbert;
mod hull;
mod knn;
mod unit_cell;
mod voronoi;

pub use delaunay::{tetrahedralize, DelaunayEdges};
pub use hilbert::{hilbert_point, HilbertPath};
pub use hull::{hull_triangles, ConvexHullEdges};
pub use knn::KnnGraph;
pub use unit_cell::RegularCell;
pub use voronoi::{voronoi_cells, VoronoiCell, VoronoiEdges};

use hashbrown::HashSet;
use nalgebra::Vector3;
use rand::Rng;

use crate::error::{LatticeError, LatticeResult};
use crate::points::seeded;
use crate::types::BBox3;

/// A strategy producing strut edges.
pub trait TopologyBuilder {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    /// Build the edge list.
    ///
    /// # Errors
    ///
    /// Empty input fails with [`LatticeError::EmptyPointCloud`]; too few points
    /// for the underlying algorithm fail with
    /// [`LatticeError::InsufficientPoints`].
    fn build_edges(&self) -> LatticeResult<EdgeList>;
}

/// A strut: an unordered pair of endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub a: Vector3<f64>,
    pub b: Vector3<f64>,
}

impl Edge {
    pub fn new(a: Vector3<f64>, b: Vector3<f64>) -> Self {
        Self { a, b }
    }

    pub fn length(&self) -> f64 {
        (self.b - self.a).norm()
    }

    /// `true` when both endpoints coincide.
    pub fn is_degenerate(&self) -> bool {
        self.a == self.b
    }

    /// The same strut with its endpoints swapped.
    pub fn reversed(&self) -> Self {
        Self { a: self.b, b: self.a }
    }

    /// Orientation-free key on a grid of spacing `tolerance`.
    fn key(&self, tolerance: f64) -> ([i64; 3], [i64; 3]) {
        let qa = quantize(self.a, tolerance);
        let qb = quantize(self.b, tolerance);
        if qa <= qb { (qa, qb) } else { (qb, qa) }
    }
}

fn quantize(p: Vector3<f64>, tolerance: f64) -> [i64; 3] {
    [
        (p.x / tolerance).round() as i64,
        (p.y / tolerance).round() as i64,
        (p.z / tolerance).round() as i64,
    ]
}

/// An ordered sequence of struts plus the bounds they were built in.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeList {
    edges: Vec<Edge>,
    bounds: BBox3,
}

impl EdgeList {
    pub fn new(edges: Vec<Edge>, bounds: BBox3) -> Self {
        Self { edges, bounds }
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn into_edges(self) -> Vec<Edge> {
        self.edges
    }

    pub fn bounds(&self) -> BBox3 {
        self.bounds
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Edge> {
        self.edges.iter()
    }

    /// Sum of strut lengths.
    pub fn total_length(&self) -> f64 {
        self.edges.iter().map(Edge::length).sum()
    }

    /// Append another list's struts, merging bounds.
    pub fn extend(&mut self, other: EdgeList) {
        self.edges.extend(other.edges);
        self.bounds = self.bounds.merge(&other.bounds);
    }

    /// Remove repeated struts, treating `(a, b)` and `(b, a)` as the same
    /// and matching endpoints to a tolerance scaled to the bounds. The first
    /// occurrence is kept, so order is otherwise preserved.
    pub fn dedup(&mut self) {
        self.dedup_within(dedup_tolerance(&self.bounds));
    }

    /// [`EdgeList::dedup`] with an explicit endpoint tolerance.
    pub fn dedup_within(&mut self, tolerance: f64) {
        let mut seen = HashSet::with_capacity(self.edges.len());
        self.edges.retain(|e| seen.insert(e.key(tolerance)));
    }

    /// Consuming form of [`EdgeList::dedup`].
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.dedup();
        self
    }
}

impl<'a> IntoIterator for &'a EdgeList {
    type Item = &'a Edge;
    type IntoIter = std::slice::Iter<'a, Edge>;

    fn into_iter(self) -> Self::IntoIter {
        self.edges.iter()
    }
}

fn dedup_tolerance(bounds: &BBox3) -> f64 {
    bounds.size().norm().max(1.0) * 1e-9
}

// ---------------------------------------------------------------------------
// Shared geometry helpers
// ---------------------------------------------------------------------------

/// Fixed seed for coordinate joggling, so builds are reproducible.
const JOGGLE_SEED: u64 = 0x6a09_e667_f3bc_c908;

/// Copy of `points` with each coordinate displaced by at most
/// `magnitude`. Breaks exact ties (shared axis values, cospherical
/// points) before spatial indexing or triangulation; edges are always
/// emitted with the original coordinates.
pub(crate) fn joggle(points: &[Vector3<f64>], magnitude: f64) -> Vec<Vector3<f64>> {
    let mut rng = seeded(JOGGLE_SEED);
    points
        .iter()
        .map(|p| {
            p + Vector3::new(
                rng.gen_range(-magnitude..=magnitude),
                rng.gen_range(-magnitude..=magnitude),
                rng.gen_range(-magnitude..=magnitude),
            )
        })
        .collect()
}

/// Indices of four points spanning a tetrahedron of non-negligible volume.
///
/// # Errors
///
/// - [`LatticeError::InsufficientPoints`] for fewer than 4 points.
/// - [`LatticeError::DegeneratePointSet`] if all points are coincident,
///   collinear or coplanar.
pub(crate) fn spanning_tetrahedron(points: &[Vector3<f64>]) -> LatticeResult<[usize; 4]> {
    if points.len() < 4 {
        return Err(LatticeError::InsufficientPoints { required: 4, actual: points.len() });
    }
    let bounds = BBox3::from_points(points).ok_or(LatticeError::EmptyPointCloud)?;
    let eps = bounds.size().norm() * 1e-10;

    let farthest = |score: &dyn Fn(&Vector3<f64>) -> f64| -> (usize, f64) {
        points
            .iter()
            .enumerate()
            .map(|(i, p)| (i, score(p)))
            .fold((0, f64::NEG_INFINITY), |best, cur| if cur.1 > best.1 { cur } else { best })
    };

    let i0 = 0;
    let p0 = points[i0];
    let (i1, d1) = farthest(&|p| (p - p0).norm());
    if d1 <= eps {
        return Err(LatticeError::DegeneratePointSet { reason: "all points coincide".into() });
    }
    let axis = (points[i1] - p0) / d1;
    let (i2, d2) = farthest(&|p| {
        let v = p - p0;
        (v - axis * v.dot(&axis)).norm()
    });
    if d2 <= eps {
        return Err(LatticeError::DegeneratePointSet { reason: "all points are collinear".into() });
    }
    let normal = axis.cross(&(points[i2] - p0)).normalize();
    let (i3, d3) = farthest(&|p| (p - p0).dot(&normal).abs());
    if d3 <= eps {
        return Err(LatticeError::DegeneratePointSet { reason: "all points are coplanar".into() });
    }
    Ok([i0, i1, i2, i3])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_treats_reversed_edges_as_equal() {
        let a = Vector3::new(0.0, 0.0, 0.0);
        let b = Vector3::new(1.0, 0.0, 0.0);
        let c = Vector3::new(0.0, 1.0, 0.0);
        let bounds = BBox3::new(a, Vector3::new(1.0, 1.0, 1.0));
        let list = EdgeList::new(vec![Edge::new(a, b), Edge::new(b, a), Edge::new(a, c)], bounds);
        let unique = list.unique();
        assert_eq!(unique.len(), 2);
        assert_eq!(unique.edges()[0], Edge::new(a, b));
    }

    #[test]
    fn coplanar_points_have_no_spanning_tetrahedron() {
        let pts: Vec<_> = (0..10)
            .map(|i| Vector3::new(i as f64, (i * i) as f64, 0.0))
            .collect();
        assert!(matches!(
            spanning_tetrahedron(&pts),
            Err(LatticeError::DegeneratePointSet { .. })
        ));
    }
}
