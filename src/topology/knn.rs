use hashbrown::HashSet;
use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::Vector3;
use tracing::debug;

use super::{joggle, Edge, EdgeList, TopologyBuilder};
use crate::error::{LatticeError, LatticeResult};
use crate::params::Neighbourhood;
use crate::points::PointCloud;

/// Nearest-neighbour graph: each point is joined to the other members of
/// its `k`-point neighbourhood, or to every point within a radius.
///
/// The neighbourhood of a point includes the point itself, so `k = 4` links
/// each point to its 3 nearest others.
///
/// Each undirected edge appears once, in the orientation first discovered
/// when walking points in cloud order. Coincident points never produce a
/// strut.
#[derive(Debug, Clone, Copy)]
pub struct KnnGraph<'a> {
    cloud: &'a PointCloud,
    neighbourhood: Neighbourhood,
}

impl<'a> KnnGraph<'a> {
    pub fn new(cloud: &'a PointCloud, neighbourhood: Neighbourhood) -> Self {
        Self { cloud, neighbourhood }
    }

    /// Neighbourhoods of `k` points, the query point included.
    pub fn with_k(cloud: &'a PointCloud, k: usize) -> Self {
        Self::new(cloud, Neighbourhood::Count(k))
    }

    /// All neighbours within `radius`.
    pub fn with_radius(cloud: &'a PointCloud, radius: f64) -> Self {
        Self::new(cloud, Neighbourhood::Radius(radius))
    }

    pub fn neighbourhood(&self) -> Neighbourhood {
        self.neighbourhood
    }

    /// Neighbour indices of point `i`, nearest first, excluding `i` itself.
    fn neighbours(&self, tree: &KdTree<f64, 3>, query: &[f64; 3], i: usize) -> Vec<usize> {
        let found = match self.neighbourhood {
            Neighbourhood::Count(k) => tree.nearest_n::<SquaredEuclidean>(query, k),
            Neighbourhood::Radius(r) => tree.within::<SquaredEuclidean>(query, r * r),
        };
        let mut out: Vec<usize> = found
            .into_iter()
            .map(|n| n.item as usize)
            .filter(|&j| j != i)
            .collect();
        if let Neighbourhood::Count(k) = self.neighbourhood {
            out.truncate(k - 1);
        }
        out
    }
}

impl TopologyBuilder for KnnGraph<'_> {
    fn name(&self) -> &'static str {
        "knn"
    }

    fn build_edges(&self) -> LatticeResult<EdgeList> {
        self.cloud.ensure_not_empty()?;
        self.neighbourhood.validate()?;
        let points = self.cloud.points();
        if points.len() < 2 {
            return Err(LatticeError::InsufficientPoints { required: 2, actual: points.len() });
        }
        let bounds = self.cloud.reference_bounds()?;

        // The tree is built on joggled copies so long runs of equal axis
        // values (grid samples) stay within kiddo's bucket limits. Points are
        // moved to a local origin first; far from the world origin the jitter
        // would otherwise round away.
        let origin = points.iter().fold(points[0], |m, p| m.inf(p));
        let local: Vec<Vector3<f64>> = points.iter().map(|p| p - origin).collect();
        let extent = local.iter().fold(0.0_f64, |m, p| m.max(p.amax()));
        let jittered = joggle(&local, extent.max(1.0) * 1e-12);
        let mut tree: KdTree<f64, 3> = KdTree::new();
        for (i, p) in jittered.iter().enumerate() {
            tree.add(&[p.x, p.y, p.z], i as u64);
        }

        let mut seen: HashSet<(usize, usize)> = HashSet::new();
        let mut edges = Vec::new();
        let mut coincident = 0usize;
        for (i, p) in jittered.iter().enumerate() {
            for j in self.neighbours(&tree, &[p.x, p.y, p.z], i) {
                if !seen.insert((i.min(j), i.max(j))) {
                    continue;
                }
                let edge = Edge::new(points[i], points[j]);
                if edge.is_degenerate() {
                    coincident += 1;
                    continue;
                }
                edges.push(edge);
            }
        }
        debug!(
            points = points.len(),
            edges = edges.len(),
            coincident,
            "built nearest-neighbour graph"
        );
        Ok(EdgeList::new(edges, bounds))
    }
}
