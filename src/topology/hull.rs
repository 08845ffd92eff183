use chull::ConvexHullWrapper;
use hashbrown::hash_map::Entry;
use hashbrown::HashMap;
use nalgebra::Vector3;
use tracing::debug;

use super::{spanning_tetrahedron, Edge, EdgeList, TopologyBuilder};
use crate::error::{LatticeError, LatticeResult};
use crate::params::EdgeMode;
use crate::points::PointCloud;

/// Convex-hull triangle edges, built on `chull`'s quickhull.
///
/// Every hull triangle contributes its three edges. In [`EdgeMode::Raw`]
/// each hull edge therefore appears twice (once per adjacent triangle);
/// [`EdgeMode::Unique`] keeps one copy.
#[derive(Debug, Clone, Copy)]
pub struct ConvexHullEdges<'a> {
    cloud: &'a PointCloud,
    mode: EdgeMode,
}

impl<'a> ConvexHullEdges<'a> {
    pub fn new(cloud: &'a PointCloud) -> Self {
        Self { cloud, mode: EdgeMode::Raw }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: EdgeMode) -> Self {
        self.mode = mode;
        self
    }
}

impl TopologyBuilder for ConvexHullEdges<'_> {
    fn name(&self) -> &'static str {
        "convex-hull"
    }

    fn build_edges(&self) -> LatticeResult<EdgeList> {
        self.cloud.ensure_not_empty()?;
        let points = self.cloud.points();
        let triangles = hull_triangles(points)?;
        let mut edges = Vec::with_capacity(triangles.len() * 3);
        for t in &triangles {
            for k in 0..3 {
                edges.push(Edge::new(points[t[k]], points[t[(k + 1) % 3]]));
            }
        }
        let mut list = EdgeList::new(edges, self.cloud.reference_bounds()?);
        if self.mode == EdgeMode::Unique {
            list.dedup();
        }
        debug!(triangles = triangles.len(), edges = list.len(), mode = ?self.mode, "built hull edges");
        Ok(list)
    }
}

/// Triangles of the convex hull of `points`, as indices into `points`.
/// Points lying inside the hull or on a hull face within tolerance are not
/// used as vertices. Repeated points resolve to their first occurrence.
///
/// # Errors
///
/// - [`LatticeError::InsufficientPoints`] for fewer than 4 points.
/// - [`LatticeError::DegeneratePointSet`] if the points do not span three
///   dimensions, or the hull construction fails on them.
pub fn hull_triangles(points: &[Vector3<f64>]) -> LatticeResult<Vec<[usize; 3]>> {
    spanning_tetrahedron(points)?;

    // Hull vertices come back as copies of input coordinates; they are
    // mapped to input indices by their bit patterns.
    let mut first_index: HashMap<[u64; 3], usize> = HashMap::with_capacity(points.len());
    let mut coords: Vec<Vec<f64>> = Vec::with_capacity(points.len());
    for (i, p) in points.iter().enumerate() {
        if let Entry::Vacant(slot) = first_index.entry(bit_key(p.x, p.y, p.z)) {
            slot.insert(i);
            coords.push(vec![p.x, p.y, p.z]);
        }
    }
    let hull = ConvexHullWrapper::try_new(&coords, None).map_err(|_| {
        LatticeError::DegeneratePointSet { reason: "quickhull rejected the point set".to_string() }
    })?;
    let (vertices, indices) = hull.vertices_indices();
    let original = vertices
        .iter()
        .map(|v| {
            first_index.get(&bit_key(v[0], v[1], v[2])).copied().ok_or_else(|| {
                LatticeError::DegeneratePointSet {
                    reason: "convex hull returned a vertex outside the input".to_string(),
                }
            })
        })
        .collect::<LatticeResult<Vec<usize>>>()?;

    Ok(indices
        .chunks_exact(3)
        .map(|t| [original[t[0]], original[t[1]], original[t[2]]])
        .collect())
}

fn bit_key(x: f64, y: f64, z: f64) -> [u64; 3] {
    [x.to_bits(), y.to_bits(), z.to_bits()]
}
