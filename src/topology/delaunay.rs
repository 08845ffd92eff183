use hashbrown::HashMap;
use nalgebra::{Matrix3, Vector3};
use tracing::debug;

use super::{joggle, spanning_tetrahedron, Edge, EdgeList, TopologyBuilder};
use crate::error::LatticeResult;
use crate::params::EdgeMode;
use crate::points::PointCloud;

/// Delaunay tetrahedralization edges.
///
/// Every tetrahedron contributes its four edges `0-1, 1-2, 2-3, 3-0` in
/// vertex order. In [`EdgeMode::Raw`] edges shared between neighbouring
/// tetrahedra are repeated; [`EdgeMode::Unique`] drops the repeats.
#[derive(Debug, Clone, Copy)]
pub struct DelaunayEdges<'a> {
    cloud: &'a PointCloud,
    mode: EdgeMode,
}

impl<'a> DelaunayEdges<'a> {
    pub fn new(cloud: &'a PointCloud) -> Self {
        Self { cloud, mode: EdgeMode::Raw }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: EdgeMode) -> Self {
        self.mode = mode;
        self
    }
}

impl TopologyBuilder for DelaunayEdges<'_> {
    fn name(&self) -> &'static str {
        "delaunay"
    }

    fn build_edges(&self) -> LatticeResult<EdgeList> {
        self.cloud.ensure_not_empty()?;
        let points = self.cloud.points();
        let tets = tetrahedralize(points)?;
        let mut edges = Vec::with_capacity(tets.len() * 4);
        for t in &tets {
            for k in 0..4 {
                edges.push(Edge::new(points[t[k]], points[t[(k + 1) % 4]]));
            }
        }
        let mut list = EdgeList::new(edges, self.cloud.reference_bounds()?);
        if self.mode == EdgeMode::Unique {
            list.dedup();
        }
        debug!(tetrahedra = tets.len(), edges = list.len(), mode = ?self.mode, "built delaunay edges");
        Ok(list)
    }
}

// ---------------------------------------------------------------------------
// Bowyer-Watson
// ---------------------------------------------------------------------------

/// Half-width of the enclosing tetrahedron, in units of the normalised
/// point-set extent.
const SUPER_SCALE: f64 = 1.0e3;

#[derive(Debug, Clone, Copy)]
struct Tet {
    v: [usize; 4],
    center: Vector3<f64>,
    radius_sq: f64,
}

impl Tet {
    fn new(v: [usize; 4], pts: &[Vector3<f64>]) -> Self {
        match circumsphere(pts[v[0]], pts[v[1]], pts[v[2]], pts[v[3]]) {
            Some((center, radius_sq)) => Self { v, center, radius_sq },
            // A flat sliver: any later point will replace it.
            None => Self {
                v,
                center: (pts[v[0]] + pts[v[1]] + pts[v[2]] + pts[v[3]]) / 4.0,
                radius_sq: f64::INFINITY,
            },
        }
    }

    fn faces(&self) -> [[usize; 3]; 4] {
        let [a, b, c, d] = self.v;
        [[a, b, c], [a, b, d], [a, c, d], [b, c, d]]
    }
}

/// Center and squared radius of the sphere through four points, `None` if
/// they are (nearly) coplanar.
fn circumsphere(
    a: Vector3<f64>,
    b: Vector3<f64>,
    c: Vector3<f64>,
    d: Vector3<f64>,
) -> Option<(Vector3<f64>, f64)> {
    let (u, v, w) = (b - a, c - a, d - a);
    let det = u.dot(&v.cross(&w));
    if det.abs() <= 1e-14 * u.norm() * v.norm() * w.norm() {
        return None;
    }
    let m = Matrix3::from_rows(&[u.transpose(), v.transpose(), w.transpose()]);
    let rhs = Vector3::new(u.norm_squared(), v.norm_squared(), w.norm_squared()) * 0.5;
    let x = m.lu().solve(&rhs)?;
    Some((a + x, x.norm_squared()))
}

/// Delaunay tetrahedralization of `points` (Bowyer-Watson).
///
/// Returns vertex-index quadruples into `points`. The input is normalised
/// and slightly joggled first so cospherical configurations such as grid
/// samples still triangulate.
///
/// # Errors
///
/// - [`LatticeError::InsufficientPoints`](crate::LatticeError::InsufficientPoints)
///   for fewer than 4 points.
/// - [`LatticeError::DegeneratePointSet`](crate::LatticeError::DegeneratePointSet)
///   if the points do not span three dimensions.
pub fn tetrahedralize(points: &[Vector3<f64>]) -> LatticeResult<Vec<[usize; 4]>> {
    spanning_tetrahedron(points)?;
    let n = points.len();

    let lo = points.iter().fold(points[0], |m, p| m.inf(p));
    let hi = points.iter().fold(points[0], |m, p| m.sup(p));
    let center = (lo + hi) * 0.5;
    let extent = (hi - lo).max();
    let normalised: Vec<Vector3<f64>> = points.iter().map(|p| (p - center) / extent).collect();
    let mut pts = joggle(&normalised, 1e-9);

    let s = SUPER_SCALE;
    pts.extend_from_slice(&[
        Vector3::new(s, s, s),
        Vector3::new(-s, -s, s),
        Vector3::new(-s, s, -s),
        Vector3::new(s, -s, -s),
    ]);
    let mut tets = vec![Tet::new([n, n + 1, n + 2, n + 3], &pts)];

    for i in 0..n {
        let p = pts[i];
        let (bad, good): (Vec<Tet>, Vec<Tet>) = tets
            .into_iter()
            .partition(|t| (p - t.center).norm_squared() < t.radius_sq);
        tets = good;

        // Cavity boundary: faces used by exactly one removed tetrahedron.
        let mut faces: HashMap<[usize; 3], (usize, [usize; 3])> = HashMap::new();
        for t in &bad {
            for face in t.faces() {
                let mut key = face;
                key.sort_unstable();
                faces.entry(key).or_insert((0, face)).0 += 1;
            }
        }
        // Sorted so the output order does not depend on hash iteration.
        let mut boundary: Vec<([usize; 3], [usize; 3])> = faces
            .into_iter()
            .filter(|(_, (count, _))| *count == 1)
            .map(|(key, (_, face))| (key, face))
            .collect();
        boundary.sort_unstable_by_key(|(key, _)| *key);
        for (_, face) in boundary {
            tets.push(Tet::new([face[0], face[1], face[2], i], &pts));
        }
    }

    let result: Vec<[usize; 4]> = tets
        .into_iter()
        .filter(|t| t.v.iter().all(|&v| v < n))
        .map(|t| {
            let mut v = t.v;
            v.sort_unstable();
            v
        })
        .collect();
    debug!(points = n, tetrahedra = result.len(), "tetrahedralized point set");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_tetrahedron() {
        let pts = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        ];
        let tets = tetrahedralize(&pts).unwrap();
        assert_eq!(tets, vec![[0, 1, 2, 3]]);
    }

    #[test]
    fn cube_corners_fill_the_cube() {
        let pts: Vec<_> = crate::types::BBox3::new(Vector3::zeros(), Vector3::new(1.0, 1.0, 1.0))
            .corners()
            .to_vec();
        let tets = tetrahedralize(&pts).unwrap();
        let volume: f64 = tets
            .iter()
            .map(|t| {
                let (a, b, c, d) = (pts[t[0]], pts[t[1]], pts[t[2]], pts[t[3]]);
                ((b - a).dot(&(c - a).cross(&(d - a)))).abs() / 6.0
            })
            .sum();
        assert!((volume - 1.0).abs() < 1e-9, "volume {volume}");
    }
}
