use nalgebra::Vector3;
use tracing::debug;

use super::{Edge, EdgeList, TopologyBuilder};
use crate::error::{LatticeError, LatticeResult};
use crate::points::PointCloud;
use crate::types::BBox3;

/// Edges of the Voronoi tessellation of a point cloud, clipped to the
/// cloud's reference bounds.
///
/// Every face of every cell contributes its closed polygon (last vertex
/// joined back to the first). Faces shared by two cells are emitted once:
/// the result is deduplicated as unordered pairs.
#[derive(Debug, Clone, Copy)]
pub struct VoronoiEdges<'a> {
    cloud: &'a PointCloud,
}

impl<'a> VoronoiEdges<'a> {
    pub fn new(cloud: &'a PointCloud) -> Self {
        Self { cloud }
    }
}

impl TopologyBuilder for VoronoiEdges<'_> {
    fn name(&self) -> &'static str {
        "voronoi"
    }

    fn build_edges(&self) -> LatticeResult<EdgeList> {
        self.cloud.ensure_not_empty()?;
        let bounds = self.cloud.reference_bounds()?;
        if bounds.is_empty() || bounds.size().min() <= 0.0 {
            return Err(LatticeError::DegeneratePointSet {
                reason: "voronoi bounds have no volume".into(),
            });
        }
        let cells = voronoi_cells(self.cloud.points(), bounds);
        let mut edges = Vec::new();
        for cell in &cells {
            for face in &cell.faces {
                for k in 0..face.len() {
                    let edge = Edge::new(face[k], face[(k + 1) % face.len()]);
                    if !edge.is_degenerate() {
                        edges.push(edge);
                    }
                }
            }
        }
        let mut list = EdgeList::new(edges, bounds);
        let raw = list.len();
        list.dedup_within(weld_tolerance(&bounds));
        debug!(cells = cells.len(), raw, edges = list.len(), "built voronoi edges");
        Ok(list)
    }
}

/// A bounded Voronoi cell as a convex polyhedron.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoronoiCell {
    /// Site the cell belongs to.
    pub site: Vector3<f64>,
    /// Face polygons, each ordered counter-clockwise seen from outside.
    pub faces: Vec<Vec<Vector3<f64>>>,
}

impl VoronoiCell {
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Distinct vertex count (Euler check: `V - E + F = 2`).
    pub fn vertex_count(&self) -> usize {
        let mut seen: Vec<Vector3<f64>> = Vec::new();
        for p in self.faces.iter().flatten() {
            if !seen.iter().any(|q| (q - p).norm() < 1e-9) {
                seen.push(*p);
            }
        }
        seen.len()
    }
}

/// Voronoi cells of `sites` clipped to `bounds`, one per site in input
/// order. A site sharing its position with an earlier site gets an empty
/// cell.
pub fn voronoi_cells(sites: &[Vector3<f64>], bounds: BBox3) -> Vec<VoronoiCell> {
    let tol = weld_tolerance(&bounds);
    sites
        .iter()
        .enumerate()
        .map(|(i, &site)| {
            let mut faces = box_faces(&bounds);
            if sites[..i].iter().any(|s| (s - site).norm() <= tol) {
                return VoronoiCell { site, faces: Vec::new() };
            }
            let mut order: Vec<(f64, usize)> = sites
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(j, s)| ((s - site).norm(), j))
                .collect();
            order.sort_by(|a, b| a.0.total_cmp(&b.0));
            for (dist, j) in order {
                if dist <= tol {
                    continue;
                }
                // Farther sites cannot cut a cell this small.
                let reach = faces
                    .iter()
                    .flatten()
                    .fold(0.0_f64, |m, p| m.max((p - site).norm()));
                if dist * 0.5 > reach + tol {
                    break;
                }
                let normal = (sites[j] - site) / dist;
                let offset = normal.dot(&((sites[j] + site) * 0.5));
                faces = clip(faces, normal, offset, tol);
                if faces.is_empty() {
                    break;
                }
            }
            VoronoiCell { site, faces }
        })
        .collect()
}

fn weld_tolerance(bounds: &BBox3) -> f64 {
    bounds.size().norm().max(1.0) * 1e-7
}

/// The six faces of an axis-aligned box, counter-clockwise from outside.
fn box_faces(b: &BBox3) -> Vec<Vec<Vector3<f64>>> {
    let c = b.corners();
    vec![
        vec![c[0], c[3], c[2], c[1]], // z = min
        vec![c[4], c[5], c[6], c[7]], // z = max
        vec![c[0], c[1], c[5], c[4]], // y = min
        vec![c[3], c[7], c[6], c[2]], // y = max
        vec![c[0], c[4], c[7], c[3]], // x = min
        vec![c[1], c[2], c[6], c[5]], // x = max
    ]
}

/// Keep the part of a convex polyhedron with `normal . x <= offset`,
/// capping the cut with a new face.
fn clip(
    faces: Vec<Vec<Vector3<f64>>>,
    normal: Vector3<f64>,
    offset: f64,
    tol: f64,
) -> Vec<Vec<Vector3<f64>>> {
    let mut kept = Vec::with_capacity(faces.len() + 1);
    let mut section: Vec<Vector3<f64>> = Vec::new();
    for face in faces {
        let mut out = Vec::with_capacity(face.len() + 1);
        for k in 0..face.len() {
            let cur = face[k];
            let next = face[(k + 1) % face.len()];
            let dc = normal.dot(&cur) - offset;
            let dn = normal.dot(&next) - offset;
            if dc <= tol {
                out.push(cur);
                if dc.abs() <= tol {
                    section.push(cur);
                }
            }
            if (dc < -tol && dn > tol) || (dc > tol && dn < -tol) {
                let hit = cur + (next - cur) * (dc / (dc - dn));
                out.push(hit);
                section.push(hit);
            }
        }
        let out = weld(out, tol);
        if out.len() >= 3 {
            kept.push(out);
        }
    }
    if kept.is_empty() {
        return kept;
    }

    let mut cap: Vec<Vector3<f64>> = Vec::new();
    for p in section {
        if !cap.iter().any(|q| (q - p).norm() <= tol) {
            cap.push(p);
        }
    }
    if cap.len() >= 3 {
        let centroid = cap.iter().sum::<Vector3<f64>>() / cap.len() as f64;
        // A section through a single edge has no area and no cap.
        if let Some(u) = (cap[0] - centroid).try_normalize(tol) {
            let v = normal.cross(&u);
            cap.sort_by(|a, b| {
                let (da, db) = (a - centroid, b - centroid);
                da.dot(&v).atan2(da.dot(&u)).total_cmp(&db.dot(&v).atan2(db.dot(&u)))
            });
            // Skip caps lying on an existing face (cut plane touching the cell).
            let duplicate = kept.iter().any(|f| {
                f.len() == cap.len()
                    && cap.iter().all(|p| f.iter().any(|q| (q - p).norm() <= tol))
            });
            if !duplicate {
                kept.push(cap);
            }
        }
    }
    kept
}

/// Drop consecutive (and wrap-around) repeated vertices.
fn weld(mut poly: Vec<Vector3<f64>>, tol: f64) -> Vec<Vector3<f64>> {
    poly.dedup_by(|a, b| (*a - *b).norm() <= tol);
    while poly.len() > 1 && (poly[0] - poly[poly.len() - 1]).norm() <= tol {
        poly.pop();
    }
    poly
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_sites_split_the_box() {
        let bounds = BBox3::new(Vector3::zeros(), Vector3::new(2.0, 1.0, 1.0));
        let sites = [Vector3::new(0.5, 0.5, 0.5), Vector3::new(1.5, 0.5, 0.5)];
        let cells = voronoi_cells(&sites, bounds);
        for cell in &cells {
            assert_eq!(cell.faces.len(), 6);
            assert_eq!(cell.vertex_count(), 8);
        }
        assert!(cells[0].faces.iter().flatten().all(|p| p.x <= 1.0 + 1e-9));
        assert!(cells[1].faces.iter().flatten().all(|p| p.x >= 1.0 - 1e-9));
    }

    #[test]
    fn lone_site_keeps_the_box() {
        let bounds = BBox3::new(Vector3::zeros(), Vector3::new(1.0, 1.0, 1.0));
        let cells = voronoi_cells(&[Vector3::new(0.3, 0.3, 0.3)], bounds);
        assert_eq!(cells[0].faces.len(), 6);
    }
}
