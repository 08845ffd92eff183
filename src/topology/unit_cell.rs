use nalgebra::Vector3;
use tracing::debug;

use super::{Edge, EdgeList, TopologyBuilder};
use crate::error::{LatticeError, LatticeResult};
use crate::shape::Shape;
use crate::types::BBox3;

/// Single body-centred unit cell.
///
/// The reference box is divided into `n_cells` per axis; the first cell (at
/// the box's minimum corner) contributes its 8 corners and its centroid,
/// and one strut runs from each corner to the centroid. The cell is not
/// tiled across the box.
#[derive(Debug, Clone, Copy)]
pub struct RegularCell {
    bounds: BBox3,
    n_cells: [usize; 3],
}

impl RegularCell {
    pub fn new(reference: &Shape, n_cells: [usize; 3]) -> Self {
        Self::in_bounds(reference.bounding_box(), n_cells)
    }

    /// Same cell count on every axis.
    pub fn uniform(reference: &Shape, n_cells: usize) -> Self {
        Self::new(reference, [n_cells; 3])
    }

    pub fn in_bounds(bounds: BBox3, n_cells: [usize; 3]) -> Self {
        Self { bounds, n_cells }
    }

    /// Extent of one cell.
    pub fn cell_size(&self) -> Vector3<f64> {
        let n = Vector3::new(self.n_cells[0] as f64, self.n_cells[1] as f64, self.n_cells[2] as f64);
        self.bounds.size().component_div(&n)
    }

    /// The cell's 8 corners followed by its centroid.
    pub fn vertices(&self) -> LatticeResult<[Vector3<f64>; 9]> {
        if self.n_cells.contains(&0) {
            return Err(LatticeError::invalid_parameter("n_cells", "must be at least 1 per axis"));
        }
        let cell = BBox3::new(self.bounds.min, self.bounds.min + self.cell_size());
        let c = cell.corners();
        Ok([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7], cell.center()])
    }
}

impl TopologyBuilder for RegularCell {
    fn name(&self) -> &'static str {
        "regular-cell"
    }

    fn build_edges(&self) -> LatticeResult<EdgeList> {
        let v = self.vertices()?;
        let centroid = v[8];
        let edges: Vec<Edge> = v[..8].iter().map(|&corner| Edge::new(corner, centroid)).collect();
        debug!(n_cells = ?self.n_cells, edges = edges.len(), "built unit cell");
        Ok(EdgeList::new(edges, self.bounds))
    }
}
