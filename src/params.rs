//! Parameter structs for lattice shapes, topology builders and the strut
//! evaluator.

use nalgebra::Vector3;

use crate::error::{LatticeError, LatticeResult};

/// Strut thickness and junction blending for [`crate::StrutLattice`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrutParams {
    /// Capsule radius of every strut.
    pub radius: f64,
    /// Junction blending sharpness. `0` fuses struts with a hard minimum;
    /// `b > 0` uses the log-domain smooth minimum, rounder for smaller `b`.
    pub blend: f64,
}

impl Default for StrutParams {
    fn default() -> Self {
        Self { radius: 0.02, blend: 0.0 }
    }
}

impl StrutParams {
    pub fn new(radius: f64) -> Self {
        Self { radius, ..Self::default() }
    }

    #[must_use]
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    #[must_use]
    pub fn with_blend(mut self, blend: f64) -> Self {
        self.blend = blend;
        self
    }

    /// # Errors
    ///
    /// [`LatticeError::InvalidParameter`] if the radius is not positive or the
    /// blend is negative or non-finite.
    pub fn validate(&self) -> LatticeResult<()> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(LatticeError::invalid_parameter(
                "radius",
                format!("must be finite and positive, got {}", self.radius),
            ));
        }
        if !(self.blend.is_finite() && self.blend >= 0.0) {
            return Err(LatticeError::invalid_parameter(
                "blend",
                format!("must be finite and >= 0, got {}", self.blend),
            ));
        }
        Ok(())
    }
}

/// Neighbour selection for the k-nearest-neighbour graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Neighbourhood {
    /// A neighbourhood of `k` points that includes the query point itself,
    /// giving `k - 1` links per point.
    Count(usize),
    /// Every other point within this Euclidean distance.
    Radius(f64),
}

impl Default for Neighbourhood {
    fn default() -> Self {
        Neighbourhood::Count(4)
    }
}

impl Neighbourhood {
    pub fn validate(&self) -> LatticeResult<()> {
        match *self {
            Neighbourhood::Count(k) if k < 2 => Err(LatticeError::invalid_parameter(
                "k",
                format!("neighbourhood counts the point itself, must be at least 2, got {k}"),
            )),
            Neighbourhood::Radius(r) if !(r.is_finite() && r > 0.0) => {
                Err(LatticeError::invalid_parameter(
                    "radius",
                    format!("must be finite and positive, got {r}"),
                ))
            }
            _ => Ok(()),
        }
    }
}

/// Whether Delaunay and convex-hull builders keep edges repeated across
/// shared faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeMode {
    /// Emit every face's edges, including repeats from shared faces.
    #[default]
    Raw,
    /// Drop repeats, treating edges as unordered pairs.
    Unique,
}

/// Placement and density of a network TPMS lattice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TpmsParams {
    /// Lattice origin; shift it to translate the pattern.
    pub center: Vector3<f64>,
    /// Unit cells per cell length on each axis.
    pub cells: Vector3<f64>,
    /// Unit-cell length on each axis.
    pub cell_lengths: Vector3<f64>,
    /// Target solid volume fraction in `(0, 1)`.
    pub volume_fraction: f64,
}

impl Default for TpmsParams {
    fn default() -> Self {
        Self {
            center: Vector3::zeros(),
            cells: Vector3::new(1.0, 1.0, 1.0),
            cell_lengths: Vector3::new(1.0, 1.0, 1.0),
            volume_fraction: 0.5,
        }
    }
}

impl TpmsParams {
    /// Cubic unit cells of edge `cell_length`.
    pub fn cubic(cell_length: f64) -> Self {
        Self {
            cell_lengths: Vector3::new(cell_length, cell_length, cell_length),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_center(mut self, center: Vector3<f64>) -> Self {
        self.center = center;
        self
    }

    #[must_use]
    pub fn with_cells(mut self, cells: Vector3<f64>) -> Self {
        self.cells = cells;
        self
    }

    #[must_use]
    pub fn with_cell_lengths(mut self, cell_lengths: Vector3<f64>) -> Self {
        self.cell_lengths = cell_lengths;
        self
    }

    #[must_use]
    pub fn with_volume_fraction(mut self, volume_fraction: f64) -> Self {
        self.volume_fraction = volume_fraction;
        self
    }

    pub fn validate(&self) -> LatticeResult<()> {
        if !(self.volume_fraction > 0.0 && self.volume_fraction < 1.0) {
            return Err(LatticeError::invalid_parameter(
                "volume_fraction",
                format!("must lie in (0, 1), got {}", self.volume_fraction),
            ));
        }
        let positive = |v: &Vector3<f64>| v.iter().all(|c| c.is_finite() && *c > 0.0);
        if !positive(&self.cells) {
            return Err(LatticeError::invalid_parameter("cells", "must be positive on every axis"));
        }
        if !positive(&self.cell_lengths) {
            return Err(LatticeError::invalid_parameter(
                "cell_lengths",
                "must be positive on every axis",
            ));
        }
        Ok(())
    }
}
