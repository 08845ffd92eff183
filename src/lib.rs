//! Implicit-solid CSG evaluation and strut-lattice generation.
//!
//! Shapes are signed-distance-like fields over a shared, sampled
//! [`DesignSpace`]. They compose through boolean combinators into CSG trees
//! and evaluate pointwise or over the whole grid. Point clouds drawn inside
//! a shape feed [`topology`] builders, whose edge lists a [`StrutLattice`]
//! fuses into a single field that is itself a [`Shape`].

pub mod cache;
pub mod csg;
pub mod domain;
pub mod error;
pub mod field;
pub mod lattice;
pub mod node;
pub mod params;
pub mod points;
pub mod primitives;
pub mod progress;
pub mod shape;
pub mod topology;
pub mod types;

pub use cache::FieldCache;
pub use csg::BooleanKind;
pub use domain::{DesignSpace, DomainId};
pub use error::{LatticeError, LatticeResult};
pub use field::ScalarField;
pub use lattice::{LatticeState, StrutLattice};
pub use params::{EdgeMode, Neighbourhood, StrutParams, TpmsParams};
pub use points::{seeded, PointCloud};
pub use primitives::TpmsKind;
pub use progress::{LoggingProgress, NoProgress, ProgressSink};
pub use shape::{Shape, ShapeId};
pub use topology::{
    ConvexHullEdges, DelaunayEdges, Edge, EdgeList, HilbertPath, KnnGraph, RegularCell,
    TopologyBuilder, VoronoiEdges,
};
pub use types::BBox3;
