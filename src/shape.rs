//! Declarative Shape builder API.
//!
//! `Shape` is the user-facing entry point for composing implicit fields.
//! It wraps an `Arc<FieldNode>` plus the [`DesignSpace`] it is sampled over,
//! so it is cheaply cloneable and immutable. Composition never consumes or
//! modifies its operands.
//!
//! # Example
//!
//! ```rust
//! use lattix::{BooleanKind, DesignSpace, Shape};
//! use nalgebra::Vector3;
//!
//! let ds = DesignSpace::cube(-1.0, 1.0, 20).unwrap();
//! let ball = Shape::sphere(&ds, Vector3::zeros(), 0.8);
//! let slab = Shape::cuboid(&ds, Vector3::zeros(), Vector3::new(1.0, 1.0, 0.3));
//! let part = Shape::combine(BooleanKind::Intersection, &ball, &slab).unwrap();
//! assert!(part.contains(Vector3::zeros()));
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use nalgebra::Vector3;
use rayon::prelude::*;

use crate::csg::BooleanKind;
use crate::domain::DesignSpace;
use crate::error::{LatticeError, LatticeResult};
use crate::field::ScalarField;
use crate::node::FieldNode;
use crate::params::TpmsParams;
use crate::primitives::TpmsKind;
use crate::types::BBox3;

static NEXT_SHAPE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one constructed shape node. Clones share it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(u64);

impl ShapeId {
    fn next() -> Self {
        Self(NEXT_SHAPE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A composable, immutable implicit shape over a design space.
///
/// Field values are negative inside the solid, zero on its surface and
/// positive outside.
#[derive(Clone, Debug)]
pub struct Shape {
    id: ShapeId,
    node: Arc<FieldNode>,
    space: Arc<DesignSpace>,
}

impl Shape {
    fn from_node(space: &Arc<DesignSpace>, node: FieldNode) -> Self {
        Self { id: ShapeId::next(), node: Arc::new(node), space: Arc::clone(space) }
    }
}

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

impl Shape {
    /// Sphere at `center`.
    pub fn sphere(space: &Arc<DesignSpace>, center: Vector3<f64>, radius: f64) -> Self {
        Self::from_node(space, FieldNode::Sphere { center, radius })
    }

    /// Spherical shell: outer radius `radius`, wall `thickness` measured
    /// inwards.
    pub fn hollow_sphere(
        space: &Arc<DesignSpace>,
        center: Vector3<f64>,
        radius: f64,
        thickness: f64,
    ) -> Self {
        let outer = Arc::new(FieldNode::Sphere { center, radius });
        let inner = Arc::new(FieldNode::Sphere { center, radius: radius - thickness });
        Self::from_node(space, FieldNode::Boolean(BooleanKind::Difference, outer, inner))
    }

    /// Axis-aligned cuboid. `half_extents` is the half-size along each axis.
    pub fn cuboid(space: &Arc<DesignSpace>, center: Vector3<f64>, half_extents: Vector3<f64>) -> Self {
        Self::from_node(space, FieldNode::Cuboid { center, half_extents })
    }

    /// Axis-aligned cube with edge length `2 * half_size`.
    pub fn cube(space: &Arc<DesignSpace>, center: Vector3<f64>, half_size: f64) -> Self {
        Self::cuboid(space, center, Vector3::new(half_size, half_size, half_size))
    }

    /// Capped cylinder aligned with Z.
    pub fn cylinder(
        space: &Arc<DesignSpace>,
        center: Vector3<f64>,
        radius: f64,
        half_height: f64,
    ) -> Self {
        Self::from_node(space, FieldNode::Cylinder { center, radius, half_height })
    }

    /// Torus lying in the XY plane.
    pub fn torus(space: &Arc<DesignSpace>, center: Vector3<f64>, major: f64, minor: f64) -> Self {
        Self::from_node(
            space,
            FieldNode::Torus { center, major_radius: major, minor_radius: minor },
        )
    }

    /// Capsule (thickened line segment) from `a` to `b`. A zero-length
    /// segment gives a sphere.
    pub fn capsule(space: &Arc<DesignSpace>, a: Vector3<f64>, b: Vector3<f64>, radius: f64) -> Self {
        Self::from_node(space, FieldNode::Capsule { a, b, radius })
    }

    /// Half-space: the solid region where `normal . p + d <= 0`.
    pub fn half_space(space: &Arc<DesignSpace>, normal: Vector3<f64>, d: f64) -> LatticeResult<Self> {
        let len = normal.norm();
        if len == 0.0 || !len.is_finite() {
            return Err(LatticeError::invalid_parameter("normal", "must be a non-zero finite vector"));
        }
        Ok(Self::from_node(space, FieldNode::HalfSpace { normal: normal / len, d }))
    }

    /// Network TPMS lattice of the given family.
    pub fn tpms(space: &Arc<DesignSpace>, kind: TpmsKind, params: &TpmsParams) -> LatticeResult<Self> {
        params.validate()?;
        Ok(Self::from_node(
            space,
            FieldNode::Tpms {
                kind,
                center: params.center,
                cells: params.cells,
                cell_lengths: params.cell_lengths,
                volume_fraction: params.volume_fraction,
            },
        ))
    }

    /// Gyroid network lattice.
    pub fn gyroid(space: &Arc<DesignSpace>, params: &TpmsParams) -> LatticeResult<Self> {
        Self::tpms(space, TpmsKind::Gyroid, params)
    }

    /// Schwarz P network lattice.
    pub fn schwarz_p(space: &Arc<DesignSpace>, params: &TpmsParams) -> LatticeResult<Self> {
        Self::tpms(space, TpmsKind::SchwarzP, params)
    }

    /// Diamond network lattice.
    pub fn diamond(space: &Arc<DesignSpace>, params: &TpmsParams) -> LatticeResult<Self> {
        Self::tpms(space, TpmsKind::Diamond, params)
    }

    /// Wrap an already evaluated field as a shape over the field's space.
    pub fn from_field(field: ScalarField) -> Self {
        let space = Arc::clone(field.space());
        Self::from_node(&space, FieldNode::Sampled(Arc::new(field)))
    }
}

// ---------------------------------------------------------------------------
// Booleans. Operands are borrowed and stay usable.
// ---------------------------------------------------------------------------

impl Shape {
    /// Build the CSG node `kind(a, b)`.
    ///
    /// # Errors
    ///
    /// - [`LatticeError::DomainMismatch`] if `a` and `b` sample different grids.
    /// - [`LatticeError::InvalidParameter`] for a negative or non-finite blend.
    pub fn combine(kind: BooleanKind, a: &Shape, b: &Shape) -> LatticeResult<Shape> {
        a.space.ensure_same(&b.space)?;
        if let Some(k) = kind.blend() {
            if !k.is_finite() || k < 0.0 {
                return Err(LatticeError::invalid_parameter(
                    "k",
                    format!("blend must be finite and >= 0, got {k}"),
                ));
            }
        }
        Ok(Self::from_node(
            &a.space,
            FieldNode::Boolean(kind, Arc::clone(&a.node), Arc::clone(&b.node)),
        ))
    }

    /// Left fold of `kind` over `operands`: `kind(kind(o0, o1), o2)...`.
    ///
    /// For smooth kinds the result depends on operand order.
    pub fn combine_all(kind: BooleanKind, operands: &[Shape]) -> LatticeResult<Shape> {
        let (first, rest) = operands
            .split_first()
            .ok_or_else(|| LatticeError::invalid_parameter("operands", "need at least one shape"))?;
        rest.iter()
            .try_fold(first.clone(), |acc, next| Shape::combine(kind, &acc, next))
    }

    /// Boolean union: the volume of either shape.
    pub fn union(&self, other: &Shape) -> LatticeResult<Shape> {
        Shape::combine(BooleanKind::Union, self, other)
    }

    /// Boolean subtraction: self minus other.
    pub fn subtract(&self, other: &Shape) -> LatticeResult<Shape> {
        Shape::combine(BooleanKind::Difference, self, other)
    }

    /// Boolean intersection: the volume shared by both shapes.
    pub fn intersect(&self, other: &Shape) -> LatticeResult<Shape> {
        Shape::combine(BooleanKind::Intersection, self, other)
    }

    /// Smooth union (fillet blend) with blending radius `k`.
    pub fn smooth_union(&self, other: &Shape, k: f64) -> LatticeResult<Shape> {
        Shape::combine(BooleanKind::SmoothUnion(k), self, other)
    }

    /// Smooth intersection with blending radius `k`.
    pub fn smooth_intersect(&self, other: &Shape, k: f64) -> LatticeResult<Shape> {
        Shape::combine(BooleanKind::SmoothIntersection(k), self, other)
    }

    /// Smooth subtraction with blending radius `k`.
    pub fn smooth_subtract(&self, other: &Shape, k: f64) -> LatticeResult<Shape> {
        Shape::combine(BooleanKind::SmoothDifference(k), self, other)
    }
}

// ---------------------------------------------------------------------------
// Transforms
// ---------------------------------------------------------------------------

impl Shape {
    /// Translate by `offset`.
    pub fn translate(&self, offset: Vector3<f64>) -> Shape {
        Self::from_node(&self.space, FieldNode::Translate(Arc::clone(&self.node), offset))
    }

    /// Uniform scale about the origin.
    pub fn scale(&self, factor: f64) -> LatticeResult<Shape> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(LatticeError::invalid_parameter(
                "factor",
                format!("scale must be finite and positive, got {factor}"),
            ));
        }
        Ok(Self::from_node(&self.space, FieldNode::Scale(Arc::clone(&self.node), factor)))
    }

    /// Shell (hollow) with wall `thickness` on each side of the surface.
    pub fn shell(&self, thickness: f64) -> Shape {
        Self::from_node(&self.space, FieldNode::Shell(Arc::clone(&self.node), thickness))
    }
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

impl Shape {
    /// Evaluate the field at `point`.
    pub fn evaluate(&self, point: Vector3<f64>) -> f64 {
        self.node.evaluate(point)
    }

    /// Evaluate the field at many points. Parallelized across points.
    pub fn evaluate_points(&self, points: &[Vector3<f64>]) -> Vec<f64> {
        let node = &self.node;
        points.par_iter().map(|p| node.evaluate(*p)).collect()
    }

    /// Returns `true` if `point` is inside the solid (field <= 0).
    pub fn contains(&self, point: Vector3<f64>) -> bool {
        self.node.evaluate(point) <= 0.0
    }

    /// Evaluate over every sample of the shape's design space.
    ///
    /// Not memoized; see [`crate::FieldCache`] for cached evaluation.
    pub fn evaluate_grid(&self) -> ScalarField {
        self.node.evaluate_grid(&self.space)
    }

    /// Conservative bounding box, clipped to the design space. Unbounded
    /// shapes (half-spaces, TPMS lattices) report the design-space bounds.
    pub fn bounding_box(&self) -> BBox3 {
        let domain = self.space.bounds();
        match self.node.bounds() {
            Some(b) => {
                // Clamp both corners into the domain so the box never inverts.
                let min = b.min.sup(&domain.min).inf(&domain.max);
                let max = b.max.inf(&domain.max).sup(&min);
                BBox3::new(min, max)
            }
            None => domain,
        }
    }

    /// Center and radius if this shape is a plain sphere.
    pub fn as_sphere(&self) -> Option<(Vector3<f64>, f64)> {
        match *self.node {
            FieldNode::Sphere { center, radius } => Some((center, radius)),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Access
// ---------------------------------------------------------------------------

impl Shape {
    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn space(&self) -> &Arc<DesignSpace> {
        &self.space
    }

    /// Expose the inner expression node.
    pub fn node(&self) -> &FieldNode {
        &self.node
    }
}
