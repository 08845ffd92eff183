//! Expression tree behind [`Shape`](crate::Shape). Leaves are analytic
//! fields or sampled grids; inner nodes are booleans and transforms.
//!
//! Children are held behind `Arc<FieldNode>` so subtrees are cheaply shared
//! between shapes and composition never mutates its inputs.

use std::sync::Arc;

use nalgebra::Vector3;

use crate::csg::BooleanKind;
use crate::domain::DesignSpace;
use crate::field::ScalarField;
use crate::primitives::{self, TpmsKind};
use crate::types::BBox3;

/// An expression node representing an implicit (signed-distance-like) field.
#[derive(Clone, Debug)]
pub enum FieldNode {
    // -- Primitives --------------------------------------------------------

    /// Sphere at `center` with given `radius`.
    Sphere { center: Vector3<f64>, radius: f64 },

    /// Axis-aligned cuboid at `center` with `half_extents`.
    Cuboid { center: Vector3<f64>, half_extents: Vector3<f64> },

    /// Z-aligned capped cylinder.
    Cylinder { center: Vector3<f64>, radius: f64, half_height: f64 },

    /// Torus in the XY plane.
    Torus { center: Vector3<f64>, major_radius: f64, minor_radius: f64 },

    /// Capsule (sphere-swept segment) from `a` to `b` with `radius`.
    Capsule { a: Vector3<f64>, b: Vector3<f64>, radius: f64 },

    /// Half-space: solid behind the plane `normal . p + d = 0`.
    HalfSpace { normal: Vector3<f64>, d: f64 },

    /// Network TPMS lattice filling all of space.
    Tpms {
        kind: TpmsKind,
        center: Vector3<f64>,
        cells: Vector3<f64>,
        cell_lengths: Vector3<f64>,
        volume_fraction: f64,
    },

    // -- CSG ---------------------------------------------------------------

    /// Boolean combination of two children.
    Boolean(BooleanKind, Arc<FieldNode>, Arc<FieldNode>),

    // -- Transforms --------------------------------------------------------

    /// Translate by an offset vector.
    Translate(Arc<FieldNode>, Vector3<f64>),

    /// Uniform scale by a factor.
    Scale(Arc<FieldNode>, f64),

    /// Shell (onion): hollow with wall `thickness`.
    Shell(Arc<FieldNode>, f64),

    // -- Precomputed -------------------------------------------------------

    /// A field already sampled over a design space (e.g. a fused lattice).
    Sampled(Arc<ScalarField>),
}

impl FieldNode {
    /// Evaluate the field at a 3D point.
    pub fn evaluate(&self, point: Vector3<f64>) -> f64 {
        match self {
            FieldNode::Sphere { center, radius } => {
                primitives::sdf_sphere(point, *center, *radius)
            }
            FieldNode::Cuboid { center, half_extents } => {
                primitives::sdf_box(point, *center, *half_extents)
            }
            FieldNode::Cylinder { center, radius, half_height } => {
                primitives::sdf_cylinder(point, *center, *radius, *half_height)
            }
            FieldNode::Torus { center, major_radius, minor_radius } => {
                primitives::sdf_torus(point, *center, *major_radius, *minor_radius)
            }
            FieldNode::Capsule { a, b, radius } => {
                primitives::sdf_capsule(point, *a, *b, *radius)
            }
            FieldNode::HalfSpace { normal, d } => {
                primitives::sdf_half_space(point, *normal, *d)
            }
            FieldNode::Tpms { kind, center, cells, cell_lengths, volume_fraction } => {
                primitives::sdf_tpms_network(
                    point, *kind, *center, *cells, *cell_lengths, *volume_fraction,
                )
            }

            FieldNode::Boolean(kind, a, b) => {
                kind.apply(a.evaluate(point), b.evaluate(point))
            }

            FieldNode::Translate(inner, offset) => {
                inner.evaluate(point - offset)
            }
            FieldNode::Scale(inner, factor) => {
                inner.evaluate(point / *factor) * factor
            }
            FieldNode::Shell(inner, thickness) => {
                inner.evaluate(point).abs() - thickness
            }

            FieldNode::Sampled(field) => field.sample(point),
        }
    }

    /// Evaluate the field at every sample of `space`.
    ///
    /// Boolean and shell nodes combine their children's grids elementwise, so
    /// a sampled child over the same grid contributes its stored values
    /// exactly. Everything else is evaluated pointwise.
    pub fn evaluate_grid(&self, space: &Arc<DesignSpace>) -> ScalarField {
        match self {
            FieldNode::Boolean(kind, a, b) => {
                let mut left = a.evaluate_grid(space);
                let right = b.evaluate_grid(space);
                for (l, r) in left.data_mut().iter_mut().zip(right.data()) {
                    *l = kind.apply(*l, *r);
                }
                left
            }
            FieldNode::Shell(inner, thickness) => {
                let mut grid = inner.evaluate_grid(space);
                for v in grid.data_mut() {
                    *v = v.abs() - thickness;
                }
                grid
            }
            FieldNode::Sampled(field) if **field.space() == **space => {
                ScalarField::clone(field)
            }
            _ => ScalarField::from_fn(Arc::clone(space), |p| self.evaluate(p)),
        }
    }

    /// Conservative axis-aligned bounds of the solid, `None` if unbounded.
    pub fn bounds(&self) -> Option<BBox3> {
        match self {
            FieldNode::Sphere { center, radius } => {
                Some(BBox3::new(*center, *center).expand(*radius))
            }
            FieldNode::Cuboid { center, half_extents } => {
                Some(BBox3::new(center - half_extents, center + half_extents))
            }
            FieldNode::Cylinder { center, radius, half_height } => {
                let ext = Vector3::new(*radius, *radius, *half_height);
                Some(BBox3::new(center - ext, center + ext))
            }
            FieldNode::Torus { center, major_radius, minor_radius } => {
                let r_xy = major_radius + minor_radius;
                let ext = Vector3::new(r_xy, r_xy, *minor_radius);
                Some(BBox3::new(center - ext, center + ext))
            }
            FieldNode::Capsule { a, b, radius } => {
                Some(BBox3::new(a.inf(b), a.sup(b)).expand(*radius))
            }
            FieldNode::HalfSpace { .. } | FieldNode::Tpms { .. } => None,

            FieldNode::Boolean(kind, a, b) => {
                let pad = kind.blend().unwrap_or(0.0).max(0.0);
                match kind {
                    BooleanKind::Union | BooleanKind::SmoothUnion(_) => {
                        match (a.bounds(), b.bounds()) {
                            (Some(ba), Some(bb)) => Some(ba.merge(&bb).expand(pad)),
                            _ => None,
                        }
                    }
                    BooleanKind::Intersection | BooleanKind::SmoothIntersection(_) => {
                        match (a.bounds(), b.bounds()) {
                            (Some(ba), Some(bb)) => Some(ba.intersect(&bb).expand(pad)),
                            (Some(one), None) | (None, Some(one)) => Some(one.expand(pad)),
                            (None, None) => None,
                        }
                    }
                    // Difference is bounded by the first operand.
                    BooleanKind::Difference | BooleanKind::SmoothDifference(_) => {
                        a.bounds().map(|ba| ba.expand(pad))
                    }
                }
            }

            FieldNode::Translate(inner, offset) => {
                inner.bounds().map(|b| BBox3::new(b.min + offset, b.max + offset))
            }
            FieldNode::Scale(inner, factor) => inner.bounds().map(|b| {
                let (p, q) = (b.min * *factor, b.max * *factor);
                BBox3::new(p.inf(&q), p.sup(&q))
            }),
            FieldNode::Shell(inner, thickness) => {
                inner.bounds().map(|b| b.expand(thickness.abs()))
            }

            FieldNode::Sampled(field) => Some(field.bounds()),
        }
    }
}
