// Pointwise boolean operators on signed field values.
//
//   union         min(a, b)
//   intersection  max(a, b)
//   difference    max(a, -b)
//
// The smooth forms round the seam between operands over a band of width `k`.
// With `k <= 0` they are exactly the hard operators, and |smooth - hard| <= k / 4
// for every input.
//
// Union and intersection are associative. Smooth variants are not: chains of
// smooth operators depend on the pairwise composition order.

/// Floor applied to the log argument in [`soft_min`].
pub const SOFT_MIN_FLOOR: f64 = 1e-300;

/// Which boolean operator a CSG node applies, with its blend parameter for
/// the smooth variants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BooleanKind {
    Union,
    Intersection,
    /// First operand minus the second.
    Difference,
    SmoothUnion(f64),
    SmoothIntersection(f64),
    SmoothDifference(f64),
}

impl BooleanKind {
    /// Apply the operator to a pair of field values.
    pub fn apply(self, d1: f64, d2: f64) -> f64 {
        match self {
            BooleanKind::Union => union(d1, d2),
            BooleanKind::Intersection => intersection(d1, d2),
            BooleanKind::Difference => difference(d1, d2),
            BooleanKind::SmoothUnion(k) => smooth_union(d1, d2, k),
            BooleanKind::SmoothIntersection(k) => smooth_intersection(d1, d2, k),
            BooleanKind::SmoothDifference(k) => smooth_difference(d1, d2, k),
        }
    }

    /// Blend radius of a smooth variant, `None` for hard operators.
    pub fn blend(self) -> Option<f64> {
        match self {
            BooleanKind::SmoothUnion(k)
            | BooleanKind::SmoothIntersection(k)
            | BooleanKind::SmoothDifference(k) => Some(k),
            _ => None,
        }
    }

    /// `true` for union and intersection, whose chains may be regrouped
    /// without changing the result.
    pub fn is_associative(self) -> bool {
        matches!(self, BooleanKind::Union | BooleanKind::Intersection)
    }
}

/// Solid wherever either operand is solid.
pub fn union(d1: f64, d2: f64) -> f64 {
    d1.min(d2)
}

/// Solid only where both operands are solid.
pub fn intersection(d1: f64, d2: f64) -> f64 {
    d1.max(d2)
}

/// Removes the second operand from the first.
pub fn difference(d1: f64, d2: f64) -> f64 {
    d1.max(-d2)
}

/// Polynomial smooth minimum. Never above [`union`], and never more than
/// `k / 4` below it. `k <= 0` is the hard union.
pub fn smooth_union(d1: f64, d2: f64, k: f64) -> f64 {
    if k <= 0.0 {
        return union(d1, d2);
    }
    let h = (0.5 + 0.5 * (d2 - d1) / k).clamp(0.0, 1.0);
    d2 * (1.0 - h) + d1 * h - k * h * (1.0 - h)
}

/// Polynomial smooth maximum, the mirror of [`smooth_union`].
pub fn smooth_intersection(d1: f64, d2: f64, k: f64) -> f64 {
    if k <= 0.0 {
        return intersection(d1, d2);
    }
    let h = (0.5 - 0.5 * (d2 - d1) / k).clamp(0.0, 1.0);
    d2 * (1.0 - h) + d1 * h + k * h * (1.0 - h)
}

/// `smooth_intersection` against the complement of `d2`.
pub fn smooth_difference(d1: f64, d2: f64, k: f64) -> f64 {
    smooth_intersection(d1, -d2, k)
}

/// Log-domain smooth minimum used to fuse strut fields:
/// `-ln(max(exp(-b*d1) + exp(-b*d2), floor)) / b`.
///
/// `b` is a sharpness: larger values approach the hard minimum, and `b <= 0`
/// falls back to it. The sum is evaluated relative to the smaller input so
/// the exponentials cannot underflow to zero far from both struts.
///
/// The direct form saturates at `-ln(floor) / b` once both exponentials
/// underflow, capping the field far from every strut. This form does not:
/// the result stays within `ln(2) / b` below `min(d1, d2)` for any inputs,
/// so far-field values keep growing with distance. The floor only guards
/// the logarithm.
pub fn soft_min(d1: f64, d2: f64, b: f64) -> f64 {
    if b <= 0.0 {
        return union(d1, d2);
    }
    let m = d1.min(d2);
    if !m.is_finite() {
        return m;
    }
    let sum = (-b * (d1 - m)).exp() + (-b * (d2 - m)).exp();
    m - sum.max(SOFT_MIN_FLOOR).ln() / b
}
