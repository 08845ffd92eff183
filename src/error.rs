//! Error types for field evaluation and lattice generation.

use thiserror::Error;

/// Errors raised while building domains, shapes, point clouds, topologies
/// and lattices.
///
/// Geometric configuration problems are reported immediately and are never
/// retried. Zero-length struts are not an error: the capsule field falls back
/// to the distance-to-point formula for them.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum LatticeError {
    /// The design space bounds or resolution are malformed.
    #[error("invalid design space: {reason}")]
    InvalidDomain {
        /// What was wrong with the domain.
        reason: String,
    },

    /// Two operands are evaluated over different design spaces.
    #[error("design space mismatch: operands are sampled over different grids")]
    DomainMismatch,

    /// A point cloud ended up with no points after containment filtering.
    #[error("point cloud is empty")]
    EmptyPointCloud,

    /// A topology builder got fewer points than its algorithm needs.
    #[error("insufficient points: need at least {required}, got {actual}")]
    InsufficientPoints {
        /// Minimum number of points the builder needs.
        required: usize,
        /// Number of points supplied.
        actual: usize,
    },

    /// The point set has enough points but spans no volume (all coplanar,
    /// collinear or coincident).
    #[error("degenerate point set: {reason}")]
    DegeneratePointSet {
        /// Why the point set could not be decomposed.
        reason: String,
    },

    /// The lattice evaluator was given an empty edge list.
    #[error("lattice has no struts to evaluate")]
    NoStruts,

    /// A parameter is out of range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl LatticeError {
    pub(crate) fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter { name, reason: reason.into() }
    }
}

/// Result alias used throughout the crate.
pub type LatticeResult<T> = Result<T, LatticeError>;
