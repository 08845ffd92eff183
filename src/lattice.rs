//! Strut lattice evaluation.
//!
//! Each strut is a capsule field over the whole design-space grid. The
//! first strut seeds a running field; every later strut is fused into it,
//! in edge order, with a hard minimum (`blend == 0`) or the log-domain
//! smooth minimum [`csg::soft_min`]. At most two grid-sized arrays are live
//! at once: the running field and the strut being fused.

use std::sync::Arc;
use std::time::Instant;

use nalgebra::Vector3;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::csg;
use crate::domain::DesignSpace;
use crate::error::{LatticeError, LatticeResult};
use crate::field::ScalarField;
use crate::params::StrutParams;
use crate::primitives::sdf_capsule;
use crate::progress::{NoProgress, ProgressSink};
use crate::shape::Shape;
use crate::topology::{Edge, EdgeList, TopologyBuilder};

/// Where a [`StrutLattice`] is in its fusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatticeState {
    /// No strut has been evaluated.
    Uninitialized,
    /// The first strut's field is the running field.
    Seeded,
    /// `fused` of `total` struts have been combined.
    Blending { fused: usize, total: usize },
    /// Every strut was fused; the field is available.
    Done,
}

/// Fuses an edge list into one scalar field over a design space.
#[derive(Debug, Clone)]
pub struct StrutLattice {
    space: Arc<DesignSpace>,
    edges: EdgeList,
    params: StrutParams,
    state: LatticeState,
    field: Option<ScalarField>,
}

impl StrutLattice {
    /// # Errors
    ///
    /// - [`LatticeError::NoStruts`] if `edges` is empty. Nothing is evaluated.
    /// - [`LatticeError::InvalidParameter`] for a bad radius or blend.
    pub fn new(space: Arc<DesignSpace>, edges: EdgeList, params: StrutParams) -> LatticeResult<Self> {
        if edges.is_empty() {
            return Err(LatticeError::NoStruts);
        }
        params.validate()?;
        Ok(Self { space, edges, params, state: LatticeState::Uninitialized, field: None })
    }

    /// Run `builder` and seed a lattice from its edges.
    pub fn from_builder<B>(space: Arc<DesignSpace>, builder: &B, params: StrutParams) -> LatticeResult<Self>
    where
        B: TopologyBuilder + ?Sized,
    {
        let edges = builder.build_edges()?;
        Self::new(space, edges, params)
    }

    pub fn space(&self) -> &Arc<DesignSpace> {
        &self.space
    }

    pub fn edges(&self) -> &EdgeList {
        &self.edges
    }

    pub fn params(&self) -> StrutParams {
        self.params
    }

    pub fn state(&self) -> LatticeState {
        self.state
    }

    /// The fused field, once [`LatticeState::Done`].
    pub fn field(&self) -> Option<&ScalarField> {
        match self.state {
            LatticeState::Done => self.field.as_ref(),
            _ => None,
        }
    }

    /// Fuse every strut. A no-op once done.
    pub fn generate(&mut self) -> &ScalarField {
        self.generate_with_progress(&mut NoProgress)
    }

    /// [`StrutLattice::generate`], reporting `(fused, total)` to `sink`
    /// after each strut.
    pub fn generate_with_progress<P>(&mut self, sink: &mut P) -> &ScalarField
    where
        P: ProgressSink + ?Sized,
    {
        let field = match self.field.take() {
            Some(field) if self.state == LatticeState::Done => field,
            _ => {
                let field = self.fuse(sink);
                self.state = LatticeState::Done;
                field
            }
        };
        self.field.insert(field)
    }

    fn fuse<P>(&mut self, sink: &mut P) -> ScalarField
    where
        P: ProgressSink + ?Sized,
    {
        let started = Instant::now();
        let total = self.edges.len();
        let StrutParams { radius, blend } = self.params;
        info!(struts = total, radius, blend, samples = self.space.len(), "fusing strut lattice");

        let degenerate = self.edges.iter().filter(|e| e.is_degenerate()).count();
        if degenerate > 0 {
            warn!(degenerate, "zero-length struts evaluated as spheres");
        }

        self.state = LatticeState::Uninitialized;
        let mut struts = self.edges.iter();
        let mut running = match struts.next() {
            Some(first) => strut_field(&self.space, first, radius),
            // `new` rejects empty edge lists.
            None => ScalarField::from_fn(Arc::clone(&self.space), |_| f64::INFINITY),
        };
        self.state = LatticeState::Seeded;
        sink.report(1, total);

        for (i, edge) in struts.enumerate() {
            let strut = strut_field(&self.space, edge, radius);
            fuse_into(&mut running, &strut, blend);
            let fused = i + 2;
            self.state = LatticeState::Blending { fused, total };
            sink.report(fused, total);
        }

        info!(
            struts = total,
            elapsed_ms = started.elapsed().as_millis() as u64,
            solid_fraction = running.solid_fraction(),
            "strut lattice fused"
        );
        running
    }

    /// Fuse (if needed) and return the field.
    pub fn into_field(mut self) -> ScalarField {
        match self.field.take() {
            Some(field) if self.state == LatticeState::Done => field,
            _ => self.fuse(&mut NoProgress),
        }
    }

    /// The fused lattice as a [`Shape`] for further composition.
    pub fn into_shape(self) -> Shape {
        Shape::from_field(self.into_field())
    }
}

/// Capsule field of one strut over the whole grid.
pub fn strut_field(space: &Arc<DesignSpace>, edge: &Edge, radius: f64) -> ScalarField {
    let (a, b) = (edge.a, edge.b);
    ScalarField::from_fn(Arc::clone(space), move |p: Vector3<f64>| sdf_capsule(p, a, b, radius))
}

/// Elementwise fusion of `strut` into `running`: hard minimum for
/// `blend == 0`, otherwise [`csg::soft_min`] with sharpness `blend`.
pub fn fuse_into(running: &mut ScalarField, strut: &ScalarField, blend: f64) {
    running
        .data_mut()
        .par_iter_mut()
        .zip(strut.data().par_iter())
        .for_each(|(r, &s)| *r = csg::soft_min(s, *r, blend));
}
