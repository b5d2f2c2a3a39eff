//! Linear elastic spring element - two nodes, stiffness given in the basic system
//!
//! Response flows through three coordinate systems:
//!
//! ```text
//! global (node DOFs) --Tgl--> local (element axes) --Tlb--> basic (declared directions)
//! ```
//!
//! The basic stiffness is constant. Stiffness and forces are returned in
//! global coordinates as `Tglᵀ · (Tlbᵀ · kb · Tlb + KpΔ) · Tgl` and
//! `Tglᵀ · (Tlbᵀ · qb + ppΔ)`.

use log::{debug, trace};

use super::definition::SpringDefinition;
use super::layout::DofLayout;
use super::state::SpringState;
use crate::analysis::RayleighFactors;
use crate::error::{SpringError, SpringResult, UpdateError};
use crate::loads::ElementLoad;
use crate::math::{
    self, build_geometry, Geometry, Mat, MomentRatios, TransformationSet, Vec as FEVec, Vec3,
};
use crate::model::Domain;
use crate::results::{Response, ResponseKind};

/// Parse a 3-component orientation vector
fn orientation_vector(values: &[f64], name: &str) -> SpringResult<Vec3> {
    if values.len() != 3 {
        return Err(SpringError::Geometry(format!(
            "local {} vector must have 3 components, got {}",
            name,
            values.len()
        )));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(SpringError::Geometry(format!(
            "local {} vector contains non-finite components",
            name
        )));
    }
    Ok(Vec3::new(values[0], values[1], values[2]))
}

/// A two-node spring with constant stiffness along selected directions
#[derive(Debug, Clone)]
pub struct SpringElement {
    tag: i32,
    layout: DofLayout,
    nodes: [i32; 2],
    directions: Vec<usize>,
    /// Stiffness in the basic system
    kb: Mat,
    /// Damping in the basic system
    cb: Option<Mat>,
    x: Option<Vec3>,
    y: Option<Vec3>,
    moment_ratios: Option<MomentRatios>,
    add_rayleigh: bool,
    rayleigh: RayleighFactors,

    /// Set by `set_domain`
    geometry: Option<Geometry>,
    trial: SpringState,
    committed: SpringState,
    /// Element loads as global end forces
    load: FEVec,
}

impl SpringElement {
    /// Create a new element from its defining parameters
    ///
    /// Classifies the DOF layout, validates the directions and mirrors the
    /// stiffness (and damping) upper triangle. The element is unbound until
    /// [`set_domain`](Self::set_domain) is called.
    pub fn new(definition: &SpringDefinition) -> SpringResult<Self> {
        let layout = DofLayout::classify(definition.dimension, definition.dofs_per_node)?;
        layout.validate_directions(&definition.directions)?;

        let num_dir = definition.directions.len();
        let kb = math::symmetric_from_upper(
            &math::matrix_from_rows(&definition.stiffness, "stiffness matrix")?,
            num_dir,
            "stiffness matrix",
        )?;
        let cb = definition
            .damping
            .as_ref()
            .map(|rows| {
                math::matrix_from_rows(rows, "damping matrix")
                    .and_then(|m| math::symmetric_from_upper(&m, num_dir, "damping matrix"))
            })
            .transpose()?;

        let x = definition
            .x
            .as_deref()
            .map(|v| orientation_vector(v, "x"))
            .transpose()?;
        let y = definition
            .y
            .as_deref()
            .map(|v| orientation_vector(v, "y"))
            .transpose()?;
        let moment_ratios = definition
            .moment_ratios
            .as_deref()
            .map(MomentRatios::from_slice)
            .transpose()?;

        let num_dof = layout.num_dof();
        Ok(Self {
            tag: definition.tag,
            layout,
            nodes: definition.nodes,
            directions: definition.directions.clone(),
            kb,
            cb,
            x,
            y,
            moment_ratios,
            add_rayleigh: definition.add_rayleigh,
            rayleigh: RayleighFactors::default(),
            geometry: None,
            trial: SpringState::zeros(num_dir, num_dof),
            committed: SpringState::zeros(num_dir, num_dof),
            load: FEVec::zeros(num_dof),
        })
    }

    /// Rebuild the defining parameters of this element
    pub fn definition(&self) -> SpringDefinition {
        SpringDefinition {
            tag: self.tag,
            dimension: self.layout.dimension(),
            dofs_per_node: self.layout.dofs_per_node(),
            nodes: self.nodes,
            directions: self.directions.clone(),
            stiffness: math::matrix_to_rows(&self.kb),
            damping: self.cb.as_ref().map(math::matrix_to_rows),
            x: self.x.map(|v| v.iter().copied().collect()),
            y: self.y.map(|v| v.iter().copied().collect()),
            moment_ratios: self.moment_ratios.map(|r| r.as_array().to_vec()),
            add_rayleigh: self.add_rayleigh,
        }
    }

    // ========================
    // Connectivity
    // ========================

    /// Element tag
    pub fn tag(&self) -> i32 {
        self.tag
    }

    /// DOF layout selected at construction
    pub fn layout(&self) -> DofLayout {
        self.layout
    }

    /// Total number of element DOFs
    pub fn num_dof(&self) -> usize {
        self.layout.num_dof()
    }

    /// Number of basic directions
    pub fn num_dir(&self) -> usize {
        self.directions.len()
    }

    /// Tags of the i and j nodes
    pub fn external_nodes(&self) -> [i32; 2] {
        self.nodes
    }

    /// Declared basic directions
    pub fn directions(&self) -> &[usize] {
        &self.directions
    }

    /// Stiffness in the basic system
    pub fn basic_stiffness(&self) -> &Mat {
        &self.kb
    }

    /// Damping in the basic system
    pub fn basic_damping(&self) -> Option<&Mat> {
        self.cb.as_ref()
    }

    /// Explicit local x axis
    pub fn orientation_x(&self) -> Option<&Vec3> {
        self.x.as_ref()
    }

    /// Explicit local y axis
    pub fn orientation_y(&self) -> Option<&Vec3> {
        self.y.as_ref()
    }

    /// P-Delta moment ratios
    pub fn moment_ratios(&self) -> Option<&MomentRatios> {
        self.moment_ratios.as_ref()
    }

    /// Whether Rayleigh damping is included
    pub fn add_rayleigh(&self) -> bool {
        self.add_rayleigh
    }

    /// Rayleigh damping factors currently set
    pub fn rayleigh_factors(&self) -> RayleighFactors {
        self.rayleigh
    }

    /// Set the Rayleigh damping factors
    pub fn set_rayleigh_factors(&mut self, factors: RayleighFactors) {
        self.rayleigh = factors;
    }

    /// Whether the element has been bound to its nodes
    pub fn is_bound(&self) -> bool {
        self.geometry.is_some()
    }

    /// Element length, once bound
    pub fn length(&self) -> Option<f64> {
        self.geometry.as_ref().map(|g| g.length)
    }

    /// Transformation matrices, once bound
    pub fn transformations(&self) -> Option<&TransformationSet> {
        self.geometry.as_ref().map(|g| &g.transformations)
    }

    /// Whether the P-Delta correction is active
    pub fn p_delta_active(&self) -> bool {
        self.geometry
            .as_ref()
            .map_or(false, |g| g.p_delta.is_some())
    }

    /// Current trial state
    pub fn trial_state(&self) -> &SpringState {
        &self.trial
    }

    /// Last committed state
    pub fn committed_state(&self) -> &SpringState {
        &self.committed
    }

    fn geometry(&self) -> SpringResult<&Geometry> {
        self.geometry.as_ref().ok_or(SpringError::Unbound(self.tag))
    }

    /// Bind the element to its nodes and build the transformation chain
    ///
    /// Both nodes must exist, carry the layout's DOF count and have
    /// coordinates of the element's dimension.
    pub fn set_domain<D: Domain + ?Sized>(&mut self, domain: &D) -> SpringResult<()> {
        let ndf = self.layout.dofs_per_node();
        let dim = self.layout.dimension();

        let mut coords: [&[f64]; 2] = [&[], &[]];
        for (k, &tag) in self.nodes.iter().enumerate() {
            let crd = domain
                .node_coordinates(tag)
                .ok_or(SpringError::NodeNotFound(tag))?;
            let node_ndf = domain
                .node_dof_count(tag)
                .ok_or(SpringError::NodeNotFound(tag))?;
            if node_ndf != ndf {
                return Err(SpringError::Configuration(format!(
                    "node {} has {} DOFs but element {} ({:?}) expects {}",
                    tag, node_ndf, self.tag, self.layout, ndf
                )));
            }
            if crd.len() != dim {
                return Err(SpringError::Configuration(format!(
                    "node {} has {} coordinates but element {} is {}D",
                    tag,
                    crd.len(),
                    self.tag,
                    dim
                )));
            }
            coords[k] = crd;
        }

        let geometry = build_geometry(
            self.layout,
            &self.directions,
            coords[0],
            coords[1],
            self.x.as_ref(),
            self.y.as_ref(),
            self.moment_ratios.as_ref(),
        )?;

        debug!(
            "spring {} bound to nodes {:?}: layout {:?}, length {:.6}, p-delta {}",
            self.tag,
            self.nodes,
            self.layout,
            geometry.length,
            geometry.p_delta.is_some()
        );
        self.geometry = Some(geometry);
        Ok(())
    }

    // ========================
    // State
    // ========================

    /// Pull trial displacements and velocities from the domain and update the trial state
    ///
    /// Nodes without a velocity contribute zero velocity. Failures are
    /// non-fatal; the trial state is left unchanged.
    pub fn update<D: Domain + ?Sized>(&mut self, domain: &D) -> Result<(), UpdateError> {
        if self.geometry.is_none() {
            return Err(UpdateError::Unbound(self.tag));
        }

        let ndf = self.layout.dofs_per_node();
        let mut ug = FEVec::zeros(self.num_dof());
        let mut ug_dot = FEVec::zeros(self.num_dof());

        for (k, &tag) in self.nodes.iter().enumerate() {
            let disp = domain
                .trial_displacement(tag)
                .ok_or(UpdateError::NodeMissing(tag))?;
            if disp.len() != ndf {
                return Err(UpdateError::SizeMismatch {
                    what: "node displacement",
                    expected: ndf,
                    actual: disp.len(),
                });
            }
            ug.rows_mut(k * ndf, ndf).copy_from_slice(disp);

            // no velocity means a static step
            if let Some(vel) = domain.trial_velocity(tag) {
                if vel.len() != ndf {
                    return Err(UpdateError::SizeMismatch {
                        what: "node velocity",
                        expected: ndf,
                        actual: vel.len(),
                    });
                }
                ug_dot.rows_mut(k * ndf, ndf).copy_from_slice(vel);
            }
        }

        self.apply_trial(ug, ug_dot)
    }

    /// Update the trial state from element-ordered global displacements
    ///
    /// `ug` (and `ug_dot`, if given) hold node i's DOFs followed by node j's.
    pub fn update_from(&mut self, ug: &[f64], ug_dot: Option<&[f64]>) -> Result<(), UpdateError> {
        let n = self.num_dof();
        if ug.len() != n {
            return Err(UpdateError::SizeMismatch {
                what: "element displacement",
                expected: n,
                actual: ug.len(),
            });
        }
        let ug_dot = match ug_dot {
            Some(v) if v.len() != n => {
                return Err(UpdateError::SizeMismatch {
                    what: "element velocity",
                    expected: n,
                    actual: v.len(),
                });
            }
            Some(v) => FEVec::from_column_slice(v),
            None => FEVec::zeros(n),
        };

        self.apply_trial(FEVec::from_column_slice(ug), ug_dot)
    }

    fn apply_trial(&mut self, ug: FEVec, ug_dot: FEVec) -> Result<(), UpdateError> {
        let geometry = self
            .geometry
            .as_ref()
            .ok_or(UpdateError::Unbound(self.tag))?;
        let t = &geometry.transformations;

        let ul = &t.global_local * &ug;
        let ub = &t.local_basic * &ul;
        let ub_dot = &t.local_basic * (&t.global_local * &ug_dot);

        let mut qb = &self.kb * &ub;
        if let Some(cb) = &self.cb {
            qb += cb * &ub_dot;
        }

        trace!("spring {} trial ub = {:?}, qb = {:?}", self.tag, ub.as_slice(), qb.as_slice());

        self.trial = SpringState {
            ub,
            ub_dot,
            qb,
            ul,
            ug_dot,
        };
        Ok(())
    }

    /// Accept the trial state
    pub fn commit_state(&mut self) {
        self.committed = self.trial.clone();
    }

    /// Discard the trial state and return to the last committed one
    pub fn revert_to_last_commit(&mut self) {
        self.trial = self.committed.clone();
    }

    /// Return to the unloaded initial state and clear element loads
    pub fn revert_to_start(&mut self) {
        self.trial = SpringState::zeros(self.num_dir(), self.num_dof());
        self.committed = self.trial.clone();
        self.load.fill(0.0);
    }

    // ========================
    // Stiffness and damping
    // ========================

    fn local_stiffness(&self, geometry: &Geometry, state: &SpringState, p_delta: bool) -> Mat {
        let mut kl = math::congruence(&geometry.transformations.local_basic, &self.kb);
        if p_delta {
            if let Some(pd) = &geometry.p_delta {
                kl += pd.local_stiffness(&state.qb);
            }
        }
        kl
    }

    fn global_stiffness(&self, state: &SpringState, p_delta: bool) -> SpringResult<Mat> {
        let geometry = self.geometry()?;
        let kl = self.local_stiffness(geometry, state, p_delta);
        Ok(math::congruence(&geometry.transformations.global_local, &kl))
    }

    /// Tangent stiffness in global coordinates, including P-Delta
    pub fn tangent_stiff(&self) -> SpringResult<Mat> {
        self.global_stiffness(&self.trial, true)
    }

    /// Initial stiffness in global coordinates, without P-Delta
    pub fn initial_stiff(&self) -> SpringResult<Mat> {
        self.global_stiffness(&self.trial, false)
    }

    /// Tangent stiffness evaluated at the last committed state
    pub fn committed_stiff(&self) -> SpringResult<Mat> {
        self.global_stiffness(&self.committed, true)
    }

    /// Stiffness proportional Rayleigh damping matrix (the element is massless)
    fn rayleigh_damping(&self) -> SpringResult<Mat> {
        let f = self.rayleigh;
        let mut c = Mat::zeros(self.num_dof(), self.num_dof());
        if f.beta_k != 0.0 {
            c += self.tangent_stiff()? * f.beta_k;
        }
        if f.beta_k0 != 0.0 {
            c += self.initial_stiff()? * f.beta_k0;
        }
        if f.beta_kc != 0.0 {
            c += self.committed_stiff()? * f.beta_kc;
        }
        Ok(c)
    }

    /// Damping matrix in global coordinates
    ///
    /// Rayleigh damping (if enabled) plus the basic damping matrix.
    pub fn damp(&self) -> SpringResult<Mat> {
        let geometry = self.geometry()?;
        let mut c = Mat::zeros(self.num_dof(), self.num_dof());
        if self.add_rayleigh {
            c += self.rayleigh_damping()?;
        }
        if let Some(cb) = &self.cb {
            c += math::congruence(&geometry.transformations.global_basic(), cb);
        }
        Ok(c)
    }

    /// Mass matrix, always zero
    pub fn mass(&self) -> Mat {
        Mat::zeros(self.num_dof(), self.num_dof())
    }

    // ========================
    // Forces
    // ========================

    fn local_force(&self, geometry: &Geometry) -> FEVec {
        let mut ql = geometry.transformations.local_basic.transpose() * &self.trial.qb;
        if let Some(pd) = &geometry.p_delta {
            ql += pd.local_force(&self.trial.qb, &self.trial.ul);
        }
        ql
    }

    /// Resisting force in global coordinates, including P-Delta and element loads
    pub fn resisting_force(&self) -> SpringResult<FEVec> {
        let geometry = self.geometry()?;
        let ql = self.local_force(geometry);
        Ok(geometry.transformations.global_local.transpose() * ql + &self.load)
    }

    /// Resisting force plus Rayleigh damping forces
    ///
    /// Damping from the basic damping matrix is already part of the basic force.
    pub fn resisting_force_inc_inertia(&self) -> SpringResult<FEVec> {
        let mut p = self.resisting_force()?;
        if self.add_rayleigh && !self.rayleigh.is_stiffness_free() {
            p += self.rayleigh_damping()? * &self.trial.ug_dot;
        }
        Ok(p)
    }

    // ========================
    // Loads
    // ========================

    /// Remove all element loads
    pub fn zero_load(&mut self) {
        self.load.fill(0.0);
    }

    /// Add an element load scaled by `factor`
    pub fn add_load(&mut self, load: &ElementLoad, factor: f64) -> SpringResult<()> {
        let contribution = match load {
            ElementLoad::Global(values) => {
                if values.len() != self.num_dof() {
                    return Err(SpringError::InvalidLoad(format!(
                        "expected {} global end forces, got {}",
                        self.num_dof(),
                        values.len()
                    )));
                }
                FEVec::from_column_slice(values) * factor
            }
            ElementLoad::Basic(values) => {
                if values.len() != self.num_dir() {
                    return Err(SpringError::InvalidLoad(format!(
                        "expected {} basic forces, got {}",
                        self.num_dir(),
                        values.len()
                    )));
                }
                let geometry = self.geometry()?;
                geometry.transformations.global_basic().transpose()
                    * FEVec::from_column_slice(values)
                    * factor
            }
        };

        self.load += contribution;
        Ok(())
    }

    /// Accumulated element load as global end forces
    pub fn load(&self) -> &FEVec {
        &self.load
    }

    // ========================
    // Responses
    // ========================

    /// Look up a response quantity by recorder name
    pub fn response(&self, name: &str) -> SpringResult<Response> {
        let kind = ResponseKind::from_name(name)?;
        self.response_for(kind)
    }

    /// Evaluate a response quantity
    pub fn response_for(&self, kind: ResponseKind) -> SpringResult<Response> {
        match kind {
            ResponseKind::GlobalForce => Ok(Response::Vector(self.resisting_force()?)),
            ResponseKind::LocalForce => {
                let geometry = self.geometry()?;
                Ok(Response::Vector(self.local_force(geometry)))
            }
            ResponseKind::BasicForce => Ok(Response::Vector(self.trial.qb.clone())),
            ResponseKind::LocalDisplacement => Ok(Response::Vector(self.trial.ul.clone())),
            ResponseKind::BasicDisplacement => Ok(Response::Vector(self.trial.ub.clone())),
            ResponseKind::BasicStiffness => Ok(Response::Matrix(self.kb.clone())),
            ResponseKind::BasicDamping => self
                .cb
                .clone()
                .map(Response::Matrix)
                .ok_or_else(|| SpringError::ResponseUnavailable(kind.name().to_string())),
        }
    }
}
