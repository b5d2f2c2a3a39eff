//! Trial and committed response snapshots

use crate::math::Vec;

/// Response of the element at one point of the analysis
#[derive(Debug, Clone, PartialEq)]
pub struct SpringState {
    /// Displacements in the basic system
    pub ub: Vec,
    /// Velocities in the basic system
    pub ub_dot: Vec,
    /// Forces in the basic system
    pub qb: Vec,
    /// Displacements in the local system
    pub ul: Vec,
    /// Global node velocities, used for Rayleigh damping forces
    pub ug_dot: Vec,
}

impl SpringState {
    /// Zero state for `num_dir` basic directions and `num_dof` element DOFs
    pub fn zeros(num_dir: usize, num_dof: usize) -> Self {
        Self {
            ub: Vec::zeros(num_dir),
            ub_dot: Vec::zeros(num_dir),
            qb: Vec::zeros(num_dir),
            ul: Vec::zeros(num_dof),
            ug_dot: Vec::zeros(num_dof),
        }
    }

    /// True when every quantity is zero
    pub fn is_zero(&self) -> bool {
        [&self.ub, &self.ub_dot, &self.qb, &self.ul, &self.ug_dot]
            .iter()
            .all(|v| v.iter().all(|x| *x == 0.0))
    }
}
