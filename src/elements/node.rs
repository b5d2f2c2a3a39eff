//! Node - a point in 1D, 2D or 3D space carrying trial response

use serde::{Deserialize, Serialize};

/// A node as seen by the spring element
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Reference coordinates, one per spatial dimension
    pub coords: Vec<f64>,
    /// Number of degrees of freedom at this node
    pub ndf: usize,

    /// Trial displacements, one per DOF
    #[serde(skip)]
    pub(crate) trial_displacement: Vec<f64>,

    /// Trial velocities, one per DOF
    #[serde(skip)]
    pub(crate) trial_velocity: Vec<f64>,
}

impl Node {
    /// Create a new node at the given coordinates with `ndf` DOFs
    pub fn new(coords: &[f64], ndf: usize) -> Self {
        Self {
            coords: coords.to_vec(),
            ndf,
            trial_displacement: vec![0.0; ndf],
            trial_velocity: vec![0.0; ndf],
        }
    }

    /// Node in a 2D model
    pub fn new_2d(x: f64, y: f64, ndf: usize) -> Self {
        Self::new(&[x, y], ndf)
    }

    /// Node in a 3D model
    pub fn new_3d(x: f64, y: f64, z: f64, ndf: usize) -> Self {
        Self::new(&[x, y, z], ndf)
    }

    /// Spatial dimension of the node
    pub fn dimension(&self) -> usize {
        self.coords.len()
    }

    /// Current trial displacements
    pub fn trial_displacement(&self) -> &[f64] {
        &self.trial_displacement
    }

    /// Current trial velocities
    pub fn trial_velocity(&self) -> &[f64] {
        &self.trial_velocity
    }

    /// Reset trial response to zero
    pub fn zero_response(&mut self) {
        self.trial_displacement.iter_mut().for_each(|v| *v = 0.0);
        self.trial_velocity.iter_mut().for_each(|v| *v = 0.0);
    }
}
