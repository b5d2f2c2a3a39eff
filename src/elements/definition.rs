//! Defining parameters of a spring element

use serde::{Deserialize, Serialize};

/// Immutable parameters a [`SpringElement`](super::SpringElement) is built from
///
/// Matrices are given as rows; only their upper triangle is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpringDefinition {
    /// Element tag
    pub tag: i32,
    /// Spatial dimension (1, 2 or 3)
    pub dimension: usize,
    /// DOFs per node of the connected nodes
    pub dofs_per_node: usize,
    /// Tags of the i and j nodes
    pub nodes: [i32; 2],
    /// Basic directions (local DOF codes)
    pub directions: Vec<usize>,
    /// Stiffness in the basic system
    pub stiffness: Vec<Vec<f64>>,
    /// Damping in the basic system
    #[serde(default)]
    pub damping: Option<Vec<Vec<f64>>>,
    /// Local x axis, defaults to the node-to-node direction
    #[serde(default)]
    pub x: Option<Vec<f64>>,
    /// Local y axis, defaults to global Y
    #[serde(default)]
    pub y: Option<Vec<f64>>,
    /// P-Delta moment ratios `[ry_i, ry_j, rz_i, rz_j]`
    #[serde(default)]
    pub moment_ratios: Option<Vec<f64>>,
    /// Include Rayleigh damping
    #[serde(default)]
    pub add_rayleigh: bool,
}

impl SpringDefinition {
    /// Create a new definition with default orientation, no damping and no P-Delta
    pub fn new(
        tag: i32,
        dimension: usize,
        dofs_per_node: usize,
        i_node: i32,
        j_node: i32,
        directions: &[usize],
        stiffness: Vec<Vec<f64>>,
    ) -> Self {
        Self {
            tag,
            dimension,
            dofs_per_node,
            nodes: [i_node, j_node],
            directions: directions.to_vec(),
            stiffness,
            damping: None,
            x: None,
            y: None,
            moment_ratios: None,
            add_rayleigh: false,
        }
    }

    /// Set the local x axis
    pub fn with_x(mut self, x: [f64; 3]) -> Self {
        self.x = Some(x.to_vec());
        self
    }

    /// Set the local y axis
    pub fn with_y(mut self, y: [f64; 3]) -> Self {
        self.y = Some(y.to_vec());
        self
    }

    /// Enable P-Delta with the given moment ratios
    pub fn with_moment_ratios(mut self, ratios: [f64; 4]) -> Self {
        self.moment_ratios = Some(ratios.to_vec());
        self
    }

    /// Set the damping matrix in the basic system
    pub fn with_damping(mut self, damping: Vec<Vec<f64>>) -> Self {
        self.damping = Some(damping);
        self
    }

    /// Include Rayleigh damping
    pub fn with_rayleigh(mut self) -> Self {
        self.add_rayleigh = true;
        self
    }
}
