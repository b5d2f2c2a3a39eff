//! Loads applied directly to a spring element

use serde::{Deserialize, Serialize};

/// A load applied to the element itself rather than to its nodes
///
/// Loads are stored as equivalent end forces in global coordinates and added
/// to the element's resisting force until `zero_load` or `revert_to_start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementLoad {
    /// End forces in global coordinates, one value per element DOF
    Global(Vec<f64>),
    /// Forces along the basic directions, mapped through the transformation chain
    Basic(Vec<f64>),
}

impl ElementLoad {
    /// Global end force load
    pub fn global(forces: &[f64]) -> Self {
        ElementLoad::Global(forces.to_vec())
    }

    /// Basic force load
    pub fn basic(forces: &[f64]) -> Self {
        ElementLoad::Basic(forces.to_vec())
    }

    /// Raw load values
    pub fn values(&self) -> &[f64] {
        match self {
            ElementLoad::Global(v) | ElementLoad::Basic(v) => v,
        }
    }
}
