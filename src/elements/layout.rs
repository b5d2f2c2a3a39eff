//! DOF layouts supported by the spring element

use serde::{Deserialize, Serialize};

use crate::error::{SpringError, SpringResult};

/// Element DOF layout, named `D{dimension}N{element dofs}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DofLayout {
    /// 1D, one translation per node
    D1N2,
    /// 2D, two translations per node
    D2N4,
    /// 2D frame, two translations and one rotation per node
    D2N6,
    /// 3D, three translations per node
    D3N6,
    /// 3D frame, three translations and three rotations per node
    D3N12,
}

impl DofLayout {
    /// Every supported layout
    pub const ALL: [DofLayout; 5] = [
        DofLayout::D1N2,
        DofLayout::D2N4,
        DofLayout::D2N6,
        DofLayout::D3N6,
        DofLayout::D3N12,
    ];

    /// Select the layout for a spatial dimension and a per-node DOF count
    pub fn classify(dimension: usize, dofs_per_node: usize) -> SpringResult<Self> {
        match (dimension, dofs_per_node) {
            (1, 1) => Ok(DofLayout::D1N2),
            (2, 2) => Ok(DofLayout::D2N4),
            (2, 3) => Ok(DofLayout::D2N6),
            (3, 3) => Ok(DofLayout::D3N6),
            (3, 6) => Ok(DofLayout::D3N12),
            _ => Err(SpringError::Configuration(format!(
                "unsupported combination of dimension {} and {} DOFs per node",
                dimension, dofs_per_node
            ))),
        }
    }

    /// Select the layout for a spatial dimension and a total element DOF count
    pub fn from_element_dofs(dimension: usize, num_dof: usize) -> SpringResult<Self> {
        if num_dof % 2 != 0 {
            return Err(SpringError::Configuration(format!(
                "element DOF count {} is not split evenly between two nodes",
                num_dof
            )));
        }
        Self::classify(dimension, num_dof / 2)
    }

    /// Spatial dimension (1, 2 or 3)
    pub fn dimension(&self) -> usize {
        match self {
            DofLayout::D1N2 => 1,
            DofLayout::D2N4 | DofLayout::D2N6 => 2,
            DofLayout::D3N6 | DofLayout::D3N12 => 3,
        }
    }

    /// DOFs per node
    pub fn dofs_per_node(&self) -> usize {
        match self {
            DofLayout::D1N2 => 1,
            DofLayout::D2N4 => 2,
            DofLayout::D2N6 | DofLayout::D3N6 => 3,
            DofLayout::D3N12 => 6,
        }
    }

    /// Total DOFs of the element (both nodes)
    pub fn num_dof(&self) -> usize {
        2 * self.dofs_per_node()
    }

    /// Local rotational DOF index (node i) resisting bending in the plane of
    /// transverse direction `transverse`, if the layout has one.
    ///
    /// Transverse 1 (local y) bends about local z, transverse 2 (local z)
    /// bends about local y.
    pub fn bending_rotation(&self, transverse: usize) -> Option<usize> {
        match (self, transverse) {
            (DofLayout::D2N6, 1) => Some(2),
            (DofLayout::D3N12, 1) => Some(5),
            (DofLayout::D3N12, 2) => Some(4),
            _ => None,
        }
    }

    /// Transverse translational directions available in this layout
    pub fn transverse_directions(&self) -> &'static [usize] {
        match self {
            DofLayout::D1N2 => &[],
            DofLayout::D2N4 | DofLayout::D2N6 => &[1],
            DofLayout::D3N6 | DofLayout::D3N12 => &[1, 2],
        }
    }

    /// Validate a list of direction codes against this layout
    pub fn validate_directions(&self, directions: &[usize]) -> SpringResult<()> {
        if directions.is_empty() {
            return Err(SpringError::Configuration(
                "at least one direction is required".to_string(),
            ));
        }
        let ndf = self.dofs_per_node();
        let mut seen = [false; 6];
        for &dir in directions {
            if dir >= ndf {
                return Err(SpringError::Configuration(format!(
                    "direction {} is outside the valid range 0..={} for layout {:?}",
                    dir,
                    ndf - 1,
                    self
                )));
            }
            if seen[dir] {
                return Err(SpringError::Configuration(format!(
                    "direction {} is listed more than once",
                    dir
                )));
            }
            seen[dir] = true;
        }
        Ok(())
    }
}
