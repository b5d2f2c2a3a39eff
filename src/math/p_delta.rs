//! P-Delta correction of local forces and stiffness
//!
//! The axial basic force `N` acting through the relative transverse
//! displacement `Δ` of the two nodes produces a moment `N·Δ`. A share of that
//! moment, given by the moment ratios, is carried by the element: as end
//! moments where the layout has a matching rotational direction, otherwise as
//! an equivalent shear couple. The remaining share is not redistributed.
//!
//! The correction is linear in the local displacements for a fixed `N`, so it
//! is stored as an operator `G` with `Δp = N·G·ul` and `ΔK = N·G`.

use log::warn;
use serde::{Deserialize, Serialize};

use super::transform::LENGTH_TOLERANCE;
use super::{Mat, Vec};
use crate::elements::DofLayout;
use crate::error::{SpringError, SpringResult};

/// Moment distribution ratios `[ry_i, ry_j, rz_i, rz_j]`
///
/// `ry_*` apply to bending about local y (transverse direction 2),
/// `rz_*` to bending about local z (transverse direction 1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MomentRatios([f64; 4]);

impl MomentRatios {
    /// Create validated moment ratios
    ///
    /// Each ratio must be finite and non-negative, and each end pair must sum to at most one.
    pub fn new(ratios: [f64; 4]) -> SpringResult<Self> {
        if ratios.iter().any(|r| !r.is_finite() || *r < 0.0) {
            return Err(SpringError::Configuration(format!(
                "moment ratios must be finite and non-negative, got {:?}",
                ratios
            )));
        }

        for (axis, pair) in [("y", [ratios[0], ratios[1]]), ("z", [ratios[2], ratios[3]])] {
            let sum = pair[0] + pair[1];
            if sum > 1.0 + 1e-12 {
                return Err(SpringError::Configuration(format!(
                    "moment ratios about local {} sum to {} (> 1)",
                    axis, sum
                )));
            }
        }

        Ok(Self(ratios))
    }

    /// Create moment ratios from a slice of exactly four values
    pub fn from_slice(ratios: &[f64]) -> SpringResult<Self> {
        let array: [f64; 4] = ratios.try_into().map_err(|_| {
            SpringError::Configuration(format!(
                "expected 4 moment ratios, got {}",
                ratios.len()
            ))
        })?;
        Self::new(array)
    }

    /// Share of the P-Delta moment not carried for a transverse direction
    pub fn remainder(&self, transverse: usize) -> f64 {
        let (r_i, r_j) = self.pair(transverse);
        (1.0 - r_i - r_j).max(0.0)
    }

    /// Ratios as `[ry_i, ry_j, rz_i, rz_j]`
    pub fn as_array(&self) -> [f64; 4] {
        self.0
    }

    /// End ratios `(i, j)` for a transverse direction (1 = local y, 2 = local z)
    pub fn pair(&self, transverse: usize) -> (f64, f64) {
        if transverse == 2 {
            (self.0[0], self.0[1])
        } else {
            (self.0[2], self.0[3])
        }
    }
}

/// Declared transverse directions whose moment ratios leave part of `N·Δ` uncarried
pub fn uncarried_shares(
    layout: DofLayout,
    directions: &[usize],
    ratios: &MomentRatios,
) -> std::vec::Vec<(usize, f64)> {
    layout
        .transverse_directions()
        .iter()
        .filter(|&&t| directions.contains(&t))
        .map(|&t| (t, ratios.remainder(t)))
        .filter(|&(_, share)| share > 0.0)
        .collect()
}

/// P-Delta operator for a bound element
#[derive(Debug, Clone, PartialEq)]
pub struct PDeltaCorrector {
    /// Index of the axial direction within the basic vector
    axial_index: usize,
    /// `num_dof x num_dof` operator scaled by the axial force
    operator: Mat,
}

impl PDeltaCorrector {
    /// Build the operator, or `None` when the axial direction is not declared
    ///
    /// # Arguments
    /// * `layout` - DOF layout of the element
    /// * `directions` - Declared basic directions
    /// * `ratios` - Moment distribution ratios
    /// * `length` - Element length
    pub fn new(
        layout: DofLayout,
        directions: &[usize],
        ratios: &MomentRatios,
        length: f64,
    ) -> Option<Self> {
        let axial_index = directions.iter().position(|&d| d == 0)?;
        let n = layout.num_dof();
        let ndf = layout.dofs_per_node();
        let mut g = Mat::zeros(n, n);

        for &t in layout.transverse_directions() {
            if !directions.contains(&t) {
                continue;
            }
            let (r_i, r_j) = ratios.pair(t);
            let rotation = layout
                .bending_rotation(t)
                .filter(|rot| directions.contains(rot));

            match rotation {
                Some(rot) => {
                    // bending about local y has the opposite sign convention
                    let s = if t == 1 { 1.0 } else { -1.0 };
                    g[(rot, t)] -= s * r_i;
                    g[(rot, t + ndf)] += s * r_i;
                    g[(rot + ndf, t)] -= s * r_j;
                    g[(rot + ndf, t + ndf)] += s * r_j;
                }
                None if length > LENGTH_TOLERANCE => {
                    let c = (r_i + r_j) / length;
                    g[(t, t)] += c;
                    g[(t, t + ndf)] -= c;
                    g[(t + ndf, t)] -= c;
                    g[(t + ndf, t + ndf)] += c;
                }
                None => {}
            }
        }

        for (t, share) in uncarried_shares(layout, directions, ratios) {
            warn!(
                "moment ratios for transverse direction {} leave {} of the P-Delta moment unredistributed",
                t, share
            );
        }

        Some(Self {
            axial_index,
            operator: g,
        })
    }

    /// Axial force taken from the basic force vector
    pub fn axial_force(&self, qb: &Vec) -> f64 {
        qb[self.axial_index]
    }

    /// Correction to the local resisting force
    pub fn local_force(&self, qb: &Vec, ul: &Vec) -> Vec {
        let n = self.axial_force(qb);
        if n == 0.0 {
            return Vec::zeros(self.operator.nrows());
        }
        &self.operator * ul * n
    }

    /// Correction to the local tangent stiffness
    pub fn local_stiffness(&self, qb: &Vec) -> Mat {
        &self.operator * self.axial_force(qb)
    }
}
