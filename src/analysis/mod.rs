//! Analysis-level settings consumed by the element

use serde::{Deserialize, Serialize};

/// Rayleigh damping factors `C = αM·M + βK·K + βK0·K0 + βKc·Kc`
///
/// Set by the analysis driver; only used when the element's Rayleigh flag is on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RayleighFactors {
    /// Mass proportional factor
    pub alpha_m: f64,
    /// Current tangent stiffness proportional factor
    pub beta_k: f64,
    /// Initial stiffness proportional factor
    pub beta_k0: f64,
    /// Last committed stiffness proportional factor
    pub beta_kc: f64,
}

impl RayleighFactors {
    /// Create factors with all four terms
    pub fn new(alpha_m: f64, beta_k: f64, beta_k0: f64, beta_kc: f64) -> Self {
        Self {
            alpha_m,
            beta_k,
            beta_k0,
            beta_kc,
        }
    }

    /// Set the mass proportional factor
    pub fn with_alpha_m(mut self, alpha_m: f64) -> Self {
        self.alpha_m = alpha_m;
        self
    }

    /// Set the current stiffness proportional factor
    pub fn with_beta_k(mut self, beta_k: f64) -> Self {
        self.beta_k = beta_k;
        self
    }

    /// Set the initial stiffness proportional factor
    pub fn with_beta_k0(mut self, beta_k0: f64) -> Self {
        self.beta_k0 = beta_k0;
        self
    }

    /// Set the committed stiffness proportional factor
    pub fn with_beta_kc(mut self, beta_kc: f64) -> Self {
        self.beta_kc = beta_kc;
        self
    }

    /// True when no stiffness proportional term is active
    ///
    /// The element is massless, so `alpha_m` never contributes.
    pub fn is_stiffness_free(&self) -> bool {
        self.beta_k == 0.0 && self.beta_k0 == 0.0 && self.beta_kc == 0.0
    }
}
