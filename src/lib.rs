//! Spring Element - a two-node linear elastic spring for structural analysis
//!
//! The element connects two nodes in 1D, 2D or 3D and resists deformation
//! along a chosen set of local directions with a constant, symmetric
//! stiffness matrix. It supports:
//! - Arbitrary orientation through local x and y vectors
//! - Optional viscous and Rayleigh damping
//! - Optional P-Delta correction weighted by end moment ratios
//! - Trial/committed state for incremental-iterative analysis
//! - A versioned wire format for checkpoints and parallel runs
//!
//! ## Example
//! ```rust
//! use spring_element::prelude::*;
//!
//! let mut domain = NodeRegistry::new();
//! domain.add_node(1, Node::new_2d(0.0, 0.0, 2)).unwrap();
//! domain.add_node(2, Node::new_2d(3.0, 0.0, 2)).unwrap();
//!
//! // Axial and shear spring
//! let def = SpringDefinition::new(
//!     1, 2, 2, 1, 2, &[0, 1],
//!     vec![vec![1000.0, 0.0], vec![0.0, 2000.0]],
//! );
//! let mut spring = SpringElement::new(&def).unwrap();
//! spring.set_domain(&domain).unwrap();
//!
//! domain.set_trial_displacement(2, &[0.01, 0.0]).unwrap();
//! spring.update(&domain).unwrap();
//! let force = spring.resisting_force().unwrap();
//! assert!((force[2] - 10.0).abs() < 1e-9);
//! spring.commit_state();
//! ```

pub mod analysis;
pub mod codec;
pub mod elements;
pub mod error;
pub mod loads;
pub mod math;
pub mod model;
pub mod results;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::RayleighFactors;
    pub use crate::codec::{pack, unpack, Channel, MemoryChannel, Packet};
    pub use crate::elements::{DofLayout, Node, SpringDefinition, SpringElement, SpringState};
    pub use crate::error::{DecodeError, SpringError, SpringResult, UpdateError};
    pub use crate::loads::ElementLoad;
    pub use crate::math::MomentRatios;
    pub use crate::model::{Domain, NodeRegistry};
    pub use crate::results::{Response, ResponseKind};
}
