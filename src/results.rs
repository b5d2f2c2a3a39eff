//! Response quantities exposed to recorders

use serde::Serialize;

use crate::error::{SpringError, SpringResult};
use crate::math::{Mat, Vec};

/// Quantity that can be queried from a spring element by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ResponseKind {
    /// Resisting force in global coordinates
    GlobalForce,
    /// Resisting force in local coordinates, including P-Delta
    LocalForce,
    /// Force in the basic system
    BasicForce,
    /// Displacement in local coordinates
    LocalDisplacement,
    /// Deformation in the basic system
    BasicDisplacement,
    /// Stiffness matrix in the basic system
    BasicStiffness,
    /// Damping matrix in the basic system
    BasicDamping,
}

impl ResponseKind {
    /// Resolve a recorder name
    pub fn from_name(name: &str) -> SpringResult<Self> {
        match name {
            "force" | "forces" | "globalForce" | "globalForces" => Ok(Self::GlobalForce),
            "localForce" | "localForces" => Ok(Self::LocalForce),
            "basicForce" | "basicForces" => Ok(Self::BasicForce),
            "localDisplacement" | "localDisplacements" => Ok(Self::LocalDisplacement),
            "basicDeformation" | "basicDeformations" | "basicDisplacement"
            | "basicDisplacements" => Ok(Self::BasicDisplacement),
            "stiffness" | "basicStiffness" => Ok(Self::BasicStiffness),
            "damping" | "basicDamping" => Ok(Self::BasicDamping),
            _ => Err(SpringError::UnknownResponse(name.to_string())),
        }
    }

    /// Canonical name
    pub fn name(&self) -> &'static str {
        match self {
            Self::GlobalForce => "globalForce",
            Self::LocalForce => "localForce",
            Self::BasicForce => "basicForce",
            Self::LocalDisplacement => "localDisplacement",
            Self::BasicDisplacement => "basicDisplacement",
            Self::BasicStiffness => "basicStiffness",
            Self::BasicDamping => "basicDamping",
        }
    }
}

/// Value returned by a response query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Response {
    Vector(Vec),
    Matrix(Mat),
}

impl Response {
    /// Vector value, if this is a vector response
    pub fn as_vector(&self) -> Option<&Vec> {
        match self {
            Response::Vector(v) => Some(v),
            Response::Matrix(_) => None,
        }
    }

    /// Matrix value, if this is a matrix response
    pub fn as_matrix(&self) -> Option<&Mat> {
        match self {
            Response::Matrix(m) => Some(m),
            Response::Vector(_) => None,
        }
    }
}
