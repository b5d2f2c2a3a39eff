//! Node registry the element resolves its node tags against

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::elements::Node;
use crate::error::{SpringError, SpringResult};

/// Read access to nodes, keyed by tag
///
/// The element never owns nodes; it only holds their tags and queries the
/// domain at bind time and on every `update`.
pub trait Domain {
    /// Reference coordinates of a node
    fn node_coordinates(&self, tag: i32) -> Option<&[f64]>;

    /// Number of DOFs at a node
    fn node_dof_count(&self, tag: i32) -> Option<usize>;

    /// Trial displacements of a node
    fn trial_displacement(&self, tag: i32) -> Option<&[f64]>;

    /// Trial velocities of a node, `None` in static analysis
    fn trial_velocity(&self, tag: i32) -> Option<&[f64]>;
}

/// In-memory node registry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeRegistry {
    /// Nodes by tag
    pub nodes: HashMap<i32, Node>,
}

impl NodeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the registry
    pub fn add_node(&mut self, tag: i32, mut node: Node) -> SpringResult<()> {
        if self.nodes.contains_key(&tag) {
            return Err(SpringError::DuplicateNode(tag));
        }
        node.trial_displacement.resize(node.ndf, 0.0);
        node.trial_velocity.resize(node.ndf, 0.0);
        self.nodes.insert(tag, node);
        Ok(())
    }

    /// Remove a node, returning it
    pub fn remove_node(&mut self, tag: i32) -> SpringResult<Node> {
        self.nodes.remove(&tag).ok_or(SpringError::NodeNotFound(tag))
    }

    /// Get a node by tag
    pub fn node(&self, tag: i32) -> SpringResult<&Node> {
        self.nodes.get(&tag).ok_or(SpringError::NodeNotFound(tag))
    }

    /// Set the trial displacements of a node
    pub fn set_trial_displacement(&mut self, tag: i32, values: &[f64]) -> SpringResult<()> {
        let node = self.nodes.get_mut(&tag).ok_or(SpringError::NodeNotFound(tag))?;
        if values.len() != node.ndf {
            return Err(SpringError::Configuration(format!(
                "node {} has {} DOFs, got {} displacements",
                tag,
                node.ndf,
                values.len()
            )));
        }
        node.trial_displacement.copy_from_slice(values);
        Ok(())
    }

    /// Set the trial velocities of a node
    pub fn set_trial_velocity(&mut self, tag: i32, values: &[f64]) -> SpringResult<()> {
        let node = self.nodes.get_mut(&tag).ok_or(SpringError::NodeNotFound(tag))?;
        if values.len() != node.ndf {
            return Err(SpringError::Configuration(format!(
                "node {} has {} DOFs, got {} velocities",
                tag,
                node.ndf,
                values.len()
            )));
        }
        node.trial_velocity.copy_from_slice(values);
        Ok(())
    }

    /// Zero the trial response of every node
    pub fn zero_response(&mut self) {
        for node in self.nodes.values_mut() {
            node.zero_response();
        }
    }
}

impl Domain for NodeRegistry {
    fn node_coordinates(&self, tag: i32) -> Option<&[f64]> {
        self.nodes.get(&tag).map(|n| n.coords.as_slice())
    }

    fn node_dof_count(&self, tag: i32) -> Option<usize> {
        self.nodes.get(&tag).map(|n| n.ndf)
    }

    fn trial_displacement(&self, tag: i32) -> Option<&[f64]> {
        self.nodes.get(&tag).map(|n| n.trial_displacement())
    }

    fn trial_velocity(&self, tag: i32) -> Option<&[f64]> {
        self.nodes.get(&tag).map(|n| n.trial_velocity())
    }
}
