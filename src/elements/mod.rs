//! Spring element and the types it is built from

mod definition;
mod layout;
mod node;
mod spring;
mod state;

pub use definition::SpringDefinition;
pub use layout::DofLayout;
pub use node::Node;
pub use spring::SpringElement;
pub use state::SpringState;
