//! Road network model
//!
//! Contains the node and edge types of the road graph and the immutable
//! [`RoadNetwork`] that owns them together with its spatial index.

pub mod components;
pub mod network;

pub use components::{EdgeIdentity, RoadEdge, RoadNode};
pub use network::RoadNetwork;
