//! Nearest-edge resolution against the road network

mod index;
mod nearest;

pub(crate) use index::EdgeSpatialIndex;
pub use nearest::{QueryPoint, ResolvedEdgeMatch, nearest_edge, nearest_edges};
