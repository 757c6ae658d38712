//! Road network components - nodes and edges

use geo::{LineString, Point};
use serde::{Deserialize, Serialize};

use crate::{EdgeKey, NodeId};

/// Road graph node
#[derive(Debug, Clone, PartialEq)]
pub struct RoadNode {
    /// OSM ID of the node
    pub id: NodeId,
    /// Node coordinates in the network CRS, if known
    pub geometry: Option<Point<f64>>,
}

impl RoadNode {
    pub fn new(id: NodeId, x: f64, y: f64) -> Self {
        Self {
            id,
            geometry: Some(Point::new(x, y)),
        }
    }

    /// Node referenced by an edge but never given coordinates
    pub fn without_coordinates(id: NodeId) -> Self {
        Self { id, geometry: None }
    }
}

/// Road graph edge (directed road segment)
#[derive(Debug, Clone, PartialEq)]
pub struct RoadEdge {
    pub u: NodeId,
    pub v: NodeId,
    /// Distinguishes parallel edges between `u` and `v`
    pub key: EdgeKey,
    pub name: Option<String>,
    /// OSM `highway` class, e.g. "primary" or "residential"
    pub highway: Option<String>,
    /// Edge length in meters
    pub length_m: f64,
    /// Explicit polyline geometry; absent for straight segments
    pub geometry: Option<LineString<f64>>,
}

impl RoadEdge {
    pub fn identity(&self) -> EdgeIdentity {
        EdgeIdentity {
            u: self.u,
            v: self.v,
            key: self.key,
        }
    }
}

/// `(u, v, key)` triple identifying an edge of the multigraph.
///
/// Ordering is lexicographic over `u`, `v`, `key`, and is the tie-break
/// between equally near edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeIdentity {
    pub u: NodeId,
    pub v: NodeId,
    pub key: EdgeKey,
}
