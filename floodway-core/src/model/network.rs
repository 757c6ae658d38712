//! Immutable road network with its spatial index

use std::fmt;

use geo::{Coord, Point};
use hashbrown::{HashMap, HashSet};
use log::{debug, info, warn};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;

use super::components::{EdgeIdentity, RoadEdge, RoadNode};
use crate::spatial::EdgeSpatialIndex;
use crate::{Crs, Error, NodeId};

/// Tolerance for geometry endpoints versus node coordinates, in CRS units
const ENDPOINT_TOLERANCE: f64 = 1e-6;

/// Directed road multigraph, loaded once and never mutated.
///
/// Share it between requests behind an `Arc`; replacing it means building
/// a new network and swapping the handle.
pub struct RoadNetwork {
    pub(crate) graph: DiGraph<RoadNode, RoadEdge>,
    node_lookup: HashMap<NodeId, NodeIndex>,
    crs: Option<Crs>,
    index: EdgeSpatialIndex,
}

impl RoadNetwork {
    /// Build a network from node and edge lists.
    ///
    /// # Errors
    ///
    /// `GraphEmpty` when `edges` is empty, `InvalidData` for negative or
    /// non-finite lengths and duplicated `(u, v, key)` triples.
    pub fn new(nodes: Vec<RoadNode>, edges: Vec<RoadEdge>, crs: Option<Crs>) -> Result<Self, Error> {
        if edges.is_empty() {
            return Err(Error::GraphEmpty);
        }

        let mut graph = DiGraph::with_capacity(nodes.len(), edges.len());
        let mut node_lookup = HashMap::with_capacity(nodes.len());

        for node in nodes {
            if node_lookup.contains_key(&node.id) {
                warn!("Duplicate node {} - keeping the first occurrence", node.id);
                continue;
            }
            let id = node.id;
            node_lookup.insert(id, graph.add_node(node));
        }

        let mut seen = HashSet::with_capacity(edges.len());
        let mut missing_nodes = 0usize;

        for mut edge in edges {
            if !edge.length_m.is_finite() || edge.length_m < 0.0 {
                return Err(Error::InvalidData(format!(
                    "Edge {} -> {} (key {}) has invalid length {}",
                    edge.u, edge.v, edge.key, edge.length_m
                )));
            }
            if !seen.insert(edge.identity()) {
                return Err(Error::InvalidData(format!(
                    "Duplicate edge {} -> {} (key {})",
                    edge.u, edge.v, edge.key
                )));
            }

            if edge.geometry.as_ref().is_some_and(|line| line.0.len() < 2) {
                warn!(
                    "Edge {} -> {} (key {}): geometry has fewer than two points",
                    edge.u, edge.v, edge.key
                );
                edge.geometry = None;
            }

            let mut endpoint = |id: NodeId| {
                *node_lookup.entry(id).or_insert_with(|| {
                    missing_nodes += 1;
                    graph.add_node(RoadNode::without_coordinates(id))
                })
            };
            let source = endpoint(edge.u);
            let target = endpoint(edge.v);

            check_endpoints(&graph[source], &graph[target], &edge);
            graph.add_edge(source, target, edge);
        }

        if missing_nodes > 0 {
            warn!("{missing_nodes} nodes referenced by edges have no coordinates");
        }

        let working_crs = match crs {
            Some(crs) => crs,
            None => {
                warn!("Road network CRS is undeclared - assuming {}", Crs::Wgs84);
                Crs::Wgs84
            }
        };

        let index = EdgeSpatialIndex::build(&graph, working_crs);
        info!(
            "Road network ready: {} nodes, {} edges, {} indexed ({working_crs})",
            graph.node_count(),
            graph.edge_count(),
            index.len()
        );

        Ok(Self {
            graph,
            node_lookup,
            crs,
            index,
        })
    }

    /// Declared CRS of the stored coordinates
    pub fn crs(&self) -> Option<Crs> {
        self.crs
    }

    /// CRS used for nearest-edge search; WGS84 when undeclared
    pub fn working_crs(&self) -> Crs {
        self.crs.unwrap_or_default()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn edge(&self, index: EdgeIndex) -> Option<&RoadEdge> {
        self.graph.edge_weight(index)
    }

    pub fn node_by_id(&self, id: NodeId) -> Option<&RoadNode> {
        self.node_lookup.get(&id).map(|&index| &self.graph[index])
    }

    /// Look up an edge by its `(u, v, key)` identity
    pub fn find_edge(&self, identity: EdgeIdentity) -> Option<EdgeIndex> {
        let source = *self.node_lookup.get(&identity.u)?;
        let target = *self.node_lookup.get(&identity.v)?;
        self.graph
            .edges_connecting(source, target)
            .find(|edge| edge.weight().key == identity.key)
            .map(|edge| edge.id())
    }

    pub fn edges(&self) -> impl Iterator<Item = &RoadEdge> {
        self.graph.edge_weights()
    }

    pub(crate) fn spatial_index(&self) -> &EdgeSpatialIndex {
        &self.index
    }
}

impl fmt::Debug for RoadNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoadNetwork")
            .field("nodes", &self.graph.node_count())
            .field("edges", &self.graph.edge_count())
            .field("crs", &self.crs)
            .finish_non_exhaustive()
    }
}

fn check_endpoints(source: &RoadNode, target: &RoadNode, edge: &RoadEdge) {
    let Some(geometry) = &edge.geometry else {
        return;
    };
    let (Some(first), Some(last)) = (geometry.0.first(), geometry.0.last()) else {
        return;
    };

    let coincides = |node: &RoadNode, coord: &Coord<f64>| {
        node.geometry.is_none_or(|point: Point<f64>| {
            (point.x() - coord.x).abs() <= ENDPOINT_TOLERANCE
                && (point.y() - coord.y).abs() <= ENDPOINT_TOLERANCE
        })
    };

    if !coincides(source, first) || !coincides(target, last) {
        debug!(
            "Geometry of edge {} -> {} (key {}) does not start/end at its nodes",
            edge.u, edge.v, edge.key
        );
    }
}
