//! R-tree over edge polylines in a planar working space.
//!
//! Projected networks are indexed in their own units. Geographic networks
//! are mapped to a local equirectangular plane in meters, centred on the
//! mean node latitude, so envelope pruning and distances agree.

use geo::{BoundingRect, Distance, Euclidean, LineString, Point};
use log::warn;
use petgraph::graph::{DiGraph, EdgeIndex};
use petgraph::visit::EdgeRef;
use rstar::{AABB, Envelope, PointDistance, RTree, RTreeObject};

use crate::model::{EdgeIdentity, RoadEdge, RoadNode};
use crate::{Crs, TIE_TOLERANCE_M};

const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Maps working-CRS coordinates to the plane the index is built in.
///
/// `Equirectangular` scales longitude by the cosine of one reference
/// latitude. Within a city-sized extent the distance error stays well under
/// 1%; it grows with the latitude span of the network and is not suitable
/// for continental graphs.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Plane {
    Projected,
    Equirectangular { cos_lat: f64 },
}

impl Plane {
    fn for_graph(graph: &DiGraph<RoadNode, RoadEdge>, crs: Crs) -> Self {
        if crs.is_projected() {
            return Plane::Projected;
        }

        let (sum, count) = graph
            .node_weights()
            .filter_map(|node| node.geometry)
            .fold((0.0, 0usize), |(sum, count), point| (sum + point.y(), count + 1));
        let mean_lat = if count == 0 { 0.0 } else { sum / count as f64 };

        Plane::Equirectangular {
            cos_lat: mean_lat.to_radians().cos(),
        }
    }

    pub(crate) fn project(self, point: Point<f64>) -> Point<f64> {
        match self {
            Plane::Projected => point,
            Plane::Equirectangular { cos_lat } => Point::new(
                EARTH_RADIUS_M * point.x().to_radians() * cos_lat,
                EARTH_RADIUS_M * point.y().to_radians(),
            ),
        }
    }
}

/// Edge polyline stored in the R-tree
#[derive(Debug)]
pub(crate) struct IndexedEdge {
    pub(crate) edge: EdgeIndex,
    pub(crate) identity: EdgeIdentity,
    line: LineString<f64>,
}

impl RTreeObject for IndexedEdge {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        match self.line.bounding_rect() {
            Some(rect) => AABB::from_corners(
                [rect.min().x, rect.min().y],
                [rect.max().x, rect.max().y],
            ),
            None => AABB::new_empty(),
        }
    }
}

impl PointDistance for IndexedEdge {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let point = Point::new(point[0], point[1]);
        Euclidean.distance(&point, &self.line).powi(2)
    }
}

pub(crate) struct EdgeSpatialIndex {
    tree: RTree<IndexedEdge>,
    plane: Plane,
}

impl EdgeSpatialIndex {
    pub(crate) fn build(graph: &DiGraph<RoadNode, RoadEdge>, crs: Crs) -> Self {
        let plane = Plane::for_graph(graph, crs);

        let edges: Vec<IndexedEdge> = graph
            .edge_references()
            .filter_map(|edge| {
                let weight = edge.weight();
                let line = match &weight.geometry {
                    Some(geometry) if geometry.0.len() >= 2 => geometry.clone(),
                    _ => {
                        let source = graph[edge.source()].geometry?;
                        let target = graph[edge.target()].geometry?;
                        LineString::from(vec![source, target])
                    }
                };
                Some(IndexedEdge {
                    edge: edge.id(),
                    identity: weight.identity(),
                    line: line.points().map(|p| plane.project(p)).collect(),
                })
            })
            .collect();

        let skipped = graph.edge_count() - edges.len();
        if skipped > 0 {
            warn!("{skipped} edges have neither geometry nor node coordinates and are not indexed");
        }

        Self {
            tree: RTree::bulk_load(edges),
            plane,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.tree.size()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    pub(crate) fn plane(&self) -> Plane {
        self.plane
    }

    /// Nearest edge to a point already in the working plane.
    ///
    /// Edges within [`TIE_TOLERANCE_M`] of the best distance are equally
    /// near; the smallest `(u, v, key)` wins.
    pub(crate) fn nearest(&self, point: Point<f64>) -> Option<(&IndexedEdge, f64)> {
        let query = [point.x(), point.y()];
        let mut candidates = self.tree.nearest_neighbor_iter_with_distance_2(&query);
        let (first, best_2) = candidates.next()?;
        let best = best_2.sqrt();

        let winner = candidates
            .take_while(|(_, distance_2)| distance_2.sqrt() - best <= TIE_TOLERANCE_M)
            .map(|(candidate, _)| candidate)
            .fold(first, |winner, candidate| {
                if candidate.identity < winner.identity {
                    candidate
                } else {
                    winner
                }
            });

        Some((winner, best))
    }
}
