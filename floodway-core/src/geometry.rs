//! Physical path of a resolved edge

use geo::LineString;
use wkt::ToWkt;

use crate::{Error, RoadNetwork, ResolvedEdgeMatch};

/// Polyline of the matched edge in the network CRS.
///
/// Returns the stored geometry verbatim when present, otherwise a straight
/// two-point line between the edge's endpoint nodes.
///
/// # Errors
///
/// `IncompleteEdge` when the edge has no geometry and an endpoint node has
/// no coordinates, or when the match does not refer to an edge of `network`.
pub fn edge_geometry(
    network: &RoadNetwork,
    matched: &ResolvedEdgeMatch,
) -> Result<LineString<f64>, Error> {
    let incomplete = || Error::IncompleteEdge {
        u: matched.u,
        v: matched.v,
        key: matched.key,
    };

    let edge = network
        .edge(matched.edge)
        .filter(|edge| edge.identity() == matched.identity())
        .ok_or_else(incomplete)?;

    if let Some(geometry) = &edge.geometry {
        return Ok(geometry.clone());
    }

    let start = network.node_by_id(edge.u).and_then(|node| node.geometry);
    let end = network.node_by_id(edge.v).and_then(|node| node.geometry);

    match (start, end) {
        (Some(start), Some(end)) => Ok(LineString::from(vec![start, end])),
        _ => Err(incomplete()),
    }
}

/// WKT text of a polyline, e.g. `LINESTRING(103.83 1.42,103.84 1.43)`
pub fn to_wkt(line: &LineString<f64>) -> String {
    line.wkt_string()
}
