use geo::Point;
use log::trace;
use petgraph::graph::EdgeIndex;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::crs::reproject;
use crate::model::EdgeIdentity;
use crate::{Crs, EdgeKey, Error, NodeId, RoadNetwork};

/// Query coordinate, constructed per request.
///
/// For a projected `crs` the fields hold northing (`lat`) and easting
/// (`lon`) in that system's units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueryPoint {
    pub lat: f64,
    pub lon: f64,
    /// Source CRS; `None` means WGS84
    #[serde(default)]
    pub crs: Option<Crs>,
}

impl QueryPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon, crs: None }
    }

    pub fn with_crs(mut self, crs: Crs) -> Self {
        self.crs = Some(crs);
        self
    }

    pub fn source_crs(&self) -> Crs {
        self.crs.unwrap_or_default()
    }

    /// Check that the coordinates are finite and, for geographic input,
    /// within latitude/longitude range.
    pub fn validate(&self) -> Result<(), Error> {
        let invalid = |reason: &str| Error::InvalidPoint {
            lat: self.lat,
            lon: self.lon,
            reason: reason.to_string(),
        };

        if !self.lat.is_finite() || !self.lon.is_finite() {
            return Err(invalid("coordinates must be finite"));
        }
        if !self.source_crs().is_projected() {
            if !(-90.0..=90.0).contains(&self.lat) {
                return Err(invalid("latitude out of range"));
            }
            if !(-180.0..=180.0).contains(&self.lon) {
                return Err(invalid("longitude out of range"));
            }
        }
        Ok(())
    }

    /// The point as `(x, y)` in its own CRS
    pub fn to_point(&self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}

/// Nearest edge to a query point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedEdgeMatch {
    pub u: NodeId,
    pub v: NodeId,
    pub key: EdgeKey,
    /// Handle to the edge attributes in the network graph
    pub edge: EdgeIndex,
    /// Distance from the query point in working-plane units (meters for
    /// geographic and SVY21 networks)
    pub distance_m: f64,
}

impl ResolvedEdgeMatch {
    pub fn identity(&self) -> EdgeIdentity {
        EdgeIdentity {
            u: self.u,
            v: self.v,
            key: self.key,
        }
    }
}

/// Resolve the nearest edge for every point, in input order.
///
/// The outer error is returned only when the network has nothing to search;
/// a bad point fails its own slot with `InvalidPoint`.
pub fn nearest_edges(
    network: &RoadNetwork,
    points: &[QueryPoint],
) -> Result<Vec<Result<ResolvedEdgeMatch, Error>>, Error> {
    if network.edge_count() == 0 || network.spatial_index().is_empty() {
        return Err(Error::GraphEmpty);
    }

    Ok(points
        .par_iter()
        .map(|point| resolve(network, point))
        .collect())
}

/// Single-point form of [`nearest_edges`]
pub fn nearest_edge(network: &RoadNetwork, point: &QueryPoint) -> Result<ResolvedEdgeMatch, Error> {
    nearest_edges(network, std::slice::from_ref(point))?
        .pop()
        .unwrap_or(Err(Error::GraphEmpty))
}

fn resolve(network: &RoadNetwork, point: &QueryPoint) -> Result<ResolvedEdgeMatch, Error> {
    point.validate()?;

    let index = network.spatial_index();
    let working = reproject(point.to_point(), point.source_crs(), network.working_crs());
    let planar = index.plane().project(working);

    if !planar.x().is_finite() || !planar.y().is_finite() {
        return Err(Error::InvalidPoint {
            lat: point.lat,
            lon: point.lon,
            reason: format!("not representable in {}", network.working_crs()),
        });
    }

    let (nearest, distance) = index.nearest(planar).ok_or(Error::GraphEmpty)?;
    trace!(
        "({}, {}) -> edge {:?} at {distance:.2}",
        point.lat, point.lon, nearest.identity
    );

    Ok(ResolvedEdgeMatch {
        u: nearest.identity.u,
        v: nearest.identity.v,
        key: nearest.identity.key,
        edge: nearest.edge,
        distance_m: distance,
    })
}
