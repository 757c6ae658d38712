//! Batch resolution of flood events to nearest-road delay figures.
//!
//! Each id is looked up in the [`RecordStore`], snapped to its nearest edge,
//! and turned into a [`DelayResult`]. Items that fail are skipped with a
//! [`SkipReason`]; only failures of the whole operation (store unreachable,
//! nothing to search) surface as an error.

use std::collections::BTreeMap;

use hashbrown::HashMap;
use itertools::Itertools;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

use crate::delay::{Delays, TravelTimes};
use crate::model::EdgeIdentity;
use crate::spatial::ResolvedEdgeMatch;
use crate::store::{FloodPoint, RecordStore};
use crate::{
    Error, FloodId, Minutes, QueryPoint, RoadNetwork, SpeedProfile, delay, edge_geometry,
    estimate, nearest_edges, to_wkt,
};

/// Wire key of the delay when the profile has a single degraded speed
pub const TRAVEL_DELAY_KEY: &str = "time_travel_delay_min";

pub fn time_key(label: &str) -> String {
    format!("time_{label}kmh_min")
}

pub fn delay_key(label: &str) -> String {
    format!("time_travel_delay_{label}kmh_min")
}

/// Nearest-road travel figures for one flood point.
///
/// Timings are flattened into the JSON object, e.g. `time_50kmh_min`,
/// `time_20kmh_min` and `time_travel_delay_min`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayResult {
    /// `None` for ad-hoc points that do not come from the record store
    pub flood_id: Option<FloodId>,
    pub edge: EdgeIdentity,
    pub road_name: Option<String>,
    pub road_type: Option<String>,
    pub length_m: f64,
    #[serde(flatten)]
    pub timings: BTreeMap<String, Minutes>,
    /// WKT of the edge polyline in the network CRS
    pub geometry: Option<String>,
}

impl DelayResult {
    /// Travel time at the speed with this label
    pub fn time_min(&self, label: &str) -> Option<Minutes> {
        self.timings.get(&time_key(label)).copied()
    }

    /// Delay of a degraded speed, for profiles with several degraded speeds
    pub fn delay_min(&self, label: &str) -> Option<Minutes> {
        self.timings.get(&delay_key(label)).copied()
    }

    /// Delay for profiles with a single degraded speed
    pub fn travel_delay_min(&self) -> Option<Minutes> {
        self.timings.get(TRAVEL_DELAY_KEY).copied()
    }
}

fn timings(times: &TravelTimes, delays: &Delays) -> BTreeMap<String, Minutes> {
    let single_delay = delays.len() == 1;
    times
        .iter()
        .map(|(label, minutes)| (time_key(label), minutes))
        .chain(delays.iter().map(|(label, minutes)| {
            let key = if single_delay {
                TRAVEL_DELAY_KEY.to_string()
            } else {
                delay_key(label)
            };
            (key, minutes)
        }))
        .collect()
}

/// Why a batch item produced no result
#[derive(ThisError, Debug)]
pub enum SkipReason {
    #[error("flood event {0} not found")]
    NotFound(FloodId),
    #[error("flood event {flood_id}: {source}")]
    Failed { flood_id: FloodId, source: Error },
}

impl SkipReason {
    pub fn flood_id(&self) -> FloodId {
        match self {
            SkipReason::NotFound(id) | SkipReason::Failed { flood_id: id, .. } => *id,
        }
    }
}

/// Resolves flood ids against a shared road network and record store
#[derive(Clone, Copy)]
pub struct DelayResolver<'a> {
    network: &'a RoadNetwork,
    store: &'a dyn RecordStore,
    profile: &'a SpeedProfile,
}

impl<'a> DelayResolver<'a> {
    pub fn new(
        network: &'a RoadNetwork,
        store: &'a dyn RecordStore,
        profile: &'a SpeedProfile,
    ) -> Self {
        Self {
            network,
            store,
            profile,
        }
    }

    /// Per-id outcomes in request order, duplicates resolved once.
    ///
    /// Store lookup and nearest-edge search run up front for the whole
    /// batch; geometry and travel times are computed as the iterator is
    /// consumed.
    ///
    /// # Errors
    ///
    /// `UpstreamUnavailable` when the store cannot be queried, `GraphEmpty`
    /// when the network has nothing to search.
    pub fn resolve_iter(
        &self,
        ids: &[FloodId],
    ) -> Result<impl Iterator<Item = Result<DelayResult, SkipReason>> + use<'a>, Error> {
        let ids: Vec<FloodId> = ids.iter().copied().unique().collect();

        let records: HashMap<FloodId, FloodPoint> = self
            .store
            .get_points(&ids)
            .map_err(|e| match e {
                Error::UpstreamUnavailable(_) => e,
                other => Error::UpstreamUnavailable(other.to_string()),
            })?
            .into_iter()
            .map(|point| (point.flood_id, point))
            .collect();

        let points: Vec<QueryPoint> = ids
            .iter()
            .filter_map(|id| records.get(id))
            .map(FloodPoint::query_point)
            .collect();
        let mut matches = nearest_edges(self.network, &points)?.into_iter();

        let lookups: Vec<(FloodId, Option<Result<ResolvedEdgeMatch, Error>>)> = ids
            .into_iter()
            .map(|id| (id, records.contains_key(&id).then(|| matches.next()).flatten()))
            .collect();

        let resolver = *self;
        Ok(lookups.into_iter().map(move |(id, lookup)| match lookup {
            None => Err(SkipReason::NotFound(id)),
            Some(matched) => matched
                .and_then(|matched| resolver.describe(Some(id), &matched))
                .map_err(|source| SkipReason::Failed { flood_id: id, source }),
        }))
    }

    /// Resolve every id, skipping (and logging) the ones that fail.
    ///
    /// An empty result is a normal outcome, not an error.
    pub fn resolve_many(&self, ids: &[FloodId]) -> Result<Vec<DelayResult>, Error> {
        let results: Vec<DelayResult> = self
            .resolve_iter(ids)?
            .filter_map(|outcome| match outcome {
                Ok(result) => Some(result),
                Err(skip) => {
                    warn!("Skipping {skip}");
                    None
                }
            })
            .collect();

        debug!("Resolved {} of {} requested flood events", results.len(), ids.len());
        Ok(results)
    }

    /// Delay figures for an arbitrary point
    pub fn resolve_point(
        &self,
        flood_id: Option<FloodId>,
        point: &QueryPoint,
    ) -> Result<DelayResult, Error> {
        let matched = crate::nearest_edge(self.network, point)?;
        self.describe(flood_id, &matched)
    }

    fn describe(
        &self,
        flood_id: Option<FloodId>,
        matched: &ResolvedEdgeMatch,
    ) -> Result<DelayResult, Error> {
        let edge = self.network.edge(matched.edge).ok_or(Error::IncompleteEdge {
            u: matched.u,
            v: matched.v,
            key: matched.key,
        })?;
        let geometry = edge_geometry(self.network, matched)?;

        let times = estimate(edge.length_m, self.profile)?;
        let delays = delay(&times, self.profile.baseline())?;

        Ok(DelayResult {
            flood_id,
            edge: matched.identity(),
            road_name: edge.name.clone(),
            road_type: edge.highway.clone(),
            length_m: edge.length_m,
            timings: timings(&times, &delays),
            geometry: Some(to_wkt(&geometry)),
        })
    }
}
