//! Nearest-road resolution and travel-time delay estimation for flood
//! points on a road network.
//!
//! The road network is loaded once ([`load_road_network`]) and shared
//! read-only. Flood points come from a [`RecordStore`]; the
//! [`DelayResolver`] snaps each one to its nearest road edge and derives
//! travel times at the configured speeds.

pub mod batch;
pub mod crs;
pub mod delay;
mod error;
pub mod geometry;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod spatial;
pub mod store;

pub use batch::{DelayResolver, DelayResult, SkipReason};
pub use crs::Crs;
pub use delay::{Delays, Speed, SpeedProfile, TravelTimes, delay, estimate};
pub use error::Error;
pub use geometry::{edge_geometry, to_wkt};
pub use loading::{NetworkConfig, load_road_network};
pub use model::{EdgeIdentity, RoadEdge, RoadNetwork, RoadNode};
pub use spatial::{QueryPoint, ResolvedEdgeMatch, nearest_edge, nearest_edges};
pub use store::{CsvRecordStore, FloodPoint, MemoryRecordStore, RecordStore, parse_id_list};

/// OSM node identifier
pub type NodeId = i64;
/// Flood event identifier as stored in the record store
pub type FloodId = i64;
/// Disambiguates parallel edges between the same pair of nodes
pub type EdgeKey = u32;
/// Travel time in minutes, rounded to two decimals
pub type Minutes = f64;

/// Distance under which two candidate edges count as equally near, in meters
pub const TIE_TOLERANCE_M: f64 = 1e-9;
