// Re-export key components
pub use crate::batch::{DelayResolver, DelayResult, SkipReason};
pub use crate::crs::Crs;
pub use crate::delay::{SpeedProfile, delay, estimate};
pub use crate::geometry::{edge_geometry, to_wkt};
pub use crate::loading::{NetworkConfig, load_road_network};
pub use crate::model::{EdgeIdentity, RoadNetwork};
pub use crate::spatial::{QueryPoint, ResolvedEdgeMatch, nearest_edge, nearest_edges};
pub use crate::store::{CsvRecordStore, FloodPoint, MemoryRecordStore, RecordStore};

// Core identifiers
pub use crate::EdgeKey;
pub use crate::FloodId;
pub use crate::Minutes;
pub use crate::NodeId;

pub use crate::Error;
