//! Flood point record stores.
//!
//! The batch resolver only needs coordinates by id; where they come from
//! (a CSV extract, a database table) sits behind [`RecordStore`].

mod csv;
mod memory;

use chrono::NaiveDate;
use geo::Point;
use geojson::{Geometry, Value as GeoJsonValue};
use serde::{Deserialize, Serialize};

pub use self::csv::CsvRecordStore;
pub use memory::MemoryRecordStore;

use crate::{Error, FloodId, QueryPoint};

/// A flood event location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloodPoint {
    pub flood_id: FloodId,
    #[serde(rename = "latitude")]
    pub lat: f64,
    #[serde(rename = "longitude")]
    pub lon: f64,
    #[serde(rename = "flooded_location", default)]
    pub location: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl FloodPoint {
    pub fn new(flood_id: FloodId, lat: f64, lon: f64) -> Self {
        Self {
            flood_id,
            lat,
            lon,
            location: None,
            date: None,
        }
    }

    pub fn query_point(&self) -> QueryPoint {
        QueryPoint::new(self.lat, self.lon)
    }

    /// `GeoJSON` point geometry (lon, lat)
    pub fn geom(&self) -> Geometry {
        Geometry::new(GeoJsonValue::from(&Point::new(self.lon, self.lat)))
    }
}

/// Source of flood point coordinates.
///
/// Implementations report an unreachable backend as
/// [`Error::UpstreamUnavailable`]; a missing id is `Ok(None)`.
pub trait RecordStore: Send + Sync {
    fn get_point(&self, id: FloodId) -> Result<Option<FloodPoint>, Error>;

    /// Multi-id lookup. Returns only the records that exist.
    fn get_points(&self, ids: &[FloodId]) -> Result<Vec<FloodPoint>, Error> {
        ids.iter()
            .filter_map(|&id| self.get_point(id).transpose())
            .collect()
    }

    fn all_points(&self) -> Result<Vec<FloodPoint>, Error>;
}

/// Parse a comma-separated list of ids such as `"1, 12,3"`
pub fn parse_id_list(raw: &str) -> Result<Vec<FloodId>, Error> {
    if raw.trim().is_empty() {
        return Err(Error::InvalidData("id list is empty".to_string()));
    }

    raw.split(',')
        .map(|part| {
            part.trim().parse::<FloodId>().map_err(|_| {
                Error::InvalidData(format!(
                    "'{}' is not an integer id; expected a comma-separated list of integers",
                    part.trim()
                ))
            })
        })
        .collect()
}
