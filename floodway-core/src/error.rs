use thiserror::Error;

use crate::{FloodId, NodeId};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Road network has no edges")]
    GraphEmpty,
    #[error("Invalid query point (lat={lat}, lon={lon}): {reason}")]
    InvalidPoint { lat: f64, lon: f64, reason: String },
    #[error("Edge {u} -> {v} (key {key}) has no usable geometry")]
    IncompleteEdge { u: NodeId, v: NodeId, key: u32 },
    #[error("Invalid speed '{label}': {kmh} km/h")]
    InvalidSpeed { label: String, kmh: f64 },
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("Flood event {0} not found")]
    NotFound(FloodId),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl Error {
    /// Whether the error only concerns a single batch item
    /// and siblings may still resolve.
    pub fn is_item_local(&self) -> bool {
        matches!(
            self,
            Error::InvalidPoint { .. }
                | Error::IncompleteEdge { .. }
                | Error::NotFound(_)
                | Error::InvalidData(_)
        )
    }
}
