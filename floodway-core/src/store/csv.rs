use std::path::{Path, PathBuf};

use log::{info, warn};

use super::{FloodPoint, MemoryRecordStore, RecordStore};
use crate::{Error, FloodId};

/// Record store backed by a flood events CSV extract.
///
/// Expected columns: `flood_id, latitude, longitude` and optionally
/// `flooded_location, date`; other columns are ignored. The file is read
/// once when the store is opened.
#[derive(Debug, Clone)]
pub struct CsvRecordStore {
    path: PathBuf,
    records: MemoryRecordStore,
}

impl CsvRecordStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let mut reader = ::csv::Reader::from_path(path).map_err(|e| {
            Error::IoError(std::io::Error::other(format!(
                "Failed to open flood events file '{}': {e}",
                path.display()
            )))
        })?;

        let mut skipped = 0usize;
        let points: Vec<FloodPoint> = reader
            .deserialize::<FloodPoint>()
            .filter_map(|row| match row {
                Ok(point) => Some(point),
                Err(e) => {
                    skipped += 1;
                    warn!("Skipping malformed flood event row: {e}");
                    None
                }
            })
            .collect();

        let records = MemoryRecordStore::new(points);
        info!(
            "Loaded {} flood events from {} ({skipped} rows skipped)",
            records.len(),
            path.display()
        );

        Ok(Self {
            path: path.to_path_buf(),
            records,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordStore for CsvRecordStore {
    fn get_point(&self, id: FloodId) -> Result<Option<FloodPoint>, Error> {
        self.records.get_point(id)
    }

    fn get_points(&self, ids: &[FloodId]) -> Result<Vec<FloodPoint>, Error> {
        self.records.get_points(ids)
    }

    fn all_points(&self) -> Result<Vec<FloodPoint>, Error> {
        self.records.all_points()
    }
}
