use std::collections::BTreeMap;

use super::{FloodPoint, RecordStore};
use crate::{Error, FloodId};

/// Record store held in memory, keyed by flood id
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    points: BTreeMap<FloodId, FloodPoint>,
}

impl MemoryRecordStore {
    /// Build a store from points; on repeated ids the first one is kept
    pub fn new(points: impl IntoIterator<Item = FloodPoint>) -> Self {
        let mut store = BTreeMap::new();
        for point in points {
            if store.contains_key(&point.flood_id) {
                log::warn!("Duplicate flood id {} - keeping the first record", point.flood_id);
                continue;
            }
            store.insert(point.flood_id, point);
        }
        Self { points: store }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl RecordStore for MemoryRecordStore {
    fn get_point(&self, id: FloodId) -> Result<Option<FloodPoint>, Error> {
        Ok(self.points.get(&id).cloned())
    }

    fn all_points(&self) -> Result<Vec<FloodPoint>, Error> {
        Ok(self.points.values().cloned().collect())
    }
}
