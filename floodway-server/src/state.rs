use floodway_core::prelude::*;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::ServerError;

/// Process-wide read-only resources shared by all requests
pub struct AppState {
    pub network: RoadNetwork,
    pub store: Box<dyn RecordStore>,
    pub profile: SpeedProfile,
}

impl AppState {
    pub fn new(network: RoadNetwork, store: Box<dyn RecordStore>, profile: SpeedProfile) -> Self {
        Self {
            network,
            store,
            profile,
        }
    }

    /// Load the road network and flood events named in the configuration
    pub fn load(config: &ServerConfig) -> Result<Self, ServerError> {
        let network = load_road_network(&config.network)?;
        let store = CsvRecordStore::open(&config.store.flood_events)?;
        info!(
            edges = network.edge_count(),
            baseline = config.speeds.baseline(),
            "application state loaded"
        );
        Ok(Self::new(network, Box::new(store), config.speeds.clone()))
    }

    pub fn resolver(&self) -> DelayResolver<'_> {
        DelayResolver::new(&self.network, self.store.as_ref(), &self.profile)
    }
}
