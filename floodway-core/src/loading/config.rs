use std::path::PathBuf;

use serde::Deserialize;

use crate::{Crs, Error};

/// Where to find the road network and how its coordinates are expressed
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// Nodes CSV: `osmid,x,y`
    pub nodes_path: PathBuf,
    /// Edges CSV: `u,v,key,name,highway,length,geometry` (WKT)
    pub edges_path: PathBuf,
    /// CRS of the stored coordinates, e.g. "EPSG:4326". When absent,
    /// geographic coordinates are assumed and a warning is logged.
    #[serde(default)]
    pub crs: Option<String>,
}

impl NetworkConfig {
    pub fn new(nodes_path: impl Into<PathBuf>, edges_path: impl Into<PathBuf>) -> Self {
        Self {
            nodes_path: nodes_path.into(),
            edges_path: edges_path.into(),
            crs: None,
        }
    }

    pub fn with_crs(mut self, crs: impl Into<String>) -> Self {
        self.crs = Some(crs.into());
        self
    }

    pub(crate) fn parsed_crs(&self) -> Result<Option<Crs>, Error> {
        self.crs.as_deref().map(str::parse).transpose()
    }
}
