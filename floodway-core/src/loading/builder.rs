use log::info;

use super::config::NetworkConfig;
use super::parser::{read_edges, read_nodes};
use crate::{Error, RoadNetwork};

/// Loads the road network described by the configuration.
///
/// Called once per process; the returned network is immutable.
///
/// # Errors
///
/// Returns an error if a file is missing or unreadable, the CRS is not
/// supported, or the network has no edges.
pub fn load_road_network(config: &NetworkConfig) -> Result<RoadNetwork, Error> {
    validate_config(config)?;
    let crs = config.parsed_crs()?;

    info!("Reading road nodes: {}", config.nodes_path.display());
    let nodes = read_nodes(&config.nodes_path)?;

    info!("Reading road edges: {}", config.edges_path.display());
    let edges = read_edges(&config.edges_path)?;

    let network = RoadNetwork::new(nodes, edges, crs)?;

    // CSV deserialization allocates a lot of short-lived memory that is
    // not always returned to the system. Release the free tail of the heap.
    //
    // # Safety
    //
    // Only compiled for linux with glibc, where `malloc_trim` exists.
    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    unsafe {
        if libc::malloc_trim(0) == 0 {
            log::debug!("Memory trimming released nothing");
        }
    }

    Ok(network)
}

fn validate_config(config: &NetworkConfig) -> Result<(), Error> {
    for path in [&config.nodes_path, &config.edges_path] {
        if !path.exists() {
            return Err(Error::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Road network file not found: {}", path.display()),
            )));
        }
    }
    Ok(())
}
