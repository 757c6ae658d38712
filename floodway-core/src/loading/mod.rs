//! This module is responsible for loading the road network from
//! node and edge CSV extracts.

mod builder;
mod config;
mod parser;

pub use builder::load_road_network;
pub use config::NetworkConfig;
pub use parser::{read_edges, read_nodes};
