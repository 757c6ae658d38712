//! HTTP surface over `floodway_core`.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::{Cli, ListenConfig, ServerConfig};
pub use routes::build_router;
pub use state::AppState;
