//! Configuration management for sessiongate

pub mod loader;
mod schema;

pub use loader::{load_config, load_config_from_path, load_config_or_default, parse_config};
pub use schema::*;
