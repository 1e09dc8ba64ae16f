//! Mesh builder command line tool.
//!
//! Builds environmental meshes from YAML/JSON configurations, compares
//! persisted meshes against reference meshes and prints mesh summaries.

pub mod commands;
pub mod config_loader;

pub use commands::{build, compare, inspect, MeshSummary};
pub use config_loader::{load_mesh_config, parse_mesh_config, ConfigFormat};
