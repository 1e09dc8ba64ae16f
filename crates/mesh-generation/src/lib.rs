//! Non-uniform environmental mesh construction.
//!
//! A region is covered by a regular grid of cells. Each cell samples its
//! bound data sources and splits into four quadrants while the data inside
//! is heterogeneous, down to a configured depth. Finished cells become
//! [`AggregatedCellBox`]es and an 8-direction [`NeighbourGraph`] links
//! every pair of touching cells, so that route planners can walk the mesh
//! as a graph.
//!
//! # Architecture
//!
//! ```text
//! MeshConfig ──► DataSourceFactory ──► Metadata (source + split conditions + fill policy)
//!      │                                   │
//!      ▼                                   ▼
//! MeshBuilder ──► Cell::split (per top-level cell, in parallel)
//!      │                │
//!      │                ├─► AggregatedCellBox leaves
//!      │                └─► SplitRecords
//!      │                          │
//!      └──► NeighbourGraph::initialise_grid ──► split_node (replay)
//!                                 │
//!                                 ▼
//!                          EnvironmentMesh ──► JSON / compare_meshes
//! ```
//!
//! # Example
//!
//! ```ignore
//! use mesh_generation::{MeshBuilder, MeshConfig};
//!
//! let config: MeshConfig = serde_yaml::from_str(&std::fs::read_to_string("mesh.yaml")?)?;
//! let mesh = MeshBuilder::new(config)?.build_environmental_mesh()?;
//! mesh.save("mesh.json")?;
//! ```

pub mod aggregated_cellbox;
pub mod aggregation;
pub mod builder;
pub mod cellbox;
pub mod compare;
pub mod config;
pub mod data_source;
pub mod direction;
pub mod factory;
pub mod mesh;
pub mod metadata;
pub mod neighbour_graph;
pub mod sources;

// Re-export commonly used types at crate root
pub use aggregated_cellbox::{AggregatedCellBox, AggregatedValue};
pub use aggregation::{aggregate, AggregationMethod};
pub use builder::MeshBuilder;
pub use cellbox::{Cell, CellSplit, SplitRecord};
pub use compare::{compare_meshes, ComparisonReport, Difference};
pub use config::{DataSourceConfig, DataSourceParams, MeshConfig, RegionConfig, SplittingConfig};
pub use data_source::{DataSource, PointSource, Sample, SampleSet};
pub use direction::{neighbour_case, neighbour_cases, Direction, LongitudeFrame};
pub use factory::DataSourceFactory;
pub use mesh::EnvironmentMesh;
pub use metadata::{FillPolicy, HomogeneityCondition, Metadata, SplitCondition};
pub use neighbour_graph::{AsymmetricEdge, CellId, IdAllocator, NeighbourGraph, NeighbourMap};
pub use sources::ShapePattern;

pub use mesh_common::{Boundary, MeshError, MeshResult};
