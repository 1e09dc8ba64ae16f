//! Mesh construction.
//!
//! # Pipeline
//!
//! ```text
//! MeshConfig
//!      │
//!      ▼
//! initial grid (row-major from the north-west corner, ids 0..rows*cols)
//!      │
//!      ├─► rayon: split every top-level cell independently, each with a
//!      │          private id namespace (local root 0, children from 1)
//!      │
//!      ├─► rebase local ids into the global id space, in grid order
//!      │
//!      ├─► NeighbourGraph::initialise_grid, then replay every split
//!      │   through NeighbourGraph::split_node
//!      │
//!      └─► symmetry check
//!               │
//!               ▼
//!         EnvironmentMesh
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use mesh_common::{Boundary, MeshError, MeshResult};

use crate::cellbox::{Cell, CellSplit};
use crate::config::MeshConfig;
use crate::direction::LongitudeFrame;
use crate::factory::DataSourceFactory;
use crate::mesh::EnvironmentMesh;
use crate::metadata::Metadata;
use crate::neighbour_graph::{CellId, IdAllocator, NeighbourGraph};

/// Relative tolerance when counting how many cells fit into the region.
const GRID_FIT_TOLERANCE: f64 = 1e-6;

/// Builds an [`EnvironmentMesh`] from a configuration.
#[derive(Debug)]
pub struct MeshBuilder {
    config: MeshConfig,
    region: Boundary,
    metadata: Arc<[Metadata]>,
}

impl MeshBuilder {
    /// Builder using only the built-in data sources.
    pub fn new(config: MeshConfig) -> MeshResult<Self> {
        Self::with_factory(config, DataSourceFactory::new())
    }

    /// Builder resolving data sources through `factory`.
    pub fn with_factory(config: MeshConfig, factory: DataSourceFactory) -> MeshResult<Self> {
        config.validate()?;
        let region = config.region_boundary()?;

        let metadata = config
            .data_sources
            .iter()
            .map(|source| factory.metadata(source, &region))
            .collect::<MeshResult<Vec<_>>>()?;

        Ok(Self {
            config,
            region,
            metadata: Arc::from(metadata),
        })
    }

    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    pub fn region(&self) -> &Boundary {
        &self.region
    }

    /// Number of rows and columns of the initial grid.
    ///
    /// A region that is not a whole number of cells gets a narrower last
    /// row or column.
    pub fn grid_shape(&self) -> (usize, usize) {
        let fit = |extent: f64, size: f64| {
            let n = extent / size;
            ((n - n * GRID_FIT_TOLERANCE).ceil().max(1.0)) as usize
        };
        (
            fit(self.region.height(), self.config.region.cell_height),
            fit(self.region.width(), self.config.region.cell_width),
        )
    }

    /// Boundaries of the initial grid in row-major order, northernmost row first.
    pub fn initial_boundaries(&self) -> MeshResult<Vec<Boundary>> {
        let (rows, cols) = self.grid_shape();
        let cell_width = self.config.region.cell_width;
        let cell_height = self.config.region.cell_height;
        let (west, east) = self.region.unwrapped_long_range();
        let (south, north) = (self.region.lat_min(), self.region.lat_max());

        let mut boundaries = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            let top = north - r as f64 * cell_height;
            let bottom = if r + 1 == rows {
                south
            } else {
                north - (r + 1) as f64 * cell_height
            };
            for c in 0..cols {
                let left = west + c as f64 * cell_width;
                let right = if c + 1 == cols {
                    east
                } else {
                    west + (c + 1) as f64 * cell_width
                };
                let boundary = Boundary::from_unwrapped([bottom, top], left, right)?;
                boundaries.push(match self.region.time_range() {
                    Some(range) => boundary.with_time_range(*range),
                    None => boundary,
                });
            }
        }
        Ok(boundaries)
    }

    /// Whether east and west edges are linked: a global region with at
    /// least two columns.
    fn wraps(&self) -> bool {
        self.config.region.global && self.grid_shape().1 >= 2
    }

    /// Split every cell of the initial grid and assemble the mesh.
    pub fn build_environmental_mesh(&self) -> MeshResult<EnvironmentMesh> {
        let (rows, cols) = self.grid_shape();
        let top_level = self.initial_boundaries()?;
        let splitting = &self.config.splitting;

        info!(
            rows,
            cols,
            split_depth = splitting.split_depth,
            data_sources = self.metadata.len(),
            global = self.config.region.global,
            "Building environmental mesh"
        );

        let partitions: Vec<CellSplit> = top_level
            .par_iter()
            .map(|boundary| {
                Cell::new(CellId(0), *boundary, Arc::clone(&self.metadata)).split(
                    0,
                    splitting,
                    &mut IdAllocator::starting_at(1),
                )
            })
            .collect();

        let wraps = self.wraps();
        let frame = LongitudeFrame::for_region(&self.region, wraps);
        let mut graph = NeighbourGraph::initialise_grid(rows, cols, 0, wraps);
        graph.set_global_mesh(self.config.region.global);

        let mut boundaries: HashMap<CellId, Boundary> = top_level
            .iter()
            .enumerate()
            .map(|(i, b)| (CellId(i as u64), *b))
            .collect();

        let mut next_id = top_level.len() as u64;
        let mut cellboxes = Vec::new();
        let mut split_count = 0usize;

        for (index, mut partition) in partitions.into_iter().enumerate() {
            partition.rebase(CellId(index as u64), next_id);
            next_id += partition.child_id_count();

            for record in &partition.splits {
                graph.split_node(record.parent, &record.children, &boundaries, &frame)?;
                boundaries.extend(record.children.iter().copied());
            }
            split_count += partition.splits.len();
            cellboxes.extend(partition.leaves);
        }

        debug!(splits = split_count, nodes = graph.len(), "Neighbour graph assembled");

        let violations = graph.validate_symmetry();
        if let Some(first) = violations.first() {
            warn!(count = violations.len(), "Neighbour graph is not symmetric");
            return Err(MeshError::GraphInconsistent(first.to_string()));
        }
        if graph.len() != cellboxes.len() {
            return Err(MeshError::GraphInconsistent(format!(
                "{} cellboxes but {} graph nodes",
                cellboxes.len(),
                graph.len()
            )));
        }

        info!(cellboxes = cellboxes.len(), splits = split_count, "Mesh built");

        Ok(EnvironmentMesh::new(self.config.clone(), cellboxes, graph))
    }
}
