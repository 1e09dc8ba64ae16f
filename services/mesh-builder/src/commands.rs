//! Subcommand implementations.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use mesh_generation::{compare_meshes, ComparisonReport, EnvironmentMesh, MeshBuilder};

use crate::config_loader::load_mesh_config;

/// Overview of a mesh, printed by `build` and `inspect`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeshSummary {
    pub cellboxes: usize,
    pub graph_nodes: usize,
    pub global: bool,
    pub min_id: Option<u64>,
    pub max_id: Option<u64>,
    pub attributes: Vec<String>,
    /// Smallest and largest cell width in degrees of longitude.
    pub cell_width_range: Option<[f64; 2]>,
    pub symmetric: bool,
}

impl MeshSummary {
    pub fn of(mesh: &EnvironmentMesh) -> Self {
        let attributes: BTreeSet<String> = mesh
            .cellboxes()
            .iter()
            .flat_map(|c| c.agg_data().keys().cloned())
            .collect();

        let cell_width_range = mesh
            .cellboxes()
            .iter()
            .map(|c| c.boundary().width())
            .fold(None, |range: Option<[f64; 2]>, w| match range {
                Some([lo, hi]) => Some([lo.min(w), hi.max(w)]),
                None => Some([w, w]),
            });

        Self {
            cellboxes: mesh.cellboxes().len(),
            graph_nodes: mesh.neighbour_graph().len(),
            global: mesh.neighbour_graph().is_global_mesh(),
            min_id: mesh.min_id().map(|id| id.value()),
            max_id: mesh.max_id().map(|id| id.value()),
            attributes: attributes.into_iter().collect(),
            cell_width_range,
            symmetric: mesh.neighbour_graph().validate_symmetry().is_empty(),
        }
    }
}

impl fmt::Display for MeshSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "cellboxes:   {}", self.cellboxes)?;
        writeln!(f, "graph nodes: {}", self.graph_nodes)?;
        writeln!(f, "global:      {}", self.global)?;
        if let (Some(min), Some(max)) = (self.min_id, self.max_id) {
            writeln!(f, "ids:         {}..={}", min, max)?;
        }
        if let Some([lo, hi]) = self.cell_width_range {
            writeln!(f, "cell width:  {} to {} degrees", lo, hi)?;
        }
        writeln!(f, "attributes:  {}", self.attributes.join(", "))?;
        write!(f, "symmetric:   {}", self.symmetric)
    }
}

/// Build a mesh from `config_path` and write it to `output`.
pub fn build(config_path: &Path, output: &Path) -> Result<MeshSummary> {
    let config = load_mesh_config(config_path)?;
    info!(
        config = %config_path.display(),
        data_sources = config.data_sources.len(),
        "Loaded mesh configuration"
    );

    let started = Instant::now();
    let mesh = MeshBuilder::new(config)
        .context("Failed to prepare mesh builder")?
        .build_environmental_mesh()
        .context("Failed to build mesh")?;

    mesh.save(output)
        .with_context(|| format!("Failed to write mesh to {:?}", output))?;

    info!(
        output = %output.display(),
        cellboxes = mesh.cellboxes().len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Mesh written"
    );

    Ok(MeshSummary::of(&mesh))
}

/// Compare a mesh against a reference mesh.
pub fn compare(expected: &Path, actual: &Path) -> Result<ComparisonReport> {
    let expected_mesh = EnvironmentMesh::load(expected)
        .with_context(|| format!("Failed to load reference mesh {:?}", expected))?;
    let actual_mesh = EnvironmentMesh::load(actual)
        .with_context(|| format!("Failed to load mesh {:?}", actual))?;

    let report = compare_meshes(&expected_mesh, &actual_mesh)?;
    info!(
        differences = report.differences.len(),
        "Compared {} against {}",
        actual.display(),
        expected.display()
    );
    Ok(report)
}

/// Summarise a persisted mesh.
pub fn inspect(path: &Path) -> Result<MeshSummary> {
    let mesh = EnvironmentMesh::load(path)
        .with_context(|| format!("Failed to load mesh {:?}", path))?;
    Ok(MeshSummary::of(&mesh))
}
