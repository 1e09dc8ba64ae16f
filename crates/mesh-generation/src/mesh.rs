//! The finished mesh and its persisted form.
//!
//! ```text
//! {
//!   "config":          { ...configuration used to build the mesh... },
//!   "cellboxes":       [ { "geometry": "POLYGON ((...))", "cx": .., "id": "0", ... }, ... ],
//!   "neighbour_graph": { "0": { "1": [], "2": ["1"], ... }, ... }
//! }
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use mesh_common::{MeshError, MeshResult};

use crate::aggregated_cellbox::AggregatedCellBox;
use crate::config::MeshConfig;
use crate::direction::LongitudeFrame;
use crate::neighbour_graph::{CellId, NeighbourGraph};

/// Cellboxes plus their adjacency, and the configuration that produced them.
#[derive(Debug, Clone, Serialize)]
pub struct EnvironmentMesh {
    config: MeshConfig,
    cellboxes: Vec<AggregatedCellBox>,
    neighbour_graph: NeighbourGraph,
}

impl EnvironmentMesh {
    pub fn new(
        config: MeshConfig,
        cellboxes: Vec<AggregatedCellBox>,
        mut neighbour_graph: NeighbourGraph,
    ) -> Self {
        neighbour_graph.set_global_mesh(config.region.global);
        Self {
            config,
            cellboxes,
            neighbour_graph,
        }
    }

    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    pub fn cellboxes(&self) -> &[AggregatedCellBox] {
        &self.cellboxes
    }

    pub fn neighbour_graph(&self) -> &NeighbourGraph {
        &self.neighbour_graph
    }

    pub fn get_cellbox(&self, id: CellId) -> Option<&AggregatedCellBox> {
        self.cellboxes.iter().find(|c| c.id() == id)
    }

    /// The cellbox owning the point, using the top/right-inclusive edge rule.
    pub fn cellbox_containing(&self, lat: f64, long: f64) -> Option<&AggregatedCellBox> {
        self.cellboxes.iter().find(|c| c.contains_point(lat, long))
    }

    pub fn min_id(&self) -> Option<CellId> {
        self.cellboxes.iter().map(|c| c.id()).min()
    }

    pub fn max_id(&self) -> Option<CellId> {
        self.cellboxes.iter().map(|c| c.id()).max()
    }

    /// Add `n` to every cellbox id and every graph reference.
    pub fn increment_ids(&mut self, n: i64) -> MeshResult<()> {
        let renamed = self
            .cellboxes
            .iter()
            .map(|c| c.id().offset(n))
            .collect::<MeshResult<Vec<_>>>()?;
        self.neighbour_graph.increment_ids(n)?;
        for (cellbox, id) in self.cellboxes.iter_mut().zip(renamed) {
            cellbox.set_id(id);
        }
        Ok(())
    }

    /// Absorb a mesh covering a region disjoint from this one.
    ///
    /// The other mesh's ids are moved past this mesh's largest id, the two
    /// graphs are unioned and cells touching across the seam are linked.
    /// This mesh's configuration is kept.
    pub fn merge(&mut self, mut other: EnvironmentMesh) -> MeshResult<()> {
        if let (Some(max), Some(min)) = (self.max_id(), other.min_id()) {
            let offset = max.value() as i64 + 1 - min.value() as i64;
            other.increment_ids(offset)?;
        }

        let existing = self.cellboxes.len();
        self.neighbour_graph.union(other.neighbour_graph)?;
        self.cellboxes.extend(other.cellboxes);

        let frame = LongitudeFrame::new(-180.0, true);
        let (ours, theirs) = self.cellboxes.split_at(existing);
        let mut stitched = 0usize;
        for a in ours {
            for b in theirs {
                if b.boundary().lat_min() > a.boundary().lat_max()
                    || b.boundary().lat_max() < a.boundary().lat_min()
                {
                    continue;
                }
                if !self
                    .neighbour_graph
                    .connect_if_adjacent((a.id(), a.boundary()), (b.id(), b.boundary()), &frame)?
                    .is_empty()
                {
                    stitched += 1;
                }
            }
        }

        info!(
            cellboxes = self.cellboxes.len(),
            stitched, "Merged meshes"
        );
        Ok(())
    }

    /// Persisted JSON document.
    pub fn to_json(&self) -> MeshResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Load a persisted document; each top-level field is required.
    pub fn from_json(value: &Value) -> MeshResult<Self> {
        let field = |name: &str| value.get(name).ok_or_else(|| MeshError::missing_field(name));

        let config = MeshConfig::from_value(field("config")?)?;

        let cellboxes = field("cellboxes")?
            .as_array()
            .ok_or_else(|| MeshError::invalid_field("cellboxes", "expected a list"))?
            .iter()
            .map(AggregatedCellBox::from_json)
            .collect::<MeshResult<Vec<_>>>()?;

        let neighbour_graph = NeighbourGraph::from_json(field("neighbour_graph")?)?;

        Ok(Self::new(config, cellboxes, neighbour_graph))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> MeshResult<()> {
        let path = path.as_ref();
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        debug!(path = %path.display(), cellboxes = self.cellboxes.len(), "Saved mesh");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> MeshResult<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let value: Value = serde_json::from_reader(reader)?;
        let mesh = Self::from_json(&value)?;
        debug!(path = %path.display(), cellboxes = mesh.cellboxes.len(), "Loaded mesh");
        Ok(mesh)
    }
}

impl<'de> Deserialize<'de> for EnvironmentMesh {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        EnvironmentMesh::from_json(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_top_level_field() {
        let err = EnvironmentMesh::from_json(&json!({
            "config": {},
            "cellboxes": []
        }))
        .unwrap_err();
        // config is parsed first and is itself incomplete
        assert!(matches!(err, MeshError::Serialization(_)));

        let err = EnvironmentMesh::from_json(&json!({ "cellboxes": [], "neighbour_graph": {} }))
            .unwrap_err();
        assert!(matches!(err, MeshError::MissingField { ref field } if field == "config"));
    }
}
