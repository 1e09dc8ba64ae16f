//! Cells under construction and the recursive split.

use std::collections::BTreeMap;
use std::sync::Arc;

use mesh_common::Boundary;
use tracing::{debug, trace};

use crate::aggregated_cellbox::{AggregatedCellBox, AggregatedValue};
use crate::aggregation::aggregate;
use crate::config::SplittingConfig;
use crate::data_source::SampleSet;
use crate::metadata::{FillPolicy, Metadata};
use crate::neighbour_graph::{CellId, IdAllocator};

/// A split performed while building: the parent and its four children in
/// NW, NE, SW, SE order.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitRecord {
    pub parent: CellId,
    pub children: [(CellId, Boundary); 4],
}

/// Everything produced by recursively splitting one cell.
///
/// `splits` is in pre-order: a parent's record precedes the records of
/// its children. `leaves` is in depth-first NW, NE, SW, SE order.
#[derive(Debug, Clone, Default)]
pub struct CellSplit {
    pub leaves: Vec<AggregatedCellBox>,
    pub splits: Vec<SplitRecord>,
}

impl CellSplit {
    /// Number of ids handed out to children.
    pub fn child_id_count(&self) -> u64 {
        4 * self.splits.len() as u64
    }

    /// Move partition-local ids into the global id space.
    ///
    /// Local id 0 is the partition root and becomes `root`; local id `l > 0`
    /// becomes `base + l - 1`.
    pub fn rebase(&mut self, root: CellId, base: u64) {
        let map = |id: CellId| {
            if id.value() == 0 {
                root
            } else {
                CellId(base + id.value() - 1)
            }
        };
        for leaf in &mut self.leaves {
            let id = map(leaf.id());
            leaf.set_id(id);
        }
        for record in &mut self.splits {
            record.parent = map(record.parent);
            for child in record.children.iter_mut() {
                child.0 = map(child.0);
            }
        }
    }
}

/// A rectangle of the mesh together with its data bindings.
#[derive(Debug, Clone)]
pub struct Cell {
    id: CellId,
    boundary: Boundary,
    metadata: Arc<[Metadata]>,
    parent_values: Option<Arc<BTreeMap<String, AggregatedValue>>>,
}

impl Cell {
    pub fn new(id: CellId, boundary: Boundary, metadata: Arc<[Metadata]>) -> Self {
        Self {
            id,
            boundary,
            metadata,
            parent_values: None,
        }
    }

    pub fn id(&self) -> CellId {
        self.id
    }

    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    pub fn metadata(&self) -> &[Metadata] {
        &self.metadata
    }

    /// Aggregate every bound source over this cell.
    ///
    /// Returns the attribute values and whether any split condition found
    /// the data heterogeneous.
    pub fn evaluate(&self, minimum_datapoints: usize) -> (BTreeMap<String, AggregatedValue>, bool) {
        let mut values = BTreeMap::new();
        let mut heterogeneous = false;

        for binding in self.metadata.iter() {
            let samples = binding.source().samples(&self.boundary);

            if binding
                .homogeneity(&samples, minimum_datapoints)
                .iter()
                .any(|c| c.requires_split())
            {
                heterogeneous = true;
            }

            self.aggregate_binding(binding, &samples, &mut values);
        }

        (values, heterogeneous)
    }

    fn aggregate_binding(
        &self,
        binding: &Metadata,
        samples: &SampleSet,
        values: &mut BTreeMap<String, AggregatedValue>,
    ) {
        for (index, name) in binding.source().data_names().iter().enumerate() {
            let value = match aggregate(samples.column(index), binding.aggregation()) {
                Some(v) => AggregatedValue::Scalar(v),
                None => self.fill_value(binding, name),
            };
            values.insert(name.clone(), value);
        }
    }

    fn fill_value(&self, binding: &Metadata, name: &str) -> AggregatedValue {
        let default = || {
            binding
                .source()
                .default_value()
                .map(AggregatedValue::Scalar)
                .unwrap_or(AggregatedValue::Missing)
        };

        let value = match binding.fill_policy() {
            FillPolicy::Zero => AggregatedValue::Scalar(0.0),
            FillPolicy::Default => default(),
            FillPolicy::Parent => self
                .parent_values
                .as_ref()
                .and_then(|p| p.get(name).cloned())
                .unwrap_or_else(default),
        };

        trace!(
            cell_id = %self.id,
            data_name = name,
            policy = ?binding.fill_policy(),
            "No data in cell, using fill value"
        );
        value
    }

    /// Split recursively until the data is homogeneous or the depth limit
    /// is reached. `current_depth` is 0 for a cell of the initial grid.
    pub fn split(
        self,
        current_depth: u32,
        settings: &SplittingConfig,
        ids: &mut IdAllocator,
    ) -> CellSplit {
        let mut out = CellSplit::default();
        self.split_into(current_depth, settings, ids, &mut out);
        out
    }

    fn split_into(
        self,
        depth: u32,
        settings: &SplittingConfig,
        ids: &mut IdAllocator,
        out: &mut CellSplit,
    ) {
        let (values, heterogeneous) = self.evaluate(settings.minimum_datapoints);

        if !heterogeneous || depth >= settings.split_depth {
            out.leaves
                .push(AggregatedCellBox::new(self.id, self.boundary, values));
            return;
        }

        let quadrants = self.boundary.split();
        let children = quadrants.map(|bounds| (ids.next_id(), bounds));
        debug!(cell_id = %self.id, depth, children = 4, "Splitting cell");

        out.splits.push(SplitRecord {
            parent: self.id,
            children,
        });

        let parent_values = Arc::new(values);
        for (id, boundary) in children {
            Cell {
                id,
                boundary,
                metadata: Arc::clone(&self.metadata),
                parent_values: Some(Arc::clone(&parent_values)),
            }
            .split_into(depth + 1, settings, ids, out);
        }
    }
}
