//! Directional adjacency graph between mesh cells.
//!
//! Every node maps each of the eight [`Direction`]s to an ordered list of
//! neighbouring cell ids. After asymmetric splits a single slot can hold
//! several neighbours (a large cell bordering two smaller ones). The graph
//! emitted by the builder is symmetric: if `b` is in `a`'s slot `d`, then
//! `a` is in `b`'s slot `d.opposite()`.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use mesh_common::{Boundary, MeshError, MeshResult};
use serde::de::{self, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, trace};

use crate::direction::{neighbour_cases, Direction, LongitudeFrame};

/// Identifier of a cell within one mesh.
///
/// Persisted as a decimal string; integer forms are accepted on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(pub u64);

impl CellId {
    pub fn value(self) -> u64 {
        self.0
    }

    /// Shift this id by `n`, failing if the result would be negative or overflow.
    pub fn offset(self, n: i64) -> MeshResult<CellId> {
        self.0
            .checked_add_signed(n)
            .map(CellId)
            .ok_or_else(|| {
                MeshError::GraphInconsistent(format!("cannot offset id {} by {}", self.0, n))
            })
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CellId {
    type Err = MeshError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(CellId)
            .map_err(|_| MeshError::invalid_field("id", format!("'{}' is not a cell id", s)))
    }
}

impl From<u64> for CellId {
    fn from(id: u64) -> Self {
        CellId(id)
    }
}

impl Serialize for CellId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

struct CellIdVisitor;

impl<'de> Visitor<'de> for CellIdVisitor {
    type Value = CellId;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a cell id as a string or non-negative integer")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<CellId, E> {
        Ok(CellId(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<CellId, E> {
        u64::try_from(v)
            .map(CellId)
            .map_err(|_| E::custom(format!("negative cell id {}", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<CellId, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for CellId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(CellIdVisitor)
    }
}

/// Hands out fresh cell ids.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    pub fn next_id(&mut self) -> CellId {
        let id = CellId(self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out relative to `first`.
    pub fn peek(&self) -> u64 {
        self.next
    }
}

/// The eight neighbour slots of one cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NeighbourMap {
    slots: [Vec<CellId>; 8],
}

impl NeighbourMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, direction: Direction) -> &[CellId] {
        &self.slots[direction.index()]
    }

    pub fn set(&mut self, direction: Direction, neighbours: Vec<CellId>) {
        self.slots[direction.index()] = neighbours;
    }

    pub fn push(&mut self, direction: Direction, neighbour: CellId) {
        self.slots[direction.index()].push(neighbour);
    }

    /// Builder-style helper used when assembling maps by hand.
    pub fn with(mut self, direction: Direction, neighbours: Vec<CellId>) -> Self {
        self.set(direction, neighbours);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Direction, &[CellId])> {
        Direction::ALL
            .into_iter()
            .map(move |d| (d, self.slots[d.index()].as_slice()))
    }

    /// Directions with at least one neighbour.
    pub fn populated_directions(&self) -> Vec<Direction> {
        self.iter()
            .filter(|(_, ids)| !ids.is_empty())
            .map(|(d, _)| d)
            .collect()
    }

    pub fn contains(&self, id: CellId) -> bool {
        self.slots.iter().any(|slot| slot.contains(&id))
    }

    /// Strip every occurrence of `id` from every slot.
    pub fn remove_all(&mut self, id: CellId) {
        for slot in self.slots.iter_mut() {
            slot.retain(|n| *n != id);
        }
    }

    /// Distinct neighbours in slot order.
    pub fn distinct_neighbours(&self) -> Vec<CellId> {
        let mut seen = Vec::new();
        for slot in &self.slots {
            for id in slot {
                if !seen.contains(id) {
                    seen.push(*id);
                }
            }
        }
        seen
    }

    fn map_ids(&self, f: impl Fn(CellId) -> MeshResult<CellId>) -> MeshResult<NeighbourMap> {
        let mut mapped = NeighbourMap::new();
        for (i, slot) in self.slots.iter().enumerate() {
            mapped.slots[i] = slot.iter().map(|id| f(*id)).collect::<MeshResult<_>>()?;
        }
        Ok(mapped)
    }
}

impl Serialize for NeighbourMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(8))?;
        for (direction, neighbours) in self.iter() {
            map.serialize_entry(&direction, neighbours)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for NeighbourMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<Direction, Vec<CellId>>::deserialize(deserializer)?;
        let mut map = NeighbourMap::new();
        for (direction, neighbours) in raw {
            map.set(direction, neighbours);
        }
        Ok(map)
    }
}

/// An edge whose reverse is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsymmetricEdge {
    pub from: CellId,
    pub direction: Direction,
    pub to: CellId,
}

impl fmt::Display for AsymmetricEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -[{}]-> {} has no reverse edge",
            self.from, self.direction, self.to
        )
    }
}

/// Adjacency graph keyed by cell id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NeighbourGraph {
    graph: BTreeMap<CellId, NeighbourMap>,
    #[serde(skip)]
    global_mesh: bool,
}

impl NeighbourGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from the persisted JSON mapping.
    pub fn from_json(value: &serde_json::Value) -> MeshResult<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }

    pub fn to_json(&self) -> MeshResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Regular adjacency of a `rows x cols` row-major grid.
    ///
    /// Row 0 is the northernmost row and ids count up from `first_id`. With
    /// `global_mesh` the columns wrap so the eastern and western edge
    /// columns are neighbours. With two columns each cell therefore holds
    /// the other in both its eastern and western slots. A single column
    /// never wraps, since every cell would border itself.
    pub fn initialise_grid(rows: usize, cols: usize, first_id: u64, global_mesh: bool) -> Self {
        let wrap = global_mesh && cols >= 2;
        let id_at = |r: usize, c: usize| CellId(first_id + (r * cols + c) as u64);

        let mut graph = BTreeMap::new();
        for r in 0..rows {
            for c in 0..cols {
                let mut map = NeighbourMap::new();
                for direction in Direction::ALL {
                    let (dr, dc) = direction.grid_offset();
                    let nr = r as i64 + dr;
                    let mut nc = c as i64 + dc;
                    if nr < 0 || nr >= rows as i64 {
                        continue;
                    }
                    if nc < 0 || nc >= cols as i64 {
                        if !wrap {
                            continue;
                        }
                        nc = nc.rem_euclid(cols as i64);
                    }
                    map.push(direction, id_at(nr as usize, nc as usize));
                }
                graph.insert(id_at(r, c), map);
            }
        }

        debug!(rows, cols, global_mesh = wrap, "Initialised grid neighbour graph");

        Self {
            graph,
            global_mesh,
        }
    }

    pub fn is_global_mesh(&self) -> bool {
        self.global_mesh
    }

    pub fn set_global_mesh(&mut self, global_mesh: bool) {
        self.global_mesh = global_mesh;
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    pub fn contains(&self, id: CellId) -> bool {
        self.graph.contains_key(&id)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = CellId> + '_ {
        self.graph.keys().copied()
    }

    pub fn get_graph(&self) -> &BTreeMap<CellId, NeighbourMap> {
        &self.graph
    }

    pub fn get_neighbour_map(&self, id: CellId) -> MeshResult<&NeighbourMap> {
        self.graph.get(&id).ok_or_else(|| MeshError::unknown_node(id))
    }

    pub fn get_neighbours(&self, id: CellId, direction: Direction) -> MeshResult<&[CellId]> {
        Ok(self.get_neighbour_map(id)?.get(direction))
    }

    fn node_mut(&mut self, id: CellId) -> MeshResult<&mut NeighbourMap> {
        self.graph.get_mut(&id).ok_or_else(|| MeshError::unknown_node(id))
    }

    /// Insert a new node. Fails if the id is already present.
    pub fn add_node(&mut self, id: CellId, neighbour_map: NeighbourMap) -> MeshResult<()> {
        if self.graph.contains_key(&id) {
            return Err(MeshError::duplicate_node(id));
        }
        self.graph.insert(id, neighbour_map);
        Ok(())
    }

    /// Delete the entry for `id` only.
    ///
    /// References to `id` held by other nodes are left in place; use
    /// [`remove_node_and_update_neighbours`](Self::remove_node_and_update_neighbours)
    /// to keep the graph consistent.
    pub fn remove_node(&mut self, id: CellId) -> MeshResult<NeighbourMap> {
        self.graph.remove(&id).ok_or_else(|| MeshError::unknown_node(id))
    }

    /// Strip `id` from every remaining node's slots, then delete it.
    pub fn remove_node_and_update_neighbours(&mut self, id: CellId) -> MeshResult<NeighbourMap> {
        if !self.graph.contains_key(&id) {
            return Err(MeshError::unknown_node(id));
        }
        for (node, map) in self.graph.iter_mut() {
            if *node != id {
                map.remove_all(id);
            }
        }
        self.remove_node(id)
    }

    /// Replace one direction slot.
    pub fn update_neighbour(
        &mut self,
        id: CellId,
        direction: Direction,
        neighbours: Vec<CellId>,
    ) -> MeshResult<()> {
        self.node_mut(id)?.set(direction, neighbours);
        Ok(())
    }

    /// Append one neighbour to a slot.
    pub fn add_neighbour(
        &mut self,
        id: CellId,
        direction: Direction,
        neighbour: CellId,
    ) -> MeshResult<()> {
        self.node_mut(id)?.push(direction, neighbour);
        Ok(())
    }

    /// Remove every occurrence of `neighbour` from one slot.
    pub fn remove_neighbour(
        &mut self,
        id: CellId,
        direction: Direction,
        neighbour: CellId,
    ) -> MeshResult<()> {
        let map = self.node_mut(id)?;
        let mut slot = map.get(direction).to_vec();
        slot.retain(|n| *n != neighbour);
        map.set(direction, slot);
        Ok(())
    }

    /// Add `n` to every node id and every neighbour reference.
    ///
    /// The renamed graph is built completely before it replaces the old
    /// one, so a failure leaves the graph untouched.
    pub fn increment_ids(&mut self, n: i64) -> MeshResult<()> {
        if n == 0 {
            return Ok(());
        }
        let mut renamed = BTreeMap::new();
        for (id, map) in &self.graph {
            renamed.insert(id.offset(n)?, map.map_ids(|nid| nid.offset(n))?);
        }
        self.graph = renamed;
        Ok(())
    }

    /// Move every node of `other` into this graph. Ids must be disjoint.
    pub fn union(&mut self, other: NeighbourGraph) -> MeshResult<()> {
        if let Some(clash) = other.graph.keys().find(|id| self.graph.contains_key(id)) {
            return Err(MeshError::duplicate_node(clash));
        }
        self.graph.extend(other.graph);
        Ok(())
    }

    /// Link `a` and `b` in both directions if they touch.
    ///
    /// Returns every direction of `b` from `a` that was linked; empty when
    /// they are not adjacent. Existing links are not duplicated.
    pub fn connect_if_adjacent(
        &mut self,
        a: (CellId, &Boundary),
        b: (CellId, &Boundary),
        frame: &LongitudeFrame,
    ) -> MeshResult<Vec<Direction>> {
        let directions = neighbour_cases(a.1, b.1, frame);
        for direction in &directions {
            if !self.get_neighbours(a.0, *direction)?.contains(&b.0) {
                self.add_neighbour(a.0, *direction, b.0)?;
            }
            if !self.get_neighbours(b.0, direction.opposite())?.contains(&a.0) {
                self.add_neighbour(b.0, direction.opposite(), a.0)?;
            }
        }
        Ok(directions)
    }

    /// Replace `parent` by its four quadrant children.
    ///
    /// `children` are ordered NW, NE, SW, SE. The children are linked to each
    /// other, every former neighbour of the parent is re-linked to whichever
    /// children it touches, and the parent id is removed from those
    /// neighbours' slots (a child takes the parent's position where the
    /// direction is unchanged). `boundaries` must hold the boundary of every
    /// former neighbour.
    pub fn split_node(
        &mut self,
        parent: CellId,
        children: &[(CellId, Boundary); 4],
        boundaries: &HashMap<CellId, Boundary>,
        frame: &LongitudeFrame,
    ) -> MeshResult<()> {
        for (child, _) in children {
            if self.graph.contains_key(child) {
                return Err(MeshError::duplicate_node(child));
            }
        }

        let parent_map = self.get_neighbour_map(parent)?;
        let externals = parent_map
            .distinct_neighbours()
            .into_iter()
            .filter(|external| *external != parent)
            .map(|external| {
                boundaries.get(&external).map(|b| (external, *b)).ok_or_else(|| {
                    MeshError::GraphInconsistent(format!(
                        "no boundary recorded for cell {}",
                        external
                    ))
                })
            })
            .collect::<MeshResult<Vec<_>>>()?;
        self.graph.remove(&parent);

        let [nw, ne, sw, se] = [children[0].0, children[1].0, children[2].0, children[3].0];

        let mut child_maps = [
            NeighbourMap::new()
                .with(Direction::East, vec![ne])
                .with(Direction::South, vec![sw])
                .with(Direction::SouthEast, vec![se]),
            NeighbourMap::new()
                .with(Direction::West, vec![nw])
                .with(Direction::South, vec![se])
                .with(Direction::SouthWest, vec![sw]),
            NeighbourMap::new()
                .with(Direction::North, vec![nw])
                .with(Direction::East, vec![se])
                .with(Direction::NorthEast, vec![ne]),
            NeighbourMap::new()
                .with(Direction::North, vec![ne])
                .with(Direction::West, vec![sw])
                .with(Direction::NorthWest, vec![nw]),
        ];

        for (external, external_bounds) in externals {
            // Slot of `external` that each touching child belongs in.
            let mut incoming: [Vec<CellId>; 8] = Default::default();
            for (i, (child, child_bounds)) in children.iter().enumerate() {
                for direction in neighbour_cases(child_bounds, &external_bounds, frame) {
                    child_maps[i].push(direction, external);
                    incoming[direction.opposite().index()].push(*child);
                }
            }

            let map = self.node_mut(external).map_err(|_| {
                MeshError::GraphInconsistent(format!(
                    "cell {} references missing neighbour {}",
                    parent, external
                ))
            })?;
            for direction in Direction::ALL {
                let arriving = std::mem::take(&mut incoming[direction.index()]);
                let slot = map.get(direction);
                let mut updated = Vec::with_capacity(slot.len() + arriving.len());
                let mut placed = arriving.is_empty();
                for id in slot {
                    if *id == parent {
                        if !placed {
                            updated.extend_from_slice(&arriving);
                            placed = true;
                        }
                    } else {
                        updated.push(*id);
                    }
                }
                if !placed {
                    updated.extend_from_slice(&arriving);
                }
                map.set(direction, updated);
            }
        }

        for ((child, _), map) in children.iter().zip(child_maps) {
            self.graph.insert(*child, map);
        }

        trace!(parent = %parent, children = ?[nw, ne, sw, se], "Split node in neighbour graph");
        Ok(())
    }

    /// Every edge whose reverse is missing, including edges to unknown nodes.
    pub fn validate_symmetry(&self) -> Vec<AsymmetricEdge> {
        let mut violations = Vec::new();
        for (id, map) in &self.graph {
            for (direction, neighbours) in map.iter() {
                for neighbour in neighbours {
                    let reciprocal = self
                        .graph
                        .get(neighbour)
                        .map(|m| m.get(direction.opposite()).contains(id))
                        .unwrap_or(false);
                    if !reciprocal {
                        violations.push(AsymmetricEdge {
                            from: *id,
                            direction,
                            to: *neighbour,
                        });
                    }
                }
            }
        }
        violations
    }

    /// Fail with the first asymmetric edge, if any.
    pub fn ensure_symmetric(&self) -> MeshResult<()> {
        match self.validate_symmetry().first() {
            Some(edge) => Err(MeshError::GraphInconsistent(edge.to_string())),
            None => Ok(()),
        }
    }
}
