//! Spatial hash of agent membership.
//!
//! # Concurrency
//!
//! Each cell sits behind its own `Mutex`, so agents stepping on different
//! threads only contend when they touch the same cell.  [`SpatialIndex::relocate`]
//! locks both cells (in flat-index order, so two movers can never deadlock)
//! and performs the remove and insert under those locks: no observer ever
//! sees the agent in zero or two cells of the same grid.
//!
//! Membership only: the index stores `AgentId`s, the population `Vec` owns
//! the agents.

use std::sync::{Mutex, MutexGuard, PoisonError};

use gc_core::{AgentId, GeoBounds, GeoPoint};
use log::debug;

use crate::{Cell, CellPair, GridMapper, SpatialResult};

// ── SpatialIndex ──────────────────────────────────────────────────────────────

/// One N×N grid of agent sets.
pub struct SpatialIndex {
    size:  usize,
    cells: Vec<Mutex<Vec<AgentId>>>,
}

impl SpatialIndex {
    pub fn new(size: usize) -> Self {
        let cells = (0..size * size).map(|_| Mutex::new(Vec::new())).collect();
        Self { size, cells }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn insert(&self, agent: AgentId, cell: Cell) {
        self.lock(cell).push(agent);
    }

    /// Remove `agent` from `cell`.  Returns `false` if it was not there.
    pub fn remove(&self, agent: AgentId, cell: Cell) -> bool {
        let mut members = self.lock(cell);
        match members.iter().position(|&a| a == agent) {
            Some(i) => {
                members.swap_remove(i);
                true
            }
            None => false,
        }
    }

    /// Move `agent` from `from` to `to` as one step.  A no-op when the cells
    /// are equal.
    pub fn relocate(&self, agent: AgentId, from: Cell, to: Cell) {
        if from == to {
            return;
        }
        let (i, j) = (from.flat(self.size), to.flat(self.size));
        let (mut src, mut dst) = if i < j {
            let src = self.lock_flat(i);
            (src, self.lock_flat(j))
        } else {
            let dst = self.lock_flat(j);
            (self.lock_flat(i), dst)
        };
        if let Some(k) = src.iter().position(|&a| a == agent) {
            src.swap_remove(k);
        }
        dst.push(agent);
    }

    /// Snapshot of the agents currently in `cell`.
    pub fn occupants(&self, cell: Cell) -> Vec<AgentId> {
        self.lock(cell).clone()
    }

    pub fn occupant_count(&self, cell: Cell) -> usize {
        self.lock(cell).len()
    }

    pub fn contains(&self, agent: AgentId, cell: Cell) -> bool {
        self.lock(cell).contains(&agent)
    }

    /// How many cells hold `agent`.  Used to check the one-cell invariant.
    pub fn membership_count(&self, agent: AgentId) -> usize {
        self.cells
            .iter()
            .map(|c| {
                let members = c.lock().unwrap_or_else(PoisonError::into_inner);
                members.iter().filter(|&&a| a == agent).count()
            })
            .sum()
    }

    /// Total memberships across all cells.
    pub fn len(&self) -> usize {
        self.cells
            .iter()
            .map(|c| c.lock().unwrap_or_else(PoisonError::into_inner).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    fn lock(&self, cell: Cell) -> MutexGuard<'_, Vec<AgentId>> {
        self.lock_flat(cell.flat(self.size))
    }

    #[inline]
    fn lock_flat(&self, i: usize) -> MutexGuard<'_, Vec<AgentId>> {
        self.cells[i].lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ── DualGrid ──────────────────────────────────────────────────────────────────

/// Grid A and Grid B plus the mapper that addresses them.
///
/// Owned by the simulation and handed to agents by reference while they
/// step; agents only ever hold `CellPair` values, never references into the
/// grids.
pub struct DualGrid {
    mapper: GridMapper,
    grid_a: SpatialIndex,
    grid_b: SpatialIndex,
}

impl DualGrid {
    pub fn new(bounds: GeoBounds, size: usize) -> SpatialResult<Self> {
        let mapper = GridMapper::new(bounds, size)?;
        debug!("dual grid {size}x{size} over {bounds:?}");
        Ok(Self {
            mapper,
            grid_a: SpatialIndex::new(size),
            grid_b: SpatialIndex::new(size),
        })
    }

    #[inline]
    pub fn mapper(&self) -> &GridMapper {
        &self.mapper
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.mapper.size()
    }

    #[inline]
    pub fn grid_a(&self) -> &SpatialIndex {
        &self.grid_a
    }

    #[inline]
    pub fn grid_b(&self) -> &SpatialIndex {
        &self.grid_b
    }

    #[inline]
    pub fn locate(&self, p: GeoPoint) -> CellPair {
        self.mapper.locate(p)
    }

    pub fn register(&self, agent: AgentId, cells: CellPair) {
        self.grid_a.insert(agent, cells.a);
        self.grid_b.insert(agent, cells.b);
    }

    pub fn deregister(&self, agent: AgentId, cells: CellPair) {
        self.grid_a.remove(agent, cells.a);
        self.grid_b.remove(agent, cells.b);
    }

    /// Move `agent` between cell pairs on both grids.
    pub fn relocate(&self, agent: AgentId, from: CellPair, to: CellPair) {
        self.grid_a.relocate(agent, from.a, to.a);
        self.grid_b.relocate(agent, from.b, to.b);
    }

    /// Occupants of the Grid-A cell followed by occupants of the Grid-B cell.
    /// An agent sharing both cells appears twice.
    pub fn neighbors(&self, cells: CellPair) -> Vec<AgentId> {
        let mut out = self.grid_a.occupants(cells.a);
        out.extend(self.grid_b.occupants(cells.b));
        out
    }
}
