//! Per-player placement grid and shot record, plus random fleet placement.

use alloc::vec::Vec;
use core::fmt;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::common::{Cell, PlacementError, ShipId, Turn};
use crate::config::Rules;
use crate::ship::{bounds, Offset, ShipPool};

/// Fresh attempts `auto_place_with_retries` makes by default.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 100;

/// Board cells mapped to the ship occupying them.
#[derive(Clone, PartialEq, Eq)]
pub struct PlacementGrid {
    width: usize,
    height: usize,
    cells: Vec<Option<ShipId>>,
}

impl PlacementGrid {
    /// Create an empty grid.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: alloc::vec![None; width * height],
        }
    }

    /// Empty grid sized for `rules`.
    pub fn for_rules(rules: &Rules) -> Self {
        Self::new(rules.width, rules.height)
    }

    /// Wrap a raw cell array. Returns `None` if the length is wrong.
    pub fn from_cells(width: usize, height: usize, cells: Vec<Option<ShipId>>) -> Option<Self> {
        if cells.len() != width * height {
            return None;
        }
        Some(Self {
            width,
            height,
            cells,
        })
    }

    pub fn cells(&self) -> &[Option<ShipId>] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<Option<ShipId>> {
        self.cells
    }

    pub fn ship_at(&self, cell: Cell) -> Option<ShipId> {
        self.cells.get(cell).copied().flatten()
    }

    pub fn is_placed(&self, ship_id: ShipId) -> bool {
        self.cells.contains(&Some(ship_id))
    }

    /// Number of cells occupied by `ship_id`.
    pub fn occupied_by(&self, ship_id: ShipId) -> usize {
        self.cells.iter().filter(|c| **c == Some(ship_id)).count()
    }

    /// Clear every cell held by `ship_id`.
    pub fn remove(&mut self, ship_id: ShipId) {
        for cell in self.cells.iter_mut() {
            if *cell == Some(ship_id) {
                *cell = None;
            }
        }
    }

    /// `true` when every ship in `pool` covers exactly its footprint size and
    /// no cell names a ship outside the pool.
    pub fn is_complete(&self, rules: &Rules, pool: &ShipPool) -> bool {
        if self
            .cells
            .iter()
            .flatten()
            .any(|id| usize::from(*id) >= pool.len())
        {
            return false;
        }
        pool.ids()
            .all(|id| Some(self.occupied_by(id)) == pool.part_count(rules, id))
    }

    /// `true` when the grid is one `try_place` could have produced: complete,
    /// every ship sitting on exactly its footprint at some pivot, and no two
    /// ships touching.
    pub fn is_valid_layout(&self, rules: &Rules, pool: &ShipPool) -> bool {
        if self.width != rules.width || self.height != rules.height || !self.is_complete(rules, pool) {
            return false;
        }
        let mut rebuilt = Self::for_rules(rules);
        for id in pool.ids() {
            let Some(footprint) = pool.footprint(rules, id) else {
                return false;
            };
            // the (0,0) offset puts the pivot on one of the ship's own cells
            let pivot = (0..self.cells.len()).find(|&pivot| {
                self.cells[pivot] == Some(id)
                    && footprint.iter().all(|o| {
                        rules
                            .offset_cell(pivot, *o)
                            .is_some_and(|cell| self.cells[cell] == Some(id))
                    })
            });
            match pivot {
                Some(pivot) if rebuilt.try_place(id, footprint, pivot) => {}
                _ => return false,
            }
        }
        rebuilt == *self
    }

    fn index(&self, x: i32, y: i32) -> Option<Cell> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    /// Place `ship_id` with its pivot on `pivot`.
    ///
    /// Fails without touching the grid if a footprint cell is off the board
    /// or if another ship sits anywhere inside the footprint's bounding box
    /// grown by one cell. On success the ship's previous cells are cleared
    /// first, so this doubles as a move.
    pub fn try_place(&mut self, ship_id: ShipId, footprint: &[Offset], pivot: Cell) -> bool {
        if pivot >= self.cells.len() {
            return false;
        }
        let px = (pivot % self.width) as i32;
        let py = (pivot / self.width) as i32;

        let mut targets = Vec::with_capacity(footprint.len());
        for o in footprint {
            let cell = px
                .checked_add(o.x)
                .zip(py.checked_add(o.y))
                .and_then(|(x, y)| self.index(x, y));
            match cell {
                Some(cell) => targets.push(cell),
                None => return false,
            }
        }

        // every footprint cell is on the board, so the grown box stays near it
        let b = bounds(footprint);
        for y in (py + b.min_y - 1)..=(py + b.max_y + 1) {
            for x in (px + b.min_x - 1)..=(px + b.max_x + 1) {
                let Some(cell) = self.index(x, y) else {
                    continue;
                };
                if matches!(self.cells[cell], Some(other) if other != ship_id) {
                    return false;
                }
            }
        }

        self.remove(ship_id);
        for cell in targets {
            self.cells[cell] = Some(ship_id);
        }
        true
    }
}

impl fmt::Debug for PlacementGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PlacementGrid {}x{} {{", self.width, self.height)?;
        for row in self.cells.chunks(self.width) {
            write!(f, "  ")?;
            for cell in row {
                match cell {
                    Some(id) => write!(f, "{:>3}", id)?,
                    None => write!(f, "  .")?,
                }
            }
            writeln!(f)?;
        }
        write!(f, "}}")
    }
}

/// Turn on which each cell was fired upon by one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShotRecord {
    cells: Vec<Option<Turn>>,
}

impl ShotRecord {
    pub fn new(cell_count: usize) -> Self {
        Self {
            cells: alloc::vec![None; cell_count],
        }
    }

    pub fn from_cells(cells: Vec<Option<Turn>>) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[Option<Turn>] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn is_shot(&self, cell: Cell) -> bool {
        matches!(self.cells.get(cell), Some(Some(_)))
    }

    pub fn turn_at(&self, cell: Cell) -> Option<Turn> {
        self.cells.get(cell).copied().flatten()
    }

    /// Record a shot. Returns `false` if the cell was already shot or is off
    /// the board; the record is never overwritten.
    pub fn mark(&mut self, cell: Cell, turn: Turn) -> bool {
        match self.cells.get_mut(cell) {
            Some(slot) if slot.is_none() => {
                *slot = Some(turn);
                true
            }
            _ => false,
        }
    }

    /// Cells not yet fired upon.
    pub fn unshot(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_none())
            .map(|(i, _)| i)
    }

    pub fn shot_count(&self) -> usize {
        self.cells.iter().filter(|t| t.is_some()).count()
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = None);
    }
}

/// Place the whole fleet at random in a single greedy pass.
///
/// All cells are shuffled once into a shared candidate list; each ship, in
/// id order, pops candidates until one is accepted. Running out of
/// candidates reports `PlacementError::Impossible` even if some other
/// layout would have worked.
pub fn auto_place<R: Rng + ?Sized>(rules: &Rules, rng: &mut R) -> Result<PlacementGrid, PlacementError> {
    let pool = ShipPool::new(rules);
    let mut grid = PlacementGrid::for_rules(rules);
    let mut candidates: Vec<Cell> = (0..rules.cell_count()).collect();
    candidates.shuffle(rng);

    for id in pool.ids() {
        let footprint = pool
            .footprint(rules, id)
            .ok_or(PlacementError::UnknownShip(id))?;
        loop {
            let pivot = candidates.pop().ok_or(PlacementError::Impossible)?;
            if grid.try_place(id, footprint, pivot) {
                break;
            }
        }
    }
    Ok(grid)
}

/// Repeat [`auto_place`] from scratch up to `attempts` times.
pub fn auto_place_with_retries<R: Rng + ?Sized>(
    rules: &Rules,
    rng: &mut R,
    attempts: usize,
) -> Result<PlacementGrid, PlacementError> {
    for attempt in 0..attempts {
        match auto_place(rules, rng) {
            Ok(grid) => return Ok(grid),
            Err(PlacementError::Impossible) => {
                log::trace!("auto placement attempt {} exhausted candidates", attempt + 1);
            }
            Err(e) => return Err(e),
        }
    }
    Err(PlacementError::Impossible)
}
