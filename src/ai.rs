// Probability-based volley selection for the built-in opponent.
// Works from public information only: own shot history and the type-level
// damage the opponent has taken.

use alloc::vec::Vec;
use core::cmp::Ordering;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::common::Cell;
use crate::config::Rules;
use crate::damage::TypeHealth;
use crate::ship::Offset;
use crate::view::PlayerView;

/// How the cells still consistent with a ship are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(clap::ValueEnum))]
pub enum TargetingModel {
    /// Every unshot cell counts; all cells tie and play is effectively random.
    UncheckedCells,
    /// Only unshot cells covered by some in-bounds placement of the
    /// footprint that avoids known-empty cells.
    #[default]
    FootprintFit,
}

/// Exact probability `parts / cells`.
#[derive(Debug, Clone, Copy)]
pub struct Density {
    parts: u32,
    cells: u32,
}

impl Density {
    pub fn new(parts: u32, cells: u32) -> Self {
        Self {
            parts,
            cells: cells.max(1),
        }
    }

    pub fn parts(&self) -> u32 {
        self.parts
    }

    pub fn cells(&self) -> u32 {
        self.cells
    }

    pub fn as_f64(&self) -> f64 {
        f64::from(self.parts) / f64::from(self.cells)
    }
}

impl PartialEq for Density {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Density {}

impl PartialOrd for Density {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Density {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = u64::from(self.parts) * u64::from(other.cells);
        let rhs = u64::from(other.parts) * u64::from(self.cells);
        lhs.cmp(&rhs)
    }
}

/// Cells covered by at least one legal placement of `footprint` that
/// avoids `known_empty`, restricted to `unshot` cells.
fn fit_mask(rules: &Rules, footprint: &[Offset], unshot: &[bool], known_empty: &[bool]) -> Vec<bool> {
    let mut mask = alloc::vec![false; rules.cell_count()];
    let mut covered = Vec::with_capacity(footprint.len());
    for pivot in 0..rules.cell_count() {
        covered.clear();
        let fits = footprint.iter().all(|o| match rules.offset_cell(pivot, *o) {
            Some(cell) if !known_empty.get(cell).copied().unwrap_or(false) => {
                covered.push(cell);
                true
            }
            _ => false,
        });
        if fits {
            for &cell in &covered {
                if unshot.get(cell).copied().unwrap_or(false) {
                    mask[cell] = true;
                }
            }
        }
    }
    mask
}

/// Per-cell hit density: for every ship type still afloat,
/// `intact parts / consistent cells`, keeping the highest value per cell.
/// `None` marks cells no remaining ship can occupy.
pub fn calc_density(
    rules: &Rules,
    unshot: &[bool],
    known_empty: &[bool],
    remaining: &[TypeHealth],
    model: TargetingModel,
) -> Vec<Option<Density>> {
    let mut map: Vec<Option<Density>> = alloc::vec![None; rules.cell_count()];

    for health in remaining.iter().filter(|h| !h.is_sunk()) {
        let Some(ship) = rules.ships.get(health.type_index) else {
            continue;
        };
        let consistent = match model {
            TargetingModel::UncheckedCells => unshot.to_vec(),
            TargetingModel::FootprintFit => fit_mask(rules, &ship.footprint, unshot, known_empty),
        };
        let count = consistent.iter().filter(|c| **c).count();
        if count == 0 {
            continue;
        }
        let density = Density::new(health.intact as u32, count as u32);
        for (cell, ok) in consistent.iter().enumerate() {
            if *ok {
                let slot = &mut map[cell];
                *slot = Some(slot.map_or(density, |d| d.max(density)));
            }
        }
    }
    map
}

/// Pick `count` cells, best density first. When a density tier holds more
/// cells than still needed, the tier is sampled uniformly.
pub fn pick_highest<R: Rng + ?Sized>(scored: &[(Cell, Density)], count: usize, rng: &mut R) -> Vec<Cell> {
    let mut sorted = scored.to_vec();
    sorted.sort_by(|a, b| b.1.cmp(&a.1));

    let mut picked = Vec::with_capacity(count);
    let mut start = 0;
    while picked.len() < count && start < sorted.len() {
        let level = sorted[start].1;
        let end = sorted[start..]
            .iter()
            .position(|(_, d)| *d != level)
            .map_or(sorted.len(), |n| start + n);
        let need = count - picked.len();
        let tier = &mut sorted[start..end];
        if tier.len() > need {
            tier.shuffle(rng);
        }
        picked.extend(tier.iter().take(need).map(|(cell, _)| *cell));
        start = end;
    }
    picked
}

/// Choose a full volley from a density map. Falls back to uniform random
/// unshot cells when the map is empty, and pads with distinct already-shot
/// cells if the board is nearly exhausted.
pub fn select_shots<R: Rng + ?Sized>(
    rules: &Rules,
    density: &[Option<Density>],
    unshot: &[bool],
    rng: &mut R,
) -> Vec<Cell> {
    let count = rules.shots_per_turn;
    let scored: Vec<(Cell, Density)> = density
        .iter()
        .enumerate()
        .filter(|(cell, _)| unshot.get(*cell).copied().unwrap_or(false))
        .filter_map(|(cell, d)| d.map(|d| (cell, d)))
        .collect();

    let mut picked = if scored.is_empty() {
        let mut open: Vec<Cell> = (0..rules.cell_count())
            .filter(|c| unshot.get(*c).copied().unwrap_or(false))
            .collect();
        open.shuffle(rng);
        open.truncate(count);
        open
    } else {
        pick_highest(&scored, count, rng)
    };

    if picked.len() < count {
        let mut rest: Vec<Cell> = (0..rules.cell_count())
            .filter(|c| !picked.contains(c))
            .collect();
        rest.shuffle(rng);
        // unshot cells first; re-shooting is a no-op
        rest.sort_by_key(|c| !unshot.get(*c).copied().unwrap_or(false));
        let need = count - picked.len();
        picked.extend(rest.into_iter().take(need));
    }
    picked
}

/// Build the density map for `view` and select the next volley.
pub fn calc_density_and_select<R: Rng + ?Sized>(
    view: &PlayerView,
    model: TargetingModel,
    rng: &mut R,
) -> Vec<Cell> {
    let unshot = view.unshot_mask();
    let density = calc_density(
        view.rules(),
        &unshot,
        &view.known_empty(),
        &view.opponent_health_by_type(),
        model,
    );
    select_shots(view.rules(), &density, &unshot, rng)
}
