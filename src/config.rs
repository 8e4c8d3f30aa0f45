use alloc::vec::Vec;
use core::ops::Range;

use crate::common::{Cell, RulesError, ShipId};
use crate::ship::{Offset, ShipType};

/// Reference board edge length.
pub const BOARD_SIZE: usize = 9;
/// Reference volley size.
pub const SHOTS_PER_TURN: usize = 3;
/// Ship parts per player in the reference fleet.
pub const TOTAL_SHIP_CELLS: usize = 5 + 3 + 3 + 2 * 2 + 4;

/// Fleet catalog: board dimensions, ship types and volley size.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Rules {
    pub width: usize,
    pub height: usize,
    pub shots_per_turn: usize,
    pub ships: Vec<ShipType>,
}

impl Default for Rules {
    fn default() -> Self {
        Self::standard()
    }
}

impl Rules {
    /// The reference ruleset: 9×9 board, three shots per turn, 19 parts.
    pub fn standard() -> Self {
        Self {
            width: BOARD_SIZE,
            height: BOARD_SIZE,
            shots_per_turn: SHOTS_PER_TURN,
            ships: alloc::vec![
                ShipType::new(
                    "Flagship",
                    &[
                        Offset::new(0, 0),
                        Offset::new(1, 0),
                        Offset::new(2, 0),
                        Offset::new(3, 0),
                        Offset::new(4, 0),
                    ],
                    1,
                    0,
                ),
                ShipType::new(
                    "Vertical cruiser",
                    &[Offset::new(0, 0), Offset::new(0, 1), Offset::new(0, 2)],
                    1,
                    1,
                ),
                ShipType::new(
                    "Horizontal cruiser",
                    &[Offset::new(0, 0), Offset::new(1, 0), Offset::new(2, 0)],
                    1,
                    2,
                ),
                ShipType::new("Destroyer", &[Offset::new(0, 0), Offset::new(1, 0)], 2, 3),
                ShipType::new("Patrol boat", &[Offset::new(0, 0)], 4, 4),
            ],
        }
    }

    /// Check the catalog for structural mistakes.
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.width == 0 || self.height == 0 {
            return Err(RulesError::EmptyBoard);
        }
        let fits_coords = |n: usize| i32::try_from(n).is_ok();
        match self.width.checked_mul(self.height) {
            Some(cells) if fits_coords(self.width) && fits_coords(self.height) && fits_coords(cells) => {}
            _ => return Err(RulesError::BoardTooLarge),
        }
        if self.shots_per_turn == 0 {
            return Err(RulesError::NoShots);
        }
        if self.ships.is_empty() {
            return Err(RulesError::NoShips);
        }
        let mut instances = 0usize;
        for (i, ship) in self.ships.iter().enumerate() {
            match ship.footprint.first() {
                None => return Err(RulesError::EmptyFootprint(i)),
                Some(first) if *first != Offset::new(0, 0) => {
                    return Err(RulesError::PivotNotFirst(i))
                }
                Some(_) => {}
            }
            for (a, offset) in ship.footprint.iter().enumerate() {
                if ship.footprint[..a].contains(offset) {
                    return Err(RulesError::DuplicateOffset(i));
                }
                if offset.x.unsigned_abs() as usize >= self.width
                    || offset.y.unsigned_abs() as usize >= self.height
                {
                    return Err(RulesError::OffsetOutOfRange(i));
                }
            }
            if ship.count == 0 {
                return Err(RulesError::ZeroCount(i));
            }
            if i > 0 && ship.rank < self.ships[i - 1].rank {
                return Err(RulesError::RankOrder(i));
            }
            instances += usize::from(ship.count);
        }
        if instances > usize::from(ShipId::MAX) + 1 {
            return Err(RulesError::TooManyShips(instances));
        }
        Ok(())
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// Ship parts per player, which is also the damage track length.
    pub fn total_parts(&self) -> usize {
        self.ships.iter().map(ShipType::parts).sum()
    }

    /// Cell index of `pivot` shifted by `offset`, or `None` when that lands
    /// off the board.
    pub fn offset_cell(&self, pivot: Cell, offset: Offset) -> Option<Cell> {
        let (px, py) = self.coords(pivot);
        self.index_of(px.checked_add(offset.x)?, py.checked_add(offset.y)?)
    }

    /// Cell index of `(x, y)`, or `None` when off the board.
    pub fn index_of(&self, x: i32, y: i32) -> Option<Cell> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }

    /// `(x, y)` coordinates of `cell`.
    pub fn coords(&self, cell: Cell) -> (i32, i32) {
        ((cell % self.width) as i32, (cell / self.width) as i32)
    }

    /// Damage track slot range owned by each ship type, in catalog order.
    pub fn damage_ranges(&self) -> Vec<Range<usize>> {
        let mut start = 0;
        self.ships
            .iter()
            .map(|ship| {
                let range = start..start + ship.parts();
                start = range.end;
                range
            })
            .collect()
    }

    /// Read a JSON rules file and validate it.
    #[cfg(feature = "std")]
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read rules file {}: {}", path.display(), e))?;
        let rules: Rules = serde_json::from_str(&text)
            .map_err(|e| anyhow::anyhow!("invalid rules file {}: {}", path.display(), e))?;
        rules.validate().map_err(|e| anyhow::anyhow!(e))?;
        Ok(rules)
    }
}
