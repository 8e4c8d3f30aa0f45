//! Ship types, footprints and the per-player ship pool.

use alloc::string::String;
use alloc::vec::Vec;

use crate::common::ShipId;
use crate::config::Rules;

/// Relative cell offset from a ship's pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Inclusive bounding box of a footprint, relative to its pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

/// Bounding box of `footprint`. An empty footprint collapses to the pivot.
pub fn bounds(footprint: &[Offset]) -> Bounds {
    let mut b = Bounds {
        min_x: 0,
        min_y: 0,
        max_x: 0,
        max_y: 0,
    };
    for o in footprint {
        b.min_x = b.min_x.min(o.x);
        b.min_y = b.min_y.min(o.y);
        b.max_x = b.max_x.max(o.x);
        b.max_y = b.max_y.max(o.y);
    }
    b
}

/// One entry of the fleet catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct ShipType {
    pub name: String,
    /// Occupied offsets; the first one is always `(0,0)`.
    pub footprint: Vec<Offset>,
    /// Instances of this type per player.
    pub count: u8,
    /// Lower ranks are placed first and own the earlier damage slots.
    pub rank: u8,
}

impl ShipType {
    pub fn new(name: &str, footprint: &[Offset], count: u8, rank: u8) -> Self {
        Self {
            name: String::from(name),
            footprint: footprint.to_vec(),
            count,
            rank,
        }
    }

    /// Cells covered by one instance.
    pub fn size(&self) -> usize {
        self.footprint.len()
    }

    /// Damage slots owned by this type: all instances together.
    pub fn parts(&self) -> usize {
        self.size() * usize::from(self.count)
    }
}

/// Mapping from ship id to catalog entry for one fleet instance.
///
/// Ids are handed out in catalog order, so id 0 is always the first
/// instance of the lowest-rank type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipPool {
    types: Vec<usize>,
}

impl ShipPool {
    pub fn new(rules: &Rules) -> Self {
        let mut types = Vec::new();
        for (index, ship) in rules.ships.iter().enumerate() {
            for _ in 0..ship.count {
                types.push(index);
            }
        }
        Self { types }
    }

    /// Number of ship instances.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Catalog index of the type `ship_id` belongs to.
    pub fn type_of(&self, ship_id: ShipId) -> Option<usize> {
        self.types.get(usize::from(ship_id)).copied()
    }

    pub fn footprint<'r>(&self, rules: &'r Rules, ship_id: ShipId) -> Option<&'r [Offset]> {
        let ty = self.type_of(ship_id)?;
        rules.ships.get(ty).map(|s| s.footprint.as_slice())
    }

    pub fn part_count(&self, rules: &Rules, ship_id: ShipId) -> Option<usize> {
        self.footprint(rules, ship_id).map(<[Offset]>::len)
    }

    /// All ship ids in placement order.
    pub fn ids(&self) -> impl Iterator<Item = ShipId> + '_ {
        (0..self.types.len()).map(|i| i as ShipId)
    }
}
