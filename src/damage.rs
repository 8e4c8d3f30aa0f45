//! Type-level damage tracks.
//!
//! Hits are written to the first intact slot of the ship type's range, never
//! to a particular instance, so two ships of the same type cannot be told
//! apart from the track.

use alloc::vec::Vec;
use core::ops::Range;

use crate::common::Turn;
use crate::config::Rules;

/// Remaining health of one ship type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeHealth {
    pub type_index: usize,
    pub intact: usize,
    pub total: usize,
}

impl TypeHealth {
    pub fn is_sunk(&self) -> bool {
        self.intact == 0
    }
}

/// Damage inflicted on one player's fleet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamageTrack {
    slots: Vec<Option<Turn>>,
    ranges: Vec<Range<usize>>,
}

impl DamageTrack {
    /// A fully intact track laid out for `rules`.
    pub fn new(rules: &Rules) -> Self {
        Self {
            slots: alloc::vec![None; rules.total_parts()],
            ranges: rules.damage_ranges(),
        }
    }

    /// Rebuild from raw slots. Returns `None` if the length does not match.
    pub fn from_slots(rules: &Rules, slots: Vec<Option<Turn>>) -> Option<Self> {
        if slots.len() != rules.total_parts() {
            return None;
        }
        Some(Self {
            slots,
            ranges: rules.damage_ranges(),
        })
    }

    pub fn slots(&self) -> &[Option<Turn>] {
        &self.slots
    }

    /// Slot range of catalog type `type_index`.
    pub fn range(&self, type_index: usize) -> Option<Range<usize>> {
        self.ranges.get(type_index).cloned()
    }

    /// Back to full health.
    pub fn reset(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }

    /// Mark the first intact slot of `type_index` as damaged on `turn`.
    /// Returns the slot index, or `None` when the type is already sunk.
    pub fn mark(&mut self, type_index: usize, turn: Turn) -> Option<usize> {
        let range = self.range(type_index)?;
        let slot = range.clone().find(|&i| self.slots[i].is_none())?;
        self.slots[slot] = Some(turn);
        Some(slot)
    }

    /// Write a specific slot, as reported by a damage event.
    pub fn set(&mut self, slot: usize, turn: Turn) -> bool {
        match self.slots.get_mut(slot) {
            Some(s) if s.is_none() => {
                *s = Some(turn);
                true
            }
            _ => false,
        }
    }

    pub fn health(&self) -> usize {
        self.slots.iter().filter(|s| s.is_none()).count()
    }

    pub fn damaged_count(&self) -> usize {
        self.slots.len() - self.health()
    }

    /// Number of slots damaged on `turn`.
    pub fn damaged_on(&self, turn: Turn) -> usize {
        self.slots.iter().filter(|s| **s == Some(turn)).count()
    }

    /// Aggregate per-type attrition; safe to show to the opponent.
    pub fn health_by_type(&self) -> Vec<TypeHealth> {
        self.ranges
            .iter()
            .enumerate()
            .map(|(type_index, range)| TypeHealth {
                type_index,
                intact: self.slots[range.clone()].iter().filter(|s| s.is_none()).count(),
                total: range.len(),
            })
            .collect()
    }
}
