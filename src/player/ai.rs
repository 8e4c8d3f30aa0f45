use alloc::vec::Vec;

use rand::rngs::SmallRng;

use crate::ai::{self, TargetingModel};
use crate::board::{self, PlacementGrid, MAX_PLACEMENT_ATTEMPTS};
use crate::common::{Cell, PlacementError};
use crate::config::Rules;
use crate::view::PlayerView;

use super::Player;

/// Computer opponent: random fleet, density-driven volleys.
#[derive(Debug, Clone, Default)]
pub struct AiPlayer {
    model: TargetingModel,
    rematches: u32,
}

impl AiPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(model: TargetingModel) -> Self {
        Self { model, rematches: 0 }
    }

    /// Accept up to `rematches` rematch offers, then decline.
    pub fn with_rematches(mut self, rematches: u32) -> Self {
        self.rematches = rematches;
        self
    }

    pub fn model(&self) -> TargetingModel {
        self.model
    }
}

impl Player for AiPlayer {
    fn place_fleet(&mut self, rng: &mut SmallRng, rules: &Rules) -> Result<PlacementGrid, PlacementError> {
        board::auto_place_with_retries(rules, rng, MAX_PLACEMENT_ATTEMPTS)
    }

    fn select_volley(&mut self, rng: &mut SmallRng, view: &PlayerView) -> Vec<Cell> {
        ai::calc_density_and_select(view, self.model, rng)
    }

    fn wants_rematch(&mut self, _view: &PlayerView) -> bool {
        if self.rematches == 0 {
            return false;
        }
        self.rematches -= 1;
        true
    }
}
