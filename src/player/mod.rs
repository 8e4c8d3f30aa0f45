//! Player trait and implementations
//!
//! A player only decides: where its fleet goes, which cells to fire on, and
//! whether to play again. Everything it sees comes through a [`PlayerView`].
//! - AiPlayer: density-based targeting with random placement
//! - CliPlayer: interactive terminal player

use alloc::vec::Vec;

use rand::rngs::SmallRng;

use crate::board::PlacementGrid;
use crate::common::{Cell, PlacementError};
use crate::config::Rules;
use crate::game::MatchEvent;
use crate::view::PlayerView;

pub trait Player: Send {
    /// Lay out the whole fleet for a new match.
    fn place_fleet(&mut self, rng: &mut SmallRng, rules: &Rules) -> Result<PlacementGrid, PlacementError>;

    /// Choose the cells for this turn's volley.
    fn select_volley(&mut self, rng: &mut SmallRng, view: &PlayerView) -> Vec<Cell>;

    /// Asked once a match has a winner.
    fn wants_rematch(&mut self, _view: &PlayerView) -> bool {
        false
    }

    /// Called for every event after it has been folded into `view`.
    fn observe(&mut self, _event: &MatchEvent, _view: &PlayerView) {}
}

pub mod ai;
pub use ai::AiPlayer;

#[cfg(feature = "std")]
pub mod cli;
#[cfg(feature = "std")]
pub use cli::CliPlayer;
