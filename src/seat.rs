//! Drives one [`Player`] from the events its session receives.

use alloc::boxed::Box;
use alloc::vec::Vec;

use log::warn;
use rand::rngs::SmallRng;

use crate::common::SessionId;
use crate::config::Rules;
use crate::game::{Command, MatchEvent, Phase};
use crate::player::Player;
use crate::view::PlayerView;

pub struct Seat {
    session: SessionId,
    player: Box<dyn Player>,
    view: PlayerView,
}

impl Seat {
    pub fn new(session: SessionId, rules: Rules, player: Box<dyn Player>) -> Self {
        Self {
            session,
            player,
            view: PlayerView::new(rules, session),
        }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn view(&self) -> &PlayerView {
        &self.view
    }

    /// Fold an event batch into the view and return the commands the player
    /// sends in response, in order.
    pub fn react(&mut self, events: &[MatchEvent], rng: &mut SmallRng) -> Vec<Command> {
        let mut placing = false;
        let mut my_turn = false;
        let mut decided = false;

        for event in events {
            self.view.apply(event);
            self.player.observe(event, &self.view);
            match event {
                MatchEvent::PhaseChanged(Phase::Placing) => placing = true,
                MatchEvent::PhaseChanged(Phase::Result) => decided = true,
                MatchEvent::TurnOwnerChanged { owner, .. } if *owner == self.session => my_turn = true,
                _ => {}
            }
        }

        let mut commands = Vec::new();
        match self.view.phase() {
            Phase::Placing if placing => match self.player.place_fleet(rng, self.view.rules()) {
                Ok(grid) => commands.push(Command::SubmitPlacement(grid.into_cells())),
                Err(e) => {
                    warn!("session {} could not place its fleet: {}", self.session, e);
                    commands.push(Command::Leave);
                }
            },
            Phase::Battle if my_turn => {
                commands.push(Command::SubmitTurn(self.player.select_volley(rng, &self.view)));
            }
            Phase::Result if decided => {
                commands.push(Command::SubmitRematch(self.player.wants_rematch(&self.view)));
            }
            _ => {}
        }
        commands
    }
}
