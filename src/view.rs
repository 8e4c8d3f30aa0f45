//! What one player can know about a match, rebuilt from the events it
//! receives. Opponent ship identities and layout never appear here.

use alloc::vec::Vec;

use crate::board::ShotRecord;
use crate::common::{Cell, SessionId, Turn};
use crate::config::Rules;
use crate::damage::{DamageTrack, TypeHealth};
use crate::game::{MatchEvent, Phase};

#[derive(Debug, Clone)]
pub struct PlayerView {
    rules: Rules,
    me: SessionId,
    opponent: Option<SessionId>,
    phase: Phase,
    turn_owner: Option<SessionId>,
    turn: Turn,
    winner: Option<SessionId>,
    my_shots: ShotRecord,
    incoming: ShotRecord,
    my_damage: DamageTrack,
    opponent_damage: DamageTrack,
}

impl PlayerView {
    pub fn new(rules: Rules, me: SessionId) -> Self {
        let cells = rules.cell_count();
        Self {
            my_shots: ShotRecord::new(cells),
            incoming: ShotRecord::new(cells),
            my_damage: DamageTrack::new(&rules),
            opponent_damage: DamageTrack::new(&rules),
            rules,
            me,
            opponent: None,
            phase: Phase::Waiting,
            turn_owner: None,
            turn: 1,
            winner: None,
        }
    }

    fn reset(&mut self) {
        self.my_shots.clear();
        self.incoming.clear();
        self.my_damage.reset();
        self.opponent_damage.reset();
        self.turn_owner = None;
        self.turn = 1;
        self.winner = None;
    }

    /// Fold one event into the view.
    pub fn apply(&mut self, event: &MatchEvent) {
        match *event {
            MatchEvent::PlayerJoined(s) if s != self.me => self.opponent = Some(s),
            MatchEvent::PlayerLeft(s) if Some(s) == self.opponent => self.opponent = None,
            MatchEvent::PhaseChanged(phase) => {
                self.phase = phase;
                if matches!(phase, Phase::Waiting | Phase::Placing | Phase::Battle) {
                    self.reset();
                }
            }
            MatchEvent::TurnOwnerChanged { owner, turn } => {
                self.turn_owner = Some(owner);
                self.turn = turn;
            }
            MatchEvent::ShotRecorded { shooter, cell, turn } => {
                if shooter == self.me {
                    self.my_shots.mark(cell, turn);
                } else {
                    self.incoming.mark(cell, turn);
                }
            }
            MatchEvent::DamageRecorded { target, slot, turn } => {
                if target == self.me {
                    self.my_damage.set(slot, turn);
                } else {
                    self.opponent_damage.set(slot, turn);
                }
            }
            MatchEvent::MatchResult { winner } => {
                self.winner = Some(winner);
                self.turn_owner = None;
            }
            _ => {}
        }
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn me(&self) -> SessionId {
        self.me
    }

    pub fn opponent(&self) -> Option<SessionId> {
        self.opponent
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn turn(&self) -> Turn {
        self.turn
    }

    pub fn turn_owner(&self) -> Option<SessionId> {
        self.turn_owner
    }

    pub fn is_my_turn(&self) -> bool {
        self.phase == Phase::Battle && self.turn_owner == Some(self.me)
    }

    pub fn winner(&self) -> Option<SessionId> {
        self.winner
    }

    /// Cells this player has fired on.
    pub fn my_shots(&self) -> &ShotRecord {
        &self.my_shots
    }

    /// Cells the opponent has fired on.
    pub fn incoming(&self) -> &ShotRecord {
        &self.incoming
    }

    pub fn my_damage(&self) -> &DamageTrack {
        &self.my_damage
    }

    pub fn opponent_damage(&self) -> &DamageTrack {
        &self.opponent_damage
    }

    pub fn my_health(&self) -> usize {
        self.my_damage.health()
    }

    pub fn opponent_health(&self) -> usize {
        self.opponent_damage.health()
    }

    pub fn opponent_health_by_type(&self) -> Vec<TypeHealth> {
        self.opponent_damage.health_by_type()
    }

    /// `true` for every cell this player has not fired on.
    pub fn unshot_mask(&self) -> Vec<bool> {
        self.my_shots.cells().iter().map(Option::is_none).collect()
    }

    /// Own shots that are certainly empty water: fired in a round in which
    /// the opponent took no damage at all.
    pub fn known_empty(&self) -> Vec<bool> {
        self.my_shots
            .cells()
            .iter()
            .map(|shot| match shot {
                Some(turn) => self.opponent_damage.damaged_on(*turn) == 0,
                None => false,
            })
            .collect()
    }

    /// Cells fired on in `turn` by this player.
    pub fn my_volley(&self, turn: Turn) -> Vec<Cell> {
        self.my_shots
            .cells()
            .iter()
            .enumerate()
            .filter(|(_, t)| **t == Some(turn))
            .map(|(c, _)| c)
            .collect()
    }
}
