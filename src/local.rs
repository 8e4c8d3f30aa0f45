//! Single-process match: both seats and the rules engine on the caller's
//! thread, connected by a FIFO command queue.

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::vec::Vec;

use log::info;
use rand::rngs::SmallRng;

use crate::common::{RulesError, SessionId};
use crate::config::Rules;
use crate::game::{Command, Match, MatchEvent, Phase};
use crate::player::Player;
use crate::seat::Seat;

/// Receives every event together with the state it produced.
pub trait EventSink {
    fn emit(&mut self, event: &MatchEvent, game: &Match);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &MatchEvent, _game: &Match) {}
}

impl EventSink for Vec<MatchEvent> {
    fn emit(&mut self, event: &MatchEvent, _game: &Match) {
        self.push(event.clone());
    }
}

/// How a local run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalOutcome {
    /// Winner of every completed match, in order.
    pub winners: Vec<SessionId>,
    /// Round counter of the last match.
    pub rounds: u32,
    pub phase: Phase,
    pub commands: usize,
}

pub struct LocalMatch<S: EventSink> {
    game: Match,
    seats: Vec<Seat>,
    sink: S,
    rng: SmallRng,
    queue: VecDeque<(SessionId, Command)>,
}

impl<S: EventSink> LocalMatch<S> {
    /// The first player takes seat 0 and fires first.
    pub fn new(rules: Rules, players: [Box<dyn Player>; 2], sink: S, rng: SmallRng) -> Result<Self, RulesError> {
        let game = Match::new(rules.clone())?;
        let seats = players
            .into_iter()
            .zip(1u64..)
            .map(|(player, id)| Seat::new(SessionId(id), rules.clone(), player))
            .collect();
        Ok(Self {
            game,
            seats,
            sink,
            rng,
            queue: VecDeque::new(),
        })
    }

    pub fn sessions(&self) -> Vec<SessionId> {
        self.seats.iter().map(Seat::session).collect()
    }

    pub fn game(&self) -> &Match {
        &self.game
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Seat both players and run until the command queue drains or the
    /// room reaches `Leave`.
    pub fn run(&mut self) -> LocalOutcome {
        for seat in &self.seats {
            self.queue.push_back((seat.session(), Command::Join));
        }

        let mut winners = Vec::new();
        let mut commands = 0;
        while let Some((session, command)) = self.queue.pop_front() {
            commands += 1;
            let events = self.game.apply(session, command);
            if events.is_empty() {
                continue;
            }
            for event in &events {
                if let MatchEvent::MatchResult { winner } = event {
                    winners.push(*winner);
                }
                self.sink.emit(event, &self.game);
            }
            for seat in self.seats.iter_mut() {
                for next in seat.react(&events, &mut self.rng) {
                    self.queue.push_back((seat.session(), next));
                }
            }
            if self.game.phase() == Phase::Leave {
                break;
            }
        }

        info!(
            "local match finished in phase {:?} after {} command(s)",
            self.game.phase(),
            commands
        );
        LocalOutcome {
            winners,
            rounds: self.game.turn(),
            phase: self.game.phase(),
            commands,
        }
    }
}
