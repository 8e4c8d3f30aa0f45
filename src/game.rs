//! Match state machine shared by the networked room and the local mirror.
//!
//! Every mutation goes through [`Match::try_apply`]; the events a command
//! produces are returned as one batch after the command has been applied in
//! full, so observers never see a half-resolved volley.

use alloc::vec::Vec;
use core::fmt;

use log::{debug, info};

use crate::board::{PlacementGrid, ShotRecord};
use crate::common::{Cell, RulesError, SessionId, ShipId, SnapshotError, Turn};
use crate::config::Rules;
use crate::damage::{DamageTrack, TypeHealth};
use crate::ship::ShipPool;

/// Coarse stage of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    Waiting,
    Placing,
    Battle,
    Result,
    Leave,
}

/// A validated request from one session.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Command {
    Join,
    Leave,
    /// Cell-to-ship array of length `width * height`.
    SubmitPlacement(Vec<Option<ShipId>>),
    /// Exactly `shots_per_turn` target cells.
    SubmitTurn(Vec<Cell>),
    SubmitRematch(bool),
}

/// State change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum MatchEvent {
    PlayerJoined(SessionId),
    PlayerLeft(SessionId),
    PhaseChanged(Phase),
    PlacementSubmitted(SessionId),
    TurnOwnerChanged { owner: SessionId, turn: Turn },
    ShotRecorded { shooter: SessionId, cell: Cell, turn: Turn },
    DamageRecorded { target: SessionId, slot: usize, turn: Turn },
    RematchVoted { session: SessionId, accept: bool },
    MatchResult { winner: SessionId },
}

/// Why a command was ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The match has reached `Leave` and accepts nothing more.
    Closed,
    /// Command not valid in the current phase.
    WrongPhase(Phase),
    UnknownSession,
    AlreadyJoined,
    RoomFull,
    AlreadySubmitted,
    /// Wrong grid length, unknown ship id, or a fleet `try_place` could not
    /// have produced.
    MalformedPlacement,
    NotYourTurn,
    WrongShotCount { expected: usize, actual: usize },
    CellOutOfRange(Cell),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Closed => write!(f, "match is closed"),
            Rejection::WrongPhase(p) => write!(f, "not allowed during {:?}", p),
            Rejection::UnknownSession => write!(f, "session is not part of this match"),
            Rejection::AlreadyJoined => write!(f, "session already joined"),
            Rejection::RoomFull => write!(f, "match already has two players"),
            Rejection::AlreadySubmitted => write!(f, "placement already submitted"),
            Rejection::MalformedPlacement => write!(f, "malformed placement grid"),
            Rejection::NotYourTurn => write!(f, "not this player's turn"),
            Rejection::WrongShotCount { expected, actual } => {
                write!(f, "volley has {} shots, expected {}", actual, expected)
            }
            Rejection::CellOutOfRange(c) => write!(f, "cell {} is off the board", c),
        }
    }
}

#[derive(Debug, Clone)]
struct PlayerRecord {
    session: SessionId,
    seat: u8,
    placement: Option<PlacementGrid>,
    shots: ShotRecord,
    /// Damage inflicted on this player's fleet.
    damage: DamageTrack,
    rematch: Option<bool>,
}

impl PlayerRecord {
    fn new(session: SessionId, seat: u8, rules: &Rules) -> Self {
        Self {
            session,
            seat,
            placement: None,
            shots: ShotRecord::new(rules.cell_count()),
            damage: DamageTrack::new(rules),
            rematch: None,
        }
    }

    fn reset(&mut self) {
        self.placement = None;
        self.shots.clear();
        self.damage.reset();
        self.rematch = None;
    }
}

/// One player's part of a [`MatchSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerSnapshot {
    pub session: SessionId,
    pub seat: u8,
    pub placement: Option<Vec<Option<ShipId>>>,
    pub shots: Vec<Option<Turn>>,
    pub damage: Vec<Option<Turn>>,
    pub rematch: Option<bool>,
}

/// Everything needed to resume a match.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchSnapshot {
    pub phase: Phase,
    pub players: Vec<PlayerSnapshot>,
    pub turn_owner: Option<SessionId>,
    pub starter: Option<SessionId>,
    pub turn: Turn,
    pub winner: Option<SessionId>,
}

/// Authoritative state of one two-player match.
#[derive(Debug, Clone)]
pub struct Match {
    rules: Rules,
    pool: ShipPool,
    phase: Phase,
    /// Sorted by seat.
    players: Vec<PlayerRecord>,
    turn_owner: Option<SessionId>,
    starter: Option<SessionId>,
    turn: Turn,
    winner: Option<SessionId>,
}

impl Match {
    pub fn new(rules: Rules) -> Result<Self, RulesError> {
        rules.validate()?;
        Ok(Self {
            pool: ShipPool::new(&rules),
            rules,
            phase: Phase::Waiting,
            players: Vec::new(),
            turn_owner: None,
            starter: None,
            turn: 1,
            winner: None,
        })
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn pool(&self) -> &ShipPool {
        &self.pool
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

    pub fn winner(&self) -> Option<SessionId> {
        self.winner
    }

    /// Joined sessions in seat order.
    pub fn sessions(&self) -> impl Iterator<Item = SessionId> + '_ {
        self.players.iter().map(|p| p.session)
    }

    pub fn seat_of(&self, session: SessionId) -> Option<u8> {
        self.record(session).map(|p| p.seat)
    }

    pub fn opponent_of(&self, session: SessionId) -> Option<SessionId> {
        if self.record(session).is_none() {
            return None;
        }
        self.players
            .iter()
            .find(|p| p.session != session)
            .map(|p| p.session)
    }

    /// Intact parts left in `session`'s fleet.
    pub fn health(&self, session: SessionId) -> Option<usize> {
        self.record(session).map(|p| p.damage.health())
    }

    pub fn health_by_type(&self, session: SessionId) -> Option<Vec<TypeHealth>> {
        self.record(session).map(|p| p.damage.health_by_type())
    }

    /// Damage inflicted on `session`'s fleet.
    pub fn damage_track(&self, session: SessionId) -> Option<&DamageTrack> {
        self.record(session).map(|p| &p.damage)
    }

    /// Cells `session` has fired on.
    pub fn shot_record(&self, session: SessionId) -> Option<&ShotRecord> {
        self.record(session).map(|p| &p.shots)
    }

    /// `session`'s own fleet layout. Must not be shown to the opponent.
    pub fn placement(&self, session: SessionId) -> Option<&PlacementGrid> {
        self.record(session).and_then(|p| p.placement.as_ref())
    }

    fn record(&self, session: SessionId) -> Option<&PlayerRecord> {
        self.players.iter().find(|p| p.session == session)
    }

    fn index_of(&self, session: SessionId) -> Result<usize, Rejection> {
        self.players
            .iter()
            .position(|p| p.session == session)
            .ok_or(Rejection::UnknownSession)
    }

    fn expect_phase(&self, phase: Phase) -> Result<(), Rejection> {
        match self.phase {
            Phase::Leave => Err(Rejection::Closed),
            p if p == phase => Ok(()),
            p => Err(Rejection::WrongPhase(p)),
        }
    }

    /// Apply `command`, dropping it with a debug log if it is rejected.
    pub fn apply(&mut self, session: SessionId, command: Command) -> Vec<MatchEvent> {
        match self.try_apply(session, command) {
            Ok(events) => events,
            Err(rejection) => {
                debug!("ignoring command from {}: {}", session, rejection);
                Vec::new()
            }
        }
    }

    /// Apply `command` and return the events it produced in order.
    /// A rejected command leaves the match untouched.
    pub fn try_apply(
        &mut self,
        session: SessionId,
        command: Command,
    ) -> Result<Vec<MatchEvent>, Rejection> {
        match command {
            Command::Join => self.join(session),
            Command::Leave => self.leave(session),
            Command::SubmitPlacement(cells) => self.submit_placement(session, cells),
            Command::SubmitTurn(cells) => self.submit_turn(session, &cells),
            Command::SubmitRematch(accept) => self.submit_rematch(session, accept),
        }
    }

    fn set_phase(&mut self, phase: Phase, events: &mut Vec<MatchEvent>) {
        info!("match phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        events.push(MatchEvent::PhaseChanged(phase));
    }

    fn reset_round(&mut self) {
        for p in self.players.iter_mut() {
            p.reset();
        }
        self.turn_owner = None;
        self.starter = None;
        self.turn = 1;
        self.winner = None;
    }

    fn start_placing(&mut self, events: &mut Vec<MatchEvent>) {
        self.reset_round();
        self.set_phase(Phase::Placing, events);
    }

    fn join(&mut self, session: SessionId) -> Result<Vec<MatchEvent>, Rejection> {
        if self.phase == Phase::Leave {
            return Err(Rejection::Closed);
        }
        if self.record(session).is_some() {
            return Err(Rejection::AlreadyJoined);
        }
        if self.players.len() >= 2 {
            return Err(Rejection::RoomFull);
        }
        let seat = if self.players.iter().any(|p| p.seat == 0) { 1 } else { 0 };
        self.players
            .push(PlayerRecord::new(session, seat, &self.rules));
        self.players.sort_by_key(|p| p.seat);

        let mut events = alloc::vec![MatchEvent::PlayerJoined(session)];
        if self.players.len() == 2 {
            self.start_placing(&mut events);
        }
        Ok(events)
    }

    fn leave(&mut self, session: SessionId) -> Result<Vec<MatchEvent>, Rejection> {
        let index = self.index_of(session)?;
        self.players.remove(index);

        let mut events = alloc::vec![MatchEvent::PlayerLeft(session)];
        if !matches!(self.phase, Phase::Waiting | Phase::Leave) {
            self.reset_round();
            self.set_phase(Phase::Waiting, &mut events);
        }
        Ok(events)
    }

    fn submit_placement(
        &mut self,
        session: SessionId,
        cells: Vec<Option<ShipId>>,
    ) -> Result<Vec<MatchEvent>, Rejection> {
        self.expect_phase(Phase::Placing)?;
        let index = self.index_of(session)?;
        if self.players[index].placement.is_some() {
            return Err(Rejection::AlreadySubmitted);
        }
        let grid = PlacementGrid::from_cells(self.rules.width, self.rules.height, cells)
            .ok_or(Rejection::MalformedPlacement)?;
        if !grid.is_valid_layout(&self.rules, &self.pool) {
            return Err(Rejection::MalformedPlacement);
        }
        self.players[index].placement = Some(grid);

        let mut events = alloc::vec![MatchEvent::PlacementSubmitted(session)];
        if self.players.len() == 2 && self.players.iter().all(|p| p.placement.is_some()) {
            self.begin_battle(&mut events);
        }
        Ok(events)
    }

    fn begin_battle(&mut self, events: &mut Vec<MatchEvent>) {
        for p in self.players.iter_mut() {
            p.shots.clear();
            p.damage.reset();
            p.rematch = None;
        }
        let starter = self.players[0].session;
        self.starter = Some(starter);
        self.turn_owner = Some(starter);
        self.turn = 1;
        self.winner = None;
        self.set_phase(Phase::Battle, events);
        events.push(MatchEvent::TurnOwnerChanged {
            owner: starter,
            turn: self.turn,
        });
    }

    fn submit_turn(&mut self, session: SessionId, cells: &[Cell]) -> Result<Vec<MatchEvent>, Rejection> {
        self.expect_phase(Phase::Battle)?;
        let me = self.index_of(session)?;
        if self.turn_owner != Some(session) {
            return Err(Rejection::NotYourTurn);
        }
        if cells.len() != self.rules.shots_per_turn {
            return Err(Rejection::WrongShotCount {
                expected: self.rules.shots_per_turn,
                actual: cells.len(),
            });
        }
        let cell_count = self.rules.cell_count();
        if let Some(&cell) = cells.iter().find(|&&c| c >= cell_count) {
            return Err(Rejection::CellOutOfRange(cell));
        }

        let opp = 1 - me;
        let target = self.players[opp].session;
        let turn = self.turn;
        let mut events = Vec::with_capacity(cells.len() * 2 + 2);

        for &cell in cells {
            if !self.players[me].shots.mark(cell, turn) {
                continue;
            }
            events.push(MatchEvent::ShotRecorded {
                shooter: session,
                cell,
                turn,
            });
            let hit = self.players[opp]
                .placement
                .as_ref()
                .and_then(|grid| grid.ship_at(cell))
                .and_then(|ship| self.pool.type_of(ship));
            if let Some(type_index) = hit {
                if let Some(slot) = self.players[opp].damage.mark(type_index, turn) {
                    events.push(MatchEvent::DamageRecorded { target, slot, turn });
                }
            }
        }

        if self.players[opp].damage.health() == 0 {
            self.winner = Some(session);
            self.turn_owner = None;
            self.set_phase(Phase::Result, &mut events);
            events.push(MatchEvent::MatchResult { winner: session });
        } else {
            if self.starter == Some(target) {
                self.turn += 1;
            }
            self.turn_owner = Some(target);
            events.push(MatchEvent::TurnOwnerChanged {
                owner: target,
                turn: self.turn,
            });
        }
        Ok(events)
    }

    fn submit_rematch(&mut self, session: SessionId, accept: bool) -> Result<Vec<MatchEvent>, Rejection> {
        self.expect_phase(Phase::Result)?;
        let index = self.index_of(session)?;
        self.players[index].rematch = Some(accept);

        let mut events = alloc::vec![MatchEvent::RematchVoted { session, accept }];
        if !accept {
            self.set_phase(Phase::Leave, &mut events);
        } else if self.players.len() == 2 && self.players.iter().all(|p| p.rematch == Some(true)) {
            self.start_placing(&mut events);
        }
        Ok(events)
    }

    /// Capture the full match state.
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            phase: self.phase,
            players: self
                .players
                .iter()
                .map(|p| PlayerSnapshot {
                    session: p.session,
                    seat: p.seat,
                    placement: p.placement.as_ref().map(|g| g.cells().to_vec()),
                    shots: p.shots.cells().to_vec(),
                    damage: p.damage.slots().to_vec(),
                    rematch: p.rematch,
                })
                .collect(),
            turn_owner: self.turn_owner,
            starter: self.starter,
            turn: self.turn,
            winner: self.winner,
        }
    }

    /// Rebuild a match from a snapshot taken under `rules`.
    pub fn restore(rules: Rules, snapshot: MatchSnapshot) -> Result<Self, SnapshotError> {
        let mut game = Match::new(rules)?;
        let seated = snapshot.players.len();
        if seated > 2
            || (seated != 2
                && matches!(snapshot.phase, Phase::Placing | Phase::Battle | Phase::Result))
        {
            return Err(SnapshotError::Players);
        }
        let cell_count = game.rules.cell_count();
        let parts = game.rules.total_parts();
        for p in snapshot.players {
            if p.seat > 1
                || game.players.iter().any(|q| q.session == p.session || q.seat == p.seat)
            {
                return Err(SnapshotError::Players);
            }
            if p.shots.len() != cell_count {
                return Err(SnapshotError::Length {
                    expected: cell_count,
                    actual: p.shots.len(),
                });
            }
            let damage = DamageTrack::from_slots(&game.rules, p.damage.clone()).ok_or(
                SnapshotError::Length {
                    expected: parts,
                    actual: p.damage.len(),
                },
            )?;
            let placement = match p.placement {
                Some(cells) => {
                    if let Some(id) = cells
                        .iter()
                        .flatten()
                        .find(|id| usize::from(**id) >= game.pool.len())
                    {
                        return Err(SnapshotError::UnknownShip(*id));
                    }
                    let len = cells.len();
                    let grid = PlacementGrid::from_cells(game.rules.width, game.rules.height, cells).ok_or(
                        SnapshotError::Length {
                            expected: cell_count,
                            actual: len,
                        },
                    )?;
                    if !grid.is_valid_layout(&game.rules, &game.pool) {
                        return Err(SnapshotError::InvalidPlacement(p.session));
                    }
                    Some(grid)
                }
                None if matches!(snapshot.phase, Phase::Battle | Phase::Result) => {
                    return Err(SnapshotError::InvalidPlacement(p.session));
                }
                None => None,
            };
            let latest = p.shots.iter().chain(p.damage.iter()).flatten().max().copied();
            if let Some(turn) = latest.filter(|t| *t > snapshot.turn) {
                return Err(SnapshotError::FutureTurn(turn));
            }
            game.players.push(PlayerRecord {
                session: p.session,
                seat: p.seat,
                placement,
                shots: ShotRecord::from_cells(p.shots),
                damage,
                rematch: p.rematch,
            });
        }
        game.players.sort_by_key(|p| p.seat);

        for session in [snapshot.turn_owner, snapshot.starter, snapshot.winner]
            .into_iter()
            .flatten()
        {
            if game.record(session).is_none() {
                return Err(SnapshotError::UnseatedSession(session));
            }
        }
        let consistent = snapshot.turn >= 1
            && match snapshot.phase {
                Phase::Waiting | Phase::Placing => {
                    snapshot.turn_owner.is_none() && snapshot.starter.is_none() && snapshot.winner.is_none()
                }
                Phase::Battle => {
                    snapshot.turn_owner.is_some() && snapshot.starter.is_some() && snapshot.winner.is_none()
                }
                Phase::Result => snapshot.turn_owner.is_none() && snapshot.winner.is_some(),
                Phase::Leave => snapshot.turn_owner.is_none(),
            };
        if !consistent {
            return Err(SnapshotError::PhaseState);
        }

        game.phase = snapshot.phase;
        game.turn_owner = snapshot.turn_owner;
        game.starter = snapshot.starter;
        game.turn = snapshot.turn;
        game.winner = snapshot.winner;
        Ok(game)
    }
}
