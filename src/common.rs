//! Common types for broadside: identifiers and error enums shared by the
//! rules core.

use core::fmt;

/// Board cell index, `y * width + x`.
pub type Cell = usize;

/// Small integer identifying one ship instance inside a fleet.
pub type ShipId = u8;

/// Turn counter value written into shot records and damage tracks.
pub type Turn = u32;

/// Identifier the session layer assigns to a connected player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors returned by fleet placement helpers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    /// Ship id is not part of the fleet.
    UnknownShip(ShipId),
    /// Random search ran out of candidate cells for a ship.
    Impossible,
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementError::UnknownShip(id) => write!(f, "ship {} is not part of the fleet", id),
            PlacementError::Impossible => write!(f, "fleet placement impossible"),
        }
    }
}

/// Problems found while validating a rules catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    /// Width or height is zero.
    EmptyBoard,
    /// Shots per turn must be at least one.
    NoShots,
    /// The catalog lists no ship types.
    NoShips,
    /// A ship type has an empty footprint.
    EmptyFootprint(usize),
    /// A footprint does not start with the `(0,0)` pivot.
    PivotNotFirst(usize),
    /// A footprint lists the same offset twice.
    DuplicateOffset(usize),
    /// A ship type has a zero count.
    ZeroCount(usize),
    /// Ship types are not sorted by rank.
    RankOrder(usize),
    /// More ship instances than a `ShipId` can address.
    TooManyShips(usize),
    /// The board has more cells than coordinates can address.
    BoardTooLarge,
    /// A footprint offset reaches at least a full board edge away from the pivot.
    OffsetOutOfRange(usize),
}

impl fmt::Display for RulesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RulesError::EmptyBoard => write!(f, "board must have a non-zero width and height"),
            RulesError::NoShots => write!(f, "shots per turn must be at least 1"),
            RulesError::NoShips => write!(f, "fleet catalog is empty"),
            RulesError::EmptyFootprint(i) => write!(f, "ship type {} has an empty footprint", i),
            RulesError::PivotNotFirst(i) => {
                write!(f, "ship type {} footprint must start at offset (0,0)", i)
            }
            RulesError::DuplicateOffset(i) => {
                write!(f, "ship type {} footprint repeats an offset", i)
            }
            RulesError::ZeroCount(i) => write!(f, "ship type {} has a count of zero", i),
            RulesError::RankOrder(i) => write!(f, "ship type {} is out of rank order", i),
            RulesError::TooManyShips(n) => write!(f, "{} ship instances exceed the id space", n),
            RulesError::BoardTooLarge => write!(f, "board dimensions are too large"),
            RulesError::OffsetOutOfRange(i) => {
                write!(f, "ship type {} footprint does not fit on the board", i)
            }
        }
    }
}

/// Errors returned when restoring a match from a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// The rules attached to the snapshot are invalid.
    Rules(RulesError),
    /// More than two players, or duplicated sessions or seats.
    Players,
    /// A per-player array has the wrong length.
    Length { expected: usize, actual: usize },
    /// A placement grid references a ship id outside the pool.
    UnknownShip(ShipId),
    /// A placement grid is missing where the phase needs one, or breaks the
    /// placement rules.
    InvalidPlacement(SessionId),
    /// Turn owner, starter or winner names a session that is not seated.
    UnseatedSession(SessionId),
    /// Turn owner, starter or winner does not fit the phase.
    PhaseState,
    /// A shot or damage mark is dated after the current turn.
    FutureTurn(Turn),
}

impl From<RulesError> for SnapshotError {
    fn from(err: RulesError) -> Self {
        SnapshotError::Rules(err)
    }
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Rules(e) => write!(f, "invalid rules: {}", e),
            SnapshotError::Players => write!(f, "invalid player records"),
            SnapshotError::Length { expected, actual } => {
                write!(f, "array length {} does not match expected {}", actual, expected)
            }
            SnapshotError::UnknownShip(id) => write!(f, "unknown ship id {}", id),
            SnapshotError::InvalidPlacement(s) => write!(f, "placement of session {} is missing or invalid", s),
            SnapshotError::UnseatedSession(s) => write!(f, "session {} is not seated", s),
            SnapshotError::PhaseState => write!(f, "turn state does not match the phase"),
            SnapshotError::FutureTurn(t) => write!(f, "mark dated turn {} is after the current turn", t),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PlacementError {}
#[cfg(feature = "std")]
impl std::error::Error for RulesError {}
#[cfg(feature = "std")]
impl std::error::Error for SnapshotError {}
