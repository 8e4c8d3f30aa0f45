#![cfg(feature = "std")]
//! One tokio task per match. Requests are applied strictly one at a time in
//! arrival order; the events of each command go out as one batch to every
//! connected session.

use std::collections::BTreeMap;

use log::{debug, info};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::common::SessionId;
use crate::config::Rules;
use crate::game::{Command, Match, MatchEvent, MatchSnapshot, Phase};

/// Outbound event batches for one session.
pub type EventOutbox = mpsc::UnboundedSender<Vec<MatchEvent>>;

enum RoomRequest {
    Connect { session: SessionId, outbox: EventOutbox },
    Command { session: SessionId, command: Command },
    Disconnect { session: SessionId },
}

/// Cloneable handle to a running room.
#[derive(Clone)]
pub struct RoomHandle {
    tx: mpsc::UnboundedSender<RoomRequest>,
}

impl RoomHandle {
    /// Start a room task. The task returns the final match snapshot once the
    /// room reaches `Leave` or every handle is dropped.
    pub fn spawn(rules: Rules) -> anyhow::Result<(Self, JoinHandle<MatchSnapshot>)> {
        let game = Match::new(rules).map_err(|e| anyhow::anyhow!("invalid rules: {}", e))?;
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_room(game, rx));
        Ok((Self { tx }, task))
    }

    fn request(&self, request: RoomRequest) -> anyhow::Result<()> {
        self.tx
            .send(request)
            .map_err(|_| anyhow::anyhow!("Room closed"))
    }

    /// Join `session` to the match; its events arrive on `outbox`. If the
    /// join is refused the outbox is dropped.
    pub fn connect(&self, session: SessionId, outbox: EventOutbox) -> anyhow::Result<()> {
        self.request(RoomRequest::Connect { session, outbox })
    }

    pub fn submit(&self, session: SessionId, command: Command) -> anyhow::Result<()> {
        self.request(RoomRequest::Command { session, command })
    }

    /// Same as `Leave`, and stop delivering events to `session`.
    pub fn disconnect(&self, session: SessionId) -> anyhow::Result<()> {
        self.request(RoomRequest::Disconnect { session })
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

async fn run_room(mut game: Match, mut rx: mpsc::UnboundedReceiver<RoomRequest>) -> MatchSnapshot {
    let mut outboxes: BTreeMap<SessionId, EventOutbox> = BTreeMap::new();

    while let Some(request) = rx.recv().await {
        let events = match request {
            RoomRequest::Connect { session, outbox } => match game.try_apply(session, Command::Join) {
                Ok(events) => {
                    outboxes.insert(session, outbox);
                    events
                }
                Err(rejection) => {
                    debug!("room refused session {}: {}", session, rejection);
                    continue;
                }
            },
            RoomRequest::Command { session, command } => {
                let leaving = matches!(command, Command::Leave);
                let events = game.apply(session, command);
                if leaving && !events.is_empty() {
                    outboxes.remove(&session);
                }
                events
            }
            RoomRequest::Disconnect { session } => {
                outboxes.remove(&session);
                game.apply(session, Command::Leave)
            }
        };

        if !events.is_empty() {
            outboxes.retain(|session, outbox| {
                let delivered = outbox.send(events.clone()).is_ok();
                if !delivered {
                    debug!("dropping outbox of session {}", session);
                }
                delivered
            });
        }

        if game.phase() == Phase::Leave {
            info!("room closing after round {}", game.turn());
            break;
        }
    }

    game.snapshot()
}
