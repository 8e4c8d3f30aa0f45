#![cfg(feature = "std")]

use log::{debug, info};
use rand::rngs::SmallRng;

use crate::common::SessionId;
use crate::game::{Command, MatchEvent, Phase};
use crate::player::Player;
use crate::protocol::{Message, PROTOCOL_VERSION};
use crate::seat::Seat;
use crate::transport::Transport;

/// Summary of a client's time in a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOutcome {
    pub session: SessionId,
    /// Winner of every completed match, in order.
    pub winners: Vec<SessionId>,
    pub opponent_left: bool,
}

impl ClientOutcome {
    pub fn wins(&self) -> usize {
        self.winners.iter().filter(|w| **w == self.session).count()
    }
}

/// Connect `player` to a room on the other end of `transport` and play
/// until the room closes or the opponent leaves.
pub async fn run_client<T: Transport>(
    transport: &mut T,
    player: Box<dyn Player>,
    rng: &mut SmallRng,
) -> anyhow::Result<ClientOutcome> {
    transport
        .send(Message::Hello {
            version: PROTOCOL_VERSION,
        })
        .await?;
    let (session, rules) = match transport.recv().await? {
        Message::Welcome {
            version,
            session,
            rules,
        } if version == PROTOCOL_VERSION => (session, rules),
        Message::Welcome { version, .. } => {
            return Err(anyhow::anyhow!(
                "Protocol version mismatch: server {}, client {}",
                version,
                PROTOCOL_VERSION
            ));
        }
        other => return Err(anyhow::anyhow!("Expected Welcome, got {:?}", other)),
    };
    info!("joined as session {}", session);

    let mut seat = Seat::new(session, rules, player);
    let mut outcome = ClientOutcome {
        session,
        winners: Vec::new(),
        opponent_left: false,
    };

    loop {
        let events = match transport.recv().await? {
            Message::Events(events) => events,
            other => {
                debug!("ignoring unexpected {:?}", other);
                continue;
            }
        };
        for event in &events {
            match event {
                MatchEvent::MatchResult { winner } => outcome.winners.push(*winner),
                MatchEvent::PlayerLeft(s) if *s != session => outcome.opponent_left = true,
                _ => {}
            }
        }

        let mut left = false;
        for command in seat.react(&events, rng) {
            left |= matches!(command, Command::Leave);
            transport.send(Message::Command(command)).await?;
        }
        if left {
            info!("session {} left the room", session);
            break;
        }

        if seat.view().phase() == Phase::Leave {
            break;
        }
        if outcome.opponent_left {
            transport.send(Message::Command(Command::Leave)).await?;
            break;
        }
    }
    Ok(outcome)
}
