#![cfg(feature = "std")]

use serde::{Deserialize, Serialize};

use crate::common::SessionId;
use crate::config::Rules;
use crate::game::{Command, MatchEvent};

/// Bumped whenever the wire format changes.
pub const PROTOCOL_VERSION: u16 = 1;

/// Messages exchanged between a client and the room server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    /// First message from a client.
    Hello { version: u16 },
    /// Server reply: the session id assigned and the rules of the room.
    Welcome {
        version: u16,
        session: SessionId,
        rules: Rules,
    },
    /// A command for the room, client to server.
    Command(Command),
    /// Events produced by one command, server to client.
    Events(alloc::vec::Vec<MatchEvent>),
}
