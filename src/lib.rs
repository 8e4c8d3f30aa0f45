#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod ai;
pub mod board;
pub mod common;
pub mod config;
pub mod damage;
pub mod game;
pub mod local;
pub mod player;
pub mod seat;
pub mod ship;
pub mod view;

#[cfg(feature = "std")]
pub mod client;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
pub mod protocol;
#[cfg(feature = "std")]
pub mod room;
#[cfg(feature = "std")]
pub mod server;
#[cfg(feature = "std")]
pub mod transport;
#[cfg(feature = "std")]
pub mod ui;

pub use ai::{calc_density, calc_density_and_select, pick_highest, select_shots, Density, TargetingModel};
pub use board::*;
pub use common::*;
pub use config::*;
pub use damage::{DamageTrack, TypeHealth};
pub use game::*;
pub use local::{EventSink, LocalMatch, LocalOutcome, NullSink};
pub use player::{AiPlayer, Player};
pub use seat::Seat;
pub use ship::*;
pub use view::PlayerView;

#[cfg(feature = "std")]
pub use client::{run_client, ClientOutcome};
#[cfg(feature = "std")]
pub use logging::init_logging;
#[cfg(feature = "std")]
pub use player::CliPlayer;
#[cfg(feature = "std")]
pub use protocol::{Message, PROTOCOL_VERSION};
#[cfg(feature = "std")]
pub use room::RoomHandle;
#[cfg(feature = "std")]
pub use server::{run_server, serve_session};
#[cfg(feature = "std")]
pub use transport::{in_memory::InMemoryTransport, tcp::TcpTransport, Transport};
