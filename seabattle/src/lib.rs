//! Session engine for two-player online Battleship.
//!
//! Clients register under a name, open or join a room, submit a fleet and take turns
//! striking the opponent's 10x10 board until one fleet is sunk. [`GameSessionEngine`]
//! owns all of that state and is driven one command at a time by a transport, which
//! supplies a [`NotificationSink`] for the events each command produces.
//!
//! [`board`] and [`ships`] hold the geometry, [`game`] the per-game turn state
//! machine, [`players`], [`rooms`] and [`leaderboard`] the process-wide registries,
//! and [`protocol`] the JSON messages exchanged with clients.

pub mod board;
pub mod engine;
pub mod errors;
pub mod game;
pub mod ids;
pub mod leaderboard;
pub mod players;
pub mod protocol;
pub mod rooms;
pub mod ships;
pub mod sink;

pub use crate::{
    engine::GameSessionEngine,
    errors::{CommandError, ErrorKind},
    ids::{ConnectionId, GameId, ParticipantId, PlayerId, RoomId},
    protocol::{ClientCommand, ServerEvent},
    sink::{NotificationSink, RecordingSink},
};
