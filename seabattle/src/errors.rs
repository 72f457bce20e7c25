//! Errors returned by engine commands.
use thiserror::Error;

use crate::{
    game::GameError,
    ids::{ConnectionId, GameId, ParticipantId},
    players::WrongCredentials,
    protocol::ProtocolError,
    rooms::RoomError,
};

/// Broad class of a rejected command, which decides what the client sees.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorKind {
    /// The message could not be understood. Dropped without a reply.
    MalformedMessage,
    /// Registration under a taken name with another password. Answered with an
    /// error-flagged `reg` reply.
    WrongCredentials,
    /// The command named something that does not exist or is not the sender's to use
    /// right now. Dropped without a reply.
    UnknownOrInvalidTarget,
}

/// Error returned when a command is rejected. A rejected command leaves all state as
/// it was.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Malformed(#[from] ProtocolError),

    #[error("{0} is not bound to a registered player")]
    NotRegistered(ConnectionId),

    #[error(transparent)]
    WrongCredentials(#[from] WrongCredentials),

    #[error(transparent)]
    Room(#[from] RoomError),

    #[error("unknown game {0}")]
    UnknownGame(GameId),

    #[error("participant {0} is not part of game {1}")]
    UnknownParticipant(ParticipantId, GameId),

    #[error("participant {0} belongs to another player")]
    NotYourParticipant(ParticipantId),

    #[error(transparent)]
    Game(#[from] GameError),
}

impl CommandError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommandError::Malformed(_) => ErrorKind::MalformedMessage,
            CommandError::WrongCredentials(_) => ErrorKind::WrongCredentials,
            _ => ErrorKind::UnknownOrInvalidTarget,
        }
    }
}
