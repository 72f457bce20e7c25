//! Opaque identifiers handed out by the engine.
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::{Builder, Uuid};

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a new random (version 4) id from the given source of randomness.
            pub fn random<R: Rng>(rng: &mut R) -> Self {
                $name(Builder::from_random_bytes(rng.gen()).into_uuid())
            }

            /// Get the underlying [`Uuid`].
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                $name(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

uuid_id! {
    /// Stable identity of a registered player. Lives for the whole process.
    PlayerId
}

uuid_id! {
    /// Identity of a room waiting for a second player.
    RoomId
}

uuid_id! {
    /// Identity of a game between two participants.
    GameId
}

uuid_id! {
    /// A player's seat in one specific game. Never reused across games.
    ParticipantId
}

/// Handle for a live client connection, assigned by the transport. Never sent to
/// clients.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "conn#{}", self.0)
    }
}
