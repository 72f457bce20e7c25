//! Identity registry: display names, passwords, and which live connection speaks for
//! which player.
use std::collections::HashMap;

use thiserror::Error;

use crate::ids::{ConnectionId, PlayerId};

/// Error returned when registering under a name that is taken with another password.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
#[error("wrong password for player {name:?}")]
pub struct WrongCredentials {
    name: String,
}

impl WrongCredentials {
    /// The name that was registered under.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A registered player. Never removed once created.
#[derive(Debug, Clone)]
pub struct Player {
    id: PlayerId,
    name: String,
    password: String,
}

impl Player {
    /// Get the id of this player.
    pub fn id(&self) -> PlayerId {
        self.id
    }

    /// Get the display name of this player.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Result of a successful registration.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Registration {
    /// The player now bound to the connection.
    pub id: PlayerId,
    /// True if the name was new and a player was created for it.
    pub created: bool,
}

/// Registry of players plus the session table binding connections to them.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: HashMap<PlayerId, Player>,
    by_name: HashMap<String, PlayerId>,
    /// Connection to the player it speaks for.
    sessions: HashMap<ConnectionId, PlayerId>,
    /// Player to the connection currently bound to it. Inverse of `sessions`.
    bindings: HashMap<PlayerId, ConnectionId>,
}

impl PlayerRegistry {
    /// Construct an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` from `conn`. A new name creates a player with an id from
    /// `new_id`; a known name with the matching password rebinds the player to `conn`.
    /// A password mismatch changes nothing.
    pub fn register<F>(
        &mut self,
        conn: ConnectionId,
        name: &str,
        password: &str,
        new_id: F,
    ) -> Result<Registration, WrongCredentials>
    where
        F: FnOnce() -> PlayerId,
    {
        let registration = match self.by_name.get(name) {
            Some(id) => {
                if self.players[id].password != password {
                    return Err(WrongCredentials {
                        name: name.to_owned(),
                    });
                }
                Registration {
                    id: *id,
                    created: false,
                }
            }
            None => {
                let id = new_id();
                self.players.insert(
                    id,
                    Player {
                        id,
                        name: name.to_owned(),
                        password: password.to_owned(),
                    },
                );
                self.by_name.insert(name.to_owned(), id);
                Registration { id, created: true }
            }
        };
        self.bind(conn, registration.id);
        Ok(registration)
    }

    /// Bind `conn` to `player`, dropping whatever either side was bound to before.
    fn bind(&mut self, conn: ConnectionId, player: PlayerId) {
        if let Some(previous) = self.sessions.insert(conn, player) {
            if previous != player {
                self.bindings.remove(&previous);
            }
        }
        if let Some(stale) = self.bindings.insert(player, conn) {
            if stale != conn {
                self.sessions.remove(&stale);
            }
        }
    }

    /// Drop the binding of `conn`, returning the player it spoke for.
    pub fn unbind(&mut self, conn: ConnectionId) -> Option<PlayerId> {
        let player = self.sessions.remove(&conn)?;
        self.bindings.remove(&player);
        Some(player)
    }

    /// Get the player a connection speaks for.
    pub fn find_by_connection(&self, conn: ConnectionId) -> Option<&Player> {
        self.sessions
            .get(&conn)
            .and_then(|id| self.players.get(id))
    }

    /// Get the connection currently bound to a player.
    pub fn connection_of(&self, player: PlayerId) -> Option<ConnectionId> {
        self.bindings.get(&player).copied()
    }

    /// Get the player with the given id.
    pub fn get(&self, player: PlayerId) -> Option<&Player> {
        self.players.get(&player)
    }

    /// Get the player registered under the given name.
    pub fn find_by_name(&self, name: &str) -> Option<&Player> {
        self.by_name.get(name).and_then(|id| self.players.get(id))
    }

    /// Number of registered players.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Returns true if no player has registered yet.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
