//! Wire messages exchanged with clients.
//!
//! Every message travels in an [`Envelope`]: `{"type": ..., "data": ..., "id": 0}`.
//! `data` is always a structured JSON value; payloads encoded as a JSON string inside
//! the envelope are rejected as malformed.
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{
    board::Position,
    game::AttackStatus,
    ids::{GameId, ParticipantId, PlayerId, RoomId},
    leaderboard::WinnerEntry,
    ships::ShipPlacement,
};

/// Error produced when an inbound message cannot be understood.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The text was not valid JSON or did not have the expected shape.
    #[error("invalid message: {0}")]
    Json(#[from] serde_json::Error),
    /// The envelope named a command type this server does not know.
    #[error("unknown message type {0:?}")]
    UnknownType(String),
}

/// Outer frame of every message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub id: u32,
}

/// A command sent by a client.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    /// `reg`: log in under a name, creating the player if the name is new.
    Register { name: String, password: String },
    /// `create_room`: open a room with the sender as host.
    CreateRoom,
    /// `add_user_to_room`: join an open room.
    JoinRoom { room: RoomId },
    /// `add_ships`: submit a fleet for a participant.
    AddShips {
        game: GameId,
        participant: ParticipantId,
        ships: Vec<ShipPlacement>,
    },
    /// `attack`: strike a cell.
    Attack {
        game: GameId,
        participant: ParticipantId,
        position: Position,
    },
    /// `randomAttack`: strike a random cell not already hit.
    RandomAttack {
        game: GameId,
        participant: ParticipantId,
    },
}

#[derive(Deserialize)]
struct RegisterData {
    name: String,
    password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JoinRoomData {
    index_room: RoomId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddShipsData {
    game_id: GameId,
    index_player: ParticipantId,
    ships: Vec<ShipPlacement>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttackData {
    game_id: GameId,
    index_player: ParticipantId,
    x: usize,
    y: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RandomAttackData {
    game_id: GameId,
    index_player: ParticipantId,
}

impl ClientCommand {
    /// Parse a command from the text of a message.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let envelope: Envelope = serde_json::from_str(text)?;
        Self::from_envelope(envelope)
    }

    /// Decode the payload of an already-parsed envelope.
    pub fn from_envelope(envelope: Envelope) -> Result<Self, ProtocolError> {
        fn data<T: DeserializeOwned>(value: Value) -> Result<T, ProtocolError> {
            Ok(serde_json::from_value(value)?)
        }

        Ok(match envelope.kind.as_str() {
            "reg" => {
                let RegisterData { name, password } = data(envelope.data)?;
                ClientCommand::Register { name, password }
            }
            "create_room" => ClientCommand::CreateRoom,
            "add_user_to_room" => {
                let JoinRoomData { index_room } = data(envelope.data)?;
                ClientCommand::JoinRoom { room: index_room }
            }
            "add_ships" => {
                let AddShipsData {
                    game_id,
                    index_player,
                    ships,
                } = data(envelope.data)?;
                ClientCommand::AddShips {
                    game: game_id,
                    participant: index_player,
                    ships,
                }
            }
            "attack" => {
                let AttackData {
                    game_id,
                    index_player,
                    x,
                    y,
                } = data(envelope.data)?;
                ClientCommand::Attack {
                    game: game_id,
                    participant: index_player,
                    position: Position::new(x, y),
                }
            }
            "randomAttack" => {
                let RandomAttackData {
                    game_id,
                    index_player,
                } = data(envelope.data)?;
                ClientCommand::RandomAttack {
                    game: game_id,
                    participant: index_player,
                }
            }
            _ => return Err(ProtocolError::UnknownType(envelope.kind)),
        })
    }

    /// The wire type of this command.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientCommand::Register { .. } => "reg",
            ClientCommand::CreateRoom => "create_room",
            ClientCommand::JoinRoom { .. } => "add_user_to_room",
            ClientCommand::AddShips { .. } => "add_ships",
            ClientCommand::Attack { .. } => "attack",
            ClientCommand::RandomAttack { .. } => "randomAttack",
        }
    }
}

/// Reply to `reg`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegReply {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<PlayerId>,
    pub error: bool,
    pub error_text: String,
}

/// A player as shown in the room list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomUser {
    pub name: String,
    pub index: PlayerId,
}

/// An open room as shown in the room list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub room_id: RoomId,
    pub room_users: Vec<RoomUser>,
}

/// Sent to each participant of a new game, carrying only their own participant id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGame {
    pub id_game: GameId,
    pub id_player: ParticipantId,
}

/// Sent to each participant when both fleets are in, carrying only their own fleet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartGame {
    pub ships: Vec<ShipPlacement>,
    pub current_player_index: ParticipantId,
}

/// Names the participant holding the turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    pub current_player: ParticipantId,
}

/// Result of a strike on one cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackResult {
    pub position: Position,
    pub current_player: ParticipantId,
    pub status: AttackStatus,
}

/// Names the winner of a finished game.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Finish {
    pub win_player: ParticipantId,
}

/// An event sent by the server.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    Registered(RegReply),
    UpdateRoom(Vec<RoomSummary>),
    UpdateWinners(Vec<WinnerEntry>),
    CreateGame(CreateGame),
    StartGame(StartGame),
    Turn(Turn),
    Attack(AttackResult),
    Finish(Finish),
}

impl ServerEvent {
    /// The wire type of this event.
    pub fn kind(&self) -> &'static str {
        match self {
            ServerEvent::Registered(_) => "reg",
            ServerEvent::UpdateRoom(_) => "update_room",
            ServerEvent::UpdateWinners(_) => "update_winners",
            ServerEvent::CreateGame(_) => "create_game",
            ServerEvent::StartGame(_) => "start_game",
            ServerEvent::Turn(_) => "turn",
            ServerEvent::Attack(_) => "attack",
            ServerEvent::Finish(_) => "finish",
        }
    }

    /// Wrap this event in an [`Envelope`].
    pub fn to_envelope(&self) -> Result<Envelope, serde_json::Error> {
        let data = match self {
            ServerEvent::Registered(d) => serde_json::to_value(d)?,
            ServerEvent::UpdateRoom(d) => serde_json::to_value(d)?,
            ServerEvent::UpdateWinners(d) => serde_json::to_value(d)?,
            ServerEvent::CreateGame(d) => serde_json::to_value(d)?,
            ServerEvent::StartGame(d) => serde_json::to_value(d)?,
            ServerEvent::Turn(d) => serde_json::to_value(d)?,
            ServerEvent::Attack(d) => serde_json::to_value(d)?,
            ServerEvent::Finish(d) => serde_json::to_value(d)?,
        };
        Ok(Envelope {
            kind: self.kind().to_owned(),
            data,
            id: 0,
        })
    }

    /// Serialize this event as message text.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_envelope()?)
    }
}
