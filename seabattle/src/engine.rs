//! The session engine: owns every player, room, game and the leaderboard, and turns
//! client commands into state changes plus outbound events.
//!
//! Commands run one at a time and to completion, including all of their sends. The
//! engine performs no I/O of its own; events go to the [`NotificationSink`] passed to
//! each command.
use std::collections::HashMap;

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info};

use crate::{
    board::{BoardDimensions, Position},
    errors::CommandError,
    game::{Aftermath, AttackReport, AttackStatus, Game, Seat},
    ids::{ConnectionId, GameId, ParticipantId, PlayerId, RoomId},
    leaderboard::Leaderboard,
    players::PlayerRegistry,
    protocol::{
        AttackResult, ClientCommand, CreateGame, Finish, RegReply, RoomSummary, RoomUser,
        ServerEvent, StartGame, Turn,
    },
    rooms::RoomBroker,
    ships::ShipPlacement,
    sink::NotificationSink,
};

/// Game session engine. Randomness (ids, first turn, random strikes) all comes from
/// `R`, so a seeded engine replays identically.
#[derive(Debug)]
pub struct GameSessionEngine<R = StdRng> {
    rng: R,
    dim: BoardDimensions,
    players: PlayerRegistry,
    rooms: RoomBroker,
    games: HashMap<GameId, Game>,
    leaderboard: Leaderboard,
}

impl GameSessionEngine<StdRng> {
    /// Construct an engine seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Construct an engine with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> GameSessionEngine<R> {
    /// Construct an empty engine drawing randomness from `rng`.
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            dim: BoardDimensions::default(),
            players: PlayerRegistry::new(),
            rooms: RoomBroker::new(),
            games: HashMap::new(),
            leaderboard: Leaderboard::new(),
        }
    }

    /// Parse and run one message received on `conn`.
    pub fn handle_message<S: NotificationSink>(
        &mut self,
        conn: ConnectionId,
        text: &str,
        sink: &mut S,
    ) -> Result<(), CommandError> {
        let command = ClientCommand::parse(text).map_err(|err| {
            debug!(%conn, error = %err, "dropping malformed message");
            err
        })?;
        self.dispatch(conn, command, sink)
    }

    /// Run one parsed command received on `conn`.
    pub fn dispatch<S: NotificationSink>(
        &mut self,
        conn: ConnectionId,
        command: ClientCommand,
        sink: &mut S,
    ) -> Result<(), CommandError> {
        let kind = command.kind();
        debug!(%conn, command = kind, "received command");
        let result = match command {
            ClientCommand::Register { name, password } => {
                self.register(conn, &name, &password, sink).map(drop)
            }
            ClientCommand::CreateRoom => self.create_room(conn, sink).map(drop),
            ClientCommand::JoinRoom { room } => self.join_room(conn, room, sink).map(drop),
            ClientCommand::AddShips {
                game,
                participant,
                ships,
            } => self.add_ships(conn, game, participant, ships, sink).map(drop),
            ClientCommand::Attack {
                game,
                participant,
                position,
            } => self.attack(conn, game, participant, position, sink).map(drop),
            ClientCommand::RandomAttack { game, participant } => {
                self.random_attack(conn, game, participant, sink).map(drop)
            }
        };
        if let Err(ref err) = result {
            debug!(%conn, command = kind, error = %err, "command rejected");
        }
        result
    }

    /// Register or log in under `name` and bind the player to `conn`.
    ///
    /// On success the sender gets a `reg` reply and everyone gets the current room list
    /// and leaderboard. A wrong password gets an error-flagged `reg` reply and nothing
    /// else.
    pub fn register<S: NotificationSink>(
        &mut self,
        conn: ConnectionId,
        name: &str,
        password: &str,
        sink: &mut S,
    ) -> Result<PlayerId, CommandError> {
        let rng = &mut self.rng;
        let registration =
            match self
                .players
                .register(conn, name, password, || PlayerId::random(rng))
            {
                Ok(registration) => registration,
                Err(err) => {
                    let reply = RegReply {
                        name: name.to_owned(),
                        index: None,
                        error: true,
                        error_text: err.to_string(),
                    };
                    sink.send_to(conn, &ServerEvent::Registered(reply));
                    return Err(err.into());
                }
            };

        if registration.created {
            self.leaderboard.enroll(name);
            info!(player = %registration.id, name, "player registered");
        } else {
            info!(player = %registration.id, name, %conn, "player reconnected");
        }
        let reply = RegReply {
            name: name.to_owned(),
            index: Some(registration.id),
            error: false,
            error_text: String::new(),
        };
        sink.send_to(conn, &ServerEvent::Registered(reply));
        self.broadcast_rooms(sink);
        self.broadcast_winners(sink);
        Ok(registration.id)
    }

    /// Open a room hosted by the player bound to `conn`.
    pub fn create_room<S: NotificationSink>(
        &mut self,
        conn: ConnectionId,
        sink: &mut S,
    ) -> Result<RoomId, CommandError> {
        let host = self.caller(conn)?;
        let id = RoomId::random(&mut self.rng);
        self.rooms.create(id, host);
        info!(room = %id, player = %host, "room created");
        self.broadcast_rooms(sink);
        Ok(id)
    }

    /// Join an open room. Filling the room closes it and starts a game between its two
    /// occupants; each of them is told the game id and their own participant id.
    pub fn join_room<S: NotificationSink>(
        &mut self,
        conn: ConnectionId,
        room: RoomId,
        sink: &mut S,
    ) -> Result<GameId, CommandError> {
        let guest = self.caller(conn)?;
        let [host, guest] = self.rooms.join(room, guest)?;
        self.broadcast_rooms(sink);

        let id = GameId::random(&mut self.rng);
        let first = (ParticipantId::random(&mut self.rng), host);
        let second = (ParticipantId::random(&mut self.rng), guest);
        let turn: Seat = self.rng.gen();
        let game = Game::new(id, self.dim, first, second, turn);
        for (_, participant) in game.participants() {
            let event = ServerEvent::CreateGame(CreateGame {
                id_game: id,
                id_player: participant.id(),
            });
            notify_one(&self.players, participant.player(), &event, sink);
        }
        info!(game = %id, %room, "game created");
        self.games.insert(id, game);
        Ok(id)
    }

    /// Submit the fleet of a participant. Returns true if this started the game, in
    /// which case each participant is sent their own fleet and both are told who moves
    /// first.
    pub fn add_ships<S: NotificationSink>(
        &mut self,
        conn: ConnectionId,
        game_id: GameId,
        participant: ParticipantId,
        ships: Vec<ShipPlacement>,
        sink: &mut S,
    ) -> Result<bool, CommandError> {
        let seat = self.authorize(conn, game_id, participant)?;
        let game = self
            .games
            .get_mut(&game_id)
            .ok_or(CommandError::UnknownGame(game_id))?;
        let started = game.place_fleet(seat, ships)?;
        debug!(game = %game_id, %participant, "fleet placed");
        if started {
            info!(game = %game_id, "game started");
            for (_, p) in game.participants() {
                let event = ServerEvent::StartGame(StartGame {
                    ships: p.fleet().iter().map(|ship| *ship.placement()).collect(),
                    current_player_index: p.id(),
                });
                notify_one(&self.players, p.player(), &event, sink);
            }
            let turn = ServerEvent::Turn(Turn {
                current_player: game.participant(game.current()).id(),
            });
            notify_both(&self.players, game, &turn, sink);
        }
        Ok(started)
    }

    /// Strike `position` on behalf of `participant`.
    pub fn attack<S: NotificationSink>(
        &mut self,
        conn: ConnectionId,
        game_id: GameId,
        participant: ParticipantId,
        position: Position,
        sink: &mut S,
    ) -> Result<AttackReport, CommandError> {
        let seat = self.authorize(conn, game_id, participant)?;
        let game = self
            .games
            .get_mut(&game_id)
            .ok_or(CommandError::UnknownGame(game_id))?;
        let report = game.attack(seat, position)?;
        self.publish_attack(game_id, &report, sink);
        Ok(report)
    }

    /// Strike a random cell that is not already hit on the opponent's ships.
    pub fn random_attack<S: NotificationSink>(
        &mut self,
        conn: ConnectionId,
        game_id: GameId,
        participant: ParticipantId,
        sink: &mut S,
    ) -> Result<AttackReport, CommandError> {
        let seat = self.authorize(conn, game_id, participant)?;
        let game = self
            .games
            .get_mut(&game_id)
            .ok_or(CommandError::UnknownGame(game_id))?;
        let position = game.random_target(seat, &mut self.rng)?;
        let report = game.attack(seat, position)?;
        self.publish_attack(game_id, &report, sink);
        Ok(report)
    }

    /// Forget which player `conn` spoke for. Rooms and games are left alone.
    pub fn disconnect(&mut self, conn: ConnectionId) -> Option<PlayerId> {
        let player = self.players.unbind(conn);
        if let Some(player) = player {
            info!(%conn, %player, "connection unbound");
        }
        player
    }

    /// Get the game with the given id.
    pub fn game(&self, id: GameId) -> Option<&Game> {
        self.games.get(&id)
    }

    /// Get the identity registry.
    pub fn players(&self) -> &PlayerRegistry {
        &self.players
    }

    /// Get the room broker.
    pub fn rooms(&self) -> &RoomBroker {
        &self.rooms
    }

    /// Get the leaderboard.
    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    /// Number of wins of the given player.
    pub fn wins(&self, player: PlayerId) -> Option<u32> {
        self.players
            .get(player)
            .and_then(|p| self.leaderboard.wins(p.name()))
    }

    /// The open-room list as shown to clients.
    pub fn open_rooms(&self) -> Vec<RoomSummary> {
        self.rooms
            .open_rooms()
            .map(|room| RoomSummary {
                room_id: room.id(),
                room_users: room
                    .occupants()
                    .iter()
                    .filter_map(|&id| self.players.get(id))
                    .map(|p| RoomUser {
                        name: p.name().to_owned(),
                        index: p.id(),
                    })
                    .collect(),
            })
            .collect()
    }

    /// Resolve the player bound to `conn`.
    fn caller(&self, conn: ConnectionId) -> Result<PlayerId, CommandError> {
        self.players
            .find_by_connection(conn)
            .map(|p| p.id())
            .ok_or(CommandError::NotRegistered(conn))
    }

    /// Check that `participant` is in the game and is played by whoever is on `conn`,
    /// returning its seat.
    fn authorize(
        &self,
        conn: ConnectionId,
        game_id: GameId,
        participant: ParticipantId,
    ) -> Result<Seat, CommandError> {
        let player = self.caller(conn)?;
        let game = self
            .games
            .get(&game_id)
            .ok_or(CommandError::UnknownGame(game_id))?;
        let seat = game
            .seat_of(participant)
            .ok_or(CommandError::UnknownParticipant(participant, game_id))?;
        if game.participant(seat).player() != player {
            return Err(CommandError::NotYourParticipant(participant));
        }
        Ok(seat)
    }

    /// Tell both participants about a resolved strike and whatever followed it.
    fn publish_attack<S: NotificationSink>(
        &mut self,
        game_id: GameId,
        report: &AttackReport,
        sink: &mut S,
    ) {
        let game = match self.games.get(&game_id) {
            Some(game) => game,
            None => return,
        };
        let attacker = game.participant(report.attacker).id();
        debug!(
            game = %game_id,
            participant = %attacker,
            x = report.position.x as u64,
            y = report.position.y as u64,
            status = ?report.status,
            "strike resolved"
        );

        let strike = ServerEvent::Attack(AttackResult {
            position: report.position,
            current_player: attacker,
            status: report.status,
        });
        notify_both(&self.players, game, &strike, sink);
        for &cell in &report.revealed {
            let reveal = ServerEvent::Attack(AttackResult {
                position: cell,
                current_player: attacker,
                status: AttackStatus::Miss,
            });
            notify_both(&self.players, game, &reveal, sink);
        }

        match report.aftermath {
            Aftermath::Turn(seat) => {
                let turn = ServerEvent::Turn(Turn {
                    current_player: game.participant(seat).id(),
                });
                notify_both(&self.players, game, &turn, sink);
            }
            Aftermath::Victory(seat) => {
                let finish = ServerEvent::Finish(Finish {
                    win_player: game.participant(seat).id(),
                });
                notify_both(&self.players, game, &finish, sink);
                if let Some(winner) = self.players.get(game.participant(seat).player()) {
                    let wins = self.leaderboard.record_win(winner.name());
                    info!(game = %game_id, winner = winner.name(), wins, "game finished");
                }
                self.broadcast_winners(sink);
            }
        }
    }

    fn broadcast_rooms<S: NotificationSink>(&self, sink: &mut S) {
        sink.broadcast(&ServerEvent::UpdateRoom(self.open_rooms()));
    }

    fn broadcast_winners<S: NotificationSink>(&self, sink: &mut S) {
        sink.broadcast(&ServerEvent::UpdateWinners(self.leaderboard.snapshot()));
    }
}

/// Send an event to whichever connection is bound to `player`, if any.
fn notify_one<S: NotificationSink>(
    players: &PlayerRegistry,
    player: PlayerId,
    event: &ServerEvent,
    sink: &mut S,
) {
    if let Some(conn) = players.connection_of(player) {
        sink.send_to(conn, event);
    }
}

/// Send an event to both participants of a game.
fn notify_both<S: NotificationSink>(
    players: &PlayerRegistry,
    game: &Game,
    event: &ServerEvent,
    sink: &mut S,
) {
    for (_, participant) in game.participants() {
        notify_one(players, participant.player(), event, sink);
    }
}
