//! The per-game turn state machine.
//!
//! A [`Game`] starts out waiting for both participants to submit a fleet. Once the
//! second fleet arrives it moves to [`GameState::InProgress`], where the participant
//! holding the turn strikes the opponent's board. A miss passes the turn, a hit or a
//! kill keeps it. Sinking the last ship of the defender finishes the game.
use enumflags2::BitFlags;
use rand::{
    distributions::{Distribution, Standard},
    seq::SliceRandom,
    Rng,
};
use serde::{Deserialize, Serialize};

use crate::{
    board::{BoardDimensions, Position},
    ids::{GameId, ParticipantId, PlayerId},
    ships::{Ship, ShipPlacement, StrikeOutcome},
};

pub use self::errors::GameError;

mod errors;

/// One of the two seats in a game.
#[derive(BitFlags, Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum Seat {
    First = 0b01,
    Second = 0b10,
}

impl Seat {
    /// Get the opponent of this seat.
    pub fn opponent(self) -> Self {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::First,
        }
    }

    fn index(self) -> usize {
        match self {
            Seat::First => 0,
            Seat::Second => 1,
        }
    }
}

impl Distribution<Seat> for Standard {
    /// Pick either seat with equal probability.
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Seat {
        if rng.gen() {
            Seat::First
        } else {
            Seat::Second
        }
    }
}

/// Status of a single strike, as shown to both participants.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackStatus {
    /// Nothing new was hit.
    Miss,
    /// A ship was hit but is still afloat.
    Shot,
    /// A ship was hit and sunk.
    Killed,
}

/// Lifecycle of a game.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum GameState {
    /// At least one participant has not placed a fleet yet.
    AwaitingFleets,
    /// Both fleets are placed and strikes are accepted.
    InProgress,
    /// The given seat sank every ship of its opponent. Terminal.
    Finished { winner: Seat },
}

/// What happens after a strike has been resolved.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Aftermath {
    /// Play continues and the given seat holds the turn.
    Turn(Seat),
    /// The attacker sank the last ship and won.
    Victory(Seat),
}

/// Full result of a resolved strike.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AttackReport {
    /// Seat that fired.
    pub attacker: Seat,
    /// Cell that was struck.
    pub position: Position,
    /// Outcome of the strike.
    pub status: AttackStatus,
    /// Cells around a freshly sunk ship, revealed as misses. Empty unless `status` is
    /// [`AttackStatus::Killed`].
    pub revealed: Vec<Position>,
    /// Turn transfer or victory.
    pub aftermath: Aftermath,
}

/// A player's role within one game.
#[derive(Debug, Clone)]
pub struct Participant {
    id: ParticipantId,
    player: PlayerId,
    fleet: Vec<Ship>,
}

impl Participant {
    fn new(id: ParticipantId, player: PlayerId) -> Self {
        Self {
            id,
            player,
            fleet: Vec::new(),
        }
    }

    /// The id of this participant, scoped to its game.
    pub fn id(&self) -> ParticipantId {
        self.id
    }

    /// The identity of the player behind this participant.
    pub fn player(&self) -> PlayerId {
        self.player
    }

    /// The participant's ships, in the order they were submitted.
    pub fn fleet(&self) -> &[Ship] {
        &self.fleet
    }

    /// Returns true if every ship of this participant has been sunk.
    pub fn defeated(&self) -> bool {
        self.fleet.iter().all(|ship| ship.sunk())
    }
}

/// A game between exactly two participants.
#[derive(Debug, Clone)]
pub struct Game {
    id: GameId,
    dim: BoardDimensions,
    participants: [Participant; 2],
    /// Seats that have submitted a fleet.
    ready: BitFlags<Seat>,
    /// Seat holding the turn.
    turn: Seat,
    state: GameState,
}

impl Game {
    /// Create a game waiting for fleets. `first` holds the first turn once the game
    /// starts.
    pub fn new(
        id: GameId,
        dim: BoardDimensions,
        first: (ParticipantId, PlayerId),
        second: (ParticipantId, PlayerId),
        turn: Seat,
    ) -> Self {
        Self {
            id,
            dim,
            participants: [
                Participant::new(first.0, first.1),
                Participant::new(second.0, second.1),
            ],
            ready: BitFlags::empty(),
            turn,
            state: GameState::AwaitingFleets,
        }
    }

    /// Get the id of this game.
    pub fn id(&self) -> GameId {
        self.id
    }

    /// Get the current state of the game.
    pub fn state(&self) -> GameState {
        self.state
    }

    /// Get the seat whose turn it is, or will be once the game starts.
    pub fn current(&self) -> Seat {
        self.turn
    }

    /// Get the winner, if the game is over.
    pub fn winner(&self) -> Option<Seat> {
        match self.state {
            GameState::Finished { winner } => Some(winner),
            _ => None,
        }
    }

    /// Get the participant in the given seat.
    pub fn participant(&self, seat: Seat) -> &Participant {
        &self.participants[seat.index()]
    }

    /// Iterate both seats with their participants.
    pub fn participants(&self) -> impl '_ + Iterator<Item = (Seat, &Participant)> {
        vec![Seat::First, Seat::Second]
            .into_iter()
            .map(move |seat| (seat, self.participant(seat)))
    }

    /// Find the seat of the participant with the given id.
    pub fn seat_of(&self, participant: ParticipantId) -> Option<Seat> {
        self.participants()
            .find(|(_, p)| p.id == participant)
            .map(|(seat, _)| seat)
    }

    /// Check whether the given seat has submitted a fleet.
    pub fn is_ready(&self, seat: Seat) -> bool {
        self.ready.contains(seat)
    }

    /// Replace the fleet of the given seat and mark it ready. Returns true if this
    /// placement started the game. Ship layouts are taken as given.
    pub fn place_fleet(
        &mut self,
        seat: Seat,
        ships: Vec<ShipPlacement>,
    ) -> Result<bool, GameError> {
        match self.state {
            GameState::AwaitingFleets => {}
            GameState::InProgress => return Err(GameError::AlreadyStarted),
            GameState::Finished { .. } => return Err(GameError::Finished),
        }
        self.participants[seat.index()].fleet = ships.into_iter().map(Ship::new).collect();
        self.ready.insert(seat);
        if self.ready == BitFlags::all() {
            self.state = GameState::InProgress;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Check that the given seat may strike right now.
    fn check_turn(&self, attacker: Seat) -> Result<(), GameError> {
        match self.state {
            GameState::AwaitingFleets => Err(GameError::NotStarted),
            GameState::Finished { .. } => Err(GameError::Finished),
            GameState::InProgress if attacker != self.turn => Err(GameError::OutOfTurn),
            GameState::InProgress => Ok(()),
        }
    }

    /// Fire at the opponent of `attacker` on the given cell.
    ///
    /// Ships are checked in fleet order and the first one covering the cell decides
    /// the outcome, except that a cell already struck on that ship does not count and
    /// checking moves on to the next ship.
    pub fn attack(&mut self, attacker: Seat, pos: Position) -> Result<AttackReport, GameError> {
        self.check_turn(attacker)?;
        if !self.dim.contains(pos) {
            return Err(GameError::OutOfBounds(pos));
        }

        let dim = self.dim;
        let defense = &mut self.participants[attacker.opponent().index()];

        let mut status = AttackStatus::Miss;
        let mut revealed = Vec::new();
        for ship in defense.fleet.iter_mut() {
            match ship.resolve_strike(pos) {
                None | Some(StrikeOutcome::AlreadyHit) => continue,
                Some(StrikeOutcome::Hit) => status = AttackStatus::Shot,
                Some(StrikeOutcome::Sunk) => {
                    status = AttackStatus::Killed;
                    revealed = ship.surrounding_miss_cells(&dim).into_iter().collect();
                }
            }
            break;
        }

        let aftermath = if defense.defeated() {
            self.state = GameState::Finished { winner: attacker };
            Aftermath::Victory(attacker)
        } else {
            if status == AttackStatus::Miss {
                self.turn = attacker.opponent();
            }
            Aftermath::Turn(self.turn)
        };

        Ok(AttackReport {
            attacker,
            position: pos,
            status,
            revealed,
            aftermath,
        })
    }

    /// Pick a random cell for `attacker` to strike, uniformly among cells of the board
    /// that are not already hit on any opposing ship.
    pub fn random_target<R: Rng>(&self, attacker: Seat, rng: &mut R) -> Result<Position, GameError> {
        self.check_turn(attacker)?;
        let defense = self.participant(attacker.opponent());
        let candidates: Vec<Position> = self
            .dim
            .cells()
            .filter(|&cell| !defense.fleet.iter().any(|ship| ship.is_hit(cell)))
            .collect();
        candidates
            .choose(rng)
            .copied()
            .ok_or(GameError::NoTargetsLeft)
    }
}
