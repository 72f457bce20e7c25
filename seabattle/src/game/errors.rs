use thiserror::Error;

use crate::board::Position;

/// Reason why a game refused a fleet placement or a strike. Rejections leave the game
/// untouched.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum GameError {
    /// Strikes are only accepted once both fleets are placed.
    #[error("the game has not started yet")]
    NotStarted,

    /// Fleets can only be replaced before the first turn.
    #[error("fleets can no longer be changed")]
    AlreadyStarted,

    /// The game is already over.
    #[error("the game is already over")]
    Finished,

    /// The attacker is not the participant whose turn it is.
    #[error("participant attempted to shoot out of turn")]
    OutOfTurn,

    /// The target cell is not on the board.
    #[error("cell {0:?} is out of bounds")]
    OutOfBounds(Position),

    /// Every cell of the opposing board is already hit.
    #[error("no cells left to shoot at")]
    NoTargetsLeft,
}
