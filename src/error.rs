use crate::board::{Color, Square};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A check query was issued for a color with no king on the board.
    #[error("no {0} king on the board")]
    MissingKing(Color),

    #[error("invalid square: {0:?}")]
    InvalidSquare(String),

    #[error("no piece on {0}")]
    NoPiece(Square),

    #[error("the piece on {0} does not belong to the side to move")]
    NotYourPiece(Square),

    #[error("no piece is selected")]
    NothingSelected,

    #[error("a piece is already selected on {0}")]
    AlreadySelected(Square),

    #[error("illegal move: {from} -> {to}")]
    IllegalMove { from: Square, to: Square },

    #[error("the game is over")]
    GameOver,
}

pub type Result<T> = std::result::Result<T, Error>;
