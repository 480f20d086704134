use std::fmt;

use log::info;

use crate::board::{Board, Color, PieceKind, Square};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    InProgress { turn: Color, check: bool },
    Checkmate { loser: Color },
    Stalemate { turn: Color },
}

impl Status {
    pub fn is_over(&self) -> bool {
        !matches!(self, Status::InProgress { .. })
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Status::InProgress { turn, check: false } => write!(f, "{turn} to move"),
            Status::InProgress { turn, check: true } => write!(f, "{turn} is in check"),
            Status::Checkmate { loser } => write!(f, "Checkmate, {loser} loses"),
            Status::Stalemate { turn } => write!(f, "Stalemate, {turn} has no legal move"),
        }
    }
}

/// A selected piece and where it may go, split the way a board view shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub from: Square,
    pub quiet: Vec<Square>,
    pub captures: Vec<Square>,
}

impl Selection {
    pub fn contains(&self, to: Square) -> bool {
        self.quiet.contains(&to) || self.captures.contains(&to)
    }

    pub fn is_empty(&self) -> bool {
        self.quiet.is_empty() && self.captures.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    AwaitingSelection,
    PieceSelected(Selection),
}

/// Turn order and piece selection on top of a [`Board`].
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    turn: Color,
    phase: Phase,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    pub fn new() -> Self {
        Self::from_board(Board::standard(), Color::White)
    }

    pub fn from_board(board: Board, turn: Color) -> Self {
        Self {
            board,
            turn,
            phase: Phase::AwaitingSelection,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn status(&mut self) -> Result<Status> {
        let turn = self.turn;
        if self.board.is_checkmate(turn)? {
            Ok(Status::Checkmate { loser: turn })
        } else if self.board.is_stalemate(turn)? {
            Ok(Status::Stalemate { turn })
        } else {
            Ok(Status::InProgress {
                turn,
                check: self.board.is_in_check(turn)?,
            })
        }
    }

    pub fn select(&mut self, square: Square) -> Result<Selection> {
        if let Phase::PieceSelected(selection) = &self.phase {
            return Err(Error::AlreadySelected(selection.from));
        }
        if self.status()?.is_over() {
            return Err(Error::GameOver);
        }

        let piece = self.board.piece_at(square).ok_or(Error::NoPiece(square))?;
        if piece.color != self.turn {
            return Err(Error::NotYourPiece(square));
        }

        // A pawn changing file is capturing, en passant included.
        let moves = self.board.legal_moves(square)?;
        let (captures, quiet): (Vec<Square>, Vec<Square>) = moves.into_iter().partition(|&to| {
            self.board.piece_at(to).is_some()
                || (piece.kind == PieceKind::Pawn && to.file != square.file)
        });
        let selection = Selection {
            from: square,
            quiet,
            captures,
        };

        self.phase = Phase::PieceSelected(selection.clone());
        Ok(selection)
    }

    pub fn deselect(&mut self) {
        self.phase = Phase::AwaitingSelection;
    }

    /// Plays the selected piece to `to`. Any outcome leaves the game awaiting
    /// a new selection; a destination outside the selection changes nothing
    /// else.
    pub fn commit(&mut self, to: Square) -> Result<Status> {
        let Phase::PieceSelected(selection) =
            std::mem::replace(&mut self.phase, Phase::AwaitingSelection)
        else {
            return Err(Error::NothingSelected);
        };
        if !selection.contains(to) {
            return Err(Error::IllegalMove {
                from: selection.from,
                to,
            });
        }

        self.board.move_piece(selection.from, to);
        self.turn = self.turn.opposite();

        let status = self.status()?;
        info!("{} -> {}: {status}", selection.from, to);
        Ok(status)
    }

    pub fn play(&mut self, from: Square, to: Square) -> Result<Status> {
        self.deselect();
        self.select(from)?;
        self.commit(to)
    }
}
