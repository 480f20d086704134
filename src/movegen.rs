use crate::board::{Board, Color, Piece, PieceKind, Square};
use crate::error::Result;

#[rustfmt::skip]
const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (2, 1), (1, 2), (-1, 2), (-2, 1),
    (-2, -1), (-1, -2), (1, -2), (2, -1),
];

#[rustfmt::skip]
const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0), (1, 0),
    (-1, 1), (0, 1), (1, 1),
];

const DIAGONALS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ORTHOGONALS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastleSide {
    King,
    Queen,
}

impl CastleSide {
    pub fn rook_file(&self) -> i8 {
        match self {
            CastleSide::King => 7,
            CastleSide::Queen => 0,
        }
    }

    /// File step from the king toward the rook.
    pub fn direction(&self) -> i8 {
        match self {
            CastleSide::King => 1,
            CastleSide::Queen => -1,
        }
    }
}

/// The square a king of `color` starts on.
pub fn king_home(color: Color) -> Square {
    Square::new(4, color.back_rank())
}

/// Squares `piece` on `from` can reach, ignoring the safety of its own king.
///
/// Castling and en passant are not included: both need more than the
/// placement of the pieces.
pub fn pseudo_legal_moves(board: &Board, from: Square, piece: Piece) -> Vec<Square> {
    let mut moves = Vec::new();
    match piece.kind {
        PieceKind::Pawn => pawn_moves(board, from, piece.color, &mut moves),
        PieceKind::Knight => step_moves(board, from, piece.color, &KNIGHT_OFFSETS, &mut moves),
        PieceKind::Bishop => slide_moves(board, from, piece.color, &DIAGONALS, &mut moves),
        PieceKind::Rook => slide_moves(board, from, piece.color, &ORTHOGONALS, &mut moves),
        PieceKind::Queen => {
            slide_moves(board, from, piece.color, &DIAGONALS, &mut moves);
            slide_moves(board, from, piece.color, &ORTHOGONALS, &mut moves);
        }
        PieceKind::King => step_moves(board, from, piece.color, &KING_OFFSETS, &mut moves),
    }
    moves
}

/// Pseudo-legal moves plus the king's castling destinations.
pub fn generate_moves(board: &mut Board, from: Square, piece: Piece) -> Result<Vec<Square>> {
    let mut moves = pseudo_legal_moves(board, from, piece);
    if piece.kind == PieceKind::King {
        for side in [CastleSide::King, CastleSide::Queen] {
            if let Some(destination) = castling_destination(board, from, piece, side)? {
                moves.push(destination);
            }
        }
    }
    Ok(moves)
}

/// Where `king` on `from` lands when castling on `side`, if it may.
///
/// The king and the rook must both be unmoved on their home squares, the
/// squares between them empty, and the king may not be in check nor pass
/// through or land on an attacked square.
pub fn castling_destination(
    board: &mut Board,
    from: Square,
    king: Piece,
    side: CastleSide,
) -> Result<Option<Square>> {
    if king.kind != PieceKind::King || king.has_moved || from != king_home(king.color) {
        return Ok(None);
    }

    let rook_square = Square::new(side.rook_file(), from.rank);
    match board.piece_at(rook_square) {
        Some(rook)
            if rook.kind == PieceKind::Rook && rook.color == king.color && !rook.has_moved => {}
        _ => return Ok(None),
    }

    let step = side.direction();
    let mut between = from.offset(step, 0);
    while between != rook_square {
        if board.piece_at(between).is_some() {
            return Ok(None);
        }
        between = between.offset(step, 0);
    }

    let transit = from.offset(step, 0);
    let destination = from.offset(2 * step, 0);
    if board.is_in_check(king.color)?
        || board.would_be_in_check_after_move(king.color, from, transit)?
        || board.would_be_in_check_after_move(king.color, from, destination)?
    {
        return Ok(None);
    }
    Ok(Some(destination))
}

fn pawn_moves(board: &Board, from: Square, color: Color, moves: &mut Vec<Square>) {
    let forward = color.forward();

    let one = from.offset(0, forward);
    if one.is_on_board() && board.piece_at(one).is_none() {
        moves.push(one);

        let two = from.offset(0, 2 * forward);
        if from.rank == color.pawn_rank() && board.piece_at(two).is_none() {
            moves.push(two);
        }
    }

    for files in [-1, 1] {
        let target = from.offset(files, forward);
        if matches!(board.piece_at(target), Some(p) if p.color != color) {
            moves.push(target);
        }
    }
}

fn step_moves(
    board: &Board,
    from: Square,
    color: Color,
    offsets: &[(i8, i8)],
    moves: &mut Vec<Square>,
) {
    for &(files, ranks) in offsets {
        let target = from.offset(files, ranks);
        if !target.is_on_board() {
            continue;
        }
        match board.piece_at(target) {
            Some(p) if p.color == color => {}
            _ => moves.push(target),
        }
    }
}

fn slide_moves(
    board: &Board,
    from: Square,
    color: Color,
    directions: &[(i8, i8)],
    moves: &mut Vec<Square>,
) {
    for &(files, ranks) in directions {
        let mut target = from.offset(files, ranks);
        while target.is_on_board() {
            match board.piece_at(target) {
                None => moves.push(target),
                Some(p) => {
                    if p.color != color {
                        moves.push(target);
                    }
                    break;
                }
            }
            target = target.offset(files, ranks);
        }
    }
}
