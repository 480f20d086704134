use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use log::{debug, trace};

use crate::error::{Error, Result};
use crate::movegen::{self, CastleSide};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Rank step of a pawn advance. White plays toward rank 0.
    pub fn forward(&self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    pub fn back_rank(&self) -> i8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    pub fn pawn_rank(&self) -> i8 {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    pub fn promotion_rank(&self) -> i8 {
        self.opposite().back_rank()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Color::White => f.write_str("White"),
            Color::Black => f.write_str("Black"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
    /// Only tracked for kings and rooks, where it gates castling.
    pub has_moved: bool,
}

impl Piece {
    pub fn new(kind: PieceKind, color: Color) -> Self {
        Self {
            kind,
            color,
            has_moved: false,
        }
    }

    /// Upper case for White, lower case for Black.
    pub fn letter(&self) -> char {
        let letter = match self.kind {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        };
        match self.color {
            Color::White => letter.to_ascii_uppercase(),
            Color::Black => letter,
        }
    }

    pub fn symbol(&self) -> char {
        match (self.color, self.kind) {
            (Color::White, PieceKind::Pawn) => '♙',
            (Color::White, PieceKind::Knight) => '♘',
            (Color::White, PieceKind::Bishop) => '♗',
            (Color::White, PieceKind::Rook) => '♖',
            (Color::White, PieceKind::Queen) => '♕',
            (Color::White, PieceKind::King) => '♔',
            (Color::Black, PieceKind::Pawn) => '♟',
            (Color::Black, PieceKind::Knight) => '♞',
            (Color::Black, PieceKind::Bishop) => '♝',
            (Color::Black, PieceKind::Rook) => '♜',
            (Color::Black, PieceKind::Queen) => '♛',
            (Color::Black, PieceKind::King) => '♚',
        }
    }
}

/// A (file, rank) coordinate. Squares may lie off the board; every board
/// access checks [`Square::is_on_board`] first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    pub file: i8,
    pub rank: i8,
}

impl Square {
    pub const fn new(file: i8, rank: i8) -> Self {
        Self { file, rank }
    }

    pub fn is_on_board(&self) -> bool {
        (0..8).contains(&self.file) && (0..8).contains(&self.rank)
    }

    pub fn offset(&self, files: i8, ranks: i8) -> Square {
        Square::new(
            self.file.saturating_add(files),
            self.rank.saturating_add(ranks),
        )
    }

    /// Chebyshev distance of at most one, the reach of a king.
    pub fn is_adjacent(&self, other: Square) -> bool {
        let files = (i16::from(self.file) - i16::from(other.file)).abs();
        let ranks = (i16::from(self.rank) - i16::from(other.rank)).abs();
        files.max(ranks) <= 1
    }

    /// All 64 squares, rank 0 first.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8).flat_map(|rank| (0..8).map(move |file| Square::new(file, rank)))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_on_board() {
            write!(f, "{}{}", (b'a' + self.file as u8) as char, 8 - self.rank)
        } else {
            write!(f, "({}, {})", self.file, self.rank)
        }
    }
}

impl FromStr for Square {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        match bytes {
            [file @ b'a'..=b'h', rank @ b'1'..=b'8'] => Ok(Square::new(
                (file - b'a') as i8,
                8 - (rank - b'0') as i8,
            )),
            _ => Err(Error::InvalidSquare(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8], // indexed [rank][file]
    en_passant: Option<Square>,
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl Board {
    pub fn empty() -> Self {
        Self {
            squares: [[None; 8]; 8],
            en_passant: None,
        }
    }

    pub fn standard() -> Self {
        let mut board = Self::empty();
        board.initialize_standard_position();
        board
    }

    pub fn initialize_standard_position(&mut self) {
        const BACK_RANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        *self = Self::empty();
        for color in [Color::White, Color::Black] {
            for (file, kind) in (0..8).zip(BACK_RANK) {
                self.set_piece(
                    Square::new(file, color.back_rank()),
                    Some(Piece::new(kind, color)),
                );
                self.set_piece(
                    Square::new(file, color.pawn_rank()),
                    Some(Piece::new(PieceKind::Pawn, color)),
                );
            }
        }
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        if square.is_on_board() {
            self.squares[square.rank as usize][square.file as usize]
        } else {
            None
        }
    }

    pub fn set_piece(&mut self, square: Square, piece: Option<Piece>) {
        if square.is_on_board() {
            self.squares[square.rank as usize][square.file as usize] = piece;
        }
    }

    /// The square skipped by the last two-step pawn advance, valid for one ply.
    pub fn en_passant_target(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |square| match self.piece_at(square) {
            Some(piece) if piece.color == color => Some((square, piece)),
            _ => None,
        })
    }

    pub fn king_square(&self, color: Color) -> Result<Square> {
        self.pieces(color)
            .find(|(_, piece)| piece.kind == PieceKind::King)
            .map(|(square, _)| square)
            .ok_or(Error::MissingKing(color))
    }

    pub fn is_in_check(&self, color: Color) -> Result<bool> {
        let king = self.king_square(color)?;
        Ok(self.attacks_king(king, color.opposite()))
    }

    // The target must hold the defending king: pawn pushes are part of the
    // pseudo-legal set, so this is not an attack map for empty squares.
    fn attacks_king(&self, king: Square, attacker: Color) -> bool {
        self.pieces(attacker).any(|(from, piece)| match piece.kind {
            // Never generate the king's own moves here, castling would recurse
            // back into the check test.
            PieceKind::King => from.is_adjacent(king),
            _ => movegen::pseudo_legal_moves(self, from, piece).contains(&king),
        })
    }

    /// Plays `from -> to` on this board, asks whether `color` is in check, and
    /// puts every touched square back before returning.
    pub fn would_be_in_check_after_move(
        &mut self,
        color: Color,
        from: Square,
        to: Square,
    ) -> Result<bool> {
        let simulation = Simulation::new(self, from, to);
        let in_check = simulation.is_in_check(color);
        trace!("simulated {from} -> {to}: {color} in check = {in_check:?}");
        in_check
    }

    pub fn legal_moves(&mut self, from: Square) -> Result<Vec<Square>> {
        let Some(piece) = self.piece_at(from) else {
            return Ok(Vec::new());
        };

        let candidates = self.candidate_moves(from, piece)?;
        let mut legal = Vec::with_capacity(candidates.len());
        for to in candidates {
            if !self.would_be_in_check_after_move(piece.color, from, to)? {
                legal.push(to);
            }
        }
        Ok(legal)
    }

    fn candidate_moves(&mut self, from: Square, piece: Piece) -> Result<Vec<Square>> {
        let mut moves = movegen::generate_moves(self, from, piece)?;
        if piece.kind == PieceKind::Pawn {
            if let Some(target) = self.en_passant {
                if self.en_passant_victim(from, target).is_some() {
                    moves.push(target);
                }
            }
        }
        Ok(moves)
    }

    /// The pawn removed if `from -> to` is an en passant capture.
    pub(crate) fn en_passant_victim(&self, from: Square, to: Square) -> Option<Square> {
        if self.en_passant != Some(to) || self.piece_at(to).is_some() {
            return None;
        }
        let pawn = self.piece_at(from).filter(|p| p.kind == PieceKind::Pawn)?;
        if to.rank - from.rank != pawn.color.forward() || (to.file - from.file).abs() != 1 {
            return None;
        }

        let victim = Square::new(to.file, from.rank);
        match self.piece_at(victim) {
            Some(p) if p.kind == PieceKind::Pawn && p.color != pawn.color => Some(victim),
            _ => None,
        }
    }

    fn has_legal_move(&mut self, color: Color) -> Result<bool> {
        let squares: Vec<Square> = self.pieces(color).map(|(square, _)| square).collect();
        for square in squares {
            if !self.legal_moves(square)?.is_empty() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn is_checkmate(&mut self, color: Color) -> Result<bool> {
        Ok(self.is_in_check(color)? && !self.has_legal_move(color)?)
    }

    pub fn is_stalemate(&mut self, color: Color) -> Result<bool> {
        Ok(!self.is_in_check(color)? && !self.has_legal_move(color)?)
    }

    pub fn can_castle_kingside(&mut self, color: Color) -> Result<bool> {
        self.can_castle(color, CastleSide::King)
    }

    pub fn can_castle_queenside(&mut self, color: Color) -> Result<bool> {
        self.can_castle(color, CastleSide::Queen)
    }

    fn can_castle(&mut self, color: Color, side: CastleSide) -> Result<bool> {
        let home = movegen::king_home(color);
        match self.piece_at(home) {
            Some(king) if king.kind == PieceKind::King && king.color == color => {
                Ok(movegen::castling_destination(self, home, king, side)?.is_some())
            }
            _ => Ok(false),
        }
    }

    /// Executes `from -> to`, including castling, en passant and promotion,
    /// and returns the captured piece.
    ///
    /// No legality check is made: callers must only pass destinations taken
    /// from [`Board::legal_moves`].
    pub fn move_piece(&mut self, from: Square, to: Square) -> Option<Piece> {
        let mut piece = self.piece_at(from)?;
        if !to.is_on_board() {
            return None;
        }
        let mut captured = self.piece_at(to);

        if piece.kind == PieceKind::King && (to.file - from.file).abs() == 2 {
            let side = if to.file > from.file {
                CastleSide::King
            } else {
                CastleSide::Queen
            };
            let rook_from = Square::new(side.rook_file(), from.rank);
            let rook_to = Square::new(to.file - side.direction(), from.rank);
            if let Some(mut rook) = self.piece_at(rook_from).filter(|p| p.kind == PieceKind::Rook) {
                rook.has_moved = true;
                self.set_piece(rook_from, None);
                self.set_piece(rook_to, Some(rook));
                debug!("{} castles {side:?}: rook {rook_from} -> {rook_to}", piece.color);
            }
        }

        if let Some(victim) = self.en_passant_victim(from, to) {
            captured = self.piece_at(victim);
            self.set_piece(victim, None);
            debug!("{} captures en passant on {to}, removing {victim}", piece.color);
        }

        self.en_passant = if piece.kind == PieceKind::Pawn && (to.rank - from.rank).abs() == 2 {
            Some(Square::new(from.file, (from.rank + to.rank) / 2))
        } else {
            None
        };

        if piece.kind == PieceKind::Pawn && to.rank == piece.color.promotion_rank() {
            piece = Piece::new(PieceKind::Queen, piece.color);
            debug!("{} pawn promotes on {to}", piece.color);
        }

        if matches!(piece.kind, PieceKind::King | PieceKind::Rook) {
            piece.has_moved = true;
        }
        self.set_piece(from, None);
        self.set_piece(to, Some(piece));

        debug!("{:?} {} {from} -> {to}", piece.kind, piece.color);
        captured
    }

    /// Text diagram with rank 8 on top, one character per square.
    pub fn render(&self, glyph: fn(&Piece) -> char) -> String {
        let mut result = String::new();
        for rank in 0..8 {
            result.push_str(&format!("{} ", 8 - rank));
            for file in 0..8 {
                match self.piece_at(Square::new(file, rank)) {
                    Some(piece) => result.push(glyph(&piece)),
                    None => result.push('.'),
                }
                if file < 7 {
                    result.push(' ');
                }
            }
            result.push('\n');
        }
        result.push_str("  a b c d e f g h\n");
        result
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.render(Piece::letter))
    }
}

/// A move played on the live board for the length of a check test.
///
/// The affected squares are saved up front and written back on drop, so the
/// board is restored on every way out, `?` and unwinding included.
struct Simulation<'a> {
    board: &'a mut Board,
    saved: Vec<(Square, Option<Piece>)>,
}

impl<'a> Simulation<'a> {
    fn new(board: &'a mut Board, from: Square, to: Square) -> Self {
        let mut saved = vec![(from, board.piece_at(from)), (to, board.piece_at(to))];
        if let Some(victim) = board.en_passant_victim(from, to) {
            saved.push((victim, board.piece_at(victim)));
            board.set_piece(victim, None);
        }

        let moving = board.piece_at(from);
        board.set_piece(from, None);
        board.set_piece(to, moving);
        Self { board, saved }
    }
}

impl Deref for Simulation<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        &*self.board
    }
}

impl Drop for Simulation<'_> {
    fn drop(&mut self) {
        for &(square, piece) in self.saved.iter().rev() {
            self.board.set_piece(square, piece);
        }
    }
}
