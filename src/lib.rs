pub mod board;
pub mod error;
pub mod game;
pub mod movegen;

pub use board::{Board, Color, Piece, PieceKind, Square};
pub use error::{Error, Result};
pub use game::{Game, Phase, Selection, Status};
pub use movegen::CastleSide;

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    fn place(board: &mut Board, name: &str, kind: PieceKind, color: Color) {
        board.set_piece(sq(name), Some(Piece::new(kind, color)));
    }

    fn legal_move_count(board: &mut Board, color: Color) -> usize {
        let squares: Vec<Square> = board.pieces(color).map(|(square, _)| square).collect();
        squares
            .into_iter()
            .map(|square| board.legal_moves(square).unwrap().len())
            .sum()
    }

    /// Plays a move after checking it is legal.
    fn play(board: &mut Board, from: &str, to: &str) -> Option<Piece> {
        let (from, to) = (sq(from), sq(to));
        assert!(
            board.legal_moves(from).unwrap().contains(&to),
            "{from} -> {to} is not legal on\n{board}"
        );
        board.move_piece(from, to)
    }

    #[test]
    fn test_initial_position() {
        let mut board = Board::standard();

        assert!(!board.is_in_check(Color::White).unwrap());
        assert!(!board.is_in_check(Color::Black).unwrap());

        // 16 pawn moves and 4 knight moves per side
        assert_eq!(legal_move_count(&mut board, Color::White), 20);
        assert_eq!(legal_move_count(&mut board, Color::Black), 20);

        assert_eq!(board.pieces(Color::White).count(), 16);
        assert_eq!(board.pieces(Color::Black).count(), 16);
        assert_eq!(
            board.piece_at(sq("d1")),
            Some(Piece::new(PieceKind::Queen, Color::White))
        );
        assert_eq!(
            board.piece_at(sq("e8")),
            Some(Piece::new(PieceKind::King, Color::Black))
        );
        assert_eq!(board.en_passant_target(), None);
    }

    #[test]
    fn test_out_of_bounds_access() {
        let mut board = Board::standard();
        let before = board.clone();
        let rook = Piece::new(PieceKind::Rook, Color::White);

        for file in -3..11 {
            for rank in -3..11 {
                let square = Square::new(file, rank);
                if square.is_on_board() {
                    continue;
                }
                assert_eq!(board.piece_at(square), None);
                board.set_piece(square, Some(rook));
                assert!(board.legal_moves(square).unwrap().is_empty());
            }
        }
        assert_eq!(board.piece_at(Square::new(i8::MIN, i8::MAX)), None);
        assert_eq!(board, before);
    }

    #[test]
    fn test_queries_leave_board_untouched() {
        let mut board = Board::standard();
        play(&mut board, "e2", "e4");
        play(&mut board, "d7", "d5");
        let before = board.clone();

        for _ in 0..3 {
            for square in Square::all() {
                board.legal_moves(square).unwrap();
            }
            board.is_in_check(Color::White).unwrap();
            board.is_checkmate(Color::Black).unwrap();
            board.is_stalemate(Color::White).unwrap();
            board.can_castle_kingside(Color::White).unwrap();
            board.can_castle_queenside(Color::Black).unwrap();
        }
        assert_eq!(board, before);
    }

    #[test]
    fn test_missing_king_is_an_error() {
        let mut board = Board::empty();
        place(&mut board, "a1", PieceKind::Rook, Color::White);
        place(&mut board, "e8", PieceKind::King, Color::Black);
        let before = board.clone();

        assert_eq!(board.is_in_check(Color::White), Err(Error::MissingKing(Color::White)));
        assert_eq!(board.legal_moves(sq("a1")), Err(Error::MissingKing(Color::White)));
        assert_eq!(board.is_checkmate(Color::White), Err(Error::MissingKing(Color::White)));
        // The simulation interrupted by the error is still undone.
        assert_eq!(board, before);

        assert_eq!(board.is_in_check(Color::Black), Ok(false));
    }

    #[test]
    fn test_en_passant_target_lifecycle() {
        let mut board = Board::standard();

        play(&mut board, "e2", "e4");
        assert_eq!(board.en_passant_target(), Some(sq("e3")));

        play(&mut board, "a7", "a6");
        assert_eq!(board.en_passant_target(), None);

        play(&mut board, "e4", "e5");
        play(&mut board, "f7", "f5");
        assert_eq!(board.en_passant_target(), Some(sq("f6")));
        play(&mut board, "g1", "f3");
        assert_eq!(board.en_passant_target(), None);
        assert!(!board.legal_moves(sq("e5")).unwrap().contains(&sq("f6")));
    }

    #[test]
    fn test_en_passant_capture() {
        let mut board = Board::standard();
        play(&mut board, "e2", "e4");
        play(&mut board, "a7", "a6");
        play(&mut board, "e4", "e5");
        play(&mut board, "d7", "d5");

        let moves = board.legal_moves(sq("e5")).unwrap();
        assert!(moves.contains(&sq("d6")));
        assert!(moves.contains(&sq("e6")));

        let captured = play(&mut board, "e5", "d6");
        assert_eq!(captured, Some(Piece::new(PieceKind::Pawn, Color::Black)));
        assert_eq!(board.piece_at(sq("d5")), None);
        assert_eq!(
            board.piece_at(sq("d6")),
            Some(Piece::new(PieceKind::Pawn, Color::White))
        );
        assert_eq!(board.en_passant_target(), None);
    }

    #[test]
    fn test_en_passant_exposing_king_is_illegal() {
        let mut board = Board::empty();
        place(&mut board, "a5", PieceKind::King, Color::White);
        place(&mut board, "e5", PieceKind::Pawn, Color::White);
        place(&mut board, "d7", PieceKind::Pawn, Color::Black);
        place(&mut board, "h5", PieceKind::Rook, Color::Black);
        place(&mut board, "e8", PieceKind::King, Color::Black);

        play(&mut board, "d7", "d5");
        assert!(!board.is_in_check(Color::White).unwrap());

        // Both pawns would leave the fifth rank, opening it to the rook.
        let moves = board.legal_moves(sq("e5")).unwrap();
        assert_eq!(moves, vec![sq("e6")]);
    }

    #[test]
    fn test_pinned_piece_cannot_move() {
        let mut board = Board::empty();
        place(&mut board, "e1", PieceKind::King, Color::White);
        place(&mut board, "e2", PieceKind::Bishop, Color::White);
        place(&mut board, "e8", PieceKind::Rook, Color::Black);
        place(&mut board, "a8", PieceKind::King, Color::Black);

        assert!(board.legal_moves(sq("e2")).unwrap().is_empty());
        assert!(!board.legal_moves(sq("e1")).unwrap().is_empty());
    }

    #[test]
    fn test_king_cannot_step_next_to_king() {
        let mut board = Board::empty();
        place(&mut board, "e4", PieceKind::King, Color::White);
        place(&mut board, "e6", PieceKind::King, Color::Black);

        let moves = board.legal_moves(sq("e4")).unwrap();
        assert_eq!(moves.len(), 5);
        for square in ["d5", "e5", "f5"] {
            assert!(!moves.contains(&sq(square)));
        }
    }

    #[test]
    fn test_fools_mate() {
        let mut board = Board::standard();
        play(&mut board, "f2", "f3");
        play(&mut board, "e7", "e5");
        play(&mut board, "g2", "g4");
        assert!(!board.is_checkmate(Color::White).unwrap());
        play(&mut board, "d8", "h4");

        assert!(board.is_in_check(Color::White).unwrap());
        assert_eq!(legal_move_count(&mut board, Color::White), 0);
        assert!(board.is_checkmate(Color::White).unwrap());
        assert!(!board.is_stalemate(Color::White).unwrap());
        assert!(!board.is_checkmate(Color::Black).unwrap());
    }

    #[test]
    fn test_stalemate() {
        let mut board = Board::empty();
        place(&mut board, "h8", PieceKind::King, Color::Black);
        place(&mut board, "g6", PieceKind::Queen, Color::White);
        place(&mut board, "f7", PieceKind::King, Color::White);

        assert!(!board.is_in_check(Color::Black).unwrap());
        assert_eq!(legal_move_count(&mut board, Color::Black), 0);
        assert!(board.is_stalemate(Color::Black).unwrap());
        assert!(!board.is_checkmate(Color::Black).unwrap());
        assert!(!board.is_stalemate(Color::White).unwrap());
    }

    fn castling_board() -> Board {
        let mut board = Board::empty();
        place(&mut board, "e1", PieceKind::King, Color::White);
        place(&mut board, "a1", PieceKind::Rook, Color::White);
        place(&mut board, "h1", PieceKind::Rook, Color::White);
        place(&mut board, "a8", PieceKind::King, Color::Black);
        board
    }

    #[test]
    fn test_castling() {
        let mut board = castling_board();
        let moves = board.legal_moves(sq("e1")).unwrap();
        assert!(moves.contains(&sq("g1")));
        assert!(moves.contains(&sq("c1")));
        assert!(board.can_castle_kingside(Color::White).unwrap());
        assert!(board.can_castle_queenside(Color::White).unwrap());

        let mut kingside = board.clone();
        kingside.move_piece(sq("e1"), sq("g1"));
        let king = kingside.piece_at(sq("g1")).unwrap();
        let rook = kingside.piece_at(sq("f1")).unwrap();
        assert_eq!((king.kind, king.has_moved), (PieceKind::King, true));
        assert_eq!((rook.kind, rook.has_moved), (PieceKind::Rook, true));
        assert_eq!(kingside.piece_at(sq("e1")), None);
        assert_eq!(kingside.piece_at(sq("h1")), None);
        assert!(!kingside.can_castle_queenside(Color::White).unwrap());

        let mut queenside = board.clone();
        queenside.move_piece(sq("e1"), sq("c1"));
        assert_eq!(queenside.piece_at(sq("c1")).map(|p| p.kind), Some(PieceKind::King));
        assert_eq!(queenside.piece_at(sq("d1")).map(|p| p.kind), Some(PieceKind::Rook));
        assert_eq!(queenside.piece_at(sq("a1")), None);
        assert_eq!(queenside.piece_at(sq("e1")), None);
    }

    #[test]
    fn test_castling_through_attacked_square() {
        let mut board = castling_board();
        place(&mut board, "f8", PieceKind::Rook, Color::Black);
        // b1 is attacked but the king never crosses it.
        place(&mut board, "b8", PieceKind::Rook, Color::Black);

        let moves = board.legal_moves(sq("e1")).unwrap();
        assert!(!moves.contains(&sq("g1")));
        assert!(moves.contains(&sq("c1")));
        assert!(!board.can_castle_kingside(Color::White).unwrap());
        assert!(board.can_castle_queenside(Color::White).unwrap());
    }

    #[test]
    fn test_castling_onto_attacked_square() {
        let mut board = castling_board();
        // Only g1 is covered: e1 and f1 stay safe.
        place(&mut board, "g8", PieceKind::Rook, Color::Black);

        assert!(!board.is_in_check(Color::White).unwrap());
        let moves = board.legal_moves(sq("e1")).unwrap();
        assert!(moves.contains(&sq("f1")));
        assert!(!moves.contains(&sq("g1")));
        assert!(moves.contains(&sq("c1")));
        assert!(!board.can_castle_kingside(Color::White).unwrap());
        assert!(board.can_castle_queenside(Color::White).unwrap());
    }

    #[test]
    fn test_cannot_castle_out_of_check() {
        let mut board = castling_board();
        place(&mut board, "e7", PieceKind::Rook, Color::Black);

        assert!(board.is_in_check(Color::White).unwrap());
        let moves = board.legal_moves(sq("e1")).unwrap();
        assert!(!moves.contains(&sq("g1")));
        assert!(!moves.contains(&sq("c1")));
        assert!(!board.can_castle_kingside(Color::White).unwrap());
        assert!(!board.can_castle_queenside(Color::White).unwrap());
    }

    #[test]
    fn test_moved_king_loses_castling() {
        let mut board = castling_board();
        board.move_piece(sq("e1"), sq("e2"));
        board.move_piece(sq("e2"), sq("e1"));

        assert!(!board.legal_moves(sq("e1")).unwrap().contains(&sq("g1")));
        assert!(!board.can_castle_kingside(Color::White).unwrap());
        assert!(!board.can_castle_queenside(Color::White).unwrap());
    }

    #[test]
    fn test_promotion() {
        let mut board = Board::empty();
        place(&mut board, "a7", PieceKind::Pawn, Color::White);
        place(&mut board, "b2", PieceKind::Pawn, Color::Black);
        place(&mut board, "e1", PieceKind::King, Color::White);
        place(&mut board, "h6", PieceKind::King, Color::Black);

        play(&mut board, "a7", "a8");
        assert_eq!(board.piece_at(sq("a7")), None);
        assert_eq!(
            board.piece_at(sq("a8")),
            Some(Piece::new(PieceKind::Queen, Color::White))
        );
        assert_eq!(board.pieces(Color::White).count(), 2);

        play(&mut board, "b2", "b1");
        assert_eq!(
            board.piece_at(sq("b1")),
            Some(Piece::new(PieceKind::Queen, Color::Black))
        );
        assert!(board.is_in_check(Color::White).unwrap());
    }

    #[test]
    fn test_square_names() {
        assert_eq!(sq("a8"), Square::new(0, 0));
        assert_eq!(sq("e2"), Square::new(4, 6));
        assert_eq!(sq("h1"), Square::new(7, 7));
        assert_eq!(Square::new(4, 5).to_string(), "e3");
        assert_eq!("i9".parse::<Square>(), Err(Error::InvalidSquare("i9".to_string())));
        assert!("e".parse::<Square>().is_err());
        assert!("e22".parse::<Square>().is_err());
    }

    #[test]
    fn test_random_playouts_respect_legality() {
        let mut rng = StdRng::seed_from_u64(0x5eed);

        for _ in 0..20 {
            let mut board = Board::standard();
            let mut turn = Color::White;

            for _ in 0..80 {
                let before = board.clone();
                let squares: Vec<Square> = board.pieces(turn).map(|(square, _)| square).collect();

                let mut moves = Vec::new();
                for from in squares {
                    for to in board.legal_moves(from).unwrap() {
                        let mut after = board.clone();
                        after.move_piece(from, to);
                        assert!(
                            !after.is_in_check(turn).unwrap(),
                            "{from} -> {to} leaves {turn} in check on\n{board}"
                        );
                        moves.push((from, to));
                    }
                }
                assert_eq!(board, before);

                let over = board.is_checkmate(turn).unwrap() || board.is_stalemate(turn).unwrap();
                assert_eq!(over, moves.is_empty());

                let Some(&(from, to)) = moves.choose(&mut rng) else {
                    break;
                };
                board.move_piece(from, to);
                turn = turn.opposite();
            }
        }
    }
}
