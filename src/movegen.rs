use shakmaty::{Color, Piece, Role};

use crate::board::Board;
use crate::notation::{Move, Square};

/// Movement rules for one kind of piece set.
///
/// The board only ever asks the rule set which moves exist; session handling
/// and rendering do not care how they were generated.
pub trait MoveRules {
    /// Push every move `piece` on `from` may make onto `moves`.
    fn piece_moves(&self, board: &Board, from: Square, piece: Piece, moves: &mut Vec<Move>);
}

/// Pawns step forward one square, two from their home rank, and capture
/// diagonally. Every other piece is immobile.
#[derive(Debug, Clone, Copy, Default)]
pub struct PawnOnly;

impl MoveRules for PawnOnly {
    fn piece_moves(&self, board: &Board, from: Square, piece: Piece, moves: &mut Vec<Move>) {
        if piece.role != Role::Pawn {
            return;
        }

        let (direction, home_rank) = match piece.color {
            Color::White => (1, 1),
            Color::Black => (-1, 6),
        };

        let single = from.offset(0, direction);
        if is_empty(board, single) {
            moves.push(Move::new(from, single));

            let double = from.offset(0, 2 * direction);
            if from.rank == home_rank && is_empty(board, double) {
                moves.push(Move::new(from, double));
            }
        }

        for df in [-1, 1] {
            let target = from.offset(df, direction);
            if let Ok(Some(victim)) = board.piece_at(target)
                && victim.color != piece.color
            {
                moves.push(Move::new(from, target));
            }
        }
    }
}

/// On the board and unoccupied.
fn is_empty(board: &Board, square: Square) -> bool {
    matches!(board.piece_at(square), Ok(None))
}

/// All moves for the side to move under `rules`.
///
/// Squares are visited file by file, rank by rank within each file.
pub fn legal_moves_with(board: &Board, rules: &impl MoveRules) -> Vec<Move> {
    let mut moves = Vec::new();
    for (from, piece) in board.pieces() {
        if piece.color == board.turn() {
            rules.piece_moves(board, from, piece, &mut moves);
        }
    }
    moves
}

pub fn is_legal_with(board: &Board, mv: &Move, rules: &impl MoveRules) -> bool {
    legal_moves_with(board, rules).contains(mv)
}

/// All pawn-only moves for the side to move.
#[inline]
pub fn legal_moves(board: &Board) -> Vec<Move> {
    legal_moves_with(board, &PawnOnly)
}

#[inline]
pub fn is_legal(board: &Board, mv: &Move) -> bool {
    is_legal_with(board, mv, &PawnOnly)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn sq(text: &str) -> Square {
        text.parse().expect("asserted square is invalid")
    }

    fn mv(text: &str) -> Move {
        text.parse().expect("asserted move is invalid")
    }

    fn place(board: &mut Board, square: &str, role: Role, color: Color) {
        board
            .set_piece(sq(square), Some(Piece { role, color }))
            .expect("valid square");
    }

    fn board_after(moves: &[&str]) -> Board {
        let mut board = Board::new();
        for m in moves {
            board.apply_move(mv(m)).expect("scripted move should be legal");
        }
        board
    }

    #[test]
    fn initial_position_has_sixteen_pawn_moves() {
        let moves = legal_moves(&Board::new());
        assert_eq!(moves.len(), 16);
    }

    #[test]
    fn moves_are_ordered_by_file_then_rank() {
        let texts: Vec<String> = legal_moves(&Board::new())
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(&texts[..4], ["a2a3", "a2a4", "b2b3", "b2b4"]);
        assert_eq!(texts.last().map(String::as_str), Some("h2h4"));
    }

    #[test]
    fn single_step_then_double_then_captures() {
        // Black pawns on d3 and f3 give e2 both captures.
        let mut board = Board::empty();
        place(&mut board, "e2", Role::Pawn, Color::White);
        place(&mut board, "d3", Role::Pawn, Color::Black);
        place(&mut board, "f3", Role::Pawn, Color::Black);

        let moves = legal_moves(&board);

        assert_eq!(moves, [mv("e2e3"), mv("e2e4"), mv("e2d3"), mv("e2f3")]);
    }

    #[test]
    fn black_pawns_move_down() {
        let board = board_after(&["e2e4"]);
        let moves = legal_moves(&board);

        assert!(moves.contains(&mv("e7e6")));
        assert!(moves.contains(&mv("e7e5")));
        assert!(!moves.contains(&mv("e7e8")));
        assert_eq!(moves.len(), 16);
    }

    #[test]
    fn double_step_needs_clear_path() {
        let mut board = Board::empty();
        place(&mut board, "e2", Role::Pawn, Color::White);
        place(&mut board, "e3", Role::Knight, Color::Black);

        assert!(legal_moves(&board).is_empty());
    }

    #[test]
    fn double_step_needs_empty_destination() {
        let mut board = Board::empty();
        place(&mut board, "e2", Role::Pawn, Color::White);
        place(&mut board, "e4", Role::Knight, Color::Black);

        assert_eq!(legal_moves(&board), [mv("e2e3")]);
    }

    #[test]
    fn double_step_only_from_home_rank() {
        let board = board_after(&["e2e3", "a7a6"]);
        let moves = legal_moves(&board);

        assert!(moves.contains(&mv("e3e4")));
        assert!(!moves.contains(&mv("e3e5")));
    }

    #[test]
    fn no_capture_of_own_piece() {
        let mut board = Board::empty();
        place(&mut board, "e2", Role::Pawn, Color::White);
        place(&mut board, "d3", Role::Knight, Color::White);

        assert!(!legal_moves(&board).contains(&mv("e2d3")));
    }

    #[test]
    fn edge_pawn_has_one_capture_direction() {
        let mut board = Board::empty();
        place(&mut board, "a4", Role::Pawn, Color::White);
        place(&mut board, "b5", Role::Pawn, Color::Black);

        assert_eq!(legal_moves(&board), [mv("a4a5"), mv("a4b5")]);
    }

    #[test]
    fn pawn_on_last_rank_is_stuck() {
        let mut board = Board::empty();
        place(&mut board, "c8", Role::Pawn, Color::White);

        assert!(legal_moves(&board).is_empty());
    }

    #[test_case(Role::Knight)]
    #[test_case(Role::Bishop)]
    #[test_case(Role::Rook)]
    #[test_case(Role::Queen)]
    #[test_case(Role::King)]
    fn other_pieces_never_move(role: Role) {
        let mut board = Board::empty();
        place(&mut board, "d4", role, Color::White);

        assert!(legal_moves(&board).is_empty());
    }

    #[test_case(&[]; "start")]
    #[test_case(&["e2e4"]; "after e4")]
    #[test_case(&["e2e4", "d7d5"]; "capture available")]
    #[test_case(&["e2e4", "d7d5", "e4d5", "c7c6"]; "recapture available")]
    #[test_case(&["a2a4", "b7b5", "a4b5", "a7a5"]; "captures on the edge")]
    fn generated_moves_respect_ownership(history: &[&str]) {
        let board = board_after(history);
        let mover = board.turn();

        for m in legal_moves(&board) {
            let piece = board.piece_at(m.from).unwrap().expect("origin occupied");
            assert_eq!(piece.color, mover, "{m} moves a piece of the wrong side");
            if let Some(target) = board.piece_at(m.to).unwrap() {
                assert_ne!(target.color, mover, "{m} captures its own piece");
            }
        }
    }

    #[test]
    fn membership_is_structural() {
        let board = Board::new();
        assert!(is_legal(&board, &mv("e2e4")));
        assert!(is_legal(&board, &Move::new(Square::new(4, 1), Square::new(4, 3))));
        assert!(!is_legal(&board, &mv("a2a5")));
        assert!(!is_legal(&board, &Move::new(Square::new(4, 1), Square::new(4, 9))));
    }

    struct Frozen;

    impl MoveRules for Frozen {
        fn piece_moves(&self, _: &Board, _: Square, _: Piece, _: &mut Vec<Move>) {}
    }

    #[test]
    fn custom_rules_replace_pawn_rules() {
        let mut board = Board::new();
        assert!(legal_moves_with(&board, &Frozen).is_empty());
        assert!(board.apply_move_with(mv("e2e4"), &Frozen).is_err());
        assert_eq!(board, Board::new());
    }
}
