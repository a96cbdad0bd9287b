use std::fmt;

use log::debug;
use shakmaty::{Color, Piece, Role};
use thiserror::Error;

use crate::movegen::{self, MoveRules, PawnOnly};
use crate::notation::{Move, OutOfRange, Square};

/// Back rank in standard order, file a through h.
const BACK_RANK: [Role; 8] = [
    Role::Rook,
    Role::Knight,
    Role::Bishop,
    Role::Queen,
    Role::King,
    Role::Bishop,
    Role::Knight,
    Role::Rook,
];

/// Errors from reading or mutating a [`Board`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error(transparent)]
    OutOfRange(#[from] OutOfRange),
    #[error("illegal move: {0}")]
    IllegalMove(Move),
}

/// Result code of a game. Draws are never produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameResult {
    #[default]
    Ongoing,
    WhiteWins,
    BlackWins,
}

impl GameResult {
    /// The result in which `color` wins.
    pub const fn win_for(color: Color) -> Self {
        match color {
            Color::White => GameResult::WhiteWins,
            Color::Black => GameResult::BlackWins,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            GameResult::Ongoing => "*",
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An 8×8 grid indexed `[file][rank]`, plus side to move and result.
///
/// Game end is a simplification: the game is over as soon as the side to
/// move has no generated move. With [`PawnOnly`] rules that happens whenever
/// every pawn of that side is blocked, far more often than real checkmate or
/// stalemate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    grid: [[Option<Piece>; 8]; 8],
    turn: Color,
    fullmove_number: u32,
    result: GameResult,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// The standard starting position, white to move.
    pub fn new() -> Self {
        let mut board = Self::empty();
        for (file, role) in BACK_RANK.into_iter().enumerate() {
            board.grid[file][0] = Some(Piece {
                role,
                color: Color::White,
            });
            board.grid[file][1] = Some(Piece {
                role: Role::Pawn,
                color: Color::White,
            });
            board.grid[file][6] = Some(Piece {
                role: Role::Pawn,
                color: Color::Black,
            });
            board.grid[file][7] = Some(Piece {
                role,
                color: Color::Black,
            });
        }
        board
    }

    /// A board with no pieces, white to move.
    pub fn empty() -> Self {
        Self {
            grid: [[None; 8]; 8],
            turn: Color::White,
            fullmove_number: 1,
            result: GameResult::Ongoing,
        }
    }

    /// Get the piece at a given square, if any
    pub fn piece_at(&self, square: Square) -> Result<Option<Piece>, OutOfRange> {
        if !square.is_valid() {
            return Err(OutOfRange(square));
        }
        Ok(self.grid[square.file as usize][square.rank as usize])
    }

    /// Place or clear a piece. Does not touch turn or result.
    pub fn set_piece(&mut self, square: Square, piece: Option<Piece>) -> Result<(), OutOfRange> {
        if !square.is_valid() {
            return Err(OutOfRange(square));
        }
        self.grid[square.file as usize][square.rank as usize] = piece;
        Ok(())
    }

    /// Occupied squares, files outer, ranks inner.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(|sq| {
            self.grid[sq.file as usize][sq.rank as usize].map(|piece| (sq, piece))
        })
    }

    #[inline]
    pub fn turn(&self) -> Color {
        self.turn
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    #[inline]
    pub fn result(&self) -> GameResult {
        self.result
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.result != GameResult::Ongoing
    }

    /// Play a move under the default pawn-only rules.
    pub fn apply_move(&mut self, mv: Move) -> Result<(), BoardError> {
        self.apply_move_with(mv, &PawnOnly)
    }

    /// Play a move that `rules` generates for the side to move.
    ///
    /// Whatever stands on the destination is discarded. If the opponent is
    /// left without a generated move, the side that just moved wins.
    pub fn apply_move_with(&mut self, mv: Move, rules: &impl MoveRules) -> Result<(), BoardError> {
        if !movegen::is_legal_with(self, &mv, rules) {
            return Err(BoardError::IllegalMove(mv));
        }

        let piece = self.piece_at(mv.from)?;
        self.set_piece(mv.to, piece)?;
        self.set_piece(mv.from, None)?;

        let mover = self.turn;
        self.turn = !mover;
        if self.turn == Color::White {
            self.fullmove_number += 1;
        }
        debug!("applied {mv}, {:?} to move", self.turn);

        if movegen::legal_moves_with(self, rules).is_empty() {
            self.result = GameResult::win_for(mover);
        }
        Ok(())
    }
}

/// ASCII diagram, rank 8 on top, FEN letters for pieces.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                let cell = self.grid[file][rank].map_or('.', |p| p.char());
                write!(f, " {cell}")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "   a b c d e f g h")?;
        write!(
            f,
            "{} to move, move {}, result {}",
            if self.turn == Color::White { "white" } else { "black" },
            self.fullmove_number,
            self.result
        )
    }
}
