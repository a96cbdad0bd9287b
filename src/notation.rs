use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A board coordinate: `file` 0-7 is `a`-`h`, `rank` 0-7 is `1`-`8`.
///
/// Coordinates are signed so that offsets (pawn steps, diagonals) can be
/// computed freely; anything outside `0..8` is invalid and must be checked with
/// [`Square::is_valid`] before touching a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    pub file: i8,
    pub rank: i8,
}

impl Square {
    #[inline]
    pub const fn new(file: i8, rank: i8) -> Self {
        Self { file, rank }
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.file >= 0 && self.file < 8 && self.rank >= 0 && self.rank < 8
    }

    /// Square shifted by the given file and rank deltas. May be invalid.
    #[inline]
    pub const fn offset(self, df: i8, dr: i8) -> Self {
        Self::new(self.file + df, self.rank + dr)
    }

    /// All 64 squares, files outer, ranks inner.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8).flat_map(|file| (0..8).map(move |rank| Square::new(file, rank)))
    }
}

/// Prints algebraic notation, or `invalid` for off-board coordinates.
impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match format_square(*self) {
            Ok(text) => f.write_str(&text),
            Err(_) => f.write_str("invalid"),
        }
    }
}

impl FromStr for Square {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_square(s)
    }
}

/// A purely geometric move. No capture, promotion or check metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
}

impl Move {
    #[inline]
    pub const fn new(from: Square, to: Square) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

impl FromStr for Move {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_move(s)
    }
}

/// What was wrong with a piece of notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatErrorKind {
    /// Square must be exactly 2 characters, a move at least 4
    WrongLength,
    /// File must be a letter from a-h
    BadFile,
    /// Rank must be a digit from 1-8
    BadRank,
}

impl fmt::Display for FormatErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatErrorKind::WrongLength => f.write_str("wrong length"),
            FormatErrorKind::BadFile => f.write_str("file must be a-h"),
            FormatErrorKind::BadRank => f.write_str("rank must be 1-8"),
        }
    }
}

/// Malformed square or move text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {notation} notation: {text} ({kind})")]
pub struct FormatError {
    notation: &'static str,
    text: String,
    kind: FormatErrorKind,
}

impl FormatError {
    fn square(text: &str, kind: FormatErrorKind) -> Self {
        Self {
            notation: "algebraic",
            text: text.to_string(),
            kind,
        }
    }

    fn uci(text: &str, kind: FormatErrorKind) -> Self {
        Self {
            notation: "UCI",
            text: text.to_string(),
            kind,
        }
    }

    /// The rejected input.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> FormatErrorKind {
        self.kind
    }
}

/// Square coordinates fall outside the 8×8 board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("square ({}, {}) is out of range", .0.file, .0.rank)]
pub struct OutOfRange(pub Square);

/// Parse algebraic notation such as `"e4"`.
pub fn parse_square(text: &str) -> Result<Square, FormatError> {
    let [file, rank] = text.as_bytes() else {
        return Err(FormatError::square(text, FormatErrorKind::WrongLength));
    };

    if !(b'a'..=b'h').contains(file) {
        return Err(FormatError::square(text, FormatErrorKind::BadFile));
    }
    if !(b'1'..=b'8').contains(rank) {
        return Err(FormatError::square(text, FormatErrorKind::BadRank));
    }

    Ok(Square::new((file - b'a') as i8, (rank - b'1') as i8))
}

/// Format a square as algebraic notation.
pub fn format_square(square: Square) -> Result<String, OutOfRange> {
    if !square.is_valid() {
        return Err(OutOfRange(square));
    }
    let file = char::from(b'a' + square.file as u8);
    let rank = char::from(b'1' + square.rank as u8);
    Ok(format!("{file}{rank}"))
}

/// Parse a UCI move such as `"e2e4"`.
///
/// Only the first four characters are read; anything after them (a promotion
/// suffix like the `q` in `"e7e8q"`) is ignored.
pub fn parse_move(text: &str) -> Result<Move, FormatError> {
    let (Some(from), Some(to)) = (text.get(0..2), text.get(2..4)) else {
        return Err(FormatError::uci(text, FormatErrorKind::WrongLength));
    };

    let from = parse_square(from).map_err(|e| FormatError::uci(text, e.kind))?;
    let to = parse_square(to).map_err(|e| FormatError::uci(text, e.kind))?;
    Ok(Move::new(from, to))
}

/// Format a move as UCI: both squares concatenated.
pub fn format_move(mv: Move) -> Result<String, OutOfRange> {
    Ok(format_square(mv.from)? + &format_square(mv.to)?)
}
