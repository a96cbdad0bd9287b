use std::io::{self, Write};
use std::path::Path;

use log::debug;
use shakmaty::{Color, Piece, Role};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::board::Board;
use crate::notation::Square;

/// MIME type of [`render`] output.
pub const SVG_CONTENT_TYPE: &str = "image/svg+xml";

const SQUARE_SIZE: i32 = 50;
const LIGHT_SQUARE: &str = "#ffce9e";
const DARK_SQUARE: &str = "#d18b47";
const BACKGROUND: &str = "#8ca2ad";

/// Failure to produce or persist a board image.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write board image: {0}")]
    Io(#[from] io::Error),
}

/// Unicode chess glyph for a piece.
fn glyph(piece: Piece) -> char {
    match (piece.role, piece.color) {
        (Role::Pawn, Color::White) => '♙',
        (Role::Knight, Color::White) => '♘',
        (Role::Bishop, Color::White) => '♗',
        (Role::Rook, Color::White) => '♖',
        (Role::Queen, Color::White) => '♕',
        (Role::King, Color::White) => '♔',
        (Role::Pawn, Color::Black) => '♟',
        (Role::Knight, Color::Black) => '♞',
        (Role::Bishop, Color::Black) => '♝',
        (Role::Rook, Color::Black) => '♜',
        (Role::Queen, Color::Black) => '♛',
        (Role::King, Color::Black) => '♚',
    }
}

/// Draw the board as a 400×400 SVG document, rank 1 at the bottom.
///
/// Output depends only on piece placement; identical boards give identical
/// bytes.
pub fn render_svg(board: &Board) -> String {
    let mut svg = String::new();
    // Writing to a String cannot fail.
    let _ = write_svg(&mut svg, board);
    svg
}

/// [`render_svg`] as bytes, ready to attach.
pub fn render(board: &Board) -> Vec<u8> {
    render_svg(board).into_bytes()
}

fn write_svg(w: &mut impl std::fmt::Write, board: &Board) -> std::fmt::Result {
    writeln!(w, r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#)?;
    writeln!(
        w,
        r#"<svg xmlns="http://www.w3.org/2000/svg" version="1.1" width="400" height="400">"#
    )?;
    writeln!(w, r#"<rect width="400" height="400" fill="{BACKGROUND}"/>"#)?;

    for rank in 0..8 {
        for file in 0..8 {
            let x = i32::from(file) * SQUARE_SIZE;
            let y = (7 - i32::from(rank)) * SQUARE_SIZE;
            let fill = if (file + rank) % 2 == 0 {
                LIGHT_SQUARE
            } else {
                DARK_SQUARE
            };
            writeln!(
                w,
                r#"<rect x="{x}" y="{y}" width="50" height="50" fill="{fill}"/>"#
            )?;

            if let Ok(Some(piece)) = board.piece_at(Square::new(file, rank)) {
                let color = match piece.color {
                    Color::White => "white",
                    Color::Black => "black",
                };
                writeln!(
                    w,
                    r#"<text x="{}" y="{}" font-size="35" text-anchor="middle" fill="{color}">{}</text>"#,
                    x + 25,
                    y + 35,
                    glyph(piece)
                )?;
            }
        }
    }

    for i in 0..8 {
        writeln!(
            w,
            r#"<text x="5" y="{}" font-size="12" text-anchor="middle">{}</text>"#,
            i * SQUARE_SIZE + 25,
            8 - i
        )?;
        writeln!(
            w,
            r#"<text x="{}" y="395" font-size="12" text-anchor="middle">{}</text>"#,
            i * SQUARE_SIZE + 25,
            char::from(b'a' + i as u8)
        )?;
    }

    writeln!(w, "</svg>")
}

/// Keep names usable inside a file name.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// A rendered board written to a temporary file.
///
/// The file exists for as long as the artifact does and is deleted on drop,
/// whether or not it was delivered.
#[derive(Debug)]
pub struct RenderArtifact {
    file: NamedTempFile,
}

impl RenderArtifact {
    /// Render `board` into `dir`, naming the file after the players and move.
    pub fn create(
        dir: &Path,
        board: &Board,
        white_name: &str,
        black_name: &str,
        move_number: u32,
    ) -> Result<Self, RenderError> {
        let prefix = format!(
            "chess_board_{}_vs_{}_move_{move_number}_",
            sanitize(white_name),
            sanitize(black_name)
        );
        let mut file = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".svg")
            .tempfile_in(dir)?;
        file.write_all(&render(board))?;
        file.flush()?;
        debug!("rendered board to {}", file.path().display());
        Ok(Self { file })
    }

    #[inline]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Read the image back, as an attachment upload would.
    pub fn read(&self) -> Result<Vec<u8>, RenderError> {
        Ok(std::fs::read(self.path())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(text: &str) -> crate::notation::Move {
        text.parse().expect("asserted move is invalid")
    }

    #[test]
    fn empty_board_document() {
        let svg = render_svg(&Board::empty());
        let lines: Vec<&str> = svg.lines().collect();

        // header, svg, background, 64 squares, 16 labels, close
        assert_eq!(lines.len(), 3 + 64 + 16 + 1);
        assert_eq!(
            lines[0],
            r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#
        );
        assert_eq!(
            lines[2],
            r##"<rect width="400" height="400" fill="#8ca2ad"/>"##
        );
        // a1 is light and drawn at the bottom left
        assert_eq!(
            lines[3],
            r##"<rect x="0" y="350" width="50" height="50" fill="#ffce9e"/>"##
        );
        // b1 is dark
        assert_eq!(
            lines[4],
            r##"<rect x="50" y="350" width="50" height="50" fill="#d18b47"/>"##
        );
        assert_eq!(
            lines[67],
            r#"<text x="5" y="25" font-size="12" text-anchor="middle">8</text>"#
        );
        assert_eq!(
            lines[68],
            r#"<text x="25" y="395" font-size="12" text-anchor="middle">a</text>"#
        );
        assert_eq!(lines[lines.len() - 1], "</svg>");
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn initial_board_draws_every_piece() {
        let svg = render_svg(&Board::new());

        assert_eq!(svg.matches("font-size=\"35\"").count(), 32);
        assert_eq!(svg.matches('♙').count(), 8);
        assert_eq!(svg.matches('♟').count(), 8);
        assert_eq!(svg.matches('♔').count(), 1);
        assert_eq!(svg.matches('♛').count(), 1);
        // the white king on e1 follows its square
        assert!(svg.contains(concat!(
            r##"<rect x="200" y="350" width="50" height="50" fill="#ffce9e"/>"##,
            "\n",
            r#"<text x="225" y="385" font-size="35" text-anchor="middle" fill="white">♔</text>"#
        )));
    }

    #[test]
    fn rendering_is_idempotent() {
        let mut board = Board::new();
        board.apply_move(mv("e2e4")).unwrap();

        assert_eq!(render(&board), render(&board));
    }

    #[test]
    fn rendering_follows_moves() {
        let mut board = Board::new();
        let before = render_svg(&board);
        board.apply_move(mv("e2e4")).unwrap();
        let after = render_svg(&board);

        assert_ne!(before, after);
        assert!(after.contains(
            r#"<text x="225" y="235" font-size="35" text-anchor="middle" fill="white">♙</text>"#
        ));
    }

    #[test]
    fn artifact_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let artifact =
            RenderArtifact::create(dir.path(), &Board::new(), "alice", "bob/../x", 0).unwrap();
        let path = artifact.path().to_path_buf();

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("chess_board_alice_vs_bob____x_move_0_"));
        assert!(name.ends_with(".svg"));
        assert_eq!(artifact.read().unwrap(), render(&Board::new()));

        drop(artifact);
        assert!(!path.exists());
    }

    #[test]
    fn artifact_in_missing_dir_is_a_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        let err = RenderArtifact::create(&missing, &Board::new(), "a", "b", 1).unwrap_err();
        assert!(matches!(err, RenderError::Io(_)));
    }
}
