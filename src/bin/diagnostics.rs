//! Prints the starting position, its generated moves and the rendered image.

use chat_chess::board::Board;
use chat_chess::{movegen, render};

fn main() {
    env_logger::init();

    let board = Board::new();
    println!("{board}");
    println!();

    let moves = movegen::legal_moves(&board);
    let listed: Vec<String> = moves.iter().map(ToString::to_string).collect();
    println!("{} moves: {}", moves.len(), listed.join(" "));
    println!();

    print!("{}", render::render_svg(&board));
}
