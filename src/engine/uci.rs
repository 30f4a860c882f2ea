/*
 * Krill, a UCI-compatible chess move generator
 * Copyright (C) 2025 Jasper Shovelton
 *
 * Krill is free software: you can redistribute it and/or modify it under the
 * terms of the GNU General Public License as published by the Free Software
 * Foundation, either version 3 of the License, or (at your option) any later
 * version.
 *
 * Krill is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
 * FOR A PARTICULAR PURPOSE. See the GNU General Public License for more
 * details.
 *
 * You should have received a copy of the GNU General Public License along with
 * Krill. If not, see <https://www.gnu.org/licenses/>.
 */

//! The text command loop: a small slice of UCI, enough to drive the move
//! generator from a terminal or a harness.

use std::{io, process::exit, str::SplitWhitespace};

use super::Engine;
use crate::{
    board::{Board, START_FEN},
    defs::{PieceType, Square},
    movegen::{generate_moves, AllMoves, Moves},
    perft::perft,
};

/// The name of the author of this engine.
const ID_AUTHOR: &str = "Jasper Shovelton";
/// The name of this engine.
const ID_NAME: &str = "Krill";
/// The version of this engine.
const ID_VERSION: &str = env!("CARGO_PKG_VERSION");

impl Engine {
    /// Repeatedly waits for a command on stdin and executes it.
    ///
    /// Returns when stdin reaches end of file; the `quit` command exits
    /// the process directly.
    pub fn main_loop(&mut self) -> Result<(), io::Error> {
        let mut line = String::new();
        loop {
            line.clear();
            if io::stdin().read_line(&mut line)? == 0 {
                return Ok(());
            }
            self.handle_command(&line);
        }
    }

    /// Interprets the command given by `command`.
    fn handle_command(&mut self, command: &str) {
        let mut tokens = command.split_whitespace();

        match tokens.next() {
            Some("go") => self.go(tokens),
            Some("isready") => println!("readyok"),
            Some("p") => print!("{}", self.board()),
            Some("perft") => self.go_perft(tokens),
            Some("position") => self.set_position(tokens),
            Some("uci") => {
                println!("id name {ID_NAME} {ID_VERSION}");
                println!("id author {ID_AUTHOR}");
                println!("uciok");
            }
            Some("ucinewgame") => self.reset(),
            Some("quit") => exit(0),
            Some(other) => println!("info string Unrecognised command \"{other}\"."),
            None => (),
        }
    }

    /// Handles the `go` command. Counting nodes is the only search here,
    /// so only `go perft <depth>` does anything.
    fn go(&mut self, mut tokens: SplitWhitespace<'_>) {
        match tokens.next() {
            Some("perft") => self.go_perft(tokens),
            Some(other) => println!("info string Cannot go \"{other}\"; try \"go perft <depth>\"."),
            None => println!("info string Nothing to go: try \"go perft <depth>\"."),
        }
    }

    /// Runs perft to the depth in the next token, printing the count of
    /// each root move, the total and the time taken.
    fn go_perft(&mut self, mut tokens: SplitWhitespace<'_>) {
        let Some(depth) = tokens.next().and_then(|token| token.parse().ok()) else {
            return println!("info string Expected a depth.");
        };
        perft::<true, true>(&mut self.board, depth);
    }

    /// Handles the `position` command:
    /// `position [startpos | fen <FEN>] [moves <move>...]`.
    fn set_position(&mut self, tokens: SplitWhitespace<'_>) {
        let tokens: Vec<&str> = tokens.collect();
        let (position, moves) = match tokens.iter().position(|&token| token == "moves") {
            Some(idx) => (&tokens[..idx], &tokens[idx + 1..]),
            None => (&tokens[..], &[][..]),
        };

        let fen = match position.first() {
            Some(&"startpos") => START_FEN.to_string(),
            Some(&"fen") => position[1..].join(" "),
            _ => return println!("info string Expected \"startpos\" or \"fen\"."),
        };
        match Board::from_fen(&fen) {
            Ok(board) => self.board = board,
            Err(error) => return println!("info string Invalid position: {error}."),
        }

        for move_str in moves {
            if !self.play_move(move_str) {
                return println!("info string Cannot play \"{move_str}\".");
            }
        }
    }

    /// Plays a move given in long algebraic notation, if it is one of the
    /// legal moves of the current position.
    fn play_move(&mut self, move_str: &str) -> bool {
        let (Some(start), Some(end)) = (
            move_str.get(0..2).and_then(Square::from_string),
            move_str.get(2..4).and_then(Square::from_string),
        ) else {
            return false;
        };
        let promotion_piece = move_str.chars().nth(4).and_then(PieceType::from_char);
        if move_str.len() > 5 || (move_str.len() == 5 && promotion_piece.is_none()) {
            return false;
        }

        let mut moves = Moves::new();
        generate_moves::<AllMoves>(&self.board, &mut moves);
        match moves.move_with(start, end, promotion_piece) {
            Some(mv) => {
                self.board.make_move(mv);
                true
            }
            None => false,
        }
    }
}
