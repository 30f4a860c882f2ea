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

//! Krill, a bitboard chess move generator.
//!
//! Accepted commands:
//! - `go perft <depth>` or `perft <depth>`: count the leaves of the move
//!   tree, with per-move and total counts
//! - `isready`
//! - `p`: pretty-print the current board
//! - `position [startpos | fen <FEN>] [moves <move>...]`
//! - `uci`
//! - `ucinewgame`
//! - `quit`

use std::io;

use krill::engine::Engine;

fn main() -> Result<(), io::Error> {
    Engine::new().main_loop()
}
