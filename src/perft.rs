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

//! Perft: see <https://www.chessprogramming.org/Perft>.
//!
//! Exhaustively counts the leaves of the move tree to a fixed depth. Any
//! disagreement with the known counts pins down a generator or make/undo
//! bug, which makes this the regression oracle for everything else here.

use std::{str::FromStr, time::Instant};

use crate::{
    board::Board,
    error::ParseError,
    movegen::{generate_moves, AllMoves, Moves},
};

/// Counts the number of leaf nodes `depth` moves in the future.
///
/// If `PRINT_MOVES`, also prints each root move followed by the number of
/// leaf nodes reached from it, then the total. If `IS_TIMED`, prints the
/// elapsed time and nodes per second at the end.
pub fn perft<const PRINT_MOVES: bool, const IS_TIMED: bool>(
    board: &mut Board,
    depth: u32,
) -> u64 {
    if IS_TIMED {
        let time = Instant::now();
        let result = perft::<PRINT_MOVES, false>(board, depth);
        let elapsed_us = time.elapsed().as_micros() as u64;
        println!(
            "Time taken: {} ms; NPS: {}",
            elapsed_us / 1_000,
            1_000_000 * result / elapsed_us.max(1)
        );
        return result;
    }

    if depth == 0 {
        if PRINT_MOVES {
            println!("1");
        }
        return 1;
    }

    let mut moves = Moves::new();
    generate_moves::<AllMoves>(board, &mut moves);

    // at the horizon the length of the list is the answer
    if depth == 1 && !PRINT_MOVES {
        return moves.len() as u64;
    }

    let mut total = 0;
    for mv in moves.iter().copied() {
        let count = if depth == 1 {
            1
        } else {
            board.make_move(mv);
            let count = perft::<false, false>(board, depth - 1);
            board.undo_move(mv);
            count
        };
        total += count;
        if PRINT_MOVES {
            println!("{mv}: {count}");
        }
    }
    if PRINT_MOVES {
        println!("Total: {total}");
    }
    total
}

/// One line of the perft regression format:
/// `<depth> <expected_nodes> <FEN>`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PerftCase {
    /// The depth to count to.
    pub depth: u32,
    /// The known-correct number of leaves.
    pub expected_nodes: u64,
    /// The position to count from.
    pub fen: String,
}

impl FromStr for PerftCase {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = line.trim().splitn(3, char::is_whitespace);
        let depth = tokens
            .next()
            .ok_or(ParseError::ExpectedToken)?
            .parse()
            .map_err(|_| ParseError::InvalidToken)?;
        let expected_nodes = tokens
            .next()
            .ok_or(ParseError::ExpectedToken)?
            .parse()
            .map_err(|_| ParseError::InvalidToken)?;
        let fen = tokens.next().ok_or(ParseError::ExpectedToken)?.to_string();
        Ok(Self {
            depth,
            expected_nodes,
            fen,
        })
    }
}

impl PerftCase {
    /// Sets up the case's position and counts its leaves.
    pub fn run(&self) -> Result<u64, ParseError> {
        let mut board = Board::from_fen(&self.fen)?;
        Ok(perft::<false, false>(&mut board, self.depth))
    }
}

#[cfg(test)]
mod tests {
    use super::{perft, PerftCase};
    use crate::board::{Board, START_FEN};

    #[test]
    fn shallow_counts() {
        let mut board = Board::new();
        assert_eq!(perft::<false, false>(&mut board, 0), 1);
        assert_eq!(perft::<false, false>(&mut board, 1), 20);
        assert_eq!(perft::<false, false>(&mut board, 2), 400);
        assert_eq!(perft::<false, false>(&mut board, 3), 8_902);
        // the board comes back untouched
        assert_eq!(board, Board::new());

        let mut board =
            Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
                .unwrap();
        assert_eq!(perft::<false, false>(&mut board, 1), 48);
        assert_eq!(perft::<false, false>(&mut board, 2), 2_039);
    }

    #[test]
    fn case_lines_parse() {
        let case: PerftCase = format!("3 8902 {START_FEN}").parse().unwrap();
        assert_eq!(case.depth, 3);
        assert_eq!(case.expected_nodes, 8_902);
        assert_eq!(case.fen, START_FEN);
        assert_eq!(case.run().unwrap(), case.expected_nodes);

        assert!("".parse::<PerftCase>().is_err());
        assert!("3".parse::<PerftCase>().is_err());
        assert!("x 1 8/8/8/8/8/8/8/8 w - - 0 1".parse::<PerftCase>().is_err());
    }
}
