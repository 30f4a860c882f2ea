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

//! Ray-walked sliding attacks.
//!
//! Slow but obviously correct: used to build the magic tables and as the
//! oracle the magic lookups are tested against.

use crate::{
    bitboard::Bitboard,
    defs::{Direction, PieceType, Square},
};

/// The four directions a bishop slides in.
const BISHOP_DIRECTIONS: [Direction; 4] =
    [Direction::NE, Direction::SE, Direction::SW, Direction::NW];
/// The four directions a rook slides in.
const ROOK_DIRECTIONS: [Direction; 4] = [Direction::N, Direction::E, Direction::S, Direction::W];

/// Checks if a piece on `square` can step once in the given direction
/// without leaving the board.
// credit to Stockfish for the wrap check: if the step wrapped around the
// board edge, the file distance comes out larger than 1
fn can_step(square: Square, direction: Direction) -> bool {
    let dest = square + direction;
    dest.is_valid() && square.horizontal_distance(dest) <= 1
}

/// Generates an attack from `square` in the given direction up to and
/// including the first square found in `blockers`, or the board edge.
///
/// `blockers` is assumed not to include `square` itself.
pub fn ray_attack(square: Square, direction: Direction, blockers: Bitboard) -> Bitboard {
    let mut attacks = Bitboard::EMPTY;
    let mut square = square;
    while can_step(square, direction) && !blockers.contains(square) {
        square = square + direction;
        attacks |= Bitboard::from_square(square);
    }
    attacks
}

/// Generates the attack set of a bishop or rook on `square`, walking each of
/// its four rays up to and including the given blockers and/or the edge.
pub fn sliding_attacks(piece_type: PieceType, square: Square, blockers: Bitboard) -> Bitboard {
    debug_assert!(
        piece_type == PieceType::BISHOP || piece_type == PieceType::ROOK,
        "only bishops and rooks slide"
    );
    let directions = if piece_type == PieceType::BISHOP {
        BISHOP_DIRECTIONS
    } else {
        ROOK_DIRECTIONS
    };

    let mut attacks = Bitboard::EMPTY;
    for direction in directions {
        attacks |= ray_attack(square, direction, blockers);
    }
    attacks
}

#[cfg(test)]
mod tests {
    use super::sliding_attacks;
    use crate::{
        bitboard::Bitboard,
        defs::{PieceType, Square},
    };

    #[test]
    fn rook_on_empty_board() {
        let attacks = sliding_attacks(PieceType::ROOK, Square::A1, Bitboard::EMPTY);
        // the whole of the A-file and first rank, minus A1 itself
        assert_eq!(attacks, Bitboard(0x0101_0101_0101_01fe));
    }

    #[test]
    fn bishop_stops_at_blockers() {
        let blockers = Bitboard::from_square(Square::F6);
        let attacks = sliding_attacks(PieceType::BISHOP, Square::D4, blockers);
        // the north-east ray ends on the blocker
        assert!(attacks.contains(Square::E5));
        assert!(attacks.contains(Square::F6));
        assert!(!attacks.contains(Square::G7));
        // the other rays run to the edge
        assert!(attacks.contains(Square::A1));
        assert!(attacks.contains(Square::A7));
        assert!(attacks.contains(Square::G1));
    }

    #[test]
    fn rays_do_not_wrap() {
        let attacks = sliding_attacks(PieceType::BISHOP, Square::H4, Bitboard::EMPTY);
        assert!(attacks.contains(Square::G5));
        assert!(attacks.contains(Square::G3));
        assert!(!attacks.contains(Square::A5));
        assert!(!attacks.contains(Square::A3));
    }
}
