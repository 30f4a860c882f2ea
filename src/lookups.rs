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

//! Attack lookup tables, built once per process.
//!
//! Pawn, knight and king attacks come straight from shift rules. Bishop and
//! rook attacks use magic bitboards: a perfect hash from (square, relevant
//! blockers) into two shared attack tables. The magic numbers themselves are
//! searched for at startup with a fixed-seed PRNG, so they come out
//! identical on every run.

use lazy_static::lazy_static;
use oorandom::Rand64;

use crate::{
    bitboard::Bitboard,
    defs::{PieceType, Side, Square},
};
use self::magic::{sparse_rand, Magic, BISHOP_TABLE_SIZE, MAX_BLOCKERS, ROOK_TABLE_SIZE};
use self::util::sliding_attacks;

/// Items related to magic bitboards.
pub mod magic;
/// Ray-walked sliding attacks, for table building and testing.
pub mod util;

/// Contains lookup tables for each piece.
pub struct Lookups {
    /// Pawn attacks, indexed by side then square.
    pawn_attacks: [[Bitboard; Square::TOTAL]; Side::TOTAL],
    /// Knight attacks, indexed by square.
    knight_attacks: [Bitboard; Square::TOTAL],
    /// King attacks, indexed by square.
    king_attacks: [Bitboard; Square::TOTAL],
    /// For two aligned squares, every square of the shared rank, file or
    /// diagonal, both endpoints included; empty otherwise.
    line: [[Bitboard; Square::TOTAL]; Square::TOTAL],
    /// The squares strictly between two aligned squares, plus the second
    /// square itself.
    ///
    /// The second square is included for every pair, aligned or not, so
    /// that the set of squares resolving a check always contains the
    /// checker.
    between: [[Bitboard; Square::TOTAL]; Square::TOTAL],
    /// The per-square magic entries for bishops.
    bishop_magics: [Magic; Square::TOTAL],
    /// The per-square magic entries for rooks.
    rook_magics: [Magic; Square::TOTAL],
    /// The shared bishop attack table all 64 magics index into.
    bishop_table: Vec<Bitboard>,
    /// The shared rook attack table all 64 magics index into.
    rook_table: Vec<Bitboard>,
}

/// The seed of the magic search.
///
/// Any seed works; a fixed one keeps the found magics identical from run to
/// run.
const MAGIC_SEED: u128 = 0x9e37_79b9_7f4a_7c15;

lazy_static! {
    /// The process-wide lookup tables.
    ///
    /// Built on first use and read-only afterwards, so access from any
    /// thread is fine.
    pub static ref LOOKUPS: Lookups = Lookups::new();
}

/// Forces the tables of [`struct@LOOKUPS`] to be built now rather than on
/// first use.
///
/// Idempotent, and never required for correctness.
pub fn init() {
    lazy_static::initialize(&LOOKUPS);
}

impl Lookups {
    /// Builds all the tables.
    fn new() -> Self {
        let mut rand = Rand64::new(MAGIC_SEED);
        let (bishop_magics, bishop_table) =
            Self::build_magics(PieceType::BISHOP, BISHOP_TABLE_SIZE, &mut rand);
        let (rook_magics, rook_table) =
            Self::build_magics(PieceType::ROOK, ROOK_TABLE_SIZE, &mut rand);

        let mut lookups = Self {
            pawn_attacks: [[Bitboard::EMPTY; Square::TOTAL]; Side::TOTAL],
            knight_attacks: [Bitboard::EMPTY; Square::TOTAL],
            king_attacks: [Bitboard::EMPTY; Square::TOTAL],
            line: [[Bitboard::EMPTY; Square::TOTAL]; Square::TOTAL],
            between: [[Bitboard::EMPTY; Square::TOTAL]; Square::TOTAL],
            bishop_magics,
            rook_magics,
            bishop_table,
            rook_table,
        };
        lookups.init_pawn_attacks();
        lookups.init_knight_attacks();
        lookups.init_king_attacks();
        lookups.init_line_and_between();
        lookups
    }

    /// Builds the magic entries and the shared attack table for one slider.
    ///
    /// For each square: strip the board edge off the empty-board attack set
    /// to get the relevant blocker mask, enumerate every subset of the mask
    /// with the Carry-Rippler trick, ray-walk the true attack set of each
    /// subset, then brute-force a magic number that maps every subset to
    /// its own slot of the square's slice of the table.
    fn build_magics(
        piece_type: PieceType,
        table_size: usize,
        rand: &mut Rand64,
    ) -> ([Magic; Square::TOTAL], Vec<Bitboard>) {
        let mut magics = [Magic::empty(); Square::TOTAL];
        let mut table = vec![Bitboard::EMPTY; table_size];

        let mut blockers = [Bitboard::EMPTY; MAX_BLOCKERS];
        let mut reference = [Bitboard::EMPTY; MAX_BLOCKERS];
        // scratch table for verifying candidates, with the epoch trick from
        // Stockfish: stamping each slot with the attempt number saves
        // re-zeroing the whole thing on every failed candidate
        let mut scratch = [Bitboard::EMPTY; MAX_BLOCKERS];
        let mut epoch = [0u32; MAX_BLOCKERS];
        let mut attempts = 0u32;

        let mut offset = 0;
        for square_idx in 0..Square::TOTAL {
            let square = Square(square_idx as u8);
            let mask = sliding_attacks(piece_type, square, Bitboard::EMPTY)
                & !Bitboard::edges_without(square);
            let shift = 64 - mask.count_ones();

            let mut size = 0;
            let mut subset = Bitboard::EMPTY;
            loop {
                blockers[size] = subset;
                reference[size] = sliding_attacks(piece_type, square, subset);
                size += 1;
                subset = Bitboard(subset.wrapping_sub(mask.0) & mask.0);
                if subset.is_empty() {
                    break;
                }
            }

            let magic = loop {
                let candidate = sparse_rand(rand);
                let mut works = true;
                attempts += 1;

                for i in 0..size {
                    let index = (blockers[i].wrapping_mul(candidate) >> shift) as usize;
                    if epoch[index] < attempts {
                        epoch[index] = attempts;
                        scratch[index] = reference[i];
                    } else if scratch[index] != reference[i] {
                        // destructive collision: discard the candidate
                        works = false;
                        break;
                    }
                }
                if works {
                    break candidate;
                }
            };

            let magic = Magic::new(magic, mask, offset, shift);
            for i in 0..size {
                table[magic.index(blockers[i])] = reference[i];
            }
            magics[square_idx] = magic;
            offset += size;
        }

        (magics, table)
    }

    /// Initialises the pawn attack tables for both sides.
    fn init_pawn_attacks(&mut self) {
        for side in [Side::WHITE, Side::BLACK] {
            for (square, bb) in self.pawn_attacks[side.to_index()].iter_mut().enumerate() {
                let pawn = Bitboard::from_square(Square(square as u8));
                *bb = pawn.pawn_attacks(side);
            }
        }
    }

    /// Initialises the knight attack table.
    fn init_knight_attacks(&mut self) {
        for (square, bb) in self.knight_attacks.iter_mut().enumerate() {
            let knight = Bitboard::from_square(Square(square as u8));
            // shortened names to avoid collisions with the methods
            let mut e = knight.east();
            let mut w = knight.west();
            let mut attacks = (e | w).north().north();
            attacks |= (e | w).south().south();
            e = e.east();
            w = w.west();
            attacks |= (e | w).north();
            attacks |= (e | w).south();
            *bb = attacks;
        }
    }

    /// Initialises the king attack table.
    fn init_king_attacks(&mut self) {
        for (square, bb) in self.king_attacks.iter_mut().enumerate() {
            let king = Bitboard::from_square(Square(square as u8));
            let mut attacks = king.east() | king.west() | king;
            attacks |= attacks.north() | attacks.south();
            attacks ^= king;
            *bb = attacks;
        }
    }

    /// Initialises the line and between tables from the slider attacks.
    fn init_line_and_between(&mut self) {
        for from_idx in 0..Square::TOTAL {
            let from = Square(from_idx as u8);
            let from_bb = Bitboard::from_square(from);
            for to_idx in 0..Square::TOTAL {
                let to = Square(to_idx as u8);
                let to_bb = Bitboard::from_square(to);

                for piece_type in [PieceType::BISHOP, PieceType::ROOK] {
                    if !self.attacks(piece_type, from, Bitboard::EMPTY).contains(to) {
                        continue;
                    }
                    let line = (self.attacks(piece_type, from, Bitboard::EMPTY)
                        & self.attacks(piece_type, to, Bitboard::EMPTY))
                        | from_bb
                        | to_bb;
                    let between = self.attacks(piece_type, from, to_bb)
                        & self.attacks(piece_type, to, from_bb);
                    self.line[from_idx][to_idx] = line;
                    self.between[from_idx][to_idx] = between;
                }

                // the destination is always part of the between set, even
                // for unaligned pairs: capturing a checker resolves a check
                // whether or not the checker sits on a ray
                self.between[from_idx][to_idx] |= to_bb;
            }
        }
    }
}

impl Lookups {
    /// Finds the attacks of the given piece type from `square` with the
    /// given blockers.
    ///
    /// Must not be called for pawns, whose attacks depend on their side:
    /// use [`pawn_attacks`](Self::pawn_attacks).
    pub fn attacks(&self, piece_type: PieceType, square: Square, blockers: Bitboard) -> Bitboard {
        debug_assert!(
            piece_type != PieceType::PAWN && piece_type != PieceType::ALL,
            "no attack table for this piece type"
        );
        if piece_type == PieceType::KNIGHT {
            self.knight_attacks(square)
        } else if piece_type == PieceType::BISHOP {
            self.bishop_attacks(square, blockers)
        } else if piece_type == PieceType::ROOK {
            self.rook_attacks(square, blockers)
        } else if piece_type == PieceType::QUEEN {
            self.queen_attacks(square, blockers)
        } else {
            self.king_attacks(square)
        }
    }

    /// Finds the attacks of a pawn of `side` on `square`.
    pub fn pawn_attacks(&self, side: Side, square: Square) -> Bitboard {
        self.pawn_attacks[side.to_index()][square.to_index()]
    }

    /// Finds the knight attacks from `square`.
    pub fn knight_attacks(&self, square: Square) -> Bitboard {
        self.knight_attacks[square.to_index()]
    }

    /// Finds the king attacks from `square`.
    pub fn king_attacks(&self, square: Square) -> Bitboard {
        self.king_attacks[square.to_index()]
    }

    /// Finds the bishop attacks from `square` with the given blockers.
    pub fn bishop_attacks(&self, square: Square, blockers: Bitboard) -> Bitboard {
        self.bishop_table[self.bishop_magics[square.to_index()].index(blockers)]
    }

    /// Finds the rook attacks from `square` with the given blockers.
    pub fn rook_attacks(&self, square: Square, blockers: Bitboard) -> Bitboard {
        self.rook_table[self.rook_magics[square.to_index()].index(blockers)]
    }

    /// Finds the queen attacks from `square` with the given blockers.
    pub fn queen_attacks(&self, square: Square, blockers: Bitboard) -> Bitboard {
        self.bishop_attacks(square, blockers) | self.rook_attacks(square, blockers)
    }

    /// The full rank, file or diagonal through `a` and `b`, both included;
    /// empty if the squares do not share one.
    pub fn line(&self, a: Square, b: Square) -> Bitboard {
        self.line[a.to_index()][b.to_index()]
    }

    /// The squares strictly between `a` and `b`, plus `b` itself.
    pub fn between(&self, a: Square, b: Square) -> Bitboard {
        self.between[a.to_index()][b.to_index()]
    }

    /// Checks if `c` lies on the line through `a` and `b`.
    pub fn is_aligned(&self, a: Square, b: Square, c: Square) -> bool {
        self.line(a, b).contains(c)
    }
}

#[cfg(test)]
mod tests {
    use super::{util::sliding_attacks, LOOKUPS};
    use crate::{
        bitboard::Bitboard,
        defs::{PieceType, Side, Square},
    };

    #[test]
    fn magic_lookups_match_ray_walks() {
        // every (square, blocker subset) pair of both sliders
        for piece_type in [PieceType::BISHOP, PieceType::ROOK] {
            for square_idx in 0..Square::TOTAL {
                let square = Square(square_idx as u8);
                let mask = sliding_attacks(piece_type, square, Bitboard::EMPTY)
                    & !Bitboard::edges_without(square);

                let mut subset = Bitboard::EMPTY;
                loop {
                    assert_eq!(
                        LOOKUPS.attacks(piece_type, square, subset),
                        sliding_attacks(piece_type, square, subset),
                        "disagreement for {piece_type:?} on {square}",
                    );
                    subset = Bitboard(subset.wrapping_sub(mask.0) & mask.0);
                    if subset.is_empty() {
                        break;
                    }
                }
            }
        }
    }

    #[test]
    fn magic_lookups_see_all_blockers() {
        // blockers outside the relevance mask must not change the result
        let blockers = Bitboard::from_square(Square::E4) | Bitboard::from_square(Square::H8);
        assert_eq!(
            LOOKUPS.rook_attacks(Square::E1, blockers),
            sliding_attacks(PieceType::ROOK, Square::E1, blockers)
        );
    }

    #[test]
    fn pseudo_attacks() {
        assert_eq!(
            LOOKUPS.knight_attacks(Square::A1),
            Bitboard::from_square(Square::B3) | Bitboard::from_square(Square::C2)
        );
        assert_eq!(LOOKUPS.king_attacks(Square::E4).count_ones(), 8);
        assert_eq!(LOOKUPS.king_attacks(Square::A1).count_ones(), 3);
        assert_eq!(
            LOOKUPS.pawn_attacks(Side::WHITE, Square::A2),
            Bitboard::from_square(Square::B3)
        );
        assert_eq!(
            LOOKUPS.pawn_attacks(Side::BLACK, Square::E5),
            Bitboard::from_square(Square::D4) | Bitboard::from_square(Square::F4)
        );
    }

    #[test]
    fn queen_is_bishop_plus_rook() {
        let blockers = Bitboard::from_square(Square::D5);
        assert_eq!(
            LOOKUPS.queen_attacks(Square::D1, blockers),
            LOOKUPS.bishop_attacks(Square::D1, blockers) | LOOKUPS.rook_attacks(Square::D1, blockers)
        );
    }

    #[test]
    fn lines_and_betweens() {
        // aligned pair: open ray plus the far endpoint
        let between = LOOKUPS.between(Square::E1, Square::E8);
        assert_eq!(between.count_ones(), 7);
        assert!(between.contains(Square::E2));
        assert!(between.contains(Square::E8));
        assert!(!between.contains(Square::E1));

        // unaligned pair (a knight's move apart): just the far square
        assert_eq!(
            LOOKUPS.between(Square::B1, Square::C3),
            Bitboard::from_square(Square::C3)
        );

        let line = LOOKUPS.line(Square::A1, Square::H8);
        assert!(line.contains(Square::A1));
        assert!(line.contains(Square::D4));
        assert!(line.contains(Square::H8));
        assert_eq!(LOOKUPS.line(Square::A1, Square::B3), Bitboard::EMPTY);

        assert!(LOOKUPS.is_aligned(Square::A1, Square::H8, Square::C3));
        assert!(!LOOKUPS.is_aligned(Square::A1, Square::H8, Square::C4));
    }
}
