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

//! The per-move state frame of a [`Board`].

use super::Board;
use crate::{
    bitboard::Bitboard,
    defs::{CastlingRights, Piece, PieceType, Side, Square},
    lookups::LOOKUPS,
};

/// Everything about a position that a move can change irreversibly, plus
/// the check and pin data derived from the placement.
///
/// Making a move pushes a new frame onto the board's history; undoing pops
/// it, which restores all of this wholesale.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct State {
    /// The square a pawn that just advanced two squares skipped, or
    /// [`Square::NONE`].
    pub(crate) ep_square: Square,
    /// The castling rights still held by either side.
    pub(crate) castling_rights: CastlingRights,
    /// Halfmoves since the last capture or pawn move.
    pub(crate) halfmove_clock: u16,
    /// Halfmoves since the last null move.
    // kept up to date even though nothing here plays null moves yet
    pub(crate) plies_from_null: u16,
    /// The piece the move that created this frame captured, or
    /// [`Piece::NONE`].
    pub(crate) captured_piece: Piece,
    /// The enemy pieces currently giving check to the side to move.
    pub(crate) checkers: Bitboard,
    /// Per side, the pieces of either colour that are the sole shield
    /// between that side's king and an enemy slider.
    pub(crate) king_blockers: [Bitboard; Side::TOTAL],
    /// Per side, that side's sliders that pin an enemy piece against the
    /// enemy king.
    pub(crate) pinners: [Bitboard; Side::TOTAL],
    /// Per piece type, the squares from which a piece of the side to move
    /// would give check.
    pub(crate) check_squares: [Bitboard; PieceType::TOTAL],
}

impl State {
    /// Returns a blank frame.
    pub(crate) fn new() -> Self {
        Self {
            ep_square: Square::NONE,
            castling_rights: CastlingRights::NONE,
            halfmove_clock: 0,
            plies_from_null: 0,
            captured_piece: Piece::NONE,
            checkers: Bitboard::EMPTY,
            king_blockers: [Bitboard::EMPTY; Side::TOTAL],
            pinners: [Bitboard::EMPTY; Side::TOTAL],
            check_squares: [Bitboard::EMPTY; PieceType::TOTAL],
        }
    }
}

impl Board {
    /// Rebuilds the derived fields of the current frame from the piece
    /// placement: checkers, king blockers, pinners and check squares.
    ///
    /// Called after parsing a position and after every made move. Undoing
    /// needs nothing: popping the frame restores the previous data.
    pub(crate) fn update_check_info(&mut self) {
        let us = self.side_to_move();
        let them = us.flip();
        let occupancies = self.occupancies();

        let checkers =
            self.attackers_to(self.king_square(us), occupancies) & self.side_bb(them);

        let mut king_blockers = [Bitboard::EMPTY; Side::TOTAL];
        let mut pinners = [Bitboard::EMPTY; Side::TOTAL];
        for side in [Side::WHITE, Side::BLACK] {
            let (blockers, their_pinners) =
                self.slider_blockers(self.side_bb(side.flip()), self.king_square(side));
            king_blockers[side.to_index()] = blockers;
            pinners[side.flip().to_index()] = their_pinners;
        }

        let their_king = self.king_square(them);
        let mut check_squares = [Bitboard::EMPTY; PieceType::TOTAL];
        check_squares[PieceType::PAWN.to_index()] = LOOKUPS.pawn_attacks(them, their_king);
        check_squares[PieceType::KNIGHT.to_index()] = LOOKUPS.knight_attacks(their_king);
        check_squares[PieceType::BISHOP.to_index()] =
            LOOKUPS.bishop_attacks(their_king, occupancies);
        check_squares[PieceType::ROOK.to_index()] = LOOKUPS.rook_attacks(their_king, occupancies);
        check_squares[PieceType::QUEEN.to_index()] = check_squares
            [PieceType::BISHOP.to_index()]
            | check_squares[PieceType::ROOK.to_index()];

        let state = self.state_mut();
        state.checkers = checkers;
        state.king_blockers = king_blockers;
        state.pinners = pinners;
        state.check_squares = check_squares;
    }
}

/// Accessors for the current frame.
impl Board {
    /// The en passant square, or [`Square::NONE`].
    pub fn ep_square(&self) -> Square {
        self.state().ep_square
    }

    /// The castling rights still held by either side.
    pub fn castling_rights(&self) -> CastlingRights {
        self.state().castling_rights
    }

    /// Halfmoves since the last capture or pawn move.
    pub fn halfmove_clock(&self) -> u16 {
        self.state().halfmove_clock
    }

    /// Halfmoves since the last null move.
    pub fn plies_from_null(&self) -> u16 {
        self.state().plies_from_null
    }

    /// The enemy pieces currently giving check to the side to move.
    pub fn checkers(&self) -> Bitboard {
        self.state().checkers
    }

    /// Checks if the side to move is in check.
    pub fn is_in_check(&self) -> bool {
        !self.checkers().is_empty()
    }

    /// The pieces of `side` that shield their own king from an enemy
    /// slider.
    pub fn pinned(&self, side: Side) -> Bitboard {
        self.state().king_blockers[side.to_index()] & self.side_bb(side)
    }

    /// The pieces of `side` whose move would uncover a slider attack on
    /// the enemy king.
    pub fn discovery_candidates(&self, side: Side) -> Bitboard {
        self.state().king_blockers[side.flip().to_index()] & self.side_bb(side)
    }

    /// The sliders of `side` that pin an enemy piece against the enemy
    /// king.
    pub fn pinners(&self, side: Side) -> Bitboard {
        self.state().pinners[side.to_index()]
    }

    /// The squares from which a piece of the given type, belonging to the
    /// side to move, would give check.
    pub fn check_squares(&self, piece_type: PieceType) -> Bitboard {
        self.state().check_squares[piece_type.to_index()]
    }
}
