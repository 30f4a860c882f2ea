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

//! Items related to the board. Mainly [`Board`].

use std::fmt::{self, Display, Formatter};

use crate::{
    bitboard::Bitboard,
    defs::{CastlingRights, Direction, File, Piece, PieceType, Rank, Side, Square},
    lookups::{self, LOOKUPS},
    movegen::Move,
};
use self::state::State;

pub use self::fen::START_FEN;

/// Reading and writing FEN.
pub mod fen;
/// The per-move state frame.
pub mod state;

/// Stores the current state of a game of chess.
///
/// The placement is kept three ways at once: a mailbox of pieces by square,
/// a bitboard per piece type (with the all-piece union at index 0) and a
/// bitboard per side. The irreversible and derived parts of the state live
/// in a stack of [`State`] frames, one pushed per made move.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Board {
    /// The piece on each square, or [`Piece::NONE`].
    piece_board: [Piece; Square::TOTAL],
    /// One bitboard per piece type; index 0 holds all occupied squares.
    piece_bbs: [Bitboard; PieceType::TOTAL],
    /// One bitboard per side.
    side_bbs: [Bitboard; Side::TOTAL],
    /// How many of each encoded piece are on the board; the per-side
    /// occupancy aliases at indices 0 and 8 count whole armies.
    piece_counts: [u8; Piece::TOTAL],
    /// The side to move.
    side_to_move: Side,
    /// Halfmoves played since the start of the game.
    ply: u32,
    /// Per square, the castling rights that touching the square revokes.
    ///
    /// Filled in once at parse time for the four home squares of the
    /// declared rights; zero everywhere else.
    castling_masks: [CastlingRights; Square::TOTAL],
    /// The frame stack. Never empty; the last element is the current
    /// frame.
    history: Vec<State>,
}

impl Board {
    /// Creates a new [`Board`] initialised with the state of the starting
    /// position and initialises the static lookup tables.
    #[must_use]
    pub fn new() -> Self {
        lookups::init();
        Self::from_fen(START_FEN).expect("the starting position FEN is valid")
    }

    /// Returns a [`Board`] with no pieces on it.
    fn empty() -> Self {
        Self {
            piece_board: [Piece::NONE; Square::TOTAL],
            piece_bbs: [Bitboard::EMPTY; PieceType::TOTAL],
            side_bbs: [Bitboard::EMPTY; Side::TOTAL],
            piece_counts: [0; Piece::TOTAL],
            side_to_move: Side::WHITE,
            ply: 0,
            castling_masks: [CastlingRights::NONE; Square::TOTAL],
            history: vec![State::new()],
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Accessors.
impl Board {
    /// The side to move.
    pub fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    /// Halfmoves played since the start of the game.
    pub fn ply(&self) -> u32 {
        self.ply
    }

    /// The fullmove number, as FEN counts it.
    pub fn fullmoves(&self) -> u32 {
        self.ply / 2 + 1
    }

    /// All occupied squares.
    pub fn occupancies(&self) -> Bitboard {
        self.piece_bbs[PieceType::ALL.to_index()]
    }

    /// The squares occupied by `side`.
    pub fn side_bb(&self, side: Side) -> Bitboard {
        self.side_bbs[side.to_index()]
    }

    /// The squares occupied by pieces of the given type, either side.
    pub fn piece_bb(&self, piece_type: PieceType) -> Bitboard {
        self.piece_bbs[piece_type.to_index()]
    }

    /// The squares occupied by pieces of the given type and side.
    pub fn pieces(&self, piece_type: PieceType, side: Side) -> Bitboard {
        self.piece_bb(piece_type) & self.side_bb(side)
    }

    /// The piece on `square`, or [`Piece::NONE`].
    pub fn piece_on(&self, square: Square) -> Piece {
        self.piece_board[square.to_index()]
    }

    /// How many of the given encoded piece are on the board.
    pub fn piece_count(&self, piece: Piece) -> u8 {
        self.piece_counts[piece.to_index()]
    }

    /// The square of the king of `side`.
    pub fn king_square(&self, side: Side) -> Square {
        self.pieces(PieceType::KING, side).to_square()
    }

    /// The current frame.
    pub(crate) fn state(&self) -> &State {
        self.history.last().expect("the frame stack is never empty")
    }

    /// The current frame, mutably.
    pub(crate) fn state_mut(&mut self) -> &mut State {
        self.history
            .last_mut()
            .expect("the frame stack is never empty")
    }
}

/// Piece placement primitives.
///
/// Each keeps the mailbox, the three bitboard families and the counts in
/// agreement.
impl Board {
    /// Puts `piece` on the empty square `square`.
    pub(crate) fn place_piece(&mut self, piece: Piece, square: Square) {
        debug_assert!(self.piece_on(square) == Piece::NONE);
        let bb = Bitboard::from_square(square);
        self.piece_board[square.to_index()] = piece;
        self.piece_bbs[PieceType::ALL.to_index()] |= bb;
        self.piece_bbs[piece.piece_type().to_index()] |= bb;
        self.side_bbs[piece.side().to_index()] |= bb;
        self.piece_counts[piece.to_index()] += 1;
        self.piece_counts[Piece::new(piece.side(), PieceType::ALL).to_index()] += 1;
    }

    /// Removes the piece on `square`.
    pub(crate) fn remove_piece(&mut self, square: Square) {
        let piece = self.piece_on(square);
        debug_assert!(piece != Piece::NONE);
        let bb = Bitboard::from_square(square);
        self.piece_board[square.to_index()] = Piece::NONE;
        self.piece_bbs[PieceType::ALL.to_index()] ^= bb;
        self.piece_bbs[piece.piece_type().to_index()] ^= bb;
        self.side_bbs[piece.side().to_index()] ^= bb;
        self.piece_counts[piece.to_index()] -= 1;
        self.piece_counts[Piece::new(piece.side(), PieceType::ALL).to_index()] -= 1;
    }

    /// Moves the piece on `start` to the empty square `end`.
    pub(crate) fn move_piece(&mut self, start: Square, end: Square) {
        let piece = self.piece_on(start);
        debug_assert!(piece != Piece::NONE);
        debug_assert!(self.piece_on(end) == Piece::NONE);
        let bb = Bitboard::from_square(start) | Bitboard::from_square(end);
        self.piece_board[start.to_index()] = Piece::NONE;
        self.piece_board[end.to_index()] = piece;
        self.piece_bbs[PieceType::ALL.to_index()] ^= bb;
        self.piece_bbs[piece.piece_type().to_index()] ^= bb;
        self.side_bbs[piece.side().to_index()] ^= bb;
    }
}

/// Attack queries.
impl Board {
    /// All pieces of either side that attack `square`, with `occupancies`
    /// as the blocking pieces.
    pub fn attackers_to(&self, square: Square, occupancies: Bitboard) -> Bitboard {
        let rooks_queens = self.piece_bb(PieceType::ROOK) | self.piece_bb(PieceType::QUEEN);
        let bishops_queens = self.piece_bb(PieceType::BISHOP) | self.piece_bb(PieceType::QUEEN);

        (LOOKUPS.pawn_attacks(Side::BLACK, square) & self.pieces(PieceType::PAWN, Side::WHITE))
            | (LOOKUPS.pawn_attacks(Side::WHITE, square)
                & self.pieces(PieceType::PAWN, Side::BLACK))
            | (LOOKUPS.knight_attacks(square) & self.piece_bb(PieceType::KNIGHT))
            | (LOOKUPS.rook_attacks(square, occupancies) & rooks_queens)
            | (LOOKUPS.bishop_attacks(square, occupancies) & bishops_queens)
            | (LOOKUPS.king_attacks(square) & self.piece_bb(PieceType::KING))
    }

    /// Finds the pieces shielding `square` from the sliders in `sliders`,
    /// and which of those sliders pin a shield of the same side as the
    /// piece on `square`.
    ///
    /// A shield is the single piece, of either side, standing between
    /// `square` and a slider whose line would otherwise reach it. Returns
    /// `(shields, pinning sliders)`.
    pub fn slider_blockers(&self, sliders: Bitboard, square: Square) -> (Bitboard, Bitboard) {
        let mut blockers = Bitboard::EMPTY;
        let mut pinners = Bitboard::EMPTY;

        let rooks_queens = self.piece_bb(PieceType::ROOK) | self.piece_bb(PieceType::QUEEN);
        let bishops_queens = self.piece_bb(PieceType::BISHOP) | self.piece_bb(PieceType::QUEEN);
        // snipers: sliders that would attack the square over an otherwise
        // empty board
        let snipers = ((LOOKUPS.rook_attacks(square, Bitboard::EMPTY) & rooks_queens)
            | (LOOKUPS.bishop_attacks(square, Bitboard::EMPTY) & bishops_queens))
            & sliders;
        let occupancies = self.occupancies() ^ snipers;

        let defended_side = self.piece_on(square).side();
        for sniper in snipers {
            let shield = LOOKUPS.between(square, sniper) & occupancies;
            if !shield.is_empty() && !shield.more_than_one() {
                blockers |= shield;
                if !(shield & self.side_bb(defended_side)).is_empty() {
                    pinners |= Bitboard::from_square(sniper);
                }
            }
        }
        (blockers, pinners)
    }
}

/// Making and undoing moves.
impl Board {
    /// Plays `mv`, which must be legal in the current position, and pushes
    /// a new frame.
    pub fn make_move(&mut self, mv: Move) {
        let mut state = *self.state();
        let us = self.side_to_move;
        let them = us.flip();
        let start = mv.start();
        let end = mv.end();
        let piece = self.piece_on(start);
        let up = Direction::pawn_push(us);

        self.ply += 1;
        state.halfmove_clock += 1;
        state.plies_from_null += 1;

        let mut captured = Piece::NONE;
        if mv.is_castling() {
            let (rook_start, rook_end) = Self::castling_rook_squares(start, end);
            self.move_piece(start, end);
            self.move_piece(rook_start, rook_end);
        } else {
            captured = if mv.is_en_passant() {
                Piece::new(them, PieceType::PAWN)
            } else {
                self.piece_on(end)
            };
            if captured != Piece::NONE {
                let capture_square = if mv.is_en_passant() { end - up } else { end };
                self.remove_piece(capture_square);
                state.halfmove_clock = 0;
            }
            self.move_piece(start, end);
        }

        // touching a home square of a right revokes it, whether by the
        // king or rook leaving or by the rook being captured
        state.castling_rights &= !(self.castling_masks[start.to_index()]
            | self.castling_masks[end.to_index()]);

        state.ep_square = Square::NONE;
        if piece.piece_type() == PieceType::PAWN {
            // record the skipped square of a double push, but only when an
            // enemy pawn could actually capture onto it
            if (start.0 ^ end.0) == 16
                && !(LOOKUPS.pawn_attacks(us, end - up) & self.pieces(PieceType::PAWN, them))
                    .is_empty()
            {
                state.ep_square = end - up;
            }
            if mv.is_promotion() {
                self.remove_piece(end);
                self.place_piece(Piece::new(us, mv.promotion_piece()), end);
            }
            state.halfmove_clock = 0;
        }

        state.captured_piece = captured;
        self.side_to_move = them;
        self.history.push(state);
        self.update_check_info();
    }

    /// Takes back `mv`, which must be the last move made, and pops its
    /// frame.
    pub fn undo_move(&mut self, mv: Move) {
        let state = self.history.pop().expect("no move to undo");
        self.side_to_move = self.side_to_move.flip();
        let us = self.side_to_move;
        let start = mv.start();
        let end = mv.end();
        let up = Direction::pawn_push(us);

        self.ply -= 1;

        if mv.is_promotion() {
            self.remove_piece(end);
            self.place_piece(Piece::new(us, PieceType::PAWN), end);
        }

        if mv.is_castling() {
            let (rook_start, rook_end) = Self::castling_rook_squares(start, end);
            self.move_piece(end, start);
            self.move_piece(rook_end, rook_start);
        } else {
            self.move_piece(end, start);
            if state.captured_piece != Piece::NONE {
                let capture_square = if mv.is_en_passant() { end - up } else { end };
                self.place_piece(state.captured_piece, capture_square);
            }
        }
    }

    /// The start and end square of the rook in a castling move with the
    /// given king squares.
    fn castling_rook_squares(start: Square, end: Square) -> (Square, Square) {
        if end.0 > start.0 {
            (end + Direction::E, end + Direction::W)
        } else {
            (end + Direction::W + Direction::W, end + Direction::E)
        }
    }
}

impl Display for Board {
    /// The board as an 8x8 grid of piece letters, rank 8 first, with the
    /// FEN string underneath.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for r in (Rank::RANK1.0..=Rank::RANK8.0).rev() {
            write!(f, "{} | ", r + 1)?;
            for file in File::FILE1.0..=File::FILE8.0 {
                let piece = self.piece_on(Square::from_pos(Rank(r), File(file)));
                let c = if piece == Piece::NONE {
                    '.'
                } else {
                    char::from(piece)
                };
                write!(f, "{c} ")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "    ---------------")?;
        writeln!(f, "    a b c d e f g h")?;
        writeln!(f)?;
        writeln!(f, "FEN: {}", self.to_fen())
    }
}

#[cfg(test)]
mod tests {
    use super::Board;
    use crate::{
        bitboard::Bitboard,
        defs::{CastlingRights, Piece, PieceType, Side, Square},
        movegen::{generate_moves, AllMoves, Move, Moves},
    };

    /// Checks the bookkeeping invariants: the bitboard families agree with
    /// the mailbox and with each other.
    fn assert_consistent(board: &Board) {
        let mut all = Bitboard::EMPTY;
        for piece_type in 1..PieceType::TOTAL {
            all |= board.piece_bb(PieceType(piece_type as u8));
        }
        assert_eq!(all, board.occupancies());
        assert_eq!(
            board.side_bb(Side::WHITE) | board.side_bb(Side::BLACK),
            board.occupancies()
        );
        assert!((board.side_bb(Side::WHITE) & board.side_bb(Side::BLACK)).is_empty());

        for square_idx in 0..Square::TOTAL {
            let square = Square(square_idx as u8);
            let piece = board.piece_on(square);
            if piece == Piece::NONE {
                assert!(!board.occupancies().contains(square));
            } else {
                assert!(board.pieces(piece.piece_type(), piece.side()).contains(square));
            }
        }

        assert_eq!(board.pieces(PieceType::KING, Side::WHITE).count_ones(), 1);
        assert_eq!(board.pieces(PieceType::KING, Side::BLACK).count_ones(), 1);
    }

    #[test]
    fn quiet_moves_and_captures() {
        let mut board = Board::new();
        board.make_move(Move::new(Square::E2, Square::E4));
        assert_eq!(board.side_to_move(), Side::BLACK);
        assert_eq!(board.ply(), 1);
        assert_eq!(board.plies_from_null(), 1);
        assert_eq!(
            board.piece_on(Square::E4),
            Piece::new(Side::WHITE, PieceType::PAWN)
        );
        assert_eq!(board.piece_on(Square::E2), Piece::NONE);
        // a double push with no enemy pawn to capture it leaves no ep square
        assert_eq!(board.ep_square(), Square::NONE);
        assert_consistent(&board);

        board.make_move(Move::new(Square::D7, Square::D5));
        // exd5 is an ordinary capture, not en passant, so the double push
        // records no ep square either
        assert_eq!(board.ep_square(), Square::NONE);
        board.make_move(Move::new(Square::E4, Square::D5));
        assert_eq!(board.halfmove_clock(), 0);
        assert_eq!(
            board.piece_count(Piece::new(Side::BLACK, PieceType::PAWN)),
            7
        );
        assert_consistent(&board);

        board.undo_move(Move::new(Square::E4, Square::D5));
        board.undo_move(Move::new(Square::D7, Square::D5));
        board.undo_move(Move::new(Square::E2, Square::E4));
        assert_eq!(board, Board::new());
    }

    #[test]
    fn double_push_records_a_capturable_ep_square() {
        let mut board = Board::new();
        board.make_move(Move::new(Square::E2, Square::E4));
        board.make_move(Move::new(Square::A7, Square::A6));
        board.make_move(Move::new(Square::E4, Square::E5));
        board.make_move(Move::new(Square::D7, Square::D5));
        // now the e5 pawn really can capture on d6
        assert_eq!(board.ep_square(), Square::D6);
    }

    #[test]
    fn castling_moves_both_pieces() {
        let mut board =
            Board::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        let before = board.clone();

        let mv = Move::new_castle(Square::E1, Square::G1);
        board.make_move(mv);
        assert_eq!(
            board.piece_on(Square::G1),
            Piece::new(Side::WHITE, PieceType::KING)
        );
        assert_eq!(
            board.piece_on(Square::F1),
            Piece::new(Side::WHITE, PieceType::ROOK)
        );
        assert_eq!(board.piece_on(Square::E1), Piece::NONE);
        assert_eq!(board.piece_on(Square::H1), Piece::NONE);
        assert!(!board.castling_rights().can_castle_kingside(Side::WHITE));
        assert!(!board.castling_rights().can_castle_queenside(Side::WHITE));
        assert!(board.castling_rights().can_castle_kingside(Side::BLACK));
        assert_consistent(&board);

        board.undo_move(mv);
        assert_eq!(board, before);

        let mv = Move::new_castle(Square::E1, Square::C1);
        board.make_move(mv);
        assert_eq!(
            board.piece_on(Square::C1),
            Piece::new(Side::WHITE, PieceType::KING)
        );
        assert_eq!(
            board.piece_on(Square::D1),
            Piece::new(Side::WHITE, PieceType::ROOK)
        );
        assert_consistent(&board);
        board.undo_move(mv);
        assert_eq!(board, before);
    }

    #[test]
    fn capturing_a_rook_revokes_the_right() {
        let mut board =
            Board::from_fen("r3k2r/pppppppp/1N6/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        board.make_move(Move::new(Square::B6, Square::A8));
        assert_eq!(
            board.castling_rights(),
            CastlingRights::WHITE_KINGSIDE
                | CastlingRights::WHITE_QUEENSIDE
                | CastlingRights::BLACK_KINGSIDE
        );
    }

    #[test]
    fn en_passant_and_promotion() {
        let mut board = Board::from_fen("4k3/1P6/8/4pP2/8/8/8/4K3 w - e6 0 1").unwrap();
        let before = board.clone();

        let ep = Move::new_en_passant(Square::F5, Square::E6);
        board.make_move(ep);
        assert_eq!(
            board.piece_on(Square::E6),
            Piece::new(Side::WHITE, PieceType::PAWN)
        );
        assert_eq!(board.piece_on(Square::E5), Piece::NONE);
        assert_eq!(board.piece_count(Piece::new(Side::BLACK, PieceType::PAWN)), 0);
        assert_consistent(&board);
        board.undo_move(ep);
        assert_eq!(board, before);

        let promo = Move::new_promo(Square::B7, Square::B8, PieceType::QUEEN);
        board.make_move(promo);
        assert_eq!(
            board.piece_on(Square::B8),
            Piece::new(Side::WHITE, PieceType::QUEEN)
        );
        assert_eq!(board.piece_count(Piece::new(Side::WHITE, PieceType::PAWN)), 1);
        assert_consistent(&board);
        board.undo_move(promo);
        assert_eq!(board, before);
    }

    #[test]
    fn make_undo_restores_everything() {
        // every legal move in a position with a bit of everything
        let mut board =
            Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
                .unwrap();
        let before = board.clone();

        let mut moves = Moves::new();
        generate_moves::<AllMoves>(&board, &mut moves);
        assert_eq!(moves.len(), 48);

        for mv in moves.iter().copied() {
            board.make_move(mv);
            assert_consistent(&board);
            // the side that just moved must never be left in check
            let mover = board.side_to_move().flip();
            assert!(
                (board.attackers_to(board.king_square(mover), board.occupancies())
                    & board.side_bb(board.side_to_move()))
                .is_empty(),
                "{mv} leaves the mover in check",
            );
            board.undo_move(mv);
            assert_eq!(board, before, "{mv} did not undo cleanly");
        }
    }

    #[test]
    fn slider_blockers_finds_pins() {
        // the e7 rook is the lone shield between its king and the e2 rook
        let board = Board::from_fen("4k3/4r3/8/8/8/8/4R3/4K3 w - - 0 1").unwrap();
        assert_eq!(board.pinned(Side::BLACK), Bitboard::from_square(Square::E7));
        assert!(board.pinned(Side::WHITE).is_empty());
        assert_eq!(board.pinners(Side::WHITE), Bitboard::from_square(Square::E2));
        assert!(board.pinners(Side::BLACK).is_empty());
    }

    #[test]
    fn slider_blockers_finds_discoveries() {
        // the e5 knight shields the enemy king from its own rook, so
        // moving it would uncover a check
        let board = Board::from_fen("4k3/8/8/4N3/8/8/4R3/4K3 w - - 0 1").unwrap();
        assert_eq!(
            board.discovery_candidates(Side::WHITE),
            Bitboard::from_square(Square::E5)
        );
        assert!(board.pinned(Side::BLACK).is_empty());
        assert!(board.pinners(Side::WHITE).is_empty());
    }
}
