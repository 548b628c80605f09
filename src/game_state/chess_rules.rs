//! Canonical chess-rule constants and mailbox geometry.
//!
//! Stores the starting FEN, the 10x12 board layout helpers, the per-piece
//! step tables, and the fixed squares involved in castling.

use crate::game_state::chess_types::*;

/// Standard chess starting position in Forsyth-Edwards Notation (FEN).
pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

pub const BOARD_CELLS: usize = 120;

pub const A1: Square = 21;
pub const C1: Square = 23;
pub const D1: Square = 24;
pub const E1: Square = 25;
pub const F1: Square = 26;
pub const G1: Square = 27;
pub const H1: Square = 28;
pub const A8: Square = 91;
pub const C8: Square = 93;
pub const D8: Square = 94;
pub const E8: Square = 95;
pub const F8: Square = 96;
pub const G8: Square = 97;
pub const H8: Square = 98;

pub const KNIGHT_OFFSETS: [isize; 8] = [-21, -19, -12, -8, 8, 12, 19, 21];
pub const KING_OFFSETS: [isize; 8] = [-11, -10, -9, -1, 1, 9, 10, 11];
pub const BISHOP_DIRECTIONS: [isize; 4] = [-11, -9, 9, 11];
pub const ROOK_DIRECTIONS: [isize; 4] = [-10, -1, 1, 10];
pub const QUEEN_DIRECTIONS: [isize; 8] = KING_OFFSETS;

/// Mailbox index of `(file, rank)`, both `0..8`.
#[inline]
pub const fn square_from_file_rank(file: usize, rank: usize) -> Square {
    21 + file + 10 * rank
}

#[inline]
pub const fn file_of(square: Square) -> usize {
    square % 10 - 1
}

#[inline]
pub const fn rank_of(square: Square) -> usize {
    square / 10 - 2
}

#[inline]
pub const fn is_playable(square: Square) -> bool {
    square >= 21 && square <= 98 && square % 10 != 0 && square % 10 != 9
}

#[inline]
pub fn offset_square(square: Square, offset: isize) -> Square {
    square.wrapping_add_signed(offset)
}

/// Rank (0-based, from white's side) a pawn of `color` starts on.
#[inline]
pub const fn pawn_start_rank(color: Color) -> usize {
    match color {
        Color::White => 1,
        Color::Black => 6,
    }
}

/// Rank a pawn of `color` promotes on.
#[inline]
pub const fn promotion_rank(color: Color) -> usize {
    match color {
        Color::White => 7,
        Color::Black => 0,
    }
}

/// Iterator over the 64 playable squares, a1 to h8.
pub fn playable_squares() -> impl Iterator<Item = Square> {
    (0..8).flat_map(|rank| (0..8).map(move |file| square_from_file_rank(file, rank)))
}

/// Fixed squares of one castling option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastlingSide {
    pub right: CastlingRights,
    pub color: Color,
    pub king_from: Square,
    pub king_to: Square,
    pub rook_from: Square,
    pub rook_to: Square,
}

impl CastlingSide {
    /// Square the king crosses between its start and destination.
    #[inline]
    pub const fn transit(&self) -> Square {
        self.rook_to
    }
}

pub const CASTLING_SIDES: [CastlingSide; 4] = [
    CastlingSide {
        right: CASTLE_WHITE_KINGSIDE,
        color: Color::White,
        king_from: E1,
        king_to: G1,
        rook_from: H1,
        rook_to: F1,
    },
    CastlingSide {
        right: CASTLE_WHITE_QUEENSIDE,
        color: Color::White,
        king_from: E1,
        king_to: C1,
        rook_from: A1,
        rook_to: D1,
    },
    CastlingSide {
        right: CASTLE_BLACK_KINGSIDE,
        color: Color::Black,
        king_from: E8,
        king_to: G8,
        rook_from: H8,
        rook_to: F8,
    },
    CastlingSide {
        right: CASTLE_BLACK_QUEENSIDE,
        color: Color::Black,
        king_from: E8,
        king_to: C8,
        rook_from: A8,
        rook_to: D8,
    },
];

/// Castling option whose rook starts on `rook_square`, if any.
#[inline]
pub fn castling_side_for_rook(rook_square: Square) -> Option<&'static CastlingSide> {
    CASTLING_SIDES.iter().find(|side| side.rook_from == rook_square)
}

/// Castling option whose king lands on `king_to`, if any.
#[inline]
pub fn castling_side_for_king_target(
    color: Color,
    king_to: Square,
) -> Option<&'static CastlingSide> {
    CASTLING_SIDES
        .iter()
        .find(|side| side.color == color && side.king_to == king_to)
}

/// Rights lost when a piece leaves or lands on `square`.
#[inline]
pub const fn rights_cleared_by_square(square: Square) -> CastlingRights {
    match square {
        A1 => CASTLE_WHITE_QUEENSIDE,
        H1 => CASTLE_WHITE_KINGSIDE,
        E1 => CASTLE_WHITE_KINGSIDE | CASTLE_WHITE_QUEENSIDE,
        A8 => CASTLE_BLACK_QUEENSIDE,
        H8 => CASTLE_BLACK_KINGSIDE,
        E8 => CASTLE_BLACK_KINGSIDE | CASTLE_BLACK_QUEENSIDE,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mailbox_geometry_matches_corners() {
        assert_eq!(square_from_file_rank(0, 0), A1);
        assert_eq!(square_from_file_rank(7, 7), H8);
        assert_eq!(file_of(E1), 4);
        assert_eq!(rank_of(E8), 7);
        assert!(is_playable(A1));
        assert!(!is_playable(20));
        assert!(!is_playable(29));
        assert!(!is_playable(99));
        assert_eq!(playable_squares().count(), 64);
        assert!(playable_squares().all(is_playable));
    }

    #[test]
    fn castling_lookups_find_their_side() {
        let side = castling_side_for_rook(H8).expect("h8 is a rook home square");
        assert_eq!(side.right, CASTLE_BLACK_KINGSIDE);
        assert_eq!(side.transit(), F8);
        let side = castling_side_for_king_target(Color::White, C1).expect("c1 is a castle target");
        assert_eq!(side.rook_from, A1);
        assert!(castling_side_for_king_target(Color::Black, C1).is_none());
    }
}
