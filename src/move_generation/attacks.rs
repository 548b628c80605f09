//! Square-attack oracle.
//!
//! Pure functions of the mailbox array: whether a square is attacked by a
//! color, checked by scanning outward from the target (knight hops, sliding
//! rays, adjacent king, pawn diagonals). The off-board border stops every ray.

use crate::game_state::chess_move::Move;
use crate::game_state::chess_rules::{
    offset_square, BISHOP_DIRECTIONS, BOARD_CELLS, KING_OFFSETS, KNIGHT_OFFSETS, QUEEN_DIRECTIONS,
    ROOK_DIRECTIONS,
};
use crate::game_state::chess_types::*;

/// Whether a pawn of `color` attacks `square`.
#[inline]
pub fn pawn_attacks_square(squares: &[Cell; BOARD_CELLS], square: Square, color: Color) -> bool {
    let behind = offset_square(square, -color.pawn_direction());
    squares[behind - 1].is_piece(PieceKind::Pawn, color)
        || squares[behind + 1].is_piece(PieceKind::Pawn, color)
}

/// Whether `by_color` attacks `square`.
pub fn is_square_attacked(squares: &[Cell; BOARD_CELLS], square: Square, by_color: Color) -> bool {
    if pawn_attacks_square(squares, square, by_color) {
        return true;
    }

    if KNIGHT_OFFSETS
        .iter()
        .any(|&off| squares[offset_square(square, off)].is_piece(PieceKind::Knight, by_color))
    {
        return true;
    }

    if KING_OFFSETS
        .iter()
        .any(|&off| squares[offset_square(square, off)].is_piece(PieceKind::King, by_color))
    {
        return true;
    }

    ray_hits(squares, square, &BISHOP_DIRECTIONS, PieceKind::Bishop, by_color)
        || ray_hits(squares, square, &ROOK_DIRECTIONS, PieceKind::Rook, by_color)
}

/// Whether the first piece met along any of `directions` is a `slider` or a
/// queen of `color`.
fn ray_hits(
    squares: &[Cell; BOARD_CELLS],
    square: Square,
    directions: &[isize],
    slider: PieceKind,
    color: Color,
) -> bool {
    for &dir in directions {
        let mut current = offset_square(square, dir);
        loop {
            match squares[current] {
                Cell::Empty => current = offset_square(current, dir),
                Cell::OffBoard => break,
                Cell::Piece(p) => {
                    if p.color == color && (p.kind == slider || p.kind == PieceKind::Queen) {
                        return true;
                    }
                    break;
                }
            }
        }
    }
    false
}

/// Whether `mv`, played by `color`, might check the enemy king on `king`.
/// Never false for a move that does give check, so the board only has to be
/// updated for the candidates. Castling, en passant and promotions are
/// always candidates.
pub fn may_give_check(
    squares: &[Cell; BOARD_CELLS],
    mv: &Move,
    color: Color,
    king: Square,
) -> bool {
    mv.is_castle()
        || mv.is_en_passant()
        || mv.is_promotion()
        || uncovers_slider(squares, mv.start, color, king)
        || attacks_from(squares, mv, color, king)
}

/// Whether `start` is the only piece between `king` and a slider of `color`
/// that moves along that line.
fn uncovers_slider(
    squares: &[Cell; BOARD_CELLS],
    start: Square,
    color: Color,
    king: Square,
) -> bool {
    let lines = [
        (&ROOK_DIRECTIONS, PieceKind::Rook),
        (&BISHOP_DIRECTIONS, PieceKind::Bishop),
    ];
    for (directions, slider) in lines {
        for &dir in directions {
            let mut current = offset_square(king, dir);
            while squares[current].is_empty() {
                current = offset_square(current, dir);
            }
            if current != start {
                continue;
            }
            current = offset_square(current, dir);
            while squares[current].is_empty() {
                current = offset_square(current, dir);
            }
            if let Cell::Piece(p) = squares[current] {
                if p.color == color && (p.kind == slider || p.kind == PieceKind::Queen) {
                    return true;
                }
            }
        }
    }
    false
}

/// Whether the moved piece attacks `king` from its destination, with its
/// start square already vacated.
fn attacks_from(squares: &[Cell; BOARD_CELLS], mv: &Move, color: Color, king: Square) -> bool {
    let directions: &[isize] = match mv.moving_piece {
        PieceKind::Pawn => {
            let ahead = offset_square(mv.end, color.pawn_direction());
            return king == ahead - 1 || king == ahead + 1;
        }
        PieceKind::Knight => {
            return KNIGHT_OFFSETS
                .iter()
                .any(|&off| offset_square(mv.end, off) == king);
        }
        PieceKind::King => return false,
        PieceKind::Bishop => &BISHOP_DIRECTIONS,
        PieceKind::Rook => &ROOK_DIRECTIONS,
        PieceKind::Queen => &QUEEN_DIRECTIONS,
    };
    for &dir in directions {
        let mut current = offset_square(mv.end, dir);
        while current == mv.start || squares[current].is_empty() {
            current = offset_square(current, dir);
        }
        if current == king {
            return true;
        }
    }
    false
}
