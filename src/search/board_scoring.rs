//! Pluggable board evaluation interfaces and baseline implementations.
//!
//! Search remains modular by delegating static position scoring to this trait,
//! allowing alternate heuristics to be swapped without altering search code.

use crate::game_state::chess_rules::{file_of, rank_of};
use crate::game_state::chess_types::*;
use crate::game_state::position::Position;

pub const MATE_SCORE: i32 = 30000;
/// Scores beyond this magnitude encode a forced mate.
pub const MATE_THRESHOLD: i32 = MATE_SCORE - 1000;
/// Outer bound of every search window.
pub const INFINITY: i32 = 32000;

pub trait BoardScorer: Send + Sync {
    /// Score from the perspective of the side to move.
    fn score(&self, position: &Position) -> i32;
}

#[inline]
fn from_side_to_move(position: &Position, white_minus_black: i32) -> i32 {
    match position.side_to_move {
        Color::White => white_minus_black,
        Color::Black => -white_minus_black,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialScorer;

impl MaterialScorer {
    #[inline]
    fn material_balance_white_minus_black(position: &Position) -> i32 {
        position.material(Color::White) - position.material(Color::Black)
    }
}

impl BoardScorer for MaterialScorer {
    fn score(&self, position: &Position) -> i32 {
        from_side_to_move(position, Self::material_balance_white_minus_black(position))
    }
}

/// Material plus piece placement and pawn-structure terms.
#[derive(Debug, Clone, Copy, Default)]
pub struct PieceSquareScorer;

impl PieceSquareScorer {
    const DOUBLED_PAWN_PENALTY: i32 = 12;
    const ISOLATED_PAWN_PENALTY: i32 = 10;
    const ROOK_OPEN_FILE_BONUS: i32 = 15;
    const ROOK_HALF_OPEN_FILE_BONUS: i32 = 7;

    fn positional_term(position: &Position) -> i32 {
        let mut score = 0i32;
        for (square, piece) in position.pieces() {
            let sign = if piece.color == Color::White { 1 } else { -1 };
            score += sign * piece_square_bonus(piece.kind, piece.color, square);
            if piece.kind == PieceKind::Rook {
                score += sign * Self::rook_file_bonus(position, piece.color, file_of(square));
            }
        }
        score
    }

    fn rook_file_bonus(position: &Position, color: Color, file: usize) -> i32 {
        let own = position.pawn_file_counts[color.index()][file];
        let enemy = position.pawn_file_counts[color.opposite().index()][file];
        match (own, enemy) {
            (0, 0) => Self::ROOK_OPEN_FILE_BONUS,
            (0, _) => Self::ROOK_HALF_OPEN_FILE_BONUS,
            _ => 0,
        }
    }

    fn pawn_structure_term(position: &Position, color: Color) -> i32 {
        let files = &position.pawn_file_counts[color.index()];
        let mut penalty = 0i32;
        for file in 0..8 {
            let count = i32::from(files[file]);
            if count == 0 {
                continue;
            }
            if count > 1 {
                penalty += (count - 1) * Self::DOUBLED_PAWN_PENALTY;
            }
            let left = file.checked_sub(1).map_or(0, |f| files[f]);
            let right = files.get(file + 1).copied().unwrap_or(0);
            if left == 0 && right == 0 {
                penalty += count * Self::ISOLATED_PAWN_PENALTY;
            }
        }
        -penalty
    }
}

impl BoardScorer for PieceSquareScorer {
    fn score(&self, position: &Position) -> i32 {
        let material = MaterialScorer::material_balance_white_minus_black(position);
        let positional = Self::positional_term(position);
        let pawns = Self::pawn_structure_term(position, Color::White)
            - Self::pawn_structure_term(position, Color::Black);
        from_side_to_move(position, material + positional + pawns)
    }
}

fn piece_square_bonus(piece: PieceKind, color: Color, square: Square) -> i32 {
    let file = file_of(square) as i32;
    let rank = rank_of(square) as i32;
    let r = if color == Color::White { rank } else { 7 - rank };
    let dist_center = (file - 3).abs().min((file - 4).abs()) + (r - 3).abs().min((r - 4).abs());
    let center_bonus = 3 - dist_center;

    match piece {
        PieceKind::Pawn => r * 8 - (file * 2 - 7).abs(),
        PieceKind::Knight => center_bonus * 8,
        PieceKind::Bishop => center_bonus * 4 + r,
        PieceKind::Rook => {
            if r == 6 {
                20
            } else {
                r * 2
            }
        }
        PieceKind::Queen => center_bonus * 2,
        PieceKind::King => {
            // Mild preference for a king tucked away on the back ranks.
            if r <= 1 {
                8 - (file - 4).abs() * 2
            } else {
                -center_bonus * 4 - r * 4
            }
        }
    }
}
