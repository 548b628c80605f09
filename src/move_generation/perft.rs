//! Perft: count leaf positions of the legal move tree.
//!
//! The standard correctness check for move generation and application.

use crate::game_state::chess_move::Move;
use crate::game_state::position::Position;
use crate::move_generation::move_generator::legal_children;

pub fn count_leaf_positions(position: &Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    if depth == 1 {
        return legal_children(position).count() as u64;
    }
    legal_children(position)
        .map(|(_, child)| count_leaf_positions(&child, depth - 1))
        .sum()
}

/// Leaf counts split by root move, for tracking down generator bugs.
pub fn perft_divide(position: &Position, depth: u32) -> Vec<(Move, u64)> {
    if depth == 0 {
        return Vec::new();
    }
    legal_children(position)
        .map(|(mv, child)| (mv, count_leaf_positions(&child, depth - 1)))
        .collect()
}
