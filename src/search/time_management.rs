//! Per-move time budgeting.
//!
//! The front end passes the raw clock data it received; the budget is decided
//! here from the clock, the increment and how much material is left.

use crate::game_state::chess_types::Color;
use crate::game_state::position::Position;
use crate::search::iterative_deepening::SearchLimits;

/// Non-king material of both sides in the starting position.
pub const STARTING_MATERIAL: i64 = 8000;
/// Never plan more than this for one move.
pub const MAX_MOVETIME_MS: u64 = 60_000;
const MIN_MOVES_LEFT: i64 = 15;
const MOVES_LEFT_PER_FULL_MATERIAL: i64 = 25;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GoParams {
    pub depth: Option<i32>,
    pub movetime_ms: Option<u64>,
    pub wtime_ms: Option<u64>,
    pub btime_ms: Option<u64>,
    pub winc_ms: Option<u64>,
    pub binc_ms: Option<u64>,
}

impl GoParams {
    pub fn limits(&self, position: &Position) -> SearchLimits {
        SearchLimits {
            max_depth: self.depth,
            movetime_ms: target_movetime(position, self),
        }
    }
}

/// Milliseconds to spend on the next move, or `None` when neither a move
/// time nor a clock for the side to move was given.
pub fn target_movetime(position: &Position, params: &GoParams) -> Option<u64> {
    if let Some(movetime) = params.movetime_ms {
        return Some(movetime);
    }
    let (remaining, increment) = match position.side_to_move {
        Color::White => (params.wtime_ms?, params.winc_ms.unwrap_or(0)),
        Color::Black => (params.btime_ms?, params.binc_ms.unwrap_or(0)),
    };
    let moves_left = estimated_moves_left(position);
    let slice = remaining / moves_left + increment.saturating_mul(3) / 4;
    Some(remaining.min(slice).min(MAX_MOVETIME_MS).max(1))
}

/// More material on the board means more of the game is still to come.
pub fn estimated_moves_left(position: &Position) -> u64 {
    let material = i64::from(position.material(Color::White) + position.material(Color::Black));
    let moves = MIN_MOVES_LEFT + MOVES_LEFT_PER_FULL_MATERIAL * material / STARTING_MATERIAL;
    moves.max(1) as u64
}
