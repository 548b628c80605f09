//! Static exchange evaluation.
//!
//! Resolves a sequence of captures on one square, each side always capturing
//! with its least valuable attacker. A side that is already ahead stops
//! capturing instead of checking whether carrying on would gain even more, so
//! the estimate is cheap rather than exact.

use crate::game_state::chess_move::Move;
use crate::game_state::chess_types::{Cell, Square};
use crate::game_state::position::Position;
use crate::move_generation::attacks::{is_square_attacked, pawn_attacks_square};
use crate::move_generation::legal_move_apply::apply_move;
use crate::move_generation::move_generator::least_valuable_capture;

/// Capturing a piece worth this much less than the capturer is suspect.
const BAD_CAPTURE_MARGIN: i32 = 50;

/// Net material the side to move can expect from starting an exchange on
/// `target`, on top of `running`. The first capture is forced; after that
/// either side may stop.
pub fn static_exchange(position: &Position, target: Square, running: i32) -> i32 {
    let Some(capture) = least_valuable_capture(position, target) else {
        return running;
    };
    resolve(position, &capture, running)
}

/// Exchange value of playing `mv` first and letting the square settle.
pub fn capture_exchange(position: &Position, mv: &Move) -> i32 {
    resolve(position, mv, 0)
}

fn resolve(position: &Position, capture: &Move, running: i32) -> i32 {
    let banked = running + capture.captured_value();
    let child = apply_move(position, *capture);
    -optional_exchange(&child, capture.end, -banked)
}

fn optional_exchange(position: &Position, target: Square, running: i32) -> i32 {
    if running > 0 {
        return running;
    }
    let Some(capture) = least_valuable_capture(position, target) else {
        return running;
    };
    let banked = running + capture.captured_value();
    let child = apply_move(position, capture);
    running.max(-optional_exchange(&child, target, -banked))
}

/// A capture of a clearly cheaper piece onto a square the opponent holds,
/// either with a pawn or by winning the exchange.
pub fn is_bad_capture(position: &Position, mv: &Move) -> bool {
    if !mv.is_capture() {
        return false;
    }
    if mv.captured_value() > mv.moving_piece.value() - BAD_CAPTURE_MARGIN {
        return false;
    }
    let enemy = position.side_to_move.opposite();
    if pawn_attacks_square(&position.squares, mv.end, enemy) {
        return true;
    }
    // An undefended target cannot lose material; skip building the child.
    let mut squares = position.squares;
    squares[mv.start] = Cell::Empty;
    is_square_attacked(&squares, mv.end, enemy) && capture_exchange(position, mv) < 0
}
