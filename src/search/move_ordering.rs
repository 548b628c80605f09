//! Move ordering strategies.
//!
//! Ordering only decides which moves are tried first; it never adds or drops
//! a move. `Identity` keeps generation order and is what the correctness
//! oracles compare against. `Custom` plugs in any ordering function.

use rand::seq::SliceRandom;

use crate::game_state::chess_move::Move;
use crate::game_state::chess_types::PieceKind;
use crate::game_state::position::Position;
use crate::search::exchange::is_bad_capture;

/// A caller-supplied ordering: takes the generated moves, returns them in
/// the order to search. It must return a permutation of its input.
pub type OrderingFn = fn(&Position, Vec<Move>) -> Vec<Move>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveOrdering {
    /// Linear-time bucketing: hint, king captures and castles, winning
    /// captures by victim, killers, losing captures, quiet moves.
    #[default]
    Fast,
    /// Full sort by most valuable victim, least valuable attacker.
    MvvLva,
    /// Biggest gains first, for capture-only searches.
    Quiescence,
    Random,
    /// Generation order, hints ignored.
    Identity,
    /// Hints ignored; the function decides alone.
    Custom(OrderingFn),
}

/// Per-node suggestions from earlier searches.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderingHints {
    pub best_move: Option<Move>,
    pub killers: [Option<Move>; 2],
}

impl OrderingHints {
    #[inline]
    fn is_best(&self, mv: &Move) -> bool {
        self.best_move.is_some_and(|best| best.same_route(mv))
    }

    #[inline]
    fn is_killer(&self, mv: &Move) -> bool {
        self.killers
            .iter()
            .flatten()
            .any(|killer| killer.same_route(mv))
    }
}

pub fn order_moves(
    position: &Position,
    moves: Vec<Move>,
    ordering: MoveOrdering,
    hints: &OrderingHints,
) -> Vec<Move> {
    match ordering {
        MoveOrdering::Fast => order_fast(position, moves, hints),
        MoveOrdering::MvvLva => order_by_key(moves, hints, mvv_lva_key),
        MoveOrdering::Quiescence => order_by_key(moves, hints, gain_key),
        MoveOrdering::Random => {
            let mut moves = moves;
            moves.shuffle(&mut rand::rng());
            moves
        }
        MoveOrdering::Identity => moves,
        MoveOrdering::Custom(order) => order(position, moves),
    }
}

/// Four victim slots: queen, rook, minor piece, pawn.
#[inline]
fn victim_slot(mv: &Move) -> usize {
    match mv.captured_piece {
        Some(PieceKind::Queen) => 0,
        Some(PieceKind::Rook) => 1,
        Some(PieceKind::Bishop | PieceKind::Knight) => 2,
        _ if mv.is_promotion() => 0,
        _ => 3,
    }
}

fn order_fast(position: &Position, moves: Vec<Move>, hints: &OrderingHints) -> Vec<Move> {
    let mut hinted = Vec::with_capacity(1);
    let mut forcing = Vec::new();
    let mut winning: [Vec<Move>; 4] = Default::default();
    let mut killers = Vec::with_capacity(2);
    let mut losing = Vec::new();
    let mut quiet = Vec::with_capacity(moves.len());

    for mv in moves {
        if hints.is_best(&mv) {
            hinted.push(mv);
        } else if mv.is_king_capture() || mv.is_castle() {
            forcing.push(mv);
        } else if mv.is_capture() || mv.is_promotion() {
            if is_bad_capture(position, &mv) {
                losing.push(mv);
            } else {
                winning[victim_slot(&mv)].push(mv);
            }
        } else if hints.is_killer(&mv) {
            killers.push(mv);
        } else {
            quiet.push(mv);
        }
    }

    let mut ordered = hinted;
    ordered.append(&mut forcing);
    for slot in &mut winning {
        ordered.append(slot);
    }
    ordered.append(&mut killers);
    ordered.append(&mut losing);
    ordered.append(&mut quiet);
    ordered
}

fn order_by_key(moves: Vec<Move>, hints: &OrderingHints, key: fn(&Move) -> i32) -> Vec<Move> {
    let mut scored: Vec<(i32, Move)> = moves
        .into_iter()
        .map(|mv| {
            let score = if hints.is_best(&mv) {
                i32::MAX
            } else if hints.is_killer(&mv) {
                500_000
            } else {
                key(&mv)
            };
            (score, mv)
        })
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, mv)| mv).collect()
}

fn mvv_lva_key(mv: &Move) -> i32 {
    let promotion = if mv.is_promotion() { PieceKind::Queen.value() } else { 0 };
    if mv.is_capture() || mv.is_promotion() {
        1_000_000 + (mv.captured_value() + promotion) * 10 - mv.moving_piece.value() / 10
    } else if mv.is_castle() {
        1_000
    } else {
        0
    }
}

fn gain_key(mv: &Move) -> i32 {
    let promotion = if mv.is_promotion() {
        PieceKind::Queen.value() - PieceKind::Pawn.value()
    } else {
        0
    };
    mv.captured_value() + promotion
}
