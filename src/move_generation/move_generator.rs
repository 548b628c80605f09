//! Move generation entry points.
//!
//! `pseudo_legal_moves` ignores checks; legality is decided per move by
//! applying it and asking the attack oracle whether the mover's king is
//! exposed. `legal_moves` is that filter as a lazy iterator, while the
//! search applies the same test itself so each child is built once.

use crate::game_state::chess_move::{Move, FLAG_PROMOTION};
use crate::game_state::chess_rules::*;
use crate::game_state::chess_types::*;
use crate::game_state::position::Position;
use crate::move_generation::attacks::is_square_attacked;
use crate::move_generation::legal_move_apply::apply_move;
use crate::move_generation::piece_moves::piece_moves;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    /// Every pseudo-legal move.
    All,
    /// Captures and promotions only, tagged as quiescent.
    Quiescent,
}

/// Pseudo-legal moves of the side to move, in board order.
pub fn pseudo_legal_moves(position: &Position, mode: GenerationMode) -> Vec<Move> {
    let mut out = Vec::with_capacity(48);
    let color = position.side_to_move;
    for (square, piece) in position.pieces() {
        if piece.color == color {
            piece_moves(position, square, piece, mode, &mut out);
        }
    }
    out
}

/// Every capture on `target` by the side to move, cheapest attacker first
/// (pawn, knight, bishop, rook, queen, king). En passant is not included.
pub fn capture_moves(position: &Position, target: Square) -> Vec<Move> {
    let mut out = Vec::new();
    collect_captures(position, target, false, &mut out);
    out
}

/// The capture on `target` by the least valuable attacker, if any.
pub fn least_valuable_capture(position: &Position, target: Square) -> Option<Move> {
    let mut out = Vec::with_capacity(1);
    collect_captures(position, target, true, &mut out);
    out.pop()
}

fn collect_captures(position: &Position, target: Square, first_only: bool, out: &mut Vec<Move>) {
    let color = position.side_to_move;
    let Some(victim) = position.piece_at(target).piece() else {
        return;
    };
    if victim.color == color {
        return;
    }

    for kind in PieceKind::ALL {
        let before = out.len();
        match kind {
            PieceKind::Pawn => {
                let behind = offset_square(target, -color.pawn_direction());
                let promotion = if rank_of(target) == promotion_rank(color) {
                    FLAG_PROMOTION
                } else {
                    0
                };
                for from in [behind - 1, behind + 1] {
                    if position.squares[from].is_piece(PieceKind::Pawn, color) {
                        out.push(
                            Move::capture(from, target, kind, victim.kind).with_flags(promotion),
                        );
                    }
                }
            }
            PieceKind::Knight | PieceKind::King => {
                let offsets: &[isize] = if kind == PieceKind::Knight {
                    &KNIGHT_OFFSETS
                } else {
                    &KING_OFFSETS
                };
                for &off in offsets {
                    let from = offset_square(target, off);
                    if position.squares[from].is_piece(kind, color) {
                        out.push(Move::capture(from, target, kind, victim.kind));
                    }
                }
            }
            PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen => {
                let directions: &[isize] = match kind {
                    PieceKind::Bishop => &BISHOP_DIRECTIONS,
                    PieceKind::Rook => &ROOK_DIRECTIONS,
                    _ => &QUEEN_DIRECTIONS,
                };
                for &dir in directions {
                    if let Some(from) = first_piece_along(position, target, dir) {
                        if position.squares[from].is_piece(kind, color) {
                            out.push(Move::capture(from, target, kind, victim.kind));
                        }
                    }
                }
            }
        }
        if first_only && out.len() > before {
            out.truncate(before + 1);
            return;
        }
    }
}

fn first_piece_along(position: &Position, from: Square, dir: isize) -> Option<Square> {
    let mut current = offset_square(from, dir);
    loop {
        match position.squares[current] {
            Cell::Empty => current = offset_square(current, dir),
            Cell::OffBoard => return None,
            Cell::Piece(_) => return Some(current),
        }
    }
}

/// Whether `mv`, already applied as `child`, leaves the mover's king safe.
/// Castling additionally requires the king's start and transit squares to
/// be unattacked in the parent position.
pub fn is_legal(position: &Position, mv: &Move, child: &Position) -> bool {
    let color = position.side_to_move;
    if mv.is_castle() {
        let Some(side) = castling_side_for_king_target(color, mv.end) else {
            return false;
        };
        let enemy = color.opposite();
        if is_square_attacked(&position.squares, side.king_from, enemy)
            || is_square_attacked(&position.squares, side.transit(), enemy)
        {
            return false;
        }
    }
    !child.is_in_check(color)
}

/// Apply `mv` and return the child if the move is legal.
#[inline]
pub fn legal_child(position: &Position, mv: Move) -> Option<Position> {
    let child = apply_move(position, mv);
    is_legal(position, &mv, &child).then_some(child)
}

/// Legal moves, checked lazily one at a time.
pub fn legal_moves(position: &Position) -> impl Iterator<Item = Move> + '_ {
    pseudo_legal_moves(position, GenerationMode::All)
        .into_iter()
        .filter(move |mv| legal_child(position, *mv).is_some())
}

/// Legal moves paired with the positions they produce.
pub fn legal_children(position: &Position) -> impl Iterator<Item = (Move, Position)> + '_ {
    pseudo_legal_moves(position, GenerationMode::All)
        .into_iter()
        .filter_map(move |mv| legal_child(position, mv).map(|child| (mv, child)))
}
