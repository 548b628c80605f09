//! Move application.
//!
//! `apply_move` is a pure function from a position and a move to the next
//! position. The parent's fingerprint is pushed onto the child's history so
//! repetitions can be detected without any undo stack.

use crate::errors::ParseError;
use crate::game_state::chess_move::Move;
use crate::game_state::chess_rules::*;
use crate::game_state::chess_types::*;
use crate::game_state::position::Position;
use crate::move_generation::move_generator::GenerationMode;
use crate::move_generation::piece_moves::piece_moves;
use crate::utils::long_algebraic::parse_move;

pub fn apply_move(position: &Position, mv: Move) -> Position {
    if mv.is_null() {
        return apply_null_move(position);
    }

    let moving_color = position.side_to_move;
    let mut next = position.clone();
    next.history = position.history.push(position.fingerprint);

    let moved = lift(&mut next, mv.start).unwrap_or(Piece::new(mv.moving_piece, moving_color));

    let captured = if mv.is_en_passant() {
        lift(&mut next, offset_square(mv.end, -moving_color.pawn_direction()))
    } else {
        lift(&mut next, mv.end)
    };

    // Pawns reaching the last rank always become queens.
    let promotes = moved.kind == PieceKind::Pawn && rank_of(mv.end) == promotion_rank(moving_color);
    let landing = if promotes {
        Piece::new(PieceKind::Queen, moving_color)
    } else {
        moved
    };
    drop_piece(&mut next, mv.end, landing);

    if mv.is_castle() {
        if let Some(side) = castling_side_for_king_target(moving_color, mv.end) {
            if let Some(rook) = lift(&mut next, side.rook_from) {
                drop_piece(&mut next, side.rook_to, rook);
            }
        }
    }

    next.castling_rights &=
        !(rights_cleared_by_square(mv.start) | rights_cleared_by_square(mv.end));
    next.en_passant_square = mv.en_passant_target;

    if moved.kind == PieceKind::Pawn || captured.is_some() {
        next.halfmove_clock = 0;
    } else {
        next.halfmove_clock = next.halfmove_clock.saturating_add(1);
    }
    if moving_color == Color::Black {
        next.fullmove_number = next.fullmove_number.saturating_add(1);
    }

    next.side_to_move = moving_color.opposite();
    next.refresh_fingerprint();

    debug_assert!(next.border_intact(), "move {mv} corrupted the board border");
    next
}

/// Pass the turn without touching the board. Clears any en-passant target.
pub fn apply_null_move(position: &Position) -> Position {
    let mut next = position.clone();
    next.history = position.history.push(position.fingerprint);
    next.en_passant_square = None;
    next.halfmove_clock = next.halfmove_clock.saturating_add(1);
    if position.side_to_move == Color::Black {
        next.fullmove_number = next.fullmove_number.saturating_add(1);
    }
    next.side_to_move = position.side_to_move.opposite();
    next.refresh_fingerprint();
    next
}

fn lift(position: &mut Position, square: Square) -> Option<Piece> {
    let piece = position.squares[square].piece()?;
    position.squares[square] = Cell::Empty;
    position.remove_from_caches(square, piece);
    Some(piece)
}

fn drop_piece(position: &mut Position, square: Square, piece: Piece) {
    position.squares[square] = Cell::Piece(piece);
    position.add_to_caches(square, piece);
}

/// The move the generator would produce along the same route as `mv`, if
/// the position allows it. Used to validate remembered moves before reuse.
pub fn find_pseudo_legal(position: &Position, mv: &Move) -> Option<Move> {
    if mv.is_null() || !is_playable(mv.start) || !is_playable(mv.end) {
        return None;
    }
    let color = position.side_to_move;
    let piece = position.piece_at(mv.start).piece()?;
    if piece.color != color || piece.kind != mv.moving_piece {
        return None;
    }

    let mut buffer = Vec::with_capacity(28);
    if mv.is_castle() {
        // Castling comes out of the rook generator.
        let side = castling_side_for_king_target(color, mv.end)?;
        let rook = position.piece_at(side.rook_from).piece()?;
        if rook != Piece::new(PieceKind::Rook, color) {
            return None;
        }
        piece_moves(position, side.rook_from, rook, GenerationMode::All, &mut buffer);
    } else {
        piece_moves(position, mv.start, piece, GenerationMode::All, &mut buffer);
    }
    buffer
        .into_iter()
        .find(|candidate| candidate.same_route(mv) && candidate.is_castle() == mv.is_castle())
}

#[inline]
pub fn is_pseudo_legal(position: &Position, mv: &Move) -> bool {
    find_pseudo_legal(position, mv).is_some()
}

/// Play a list of long-algebraic moves (`["e2e4", "e7e5"]`) from `position`,
/// rejecting the first one that is malformed or illegal.
pub fn apply_long_algebraic_moves<S: AsRef<str>>(
    position: &Position,
    moves: &[S],
) -> Result<Position, ParseError> {
    let mut current = position.clone();
    for text in moves {
        let mv = parse_move(&current, text.as_ref())?;
        current = apply_move(&current, mv);
    }
    Ok(current)
}
