//! Long algebraic move text (`e2e4`, `e7e8q`, `0000`).
//!
//! Text is resolved against the legal moves of a position, so the returned
//! `Move` carries the same flags the generator would give it.

use crate::errors::ParseError;
use crate::game_state::chess_move::Move;
use crate::game_state::position::Position;
use crate::move_generation::move_generator::legal_moves;
use crate::utils::algebraic::algebraic_to_square;

pub fn parse_move(position: &Position, text: &str) -> Result<Move, ParseError> {
    let text = text.trim();
    if text == "0000" {
        return Ok(Move::null());
    }
    if !text.is_ascii() || (text.len() != 4 && text.len() != 5) {
        return Err(ParseError::InvalidMoveText(text.to_owned()));
    }

    let start = algebraic_to_square(&text[0..2])
        .map_err(|_| ParseError::InvalidMoveText(text.to_owned()))?;
    let end = algebraic_to_square(&text[2..4])
        .map_err(|_| ParseError::InvalidMoveText(text.to_owned()))?;

    let wants_promotion = match text.as_bytes().get(4) {
        None => false,
        Some(b'q') | Some(b'Q') => true,
        Some(b'n' | b'b' | b'r' | b'N' | b'B' | b'R') => {
            return Err(ParseError::UnsupportedPromotion(text.to_owned()));
        }
        Some(_) => return Err(ParseError::InvalidMoveText(text.to_owned())),
    };

    legal_moves(position)
        .find(|mv| mv.start == start && mv.end == end)
        .filter(|mv| !wants_promotion || mv.is_promotion())
        .ok_or_else(|| ParseError::IllegalMove(text.to_owned()))
}

#[inline]
pub fn format_move(mv: &Move) -> String {
    mv.to_string()
}
