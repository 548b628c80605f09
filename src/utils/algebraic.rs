//! Square conversions for algebraic coordinates.
//!
//! Converts between human-readable coordinates (e.g., `e4`) and mailbox
//! square indices reused by FEN and UCI components.

use crate::errors::ParseError;
use crate::game_state::chess_rules::{file_of, is_playable, rank_of, square_from_file_rank};
use crate::game_state::chess_types::Square;

/// Convert algebraic notation (for example: "e4") to a mailbox square index.
#[inline]
pub fn algebraic_to_square(square: &str) -> Result<Square, ParseError> {
    let bytes = square.as_bytes();
    if bytes.len() != 2 {
        return Err(ParseError::InvalidSquare(square.to_owned()));
    }

    let file = bytes[0];
    let rank = bytes[1];

    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return Err(ParseError::InvalidSquare(square.to_owned()));
    }

    Ok(square_from_file_rank(
        usize::from(file - b'a'),
        usize::from(rank - b'1'),
    ))
}

/// Convert a mailbox square index to algebraic notation (for example: "e4").
#[inline]
pub fn square_to_algebraic(square: Square) -> Result<String, ParseError> {
    if !is_playable(square) {
        return Err(ParseError::InvalidSquare(square.to_string()));
    }

    let file_char = char::from(b'a' + file_of(square) as u8);
    let rank_char = char::from(b'1' + rank_of(square) as u8);

    Ok(format!("{file_char}{rank_char}"))
}
