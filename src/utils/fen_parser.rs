//! FEN-to-Position parser.
//!
//! Builds a fully-populated `Position` from a Forsyth-Edwards Notation
//! string, including the king/pawn caches and the fingerprint. Malformed input
//! is rejected with a `ParseError` rather than patched into something that
//! merely looks valid.

use crate::errors::ParseError;
use crate::game_state::chess_rules::{rank_of, square_from_file_rank, CASTLING_SIDES};
use crate::game_state::chess_types::*;
use crate::game_state::position::Position;
use crate::utils::algebraic::algebraic_to_square;

pub fn parse_fen(fen: &str) -> Result<Position, ParseError> {
    let mut parts = fen.split_whitespace();

    let board_part = parts.next().ok_or(ParseError::MissingFenField("board layout"))?;
    let side_part = parts.next().ok_or(ParseError::MissingFenField("side-to-move"))?;
    let castling_part = parts
        .next()
        .ok_or(ParseError::MissingFenField("castling rights"))?;
    let en_passant_part = parts
        .next()
        .ok_or(ParseError::MissingFenField("en-passant square"))?;
    let halfmove_part = parts.next().ok_or(ParseError::MissingFenField("halfmove clock"))?;
    let fullmove_part = parts
        .next()
        .ok_or(ParseError::MissingFenField("fullmove number"))?;

    if parts.next().is_some() {
        return Err(ParseError::ExtraFenFields);
    }

    let mut position = Position::empty();

    parse_board(board_part, &mut position)?;
    position.side_to_move = parse_side_to_move(side_part)?;
    position.castling_rights =
        playable_castling_rights(&position, parse_castling_rights(castling_part)?);
    position.en_passant_square =
        parse_en_passant_square(en_passant_part, position.side_to_move)?;
    position.halfmove_clock = parse_counter("halfmove clock", halfmove_part)?;
    position.fullmove_number = parse_counter("fullmove number", fullmove_part)?;
    position.refresh_fingerprint();

    Ok(position)
}

fn parse_board(board_part: &str, position: &mut Position) -> Result<(), ParseError> {
    let ranks: Vec<&str> = board_part.split('/').collect();
    if ranks.len() != 8 {
        return Err(ParseError::WrongRankCount(ranks.len()));
    }

    let mut king_counts = [0u8; 2];

    for (fen_rank_idx, rank_str) in ranks.iter().enumerate() {
        let board_rank = 7 - fen_rank_idx;
        let mut file = 0usize;

        for ch in rank_str.chars() {
            if let Some(empty_count) = ch.to_digit(10) {
                if !(1..=8).contains(&empty_count) {
                    return Err(ParseError::InvalidPiece(ch));
                }
                file += empty_count as usize;
                if file > 8 {
                    return Err(ParseError::BadRankLength { rank: board_rank + 1 });
                }
                continue;
            }

            let piece = Piece::from_fen_char(ch).ok_or(ParseError::InvalidPiece(ch))?;

            if file >= 8 {
                return Err(ParseError::BadRankLength { rank: board_rank + 1 });
            }

            if piece.kind == PieceKind::King {
                king_counts[piece.color.index()] += 1;
                if king_counts[piece.color.index()] > 1 {
                    return Err(ParseError::TooManyKings(match piece.color {
                        Color::White => "white",
                        Color::Black => "black",
                    }));
                }
            }

            position.place(square_from_file_rank(file, board_rank), piece);
            file += 1;
        }

        if file != 8 {
            return Err(ParseError::BadRankLength { rank: board_rank + 1 });
        }
    }

    Ok(())
}

fn parse_side_to_move(side_part: &str) -> Result<Color, ParseError> {
    match side_part {
        "w" => Ok(Color::White),
        "b" => Ok(Color::Black),
        _ => Err(ParseError::InvalidSideToMove(side_part.to_owned())),
    }
}

fn parse_castling_rights(castling_part: &str) -> Result<CastlingRights, ParseError> {
    if castling_part == "-" {
        return Ok(0);
    }

    let mut rights: CastlingRights = 0;

    for ch in castling_part.chars() {
        match ch {
            'K' => rights |= CASTLE_WHITE_KINGSIDE,
            'Q' => rights |= CASTLE_WHITE_QUEENSIDE,
            'k' => rights |= CASTLE_BLACK_KINGSIDE,
            'q' => rights |= CASTLE_BLACK_QUEENSIDE,
            _ => return Err(ParseError::InvalidCastling(ch)),
        }
    }

    Ok(rights)
}

/// Rights whose king or rook has left its home square can never be used.
fn playable_castling_rights(position: &Position, rights: CastlingRights) -> CastlingRights {
    CASTLING_SIDES
        .iter()
        .filter(|side| rights & side.right != 0)
        .filter(|side| {
            position.piece_at(side.king_from).is_piece(PieceKind::King, side.color)
                && position.piece_at(side.rook_from).is_piece(PieceKind::Rook, side.color)
        })
        .fold(0, |kept, side| kept | side.right)
}

fn parse_en_passant_square(
    en_passant_part: &str,
    side_to_move: Color,
) -> Result<Option<Square>, ParseError> {
    if en_passant_part == "-" {
        return Ok(None);
    }

    let square = algebraic_to_square(en_passant_part)?;
    // The target sits behind a pawn the opponent just pushed two squares.
    let expected_rank = match side_to_move {
        Color::White => 5,
        Color::Black => 2,
    };
    if rank_of(square) != expected_rank {
        return Err(ParseError::InvalidSquare(en_passant_part.to_owned()));
    }
    Ok(Some(square))
}

fn parse_counter(field: &'static str, text: &str) -> Result<u16, ParseError> {
    text.parse::<u16>().map_err(|_| ParseError::InvalidCounter {
        field,
        value: text.to_owned(),
    })
}
