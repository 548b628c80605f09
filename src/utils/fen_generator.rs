use crate::game_state::chess_rules::square_from_file_rank;
use crate::game_state::chess_types::*;
use crate::game_state::position::Position;
use crate::utils::algebraic::square_to_algebraic;

pub fn generate_fen(position: &Position) -> String {
    let board = generate_board_field(position);
    let side_to_move = match position.side_to_move {
        Color::White => "w",
        Color::Black => "b",
    };
    let castling = generate_castling_field(position.castling_rights);
    let en_passant = generate_en_passant_field(position.en_passant_square);

    format!(
        "{} {} {} {} {} {}",
        board,
        side_to_move,
        castling,
        en_passant,
        position.halfmove_clock,
        position.fullmove_number
    )
}

fn generate_board_field(position: &Position) -> String {
    let mut out = String::new();

    for rank in (0..8).rev() {
        let mut empty_count = 0u8;

        for file in 0..8 {
            match position.piece_at(square_from_file_rank(file, rank)).piece() {
                Some(piece) => {
                    if empty_count > 0 {
                        out.push(char::from(b'0' + empty_count));
                        empty_count = 0;
                    }
                    out.push(piece.to_fen_char());
                }
                None => empty_count += 1,
            }
        }

        if empty_count > 0 {
            out.push(char::from(b'0' + empty_count));
        }

        if rank > 0 {
            out.push('/');
        }
    }

    out
}

fn generate_castling_field(rights: CastlingRights) -> String {
    let mut out = String::new();

    if (rights & CASTLE_WHITE_KINGSIDE) != 0 {
        out.push('K');
    }
    if (rights & CASTLE_WHITE_QUEENSIDE) != 0 {
        out.push('Q');
    }
    if (rights & CASTLE_BLACK_KINGSIDE) != 0 {
        out.push('k');
    }
    if (rights & CASTLE_BLACK_QUEENSIDE) != 0 {
        out.push('q');
    }

    if out.is_empty() {
        out.push('-');
    }

    out
}

fn generate_en_passant_field(square: Option<Square>) -> String {
    let Some(square) = square else {
        return "-".to_owned();
    };

    square_to_algebraic(square).unwrap_or_else(|_| "-".to_owned())
}

#[cfg(test)]
mod tests {
    use super::generate_fen;
    use crate::game_state::chess_rules::STARTING_POSITION_FEN;
    use crate::game_state::chess_types::{Color, CASTLE_BLACK_KINGSIDE, CASTLE_BLACK_QUEENSIDE};
    use crate::utils::fen_parser::parse_fen;

    const ROUND_TRIP_FENS: &[&str] = &[
        STARTING_POSITION_FEN,
        "r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/2N2N2/PPPP1PPP/R1BQ1RK1 b kq - 4 6",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 3",
        "8/8/8/8/8/8/8/8 b - - 99 250",
        "4k3/8/8/8/8/8/8/4K2R w K - 12 40",
    ];

    #[test]
    fn fen_round_trip_is_exact() {
        for fen in ROUND_TRIP_FENS {
            let parsed = parse_fen(fen).expect("FEN should parse");
            assert_eq!(&generate_fen(&parsed), fen);
        }
    }

    #[test]
    fn round_trip_preserves_state_fields() {
        let fen = "r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/2N2N2/PPPP1PPP/R1BQ1RK1 b kq - 4 6";
        let parsed = parse_fen(fen).expect("custom FEN should parse");
        let reparsed = parse_fen(&generate_fen(&parsed)).expect("generated FEN should parse");

        assert_eq!(reparsed.squares, parsed.squares);
        assert_eq!(reparsed.side_to_move, Color::Black);
        assert_eq!(
            reparsed.castling_rights,
            CASTLE_BLACK_KINGSIDE | CASTLE_BLACK_QUEENSIDE
        );
        assert_eq!(reparsed.en_passant_square, None);
        assert_eq!(reparsed.halfmove_clock, 4);
        assert_eq!(reparsed.fullmove_number, 6);
        assert_eq!(reparsed.fingerprint(), parsed.fingerprint());
    }
}
