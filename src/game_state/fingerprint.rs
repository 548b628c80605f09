//! Position fingerprints used as transposition-cache and repetition keys.
//!
//! The fingerprint is recomputed from the complete state on every position
//! rather than updated incrementally. Keys come from a fixed splitmix64 seed so
//! fingerprints are stable across runs. Two different positions may share a
//! fingerprint; the cache accepts that risk instead of comparing full states.

use std::sync::OnceLock;

use crate::game_state::chess_rules::{file_of, playable_squares, BOARD_CELLS};
use crate::game_state::chess_types::*;

#[derive(Debug)]
struct FingerprintKeys {
    piece_square: [[[u64; BOARD_CELLS]; 6]; 2],
    side_to_move: u64,
    castling: [u64; 16],
    en_passant_file: [u64; 8],
}

static KEYS: OnceLock<FingerprintKeys> = OnceLock::new();

#[inline]
fn keys() -> &'static FingerprintKeys {
    KEYS.get_or_init(build_keys)
}

fn build_keys() -> FingerprintKeys {
    let mut seed: u64 = 0x9E37_79B9_7F4A_7C15;

    let mut piece_square = [[[0u64; BOARD_CELLS]; 6]; 2];
    for color in &mut piece_square {
        for kind in color.iter_mut() {
            for square in playable_squares() {
                kind[square] = next_random_u64(&mut seed);
            }
        }
    }

    let side_to_move = next_random_u64(&mut seed);

    let mut castling = [0u64; 16];
    for key in &mut castling {
        *key = next_random_u64(&mut seed);
    }

    let mut en_passant_file = [0u64; 8];
    for key in &mut en_passant_file {
        *key = next_random_u64(&mut seed);
    }

    FingerprintKeys {
        piece_square,
        side_to_move,
        castling,
        en_passant_file,
    }
}

#[inline]
fn next_random_u64(state: &mut u64) -> u64 {
    // splitmix64
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Fingerprint of a full board state.
pub fn compute_fingerprint(
    squares: &[Cell; BOARD_CELLS],
    side_to_move: Color,
    castling_rights: CastlingRights,
    en_passant: Option<Square>,
) -> u64 {
    let keys = keys();
    let mut key = 0u64;

    for square in playable_squares() {
        if let Cell::Piece(piece) = squares[square] {
            key ^= keys.piece_square[piece.color.index()][piece.kind.index()][square];
        }
    }

    if side_to_move == Color::Black {
        key ^= keys.side_to_move;
    }

    key ^= keys.castling[usize::from(castling_rights & CASTLE_ALL)];

    if let Some(square) = en_passant {
        key ^= keys.en_passant_file[file_of(square)];
    }

    key
}

#[cfg(test)]
mod tests {
    use crate::game_state::position::Position;

    fn fingerprint_of(fen: &str) -> u64 {
        Position::from_fen(fen).expect("FEN should parse").fingerprint()
    }

    #[test]
    fn starting_position_fingerprint_is_deterministic() {
        assert_eq!(
            Position::new_game().fingerprint(),
            Position::new_game().fingerprint()
        );
    }

    #[test]
    fn side_to_move_changes_fingerprint() {
        assert_ne!(
            fingerprint_of("4k3/8/8/8/8/8/8/4K3 w - - 0 1"),
            fingerprint_of("4k3/8/8/8/8/8/8/4K3 b - - 0 1")
        );
    }

    #[test]
    fn castling_and_en_passant_change_fingerprint() {
        assert_ne!(
            fingerprint_of("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1"),
            fingerprint_of("4k3/8/8/8/8/8/8/R3K2R w - - 0 1")
        );
        assert_ne!(
            fingerprint_of("4k3/8/8/8/4P3/8/8/4K3 b - - 0 1"),
            fingerprint_of("4k3/8/8/8/4P3/8/8/4K3 b - e3 0 1")
        );
    }

    #[test]
    fn clocks_do_not_change_fingerprint() {
        assert_eq!(
            fingerprint_of("4k3/8/8/8/8/8/8/4K3 w - - 0 1"),
            fingerprint_of("4k3/8/8/8/8/8/8/4K3 w - - 17 40")
        );
    }
}
