//! Per-piece pseudo-legal move generators.
//!
//! Each generator appends to a caller-owned buffer. Knights and kings use
//! fixed offset tables, bishops/rooks/queens cast rays until the first piece
//! or the border, and pawns handle pushes, captures, en passant, and
//! auto-queen promotion. Castling is emitted by the rook generator: a rook
//! on its home square whose ray runs straight into its own king has just
//! proven the squares between them empty.

use crate::game_state::chess_move::*;
use crate::game_state::chess_rules::*;
use crate::game_state::chess_types::*;
use crate::game_state::position::Position;
use crate::move_generation::move_generator::GenerationMode;

#[inline]
fn mode_flags(mode: GenerationMode) -> u8 {
    match mode {
        GenerationMode::All => 0,
        GenerationMode::Quiescent => FLAG_QUIESCENT,
    }
}

pub fn pawn_moves(
    position: &Position,
    from: Square,
    color: Color,
    mode: GenerationMode,
    out: &mut Vec<Move>,
) {
    let dir = color.pawn_direction();
    let extra = mode_flags(mode);
    let last_rank = promotion_rank(color);
    let promotion = |to: Square| {
        if rank_of(to) == last_rank {
            FLAG_PROMOTION
        } else {
            0
        }
    };

    let one = offset_square(from, dir);
    if position.squares[one].is_empty() {
        let promo = promotion(one);
        if promo != 0 {
            out.push(Move::quiet(from, one, PieceKind::Pawn).with_flags(promo | extra));
        } else if mode == GenerationMode::All {
            out.push(Move::quiet(from, one, PieceKind::Pawn));

            let two = offset_square(one, dir);
            if rank_of(from) == pawn_start_rank(color) && position.squares[two].is_empty() {
                let mut double = Move::quiet(from, two, PieceKind::Pawn);
                double.en_passant_target = Some(one);
                out.push(double);
            }
        }
    }

    for side in [-1, 1] {
        let to = offset_square(from, dir + side);
        match position.squares[to] {
            Cell::Piece(victim) if victim.color != color => {
                out.push(
                    Move::capture(from, to, PieceKind::Pawn, victim.kind)
                        .with_flags(promotion(to) | extra),
                );
            }
            Cell::Empty if position.en_passant_square == Some(to) => {
                out.push(
                    Move::capture(from, to, PieceKind::Pawn, PieceKind::Pawn)
                        .with_flags(FLAG_EN_PASSANT | extra),
                );
            }
            _ => {}
        }
    }
}

/// Knight and king moves from fixed offset tables.
pub fn step_moves(
    position: &Position,
    from: Square,
    piece: Piece,
    offsets: &[isize],
    mode: GenerationMode,
    out: &mut Vec<Move>,
) {
    let extra = mode_flags(mode);
    for &off in offsets {
        let to = offset_square(from, off);
        match position.squares[to] {
            Cell::Empty if mode == GenerationMode::All => {
                out.push(Move::quiet(from, to, piece.kind));
            }
            Cell::Piece(victim) if victim.color != piece.color => {
                out.push(Move::capture(from, to, piece.kind, victim.kind).with_flags(extra));
            }
            _ => {}
        }
    }
}

/// Bishop, rook, and queen rays; rooks also emit castling.
pub fn sliding_moves(
    position: &Position,
    from: Square,
    piece: Piece,
    directions: &[isize],
    mode: GenerationMode,
    out: &mut Vec<Move>,
) {
    let extra = mode_flags(mode);
    for &dir in directions {
        let mut to = offset_square(from, dir);
        loop {
            match position.squares[to] {
                Cell::Empty => {
                    if mode == GenerationMode::All {
                        out.push(Move::quiet(from, to, piece.kind));
                    }
                    to = offset_square(to, dir);
                }
                Cell::OffBoard => break,
                Cell::Piece(other) => {
                    if other.color != piece.color {
                        out.push(Move::capture(from, to, piece.kind, other.kind).with_flags(extra));
                    } else if piece.kind == PieceKind::Rook
                        && other.kind == PieceKind::King
                        && mode == GenerationMode::All
                    {
                        push_castle(position, from, to, piece.color, out);
                    }
                    break;
                }
            }
        }
    }
}

/// The ray from `rook_square` reached the own king on `king_square` with
/// nothing in between.
fn push_castle(
    position: &Position,
    rook_square: Square,
    king_square: Square,
    color: Color,
    out: &mut Vec<Move>,
) {
    let Some(side) = castling_side_for_rook(rook_square) else {
        return;
    };
    if side.color != color
        || side.king_from != king_square
        || position.castling_rights & side.right == 0
    {
        return;
    }
    out.push(Move::quiet(side.king_from, side.king_to, PieceKind::King).with_flags(FLAG_CASTLE));
}

/// Append every pseudo-legal move of the piece standing on `from`.
pub fn piece_moves(
    position: &Position,
    from: Square,
    piece: Piece,
    mode: GenerationMode,
    out: &mut Vec<Move>,
) {
    match piece.kind {
        PieceKind::Pawn => pawn_moves(position, from, piece.color, mode, out),
        PieceKind::Knight => step_moves(position, from, piece, &KNIGHT_OFFSETS, mode, out),
        PieceKind::Bishop => sliding_moves(position, from, piece, &BISHOP_DIRECTIONS, mode, out),
        PieceKind::Rook => sliding_moves(position, from, piece, &ROOK_DIRECTIONS, mode, out),
        PieceKind::Queen => sliding_moves(position, from, piece, &QUEEN_DIRECTIONS, mode, out),
        PieceKind::King => step_moves(position, from, piece, &KING_OFFSETS, mode, out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::algebraic::algebraic_to_square;

    fn sq(name: &str) -> Square {
        algebraic_to_square(name).expect("square should parse")
    }

    fn moves_from(fen: &str, from: &str, mode: GenerationMode) -> Vec<String> {
        let position = Position::from_fen(fen).expect("FEN should parse");
        let piece = position.piece_at(sq(from)).piece().expect("piece should exist");
        let mut out = Vec::new();
        piece_moves(&position, sq(from), piece, mode, &mut out);
        let mut text: Vec<String> = out.iter().map(|m| m.to_string()).collect();
        text.sort();
        text
    }

    #[test]
    fn pawn_pushes_captures_and_en_passant() {
        let fen = "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1";
        assert_eq!(moves_from(fen, "e5", GenerationMode::All), vec!["e5d6", "e5e6"]);

        let fen = "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1";
        assert_eq!(moves_from(fen, "e2", GenerationMode::All), vec!["e2e3", "e2e4"]);

        let blocked = "4k3/8/8/8/8/4n3/4P3/4K3 w - - 0 1";
        assert!(moves_from(blocked, "e2", GenerationMode::All).is_empty());

        let half_blocked = "4k3/8/8/8/4n3/8/4P3/4K3 w - - 0 1";
        assert_eq!(moves_from(half_blocked, "e2", GenerationMode::All), vec!["e2e3"]);
    }

    #[test]
    fn pawn_promotes_only_to_queen() {
        let fen = "3rk3/4P3/8/8/8/8/8/4K3 w - - 0 1";
        assert_eq!(moves_from(fen, "e7", GenerationMode::All), vec!["e7d8q"]);
        let fen = "1r2k3/P7/8/8/8/8/8/4K3 w - - 0 1";
        assert_eq!(
            moves_from(fen, "a7", GenerationMode::Quiescent),
            vec!["a7a8q", "a7b8q"]
        );
    }

    #[test]
    fn double_push_records_en_passant_target() {
        let position = Position::new_game();
        let mut out = Vec::new();
        pawn_moves(&position, sq("d2"), Color::White, GenerationMode::All, &mut out);
        let double = out
            .iter()
            .find(|m| m.end == sq("d4"))
            .expect("double push should exist");
        assert_eq!(double.en_passant_target, Some(sq("d3")));
    }

    #[test]
    fn rook_emits_castling_when_path_is_clear() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        let from_h1 = moves_from(fen, "h1", GenerationMode::All);
        assert!(from_h1.contains(&"e1g1".to_owned()));
        let from_a1 = moves_from(fen, "a1", GenerationMode::All);
        assert!(from_a1.contains(&"e1c1".to_owned()));

        let no_rights = "r3k2r/8/8/8/8/8/8/R3K2R w kq - 0 1";
        assert!(!moves_from(no_rights, "h1", GenerationMode::All).contains(&"e1g1".to_owned()));

        let blocked = "r3k2r/8/8/8/8/8/8/RN2K2R w KQkq - 0 1";
        assert!(!moves_from(blocked, "a1", GenerationMode::All).contains(&"e1c1".to_owned()));
        assert!(!moves_from(fen, "h1", GenerationMode::Quiescent).contains(&"e1g1".to_owned()));
    }

    #[test]
    fn quiescent_mode_keeps_only_captures() {
        let fen = "4k3/8/8/4p3/8/5N2/8/4K3 w - - 0 1";
        assert_eq!(moves_from(fen, "f3", GenerationMode::Quiescent), vec!["f3e5"]);
        // Eight hops minus the one onto the own king.
        assert_eq!(moves_from(fen, "f3", GenerationMode::All).len(), 7);
    }

    #[test]
    fn king_captures_are_flagged() {
        let position =
            Position::from_fen("4k3/8/8/8/8/8/8/4K2R w - - 0 1").expect("FEN should parse");
        let mut out = Vec::new();
        let rook = Piece::new(PieceKind::Rook, Color::White);
        sliding_moves(&position, sq("h1"), rook, &ROOK_DIRECTIONS, GenerationMode::All, &mut out);
        assert!(!out.iter().any(|m| m.is_king_capture()));

        let position =
            Position::from_fen("7k/8/8/8/8/8/8/4K2R w - - 0 1").expect("FEN should parse");
        out.clear();
        sliding_moves(&position, sq("h1"), rook, &ROOK_DIRECTIONS, GenerationMode::All, &mut out);
        assert!(out.iter().any(|m| m.is_king_capture() && m.end == sq("h8")));
    }
}
