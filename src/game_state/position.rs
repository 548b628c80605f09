//! Immutable board state.
//!
//! `Position` is the central model for the engine. Every move application
//! produces a fresh value (see `move_generation::legal_move_apply`), so the
//! recursive search never needs an undo phase. Alongside the 120-cell mailbox
//! it caches king squares and pawn structure counts, and it carries the chain
//! of prior fingerprints used for repetition detection.

use std::sync::Arc;

use crate::errors::ParseError;
use crate::game_state::chess_rules::{
    file_of, is_playable, playable_squares, BOARD_CELLS, STARTING_POSITION_FEN,
};
use crate::game_state::chess_types::*;
use crate::game_state::fingerprint::compute_fingerprint;
use crate::move_generation::attacks::is_square_attacked;
use crate::utils::fen_generator::generate_fen;
use crate::utils::fen_parser::parse_fen;

#[derive(Debug)]
struct HistoryEntry {
    fingerprint: u64,
    previous: Option<Arc<HistoryEntry>>,
}

/// Persistent, append-only list of the fingerprints of earlier positions.
///
/// Children share their parent's list, so extending it is O(1) no matter how
/// long the game is.
#[derive(Debug, Clone, Default)]
pub struct PositionHistory {
    head: Option<Arc<HistoryEntry>>,
    len: usize,
}

impl PositionHistory {
    pub fn push(&self, fingerprint: u64) -> Self {
        Self {
            head: Some(Arc::new(HistoryEntry {
                fingerprint,
                previous: self.head.clone(),
            })),
            len: self.len + 1,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Fingerprints from the most recent backwards.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        let mut cursor = self.head.as_deref();
        std::iter::from_fn(move || {
            let entry = cursor?;
            cursor = entry.previous.as_deref();
            Some(entry.fingerprint)
        })
    }

    /// Whether `fingerprint` occurs among the `window` most recent entries.
    pub fn contains_recent(&self, fingerprint: u64, window: usize) -> bool {
        self.iter().take(window).any(|fp| fp == fingerprint)
    }
}

#[derive(Debug, Clone)]
pub struct Position {
    pub squares: [Cell; BOARD_CELLS],
    pub side_to_move: Color,
    pub castling_rights: CastlingRights,
    pub en_passant_square: Option<Square>,
    pub halfmove_clock: u16,
    pub fullmove_number: u16,

    // Caches derived from `squares`.
    pub king_squares: [Option<Square>; 2],
    pub pawn_counts: [u8; 2],
    pub pawn_file_counts: [[u8; 8]; 2],

    pub history: PositionHistory,
    pub(crate) fingerprint: u64,
}

impl Position {
    /// Board with every playable cell empty and the border set off-board.
    pub fn empty() -> Self {
        let mut squares = [Cell::OffBoard; BOARD_CELLS];
        for square in playable_squares() {
            squares[square] = Cell::Empty;
        }
        let mut position = Self {
            squares,
            side_to_move: Color::White,
            castling_rights: 0,
            en_passant_square: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            king_squares: [None; 2],
            pawn_counts: [0; 2],
            pawn_file_counts: [[0; 8]; 2],
            history: PositionHistory::default(),
            fingerprint: 0,
        };
        position.refresh_fingerprint();
        position
    }

    pub fn new_game() -> Self {
        parse_fen(STARTING_POSITION_FEN).expect("starting FEN should always parse")
    }

    #[inline]
    pub fn from_fen(fen: &str) -> Result<Self, ParseError> {
        parse_fen(fen)
    }

    #[inline]
    pub fn to_fen(&self) -> String {
        generate_fen(self)
    }

    #[inline]
    pub fn piece_at(&self, square: Square) -> Cell {
        self.squares[square]
    }

    #[inline]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.king_squares[color.index()]
    }

    #[inline]
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Whether `color`'s king is attacked. A missing king is never in check.
    pub fn is_in_check(&self, color: Color) -> bool {
        match self.king_square(color) {
            Some(square) => is_square_attacked(&self.squares, square, color.opposite()),
            None => false,
        }
    }

    /// Whether this position already occurred earlier in its own history.
    ///
    /// Only the plies since the last capture or pawn move are scanned: those
    /// moves are irreversible, so nothing older can match.
    pub fn is_repetition(&self) -> bool {
        self.history
            .contains_recent(self.fingerprint, usize::from(self.halfmove_clock))
    }

    #[inline]
    pub fn fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// Non-king material of `color` in centipawns.
    pub fn material(&self, color: Color) -> i32 {
        playable_squares()
            .filter_map(|sq| self.squares[sq].piece())
            .filter(|p| p.color == color && p.kind != PieceKind::King)
            .map(|p| p.kind.value())
            .sum()
    }

    /// Iterator over `(square, piece)` for every piece on the board.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        playable_squares().filter_map(|sq| self.squares[sq].piece().map(|p| (sq, p)))
    }

    /// Put `piece` on an empty playable square, keeping the caches in step.
    /// Used while building positions; move application has its own path.
    pub(crate) fn place(&mut self, square: Square, piece: Piece) {
        debug_assert!(is_playable(square));
        self.squares[square] = Cell::Piece(piece);
        self.add_to_caches(square, piece);
    }

    pub(crate) fn add_to_caches(&mut self, square: Square, piece: Piece) {
        let color = piece.color.index();
        match piece.kind {
            PieceKind::King => self.king_squares[color] = Some(square),
            PieceKind::Pawn => {
                self.pawn_counts[color] += 1;
                self.pawn_file_counts[color][file_of(square)] += 1;
            }
            _ => {}
        }
    }

    pub(crate) fn remove_from_caches(&mut self, square: Square, piece: Piece) {
        let color = piece.color.index();
        match piece.kind {
            PieceKind::King => {
                if self.king_squares[color] == Some(square) {
                    self.king_squares[color] = None;
                }
            }
            PieceKind::Pawn => {
                self.pawn_counts[color] = self.pawn_counts[color].saturating_sub(1);
                let file = file_of(square);
                self.pawn_file_counts[color][file] =
                    self.pawn_file_counts[color][file].saturating_sub(1);
            }
            _ => {}
        }
    }

    pub(crate) fn refresh_fingerprint(&mut self) {
        self.fingerprint = compute_fingerprint(
            &self.squares,
            self.side_to_move,
            self.castling_rights,
            self.en_passant_square,
        );
    }

    /// Border cells must stay off-board and playable cells must not.
    pub fn border_intact(&self) -> bool {
        (0..BOARD_CELLS).all(|sq| is_playable(sq) != self.squares[sq].is_off_board())
    }
}
