//! Move value type produced by the generators and consumed by the search.
//!
//! Moves are small `Copy` values. Promotions always produce a queen.

use std::fmt;

use crate::game_state::chess_rules::{file_of, is_playable, rank_of};
use crate::game_state::chess_types::{PieceKind, Square};

pub const FLAG_CAPTURE: u8 = 1 << 0;
pub const FLAG_CASTLE: u8 = 1 << 1;
pub const FLAG_KING_CAPTURE: u8 = 1 << 2;
pub const FLAG_NULL: u8 = 1 << 3;
pub const FLAG_QUIESCENT: u8 = 1 << 4;
pub const FLAG_EN_PASSANT: u8 = 1 << 5;
pub const FLAG_PROMOTION: u8 = 1 << 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub start: Square,
    pub end: Square,
    pub moving_piece: PieceKind,
    pub captured_piece: Option<PieceKind>,
    pub flags: u8,
    /// Square a two-square pawn push makes capturable en passant.
    pub en_passant_target: Option<Square>,
}

impl Move {
    #[inline]
    pub const fn quiet(start: Square, end: Square, moving_piece: PieceKind) -> Self {
        Self {
            start,
            end,
            moving_piece,
            captured_piece: None,
            flags: 0,
            en_passant_target: None,
        }
    }

    /// A capture of `captured` on `end`. Captures of a king carry
    /// [`FLAG_KING_CAPTURE`].
    #[inline]
    pub fn capture(
        start: Square,
        end: Square,
        moving_piece: PieceKind,
        captured: PieceKind,
    ) -> Self {
        let mut flags = FLAG_CAPTURE;
        if captured == PieceKind::King {
            flags |= FLAG_KING_CAPTURE;
        }
        Self {
            start,
            end,
            moving_piece,
            captured_piece: Some(captured),
            flags,
            en_passant_target: None,
        }
    }

    /// The "pass" move: flips the side to move without touching the board.
    #[inline]
    pub const fn null() -> Self {
        Self {
            start: 0,
            end: 0,
            moving_piece: PieceKind::King,
            captured_piece: None,
            flags: FLAG_NULL,
            en_passant_target: None,
        }
    }

    #[inline]
    pub const fn with_flags(mut self, flags: u8) -> Self {
        self.flags |= flags;
        self
    }

    #[inline]
    pub const fn is_capture(&self) -> bool {
        self.flags & FLAG_CAPTURE != 0
    }

    #[inline]
    pub const fn is_castle(&self) -> bool {
        self.flags & FLAG_CASTLE != 0
    }

    #[inline]
    pub const fn is_king_capture(&self) -> bool {
        self.flags & FLAG_KING_CAPTURE != 0
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        self.flags & FLAG_NULL != 0
    }

    #[inline]
    pub const fn is_quiescent(&self) -> bool {
        self.flags & FLAG_QUIESCENT != 0
    }

    #[inline]
    pub const fn is_en_passant(&self) -> bool {
        self.flags & FLAG_EN_PASSANT != 0
    }

    #[inline]
    pub const fn is_promotion(&self) -> bool {
        self.flags & FLAG_PROMOTION != 0
    }

    /// Neither a capture nor a promotion.
    #[inline]
    pub const fn is_quiet(&self) -> bool {
        self.flags & (FLAG_CAPTURE | FLAG_PROMOTION) == 0
    }

    /// Value of the captured piece, or 0 for non-captures.
    #[inline]
    pub fn captured_value(&self) -> i32 {
        self.captured_piece.map_or(0, PieceKind::value)
    }

    /// Same start, end and piece: the identity used for killers and cached
    /// best moves, which may have been generated in a different mode.
    #[inline]
    pub fn same_route(&self, other: &Move) -> bool {
        self.start == other.start
            && self.end == other.end
            && self.moving_piece == other.moving_piece
    }
}

fn write_square(f: &mut fmt::Formatter<'_>, square: Square) -> fmt::Result {
    if !is_playable(square) {
        return write!(f, "??");
    }
    let file = char::from(b'a' + file_of(square) as u8);
    let rank = char::from(b'1' + rank_of(square) as u8);
    write!(f, "{file}{rank}")
}

/// Long algebraic notation (`e2e4`, `e7e8q`, null move `0000`).
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return write!(f, "0000");
        }
        write_square(f, self.start)?;
        write_square(f, self.end)?;
        if self.is_promotion() {
            write!(f, "q")?;
        }
        Ok(())
    }
}
