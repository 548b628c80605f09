//! Errors surfaced to callers of the engine.
//!
//! Searching never fails: checkmate, stalemate, missing kings and cancelled
//! depths are all ordinary outcomes. What can fail is turning text (FEN or
//! long algebraic moves) into engine values, and that is what `ParseError`
//! describes.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("missing {0} field in FEN")]
    MissingFenField(&'static str),

    #[error("FEN has extra trailing fields")]
    ExtraFenFields,

    #[error("board layout must contain 8 ranks, found {0}")]
    WrongRankCount(usize),

    #[error("rank {rank} does not describe exactly 8 files")]
    BadRankLength { rank: usize },

    #[error("invalid piece character '{0}' in board layout")]
    InvalidPiece(char),

    #[error("more than one {0} king on the board")]
    TooManyKings(&'static str),

    #[error("invalid side-to-move field: {0}")]
    InvalidSideToMove(String),

    #[error("invalid castling rights character: {0}")]
    InvalidCastling(char),

    #[error("invalid square: {0}")]
    InvalidSquare(String),

    #[error("invalid {field}: {value}")]
    InvalidCounter { field: &'static str, value: String },

    #[error("invalid long algebraic move: {0}")]
    InvalidMoveText(String),

    #[error("under-promotion is not supported: {0}")]
    UnsupportedPromotion(String),

    #[error("move {0} is not legal in this position")]
    IllegalMove(String),
}

#[cfg(test)]
mod tests {
    use super::ParseError;

    #[test]
    fn messages_carry_the_offending_input() {
        assert_eq!(
            ParseError::InvalidPiece('x').to_string(),
            "invalid piece character 'x' in board layout"
        );
        assert_eq!(
            ParseError::InvalidCounter {
                field: "halfmove clock",
                value: "abc".to_owned()
            }
            .to_string(),
            "invalid halfmove clock: abc"
        );
    }
}
