//! Quiescence search.
//!
//! Extends depth-exhausted nodes with captures and promotions until the
//! position is quiet, so the scorer is never asked about a half-finished
//! exchange. Outside check the side to move may stand pat on the static
//! score. In check every evasion is searched, which is also how mates at the
//! horizon are found. A small quota of quiet checking moves is allowed per
//! line.

use crate::game_state::chess_move::Move;
use crate::game_state::position::Position;
use crate::move_generation::attacks::may_give_check;
use crate::move_generation::move_generator::{legal_child, pseudo_legal_moves, GenerationMode};
use crate::search::alpha_beta::{Aborted, Searcher};
use crate::search::board_scoring::{INFINITY, MATE_SCORE};
use crate::search::exchange::is_bad_capture;
use crate::search::move_ordering::{order_moves, MoveOrdering, OrderingHints};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuiescenceConfig {
    /// Plies past the horizon after which the scorer is used as is.
    pub max_depth: u32,
    /// Quiet checking moves allowed along one line.
    pub check_quota: u32,
    pub ordering: MoveOrdering,
}

impl Default for QuiescenceConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            check_quota: 1,
            ordering: MoveOrdering::Quiescence,
        }
    }
}

impl Searcher<'_> {
    pub(crate) fn quiescence(
        &mut self,
        position: &Position,
        mut alpha: i32,
        beta: i32,
        ply: usize,
        qdepth: u32,
        quota: u32,
    ) -> Result<i32, Aborted> {
        self.visit()?;
        let settings = self.config.quiescence.unwrap_or_default();
        let color = position.side_to_move;

        if position.king_square(color).is_none() {
            return Ok(-MATE_SCORE + ply as i32);
        }
        if qdepth >= settings.max_depth {
            return Ok(self.config.scorer.score(position));
        }

        let in_check = position.is_in_check(color);
        let mut best = -INFINITY;
        if !in_check {
            let stand_pat = self.config.scorer.score(position);
            if stand_pat >= beta {
                return Ok(stand_pat);
            }
            best = stand_pat;
            alpha = alpha.max(stand_pat);
        }

        let mut moves: Vec<Move> = if in_check {
            pseudo_legal_moves(position, GenerationMode::All)
        } else {
            let mut tactical = pseudo_legal_moves(position, GenerationMode::Quiescent);
            // Quiet moves that cannot check are dropped before being played.
            if let Some(king) = position.king_square(color.opposite()).filter(|_| quota > 0) {
                tactical.extend(
                    pseudo_legal_moves(position, GenerationMode::All)
                        .into_iter()
                        .filter(|mv| {
                            mv.is_quiet() && may_give_check(&position.squares, mv, color, king)
                        }),
                );
            }
            tactical
        };
        if moves.iter().any(Move::is_king_capture) {
            return Ok(MATE_SCORE - ply as i32);
        }
        moves = order_moves(position, moves, settings.ordering, &OrderingHints::default());

        let mut evasions = 0usize;
        for mv in moves {
            if !in_check && mv.is_capture() && is_bad_capture(position, &mv) {
                continue;
            }
            let Some(child) = legal_child(position, mv) else {
                continue;
            };
            evasions += 1;

            let mut child_quota = quota;
            if !in_check && !mv.is_capture() {
                if mv.is_quiet() && !child.is_in_check(child.side_to_move) {
                    continue;
                }
                child_quota = quota.saturating_sub(1);
            }

            let value =
                -self.quiescence(&child, -beta, -alpha, ply + 1, qdepth + 1, child_quota)?;
            if value > best {
                best = value;
            }
            if value > alpha {
                alpha = value;
            }
            if alpha >= beta {
                break;
            }
        }

        if in_check && evasions == 0 {
            return Ok(-MATE_SCORE + ply as i32);
        }
        Ok(best)
    }
}
