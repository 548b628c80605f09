//! Fail-soft alpha-beta search.
//!
//! One `Searcher` runs one single-threaded search over a `SearchContext` it
//! borrows for the duration. Positions are immutable: every child is a fresh
//! value, so nothing is undone on the way back up. Illegal moves are skipped
//! when the mover's king is left attacked, and a position where the side to
//! move can capture the king is scored as already won.
//!
//! `minimax` is the unpruned baseline the pruned search is checked against.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::game_state::chess_move::Move;
use crate::game_state::position::Position;
use crate::move_generation::legal_move_apply::find_pseudo_legal;
use crate::move_generation::move_generator::{legal_child, pseudo_legal_moves, GenerationMode};
use crate::search::board_scoring::{
    BoardScorer, PieceSquareScorer, INFINITY, MATE_SCORE, MATE_THRESHOLD,
};
use crate::search::move_ordering::{order_moves, MoveOrdering, OrderingHints};
use crate::search::quiescence::QuiescenceConfig;
use crate::search::transposition_table::{Bound, SearchContext, TTEntry, DEFAULT_TT_CAPACITY};

pub const DRAW_SCORE: i32 = 0;
/// Frontier nodes whose static score is this far below alpha skip quiet moves.
const FUTILITY_MARGIN: i32 = 200;
/// How often, in nodes, the cancel flag is polled.
const CANCEL_POLL_INTERVAL: u64 = 1024;

/// The search was cancelled; whatever it computed is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aborted;

#[derive(Clone)]
pub struct SearchConfig {
    pub scorer: Arc<dyn BoardScorer>,
    pub ordering: MoveOrdering,
    /// `None` scores depth-exhausted nodes with the scorer directly.
    pub quiescence: Option<QuiescenceConfig>,
    pub use_transposition_table: bool,
    pub tt_capacity: usize,
    pub late_move_reduction: bool,
    pub futility_pruning: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            scorer: Arc::new(PieceSquareScorer),
            ordering: MoveOrdering::Fast,
            quiescence: Some(QuiescenceConfig::default()),
            use_transposition_table: true,
            tt_capacity: DEFAULT_TT_CAPACITY,
            late_move_reduction: true,
            futility_pruning: true,
        }
    }
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("ordering", &self.ordering)
            .field("quiescence", &self.quiescence)
            .field("use_transposition_table", &self.use_transposition_table)
            .field("tt_capacity", &self.tt_capacity)
            .field("late_move_reduction", &self.late_move_reduction)
            .field("futility_pruning", &self.futility_pruning)
            .finish_non_exhaustive()
    }
}

/// Result of searching one node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchNode {
    /// Score for the side to move, in centipawns.
    pub value: i32,
    pub depth: i32,
    pub pv: Vec<Move>,
    /// Window the node was searched with.
    pub lower: i32,
    pub upper: i32,
    pub nodes: u64,
}

impl SearchNode {
    #[inline]
    pub fn best_move(&self) -> Option<Move> {
        self.pv.first().copied()
    }

    #[inline]
    pub fn is_mate_score(&self) -> bool {
        is_mate_score(self.value)
    }

    fn leaf(value: i32, depth: i32, lower: i32, upper: i32) -> Self {
        Self {
            value,
            depth,
            pv: Vec::new(),
            lower,
            upper,
            nodes: 1,
        }
    }
}

#[inline]
pub fn is_mate_score(value: i32) -> bool {
    value.abs() > MATE_THRESHOLD
}

/// Plies to mate encoded in `value`, positive when the side to move mates.
pub fn mate_distance(value: i32) -> Option<i32> {
    if !is_mate_score(value) {
        return None;
    }
    Some(if value > 0 {
        MATE_SCORE - value
    } else {
        -(MATE_SCORE + value)
    })
}

/// Search `position` to `depth` with a full window and fresh caches.
pub fn search(position: &Position, depth: i32, config: &SearchConfig) -> SearchNode {
    let mut context = SearchContext::with_capacity(config.tt_capacity);
    // Without a cancel flag the search always completes.
    search_window(position, depth, -INFINITY, INFINITY, config, &mut context, None)
        .unwrap_or_default()
}

/// Search with an explicit window over caller-owned caches. Returns
/// `Err(Aborted)` once `cancel` is observed set.
pub fn search_window(
    position: &Position,
    depth: i32,
    alpha: i32,
    beta: i32,
    config: &SearchConfig,
    context: &mut SearchContext,
    cancel: Option<&AtomicBool>,
) -> Result<SearchNode, Aborted> {
    let mut searcher = Searcher::new(config, context, cancel);
    let mut node = searcher.alpha_beta(position, depth, alpha, beta, 0)?;
    node.nodes = searcher.nodes;
    Ok(node)
}

/// Plain minimax in generation order with static leaves. Slow; used as the
/// reference the pruned search must agree with.
pub fn minimax(position: &Position, depth: i32, config: &SearchConfig) -> SearchNode {
    let mut nodes = 0;
    let mut node = minimax_node(position, depth, 0, config.scorer.as_ref(), &mut nodes);
    node.nodes = nodes;
    node
}

fn minimax_node(
    position: &Position,
    depth: i32,
    ply: usize,
    scorer: &dyn BoardScorer,
    nodes: &mut u64,
) -> SearchNode {
    *nodes += 1;
    let full = |value| SearchNode::leaf(value, depth.max(0), -INFINITY, INFINITY);
    let color = position.side_to_move;

    if position.king_square(color).is_none() {
        return full(-MATE_SCORE + ply as i32);
    }
    if ply > 0 && (position.is_repetition() || position.fifty_move_draw()) {
        return full(DRAW_SCORE);
    }
    if depth <= 0 {
        return full(scorer.score(position));
    }

    let moves = pseudo_legal_moves(position, GenerationMode::All);
    if moves.iter().any(Move::is_king_capture) {
        return full(MATE_SCORE - ply as i32);
    }

    let mut best: Option<SearchNode> = None;
    for mv in moves {
        let Some(child) = legal_child(position, mv) else {
            continue;
        };
        let reply = minimax_node(&child, depth - 1, ply + 1, scorer, nodes);
        let value = -reply.value;
        if best.as_ref().map_or(true, |b| value > b.value) {
            let mut pv = Vec::with_capacity(reply.pv.len() + 1);
            pv.push(mv);
            pv.extend(reply.pv);
            best = Some(SearchNode {
                value,
                pv,
                ..full(value)
            });
        }
    }

    best.unwrap_or_else(|| {
        if position.is_in_check(color) {
            full(-MATE_SCORE + ply as i32)
        } else {
            full(DRAW_SCORE)
        }
    })
}

pub(crate) struct Searcher<'a> {
    pub(crate) config: &'a SearchConfig,
    pub(crate) context: &'a mut SearchContext,
    cancel: Option<&'a AtomicBool>,
    pub(crate) nodes: u64,
}

impl<'a> Searcher<'a> {
    pub(crate) fn new(
        config: &'a SearchConfig,
        context: &'a mut SearchContext,
        cancel: Option<&'a AtomicBool>,
    ) -> Self {
        Self {
            config,
            context,
            cancel,
            nodes: 0,
        }
    }

    /// Count a node and poll the cancel flag now and then.
    #[inline]
    pub(crate) fn visit(&mut self) -> Result<(), Aborted> {
        self.nodes += 1;
        if self.nodes % CANCEL_POLL_INTERVAL == 0 {
            if let Some(flag) = self.cancel {
                if flag.load(Ordering::Relaxed) {
                    return Err(Aborted);
                }
            }
        }
        Ok(())
    }

    fn alpha_beta(
        &mut self,
        position: &Position,
        depth: i32,
        mut alpha: i32,
        mut beta: i32,
        ply: usize,
    ) -> Result<SearchNode, Aborted> {
        self.visit()?;
        let first_node = self.nodes;
        let color = position.side_to_move;

        if position.king_square(color).is_none() {
            return Ok(SearchNode::leaf(-MATE_SCORE + ply as i32, depth, alpha, beta));
        }
        if ply > 0 && (position.is_repetition() || position.fifty_move_draw()) {
            return Ok(SearchNode::leaf(DRAW_SCORE, depth, alpha, beta));
        }
        if depth <= 0 {
            let value = match self.config.quiescence {
                Some(quiescence) => {
                    self.quiescence(position, alpha, beta, ply, 0, quiescence.check_quota)?
                }
                None => self.config.scorer.score(position),
            };
            return Ok(SearchNode::leaf(value, 0, alpha, beta));
        }

        let key = position.fingerprint();
        if self.config.use_transposition_table && ply > 0 {
            if let Some(entry) = self.context.tt.probe(key, depth, ply) {
                match entry.bound() {
                    Bound::Exact => {
                        return Ok(SearchNode {
                            pv: self.remembered_line(position),
                            ..SearchNode::leaf(entry.value, entry.depth, alpha, beta)
                        });
                    }
                    Bound::Lower => alpha = alpha.max(entry.value),
                    Bound::Upper => beta = beta.min(entry.value),
                }
                if alpha >= beta {
                    return Ok(SearchNode::leaf(entry.value, entry.depth, alpha, beta));
                }
            }
        }

        let moves = pseudo_legal_moves(position, GenerationMode::All);
        if moves.iter().any(Move::is_king_capture) {
            return Ok(SearchNode::leaf(MATE_SCORE - ply as i32, depth, alpha, beta));
        }

        let hints = OrderingHints {
            best_move: self
                .context
                .best_moves
                .get(key)
                .and_then(|mv| find_pseudo_legal(position, &mv)),
            killers: self.context.killers.at(ply),
        };
        let moves = order_moves(position, moves, self.config.ordering, &hints);

        let in_check = position.is_in_check(color);
        let futility_value = (self.config.futility_pruning && ply > 0 && depth == 1 && !in_check)
            .then(|| self.config.scorer.score(position) + FUTILITY_MARGIN);
        let (window_lower, window_upper) = (alpha, beta);

        let mut best_value = -INFINITY;
        let mut best_move = None;
        let mut best_pv = Vec::new();
        let mut legal_moves = 0usize;
        let mut quiet_tried = 0usize;

        for mv in moves {
            let Some(child) = legal_child(position, mv) else {
                continue;
            };
            legal_moves += 1;

            let quiet = mv.is_quiet();
            let gives_check = quiet && child.is_in_check(child.side_to_move);
            if let Some(futile) = futility_value {
                if quiet && !gives_check && futile <= alpha {
                    best_value = best_value.max(futile);
                    continue;
                }
            }

            let mut child_depth = depth - 1;
            if quiet {
                if self.config.late_move_reduction && !in_check && !gives_check {
                    child_depth -= late_move_reduction(depth, quiet_tried);
                }
                quiet_tried += 1;
            }

            let reply = self.alpha_beta(&child, child_depth, -beta, -alpha, ply + 1)?;
            let value = -reply.value;

            if value > best_value {
                best_value = value;
                best_move = Some(mv);
                best_pv.clear();
                best_pv.push(mv);
                best_pv.extend(reply.pv);
            }
            if value > alpha {
                alpha = value;
            }
            if alpha >= beta {
                if quiet {
                    self.context.killers.record(ply, mv);
                }
                break;
            }
        }

        if legal_moves == 0 {
            let value = if in_check {
                -MATE_SCORE + ply as i32
            } else {
                DRAW_SCORE
            };
            return Ok(SearchNode::leaf(value, depth, window_lower, window_upper));
        }

        if let Some(mv) = best_move {
            self.context.best_moves.insert(key, mv);
        }
        if self.config.use_transposition_table {
            self.context.tt.store(
                key,
                TTEntry {
                    value: best_value,
                    depth,
                    lower: window_lower,
                    upper: window_upper,
                },
                ply,
            );
        }

        Ok(SearchNode {
            value: best_value,
            depth,
            pv: best_pv,
            lower: window_lower,
            upper: window_upper,
            nodes: self.nodes - first_node + 1,
        })
    }

    /// The remembered best move of `position`, if it is still playable.
    fn remembered_line(&self, position: &Position) -> Vec<Move> {
        self.context
            .best_moves
            .get(position.fingerprint())
            .and_then(|mv| find_pseudo_legal(position, &mv))
            .filter(|mv| legal_child(position, *mv).is_some())
            .into_iter()
            .collect()
    }
}

/// Depth taken off a quiet move once `quiet_tried` quiet siblings have
/// already been searched.
fn late_move_reduction(depth: i32, quiet_tried: usize) -> i32 {
    let depth = depth.max(0) as usize;
    if quiet_tried > 4 + 8 * depth {
        3
    } else if quiet_tried > 4 + 6 * depth {
        2
    } else if quiet_tried > 3 + 3 * depth {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_rules::STARTING_POSITION_FEN;
    use crate::game_state::chess_types::PieceKind;
    use crate::move_generation::legal_move_apply::apply_long_algebraic_moves;
    use crate::search::board_scoring::MaterialScorer;
    use crate::search::iterative_deepening::format_pv;

    /// Unpruned alpha-beta in generation order: the configuration that must
    /// reproduce minimax exactly.
    fn oracle_config() -> SearchConfig {
        SearchConfig {
            scorer: Arc::new(MaterialScorer),
            ordering: MoveOrdering::Identity,
            quiescence: None,
            use_transposition_table: false,
            tt_capacity: 10_000,
            late_move_reduction: false,
            futility_pruning: false,
        }
    }

    const CORPUS: &[(&str, i32)] = &[
        ("8/8/8/8/8/4k3/4P3/4K3 w - - 0 1", 5),
        ("4k3/8/8/8/8/8/4q3/4KQ2 w - - 0 1", 3),
        ("7k/8/6K1/8/8/8/8/R7 w - - 0 1", 3),
        ("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1", 4),
        (STARTING_POSITION_FEN, 3),
        ("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", 3),
    ];

    fn parse(fen: &str) -> Position {
        Position::from_fen(fen).expect("corpus FEN should parse")
    }

    #[test]
    fn alpha_beta_matches_minimax() {
        let config = oracle_config();
        for &(fen, max_depth) in CORPUS {
            let position = parse(fen);
            for depth in 1..=max_depth {
                let reference = minimax(&position, depth, &config);
                let pruned = search(&position, depth, &config);
                assert_eq!(pruned.value, reference.value, "{fen} at depth {depth}");
                assert_eq!(pruned.pv, reference.pv, "{fen} at depth {depth}");
                assert!(pruned.nodes <= reference.nodes);
            }
        }
    }

    fn reversed(_: &Position, mut moves: Vec<Move>) -> Vec<Move> {
        moves.reverse();
        moves
    }

    #[test]
    fn orderings_agree_on_value() {
        let position =
            parse("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        let reference = search(&position, 3, &oracle_config());
        for ordering in [
            MoveOrdering::Fast,
            MoveOrdering::MvvLva,
            MoveOrdering::Random,
            MoveOrdering::Custom(reversed),
        ] {
            let config = SearchConfig {
                ordering,
                ..oracle_config()
            };
            assert_eq!(search(&position, 3, &config).value, reference.value, "{ordering:?}");
        }
    }

    #[test]
    fn transposition_table_is_value_neutral() {
        for quiescence in [None, Some(QuiescenceConfig::default())] {
            for &(fen, max_depth) in CORPUS {
                let position = parse(fen);
                for depth in 1..=max_depth.min(4) {
                    let off = SearchConfig {
                        ordering: MoveOrdering::Fast,
                        quiescence,
                        ..oracle_config()
                    };
                    let on = SearchConfig {
                        use_transposition_table: true,
                        ..off.clone()
                    };
                    assert_eq!(
                        search(&position, depth, &on).value,
                        search(&position, depth, &off).value,
                        "{fen} at depth {depth}, quiescence {:?}",
                        quiescence.is_some()
                    );
                }
            }
        }
    }

    #[test]
    fn finds_mate_in_one() {
        // Ra8 is mate; the king covers g7 and h7.
        let position = parse("7k/8/6K1/8/8/8/8/R7 w - - 0 1");
        let node = search(&position, 2, &SearchConfig::default());
        assert_eq!(node.value, MATE_SCORE - 1);
        assert_eq!(mate_distance(node.value), Some(1));
        assert_eq!(node.best_move().map(|m| m.to_string()).as_deref(), Some("a1a8"));
    }

    #[test]
    fn repeating_a_position_scores_as_a_draw() {
        // A knight down to a queen, White can only hold by walking back into
        // a position already on the board.
        let fen = "4k3/8/8/8/8/8/q7/6NK w - - 0 1";
        let fresh = search(&parse(fen), 1, &oracle_config());
        assert_eq!(fresh.value, 320 - 900);

        let shuffled =
            apply_long_algebraic_moves(&parse(fen), &["g1f3", "e8d8", "f3g1", "d8e8"])
                .expect("shuffle is legal");
        // The root itself is a repetition and is still searched.
        assert!(shuffled.is_repetition());
        let node = search(&shuffled, 1, &oracle_config());
        assert_eq!(node.value, DRAW_SCORE);
        assert_eq!(format_pv(&node.pv), "g1f3");
    }

    #[test]
    fn fifty_move_rule_applies_below_the_root() {
        // Any king move reaches the hundredth half-move and is a draw.
        let position = parse("4k3/8/8/8/8/3q4/8/4K3 w - - 99 80");
        let node = search(&position, 1, &oracle_config());
        assert_eq!(node.value, DRAW_SCORE);
        assert_eq!(format_pv(&node.pv), "e1f2");

        // At the limit already, the root is searched and the capture that
        // resets the clock wins.
        let position = parse("4k3/8/8/3q4/4P3/8/8/4K3 w - - 100 80");
        assert!(position.fifty_move_draw());
        let node = search(&position, 1, &oracle_config());
        assert_eq!(node.value, PieceKind::Pawn.value());
        assert_eq!(format_pv(&node.pv), "e4d5");
    }

    #[test]
    fn terminal_positions_score_without_moves() {
        let config = SearchConfig::default();
        // Black is checkmated.
        let mated = parse("6k1/6Q1/6K1/8/8/8/8/8 b - - 0 1");
        let node = search(&mated, 3, &config);
        assert_eq!(node.value, -MATE_SCORE);
        assert!(node.pv.is_empty());

        // Black is stalemated.
        let stalemate = parse("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        assert_eq!(search(&stalemate, 3, &config).value, DRAW_SCORE);

        // A side without a king has already lost.
        let kingless = parse("8/8/8/8/8/8/8/4K3 b - - 0 1");
        assert_eq!(search(&kingless, 2, &config).value, -MATE_SCORE);
    }

    #[test]
    fn capturable_king_is_an_immediate_win() {
        // White to move while black is in check: the previous move was illegal.
        let position = parse("4k3/8/8/8/8/8/8/4RK2 w - - 0 1");
        let node = search(&position, 3, &oracle_config());
        assert_eq!(node.value, MATE_SCORE);
        assert_eq!(minimax(&position, 3, &oracle_config()).value, MATE_SCORE);
    }

    #[test]
    fn pruning_still_returns_a_defined_value() {
        // A lone king against a queen: every quiet move at the frontier is
        // futile for black, yet the search must report a real score.
        let position = parse("4k3/8/8/8/8/8/3Q4/4K3 b - - 0 1");
        let node = search(&position, 2, &SearchConfig::default());
        assert!(node.value > -INFINITY && node.value < 0);
        assert!(node.best_move().is_some());
    }

    #[test]
    fn search_window_stops_when_cancelled() {
        let position = Position::new_game();
        let config = SearchConfig::default();
        let mut context = SearchContext::with_capacity(config.tt_capacity);
        let cancel = AtomicBool::new(true);
        let result = search_window(
            &position,
            6,
            -INFINITY,
            INFINITY,
            &config,
            &mut context,
            Some(&cancel),
        );
        assert_eq!(result, Err(Aborted));
    }

    #[test]
    fn reductions_step_with_quiet_moves_tried() {
        assert_eq!(late_move_reduction(2, 9), 0);
        assert_eq!(late_move_reduction(2, 10), 1);
        assert_eq!(late_move_reduction(2, 17), 2);
        assert_eq!(late_move_reduction(2, 21), 3);
    }
}
