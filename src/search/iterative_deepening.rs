//! Iterative deepening driver.
//!
//! Each depth runs as one `SearchUnit`: a worker thread that owns a copy of
//! the position, the configuration and the search caches, and hands back its
//! result together with the caches over a one-shot channel. The supervisor
//! polls the channel, and on timeout or an external stop it raises the unit's
//! cancel flag and throws the whole unit away. The answer is always the last
//! depth that completed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::game_state::chess_move::Move;
use crate::game_state::position::Position;
use crate::move_generation::move_generator::legal_moves;
use crate::search::alpha_beta::{search_window, Aborted, SearchConfig, SearchNode};
use crate::search::board_scoring::INFINITY;
use crate::search::transposition_table::SearchContext;

/// Half-width of the first aspiration window.
pub const ASPIRATION_WINDOW: i32 = 50;
/// Window misses tolerated before falling back to a full window.
const MAX_ASPIRATION_RETRIES: u32 = 4;
const POLL_INTERVAL: Duration = Duration::from_millis(100);
const TIMED_MAX_DEPTH: i32 = 64;
const UNTIMED_MAX_DEPTH: i32 = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_depth: Option<i32>,
    pub movetime_ms: Option<u64>,
}

impl SearchLimits {
    pub fn depth(max_depth: i32) -> Self {
        Self {
            max_depth: Some(max_depth),
            movetime_ms: None,
        }
    }

    pub fn movetime(movetime_ms: u64) -> Self {
        Self {
            max_depth: None,
            movetime_ms: Some(movetime_ms),
        }
    }

    /// Deepest iteration to run. Timed searches go deep and rely on the clock.
    /// At least one ply is always searched.
    pub fn depth_cap(&self) -> i32 {
        self.max_depth
            .unwrap_or(if self.movetime_ms.is_some() {
                TIMED_MAX_DEPTH
            } else {
                UNTIMED_MAX_DEPTH
            })
            .max(1)
    }
}

/// Progress after each completed depth.
#[derive(Debug, Clone, Copy)]
pub struct DepthReport<'a> {
    pub depth: i32,
    pub node: &'a SearchNode,
    /// Nodes over all iterations so far, re-searches included.
    pub total_nodes: u64,
    pub elapsed: Duration,
}

pub fn iterative_deepening(
    position: &Position,
    config: &SearchConfig,
    limits: SearchLimits,
) -> Option<SearchNode> {
    iterative_deepening_with_reporter(position, config, limits, None, |_| {})
}

/// Deepen until the depth cap, the time budget or `stop_signal` ends the
/// search. `None` means there was no legal move or no depth finished in time.
pub fn iterative_deepening_with_reporter<F>(
    position: &Position,
    config: &SearchConfig,
    limits: SearchLimits,
    stop_signal: Option<Arc<AtomicBool>>,
    mut on_depth: F,
) -> Option<SearchNode>
where
    F: FnMut(&DepthReport<'_>),
{
    let mut moves = legal_moves(position);
    let first = moves.next()?;
    if moves.next().is_none() {
        log::debug!("only legal move {first}, returned unsearched");
        return Some(forced_reply(position, config, first));
    }

    let started = Instant::now();
    let deadline = limits
        .movetime_ms
        .map(|ms| started + Duration::from_millis(ms));
    let stop = stop_signal.as_deref();
    let mut context = SearchContext::with_capacity(config.tt_capacity);
    let mut completed: Option<SearchNode> = None;
    let mut total_nodes = 0u64;

    'deepening: for depth in 1..=limits.depth_cap() {
        if is_stopped(stop) || deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }

        let mut retries = 0u32;
        let (mut alpha, mut beta) = match &completed {
            Some(previous) if depth > 1 => (
                (previous.value - ASPIRATION_WINDOW).max(-INFINITY),
                (previous.value + ASPIRATION_WINDOW).min(INFINITY),
            ),
            _ => (-INFINITY, INFINITY),
        };

        let node = loop {
            let window = (alpha, beta);
            let unit = SearchUnit::spawn(position.clone(), depth, window, config.clone(), context);
            let Some((node, returned)) = unit.wait(deadline, stop) else {
                log::debug!(
                    "depth {depth} abandoned after {} ms",
                    started.elapsed().as_millis()
                );
                break 'deepening;
            };
            context = returned;
            total_nodes += node.nodes;

            let failed_low = node.value <= alpha && alpha > -INFINITY;
            let failed_high = node.value >= beta && beta < INFINITY;
            if !failed_low && !failed_high {
                break node;
            }

            retries += 1;
            if retries > MAX_ASPIRATION_RETRIES {
                (alpha, beta) = (-INFINITY, INFINITY);
            } else {
                let width = ASPIRATION_WINDOW * ((retries + 1) * (retries + 1)) as i32;
                alpha = (node.value - width).max(-INFINITY);
                beta = (node.value + width).min(INFINITY);
            }
            log::debug!(
                "depth {depth}: score {} outside window, re-searching [{alpha}, {beta}]",
                node.value
            );
        };

        let report = DepthReport {
            depth,
            node: &node,
            total_nodes,
            elapsed: started.elapsed(),
        };
        let tt = context.tt.stats();
        log::debug!(
            "depth {depth} score {} nodes {total_nodes} pv {} tt {}/{} hits {}/{} clears {}",
            node.value,
            format_pv(&node.pv),
            context.tt.len(),
            context.tt.capacity(),
            tt.hits,
            tt.probes,
            tt.clears
        );
        on_depth(&report);

        let mate_found = node.is_mate_score();
        completed = Some(node);
        if mate_found {
            break;
        }
    }

    match &completed {
        Some(node) => log::info!(
            "best move {} at depth {} score {}",
            node.best_move().map_or_else(|| "0000".to_string(), |mv| mv.to_string()),
            node.depth,
            node.value
        ),
        None => log::info!("no depth completed within the budget"),
    }
    completed
}

fn forced_reply(position: &Position, config: &SearchConfig, mv: Move) -> SearchNode {
    SearchNode {
        value: config.scorer.score(position),
        depth: 0,
        pv: vec![mv],
        lower: -INFINITY,
        upper: INFINITY,
        nodes: 0,
    }
}

#[inline]
fn is_stopped(stop: Option<&AtomicBool>) -> bool {
    stop.is_some_and(|flag| flag.load(Ordering::Relaxed))
}

pub fn format_pv(pv: &[Move]) -> String {
    pv.iter().map(Move::to_string).collect::<Vec<_>>().join(" ")
}

type UnitOutcome = (Result<SearchNode, Aborted>, SearchContext);

/// One depth of search running on its own thread.
struct SearchUnit {
    cancel: Arc<AtomicBool>,
    receiver: Receiver<UnitOutcome>,
    handle: JoinHandle<()>,
}

impl SearchUnit {
    fn spawn(
        position: Position,
        depth: i32,
        (alpha, beta): (i32, i32),
        config: SearchConfig,
        mut context: SearchContext,
    ) -> Self {
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let (sender, receiver) = mpsc::sync_channel(1);
        let handle = thread::spawn(move || {
            let result =
                search_window(&position, depth, alpha, beta, &config, &mut context, Some(&flag));
            // Fails only once the supervisor has dropped the receiver.
            let _ = sender.send((result, context));
        });
        Self {
            cancel,
            receiver,
            handle,
        }
    }

    /// Wait for the unit to finish, cancelling it once the deadline passes or
    /// `stop` is raised. Only a completed search is returned.
    fn wait(
        self,
        deadline: Option<Instant>,
        stop: Option<&AtomicBool>,
    ) -> Option<(SearchNode, SearchContext)> {
        loop {
            let timeout = deadline.map_or(POLL_INTERVAL, |d| {
                d.saturating_duration_since(Instant::now()).min(POLL_INTERVAL)
            });
            match self.receiver.recv_timeout(timeout) {
                Ok((Ok(node), context)) => {
                    self.join();
                    return Some((node, context));
                }
                Ok((Err(Aborted), _)) => {
                    self.join();
                    return None;
                }
                Err(RecvTimeoutError::Timeout) => {
                    if is_stopped(stop) || deadline.is_some_and(|d| Instant::now() >= d) {
                        self.cancel();
                        return None;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    log::warn!("search unit ended without reporting a result");
                    self.join();
                    return None;
                }
            }
        }
    }

    fn cancel(self) {
        self.cancel.store(true, Ordering::Relaxed);
        // Drain the outcome so the worker is never left blocked; it is dropped.
        let _ = self.receiver.recv();
        self.join();
    }

    fn join(self) {
        if self.handle.join().is_err() {
            log::warn!("search unit panicked");
        }
    }
}
