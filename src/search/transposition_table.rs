//! Search caches keyed by position fingerprint.
//!
//! The transposition table keeps one result per fingerprint with
//! depth-preferred replacement. When it grows past its capacity it is cleared
//! wholesale; a new top-level search starts from an empty table anyway.
//! Mate scores are stored relative to the node rather than the root so an
//! entry can be reused at a different ply.

use std::collections::HashMap;

use crate::game_state::chess_move::Move;
use crate::search::board_scoring::MATE_THRESHOLD;

pub const DEFAULT_TT_CAPACITY: usize = 1_000_000;
pub const MAX_PLY: usize = 128;

/// How a stored value relates to the true score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Exact,
    Lower,
    Upper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TTEntry {
    pub value: i32,
    pub depth: i32,
    /// Window the value was produced in.
    pub lower: i32,
    pub upper: i32,
}

impl TTEntry {
    #[inline]
    pub fn bound(&self) -> Bound {
        if self.value <= self.lower {
            Bound::Upper
        } else if self.value >= self.upper {
            Bound::Lower
        } else {
            Bound::Exact
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TTStats {
    pub probes: u64,
    pub hits: u64,
    /// Entries found but searched shallower than requested.
    pub shallow_hits: u64,
    pub stores: u64,
    pub clears: u64,
}

#[derive(Debug, Clone)]
pub struct TranspositionTable {
    entries: HashMap<u64, TTEntry>,
    capacity: usize,
    stats: TTStats,
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_TT_CAPACITY)
    }
}

impl TranspositionTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            stats: TTStats::default(),
        }
    }

    /// Size the table from a memory budget in megabytes.
    pub fn new_with_mb(size_mb: usize) -> Self {
        let bytes = size_mb.max(1) * 1024 * 1024;
        let entry_size = std::mem::size_of::<(u64, TTEntry)>() * 2;
        Self::with_capacity(bytes / entry_size)
    }

    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats.clears += 1;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn stats(&self) -> TTStats {
        self.stats
    }

    /// Entry for `key` searched at least `min_depth` deep, with its value and
    /// window translated to `ply`.
    pub fn probe(&mut self, key: u64, min_depth: i32, ply: usize) -> Option<TTEntry> {
        self.stats.probes += 1;
        let entry = self.entries.get(&key)?;
        if entry.depth < min_depth {
            self.stats.shallow_hits += 1;
            return None;
        }
        self.stats.hits += 1;
        Some(TTEntry {
            value: score_from_storage(entry.value, ply),
            depth: entry.depth,
            lower: score_from_storage(entry.lower, ply),
            upper: score_from_storage(entry.upper, ply),
        })
    }

    pub fn store(&mut self, key: u64, entry: TTEntry, ply: usize) {
        if let Some(existing) = self.entries.get(&key) {
            if entry.depth < existing.depth {
                return;
            }
        } else if self.entries.len() >= self.capacity {
            log::trace!("transposition table full at {} entries, clearing", self.entries.len());
            self.clear();
        }
        self.stats.stores += 1;
        self.entries.insert(
            key,
            TTEntry {
                value: score_to_storage(entry.value, ply),
                depth: entry.depth,
                lower: score_to_storage(entry.lower, ply),
                upper: score_to_storage(entry.upper, ply),
            },
        );
    }
}

/// Mate scores count plies from the root; stored ones count from the node.
#[inline]
pub fn score_to_storage(score: i32, ply: usize) -> i32 {
    let ply = ply as i32;
    if score > MATE_THRESHOLD {
        score + ply
    } else if score < -MATE_THRESHOLD {
        score - ply
    } else {
        score
    }
}

#[inline]
pub fn score_from_storage(score: i32, ply: usize) -> i32 {
    let ply = ply as i32;
    if score > MATE_THRESHOLD {
        score - ply
    } else if score < -MATE_THRESHOLD {
        score + ply
    } else {
        score
    }
}

/// Last best move found per fingerprint, used only to seed ordering.
#[derive(Debug, Clone, Default)]
pub struct BestMoveTable {
    moves: HashMap<u64, Move>,
    capacity: usize,
}

impl BestMoveTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            moves: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    #[inline]
    pub fn get(&self, key: u64) -> Option<Move> {
        self.moves.get(&key).copied()
    }

    pub fn insert(&mut self, key: u64, mv: Move) {
        if self.moves.len() >= self.capacity && !self.moves.contains_key(&key) {
            self.moves.clear();
        }
        self.moves.insert(key, mv);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

/// Two quiet cutoff moves remembered per ply.
#[derive(Debug, Clone)]
pub struct KillerTable {
    slots: Vec<[Option<Move>; 2]>,
}

impl Default for KillerTable {
    fn default() -> Self {
        Self {
            slots: vec![[None; 2]; MAX_PLY],
        }
    }
}

impl KillerTable {
    #[inline]
    pub fn at(&self, ply: usize) -> [Option<Move>; 2] {
        self.slots.get(ply).copied().unwrap_or([None; 2])
    }

    pub fn record(&mut self, ply: usize, mv: Move) {
        let Some(slot) = self.slots.get_mut(ply) else {
            return;
        };
        if slot[0].is_some_and(|killer| killer.same_route(&mv)) {
            return;
        }
        slot[1] = slot[0];
        slot[0] = Some(mv);
    }
}

/// Caches owned by one search unit. Rebuilt for every top-level search and
/// dropped with a cancelled unit.
#[derive(Debug, Clone, Default)]
pub struct SearchContext {
    pub tt: TranspositionTable,
    pub best_moves: BestMoveTable,
    pub killers: KillerTable,
}

impl SearchContext {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tt: TranspositionTable::with_capacity(capacity),
            best_moves: BestMoveTable::with_capacity(capacity),
            killers: KillerTable::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_types::PieceKind;
    use crate::search::board_scoring::MATE_SCORE;

    fn entry(value: i32, depth: i32) -> TTEntry {
        TTEntry {
            value,
            depth,
            lower: -100,
            upper: 100,
        }
    }

    #[test]
    fn store_and_probe_round_trip() {
        let mut tt = TranspositionTable::with_capacity(16);
        tt.store(123, entry(42, 5), 3);
        let got = tt.probe(123, 5, 3).expect("entry should exist");
        assert_eq!(got, entry(42, 5));
        assert_eq!(got.bound(), Bound::Exact);
        assert!(tt.probe(999, 0, 0).is_none());
        assert_eq!(tt.stats().hits, 1);
        assert_eq!(tt.stats().probes, 2);
    }

    #[test]
    fn shallow_entries_are_misses() {
        let mut tt = TranspositionTable::with_capacity(16);
        tt.store(7, entry(10, 2), 0);
        assert!(tt.probe(7, 3, 0).is_none());
        assert_eq!(tt.stats().shallow_hits, 1);
        assert_eq!(tt.stats().hits, 0);
    }

    #[test]
    fn depth_preferred_replacement() {
        let mut tt = TranspositionTable::with_capacity(16);
        tt.store(555, entry(1, 2), 0);
        tt.store(555, entry(9, 1), 0);
        assert_eq!(tt.probe(555, 0, 0).expect("exists").value, 1);
        tt.store(555, entry(3, 6), 0);
        let got = tt.probe(555, 0, 0).expect("exists");
        assert_eq!(got.depth, 6);
        assert_eq!(got.value, 3);
    }

    #[test]
    fn overflow_clears_the_table() {
        let mut tt = TranspositionTable::with_capacity(2);
        tt.store(1, entry(0, 1), 0);
        tt.store(2, entry(0, 1), 0);
        tt.store(3, entry(0, 1), 0);
        assert_eq!(tt.len(), 1);
        assert_eq!(tt.stats().clears, 1);
        assert!(tt.probe(3, 0, 0).is_some());
    }

    #[test]
    fn mate_scores_move_with_ply() {
        let mut tt = TranspositionTable::with_capacity(4);
        // Mate found five plies below a node sitting at ply 2.
        tt.store(9, entry(MATE_SCORE - 7, 4), 2);
        let deeper = tt.probe(9, 0, 4).expect("exists");
        assert_eq!(deeper.value, MATE_SCORE - 9);
        assert_eq!(score_from_storage(score_to_storage(-250, 7), 7), -250);
    }

    #[test]
    fn bounds_follow_the_storage_window() {
        assert_eq!(entry(-100, 1).bound(), Bound::Upper);
        assert_eq!(entry(150, 1).bound(), Bound::Lower);
        assert_eq!(entry(99, 1).bound(), Bound::Exact);
    }

    #[test]
    fn killers_keep_two_distinct_moves() {
        let mut killers = KillerTable::default();
        let a = Move::quiet(31, 41, PieceKind::Pawn);
        let b = Move::quiet(32, 42, PieceKind::Pawn);
        killers.record(3, a);
        killers.record(3, a);
        assert_eq!(killers.at(3), [Some(a), None]);
        killers.record(3, b);
        assert_eq!(killers.at(3), [Some(b), Some(a)]);
        assert_eq!(killers.at(MAX_PLY + 5), [None, None]);
    }
}
