//! Transposition table
//!
//! Single-slot buckets indexed by `hash % len`. An entry is only trusted when
//! its full key matches, so index collisions degrade to misses.

use crate::moves::Move;
use std::mem;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// How a stored score relates to the true minimax value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Bound {
    Exact,
    /// True value is at least the stored score (beta cutoff)
    Lower,
    /// True value is at most the stored score (alpha cutoff)
    Upper,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TtEntry {
    pub key: u64,
    pub depth: i32,
    pub score: i32,
    pub bound: Bound,
    pub best_move: Option<Move>,
    pub generation: u32,
}

pub struct TranspositionTable {
    slots: Mutex<Vec<Option<TtEntry>>>,
    len: usize,
    generation: AtomicU32,
    probes: AtomicU64,
    hits: AtomicU64,
}

impl TranspositionTable {
    /// Table sized to roughly `size_mb` megabytes
    pub fn new(size_mb: usize) -> Self {
        let entry_size = mem::size_of::<Option<TtEntry>>();
        Self::with_entries(size_mb * 1024 * 1024 / entry_size)
    }

    pub fn with_entries(len: usize) -> Self {
        let len = len.max(1);
        Self {
            slots: Mutex::new(vec![None; len]),
            len,
            generation: AtomicU32::new(0),
            probes: AtomicU64::new(0),
            hits: AtomicU64::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    fn index(&self, hash: u64) -> usize {
        (hash % self.len as u64) as usize
    }

    pub fn generation(&self) -> u32 {
        self.generation.load(Ordering::Relaxed)
    }

    /// Age the table at the start of a root search
    pub fn new_search(&self) {
        self.generation.fetch_add(1, Ordering::Relaxed);
    }

    /// Entry for `hash` searched to at least `depth`
    pub fn probe(&self, hash: u64, depth: i32) -> Option<TtEntry> {
        self.probes.fetch_add(1, Ordering::Relaxed);
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = slots[self.index(hash)].filter(|e| e.key == hash && e.depth >= depth);
        drop(slots);

        if entry.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        entry
    }

    /// Stored best move for `hash` at any depth (ordering hint only)
    pub fn best_move(&self, hash: u64) -> Option<Move> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots[self.index(hash)]
            .filter(|e| e.key == hash)
            .and_then(|e| e.best_move)
    }

    pub fn store(&self, hash: u64, depth: i32, score: i32, bound: Bound, best_move: Option<Move>) {
        let generation = self.generation();
        let index = self.index(hash);
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = &slots[index] {
            let keep = existing.key == hash
                && existing.generation == generation
                && (existing.depth > depth
                    || (existing.depth == depth && existing.bound == Bound::Exact && bound != Bound::Exact));
            if keep {
                return;
            }
        }

        slots[index] = Some(TtEntry {
            key: hash,
            depth,
            score,
            bound,
            best_move,
            generation,
        });
    }

    pub fn clear(&self) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.iter_mut().for_each(|slot| *slot = None);
        self.probes.store(0, Ordering::Relaxed);
        self.hits.store(0, Ordering::Relaxed);
    }

    /// Percentage of slots in use
    pub fn usage(&self) -> f64 {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let used = slots.iter().filter(|s| s.is_some()).count();
        100.0 * used as f64 / self.len as f64
    }

    /// Percentage of probes that returned an entry
    pub fn hit_rate(&self) -> f64 {
        let probes = self.probes.load(Ordering::Relaxed);
        if probes == 0 {
            return 0.0;
        }
        100.0 * self.hits.load(Ordering::Relaxed) as f64 / probes as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Direction;

    #[test]
    fn test_exact_entry_round_trip() {
        let tt = TranspositionTable::with_entries(1024);
        let mv = Move::single(30, Direction::E);
        tt.store(42, 4, 150, Bound::Exact, Some(mv));

        for depth in 0..=4 {
            let entry = tt.probe(42, depth).unwrap();
            assert_eq!(entry.score, 150);
            assert_eq!(entry.bound, Bound::Exact);
        }
        assert!(tt.probe(42, 5).is_none());
        assert_eq!(tt.best_move(42), Some(mv));
    }

    #[test]
    fn test_index_collision_is_a_miss() {
        let tt = TranspositionTable::with_entries(16);
        tt.store(3, 2, 10, Bound::Exact, None);
        // 19 lands in the same slot with a different key
        assert!(tt.probe(19, 0).is_none());
        assert!(tt.best_move(19).is_none());
        assert!(tt.probe(3, 0).is_some());
    }

    #[test]
    fn test_replacement_policy() {
        let tt = TranspositionTable::with_entries(16);

        tt.store(5, 4, 100, Bound::Exact, None);
        // shallower result for the same position is ignored
        tt.store(5, 2, 7, Bound::Exact, None);
        assert_eq!(tt.probe(5, 0).unwrap().score, 100);

        // a bound never displaces an exact entry of equal depth
        tt.store(5, 4, 8, Bound::Lower, None);
        assert_eq!(tt.probe(5, 0).unwrap().bound, Bound::Exact);

        // deeper always wins
        tt.store(5, 6, 9, Bound::Upper, None);
        assert_eq!(tt.probe(5, 0).unwrap().depth, 6);

        // different key overwrites
        tt.store(21, 1, 11, Bound::Exact, None);
        assert!(tt.probe(5, 0).is_none());
        assert_eq!(tt.probe(21, 0).unwrap().score, 11);
    }

    #[test]
    fn test_stale_generation_is_replaced() {
        let tt = TranspositionTable::with_entries(16);
        tt.store(5, 8, 100, Bound::Exact, None);
        tt.new_search();
        tt.store(5, 1, 3, Bound::Lower, None);
        let entry = tt.probe(5, 0).unwrap();
        assert_eq!(entry.depth, 1);
        assert_eq!(entry.generation, 1);
    }

    #[test]
    fn test_usage_and_hit_rate() {
        let tt = TranspositionTable::with_entries(4);
        assert_eq!(tt.usage(), 0.0);
        assert_eq!(tt.hit_rate(), 0.0);

        tt.store(1, 1, 0, Bound::Exact, None);
        assert_eq!(tt.usage(), 25.0);
        assert!(tt.probe(1, 0).is_some());
        assert!(tt.probe(2, 0).is_none());
        assert_eq!(tt.hit_rate(), 50.0);

        tt.clear();
        assert_eq!(tt.usage(), 0.0);
        assert_eq!(tt.hit_rate(), 0.0);
    }

    #[test]
    fn test_sized_in_megabytes() {
        let tt = TranspositionTable::new(1);
        assert!(tt.len() > 1000);
    }
}
