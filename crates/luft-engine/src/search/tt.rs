//! Transposition table keyed by position keys.
//!
//! Two shapes behind one interface: deep mode uses an unbounded map (the
//! 10-second budget keeps it modest), hard mode a fixed open-addressed array
//! with replace-always semantics so memory stays constant.

use std::collections::HashMap;

use luft_core::Move;

/// How a stored score relates to the true value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flag {
    /// Searched with a full window; the score is exact.
    Exact,
    /// Failed low: the score is an upper bound.
    Alpha,
    /// Failed high: the score is a lower bound.
    Beta,
}

/// One stored position.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TtEntry {
    pub depth: u32,
    pub score: i32,
    pub flag: Flag,
    pub best_move: Option<Move>,
}

/// Number of slots in the bounded table.
const BOUNDED_SLOTS: usize = 4096_usize.next_power_of_two();

/// Transposition table.
pub(crate) enum TransTable {
    /// Grows with the search; keyed directly by position key.
    Unbounded(HashMap<u64, TtEntry>),
    /// Open-addressed array, one entry per slot, replace-always.
    Bounded {
        slots: Box<[Option<(u64, TtEntry)>]>,
        /// Occupied slot count, for diagnostics.
        size: usize,
    },
}

impl TransTable {
    /// Map-backed table for deep searches.
    pub fn unbounded() -> TransTable {
        TransTable::Unbounded(HashMap::new())
    }

    /// Fixed-size table for hard mode.
    pub fn bounded() -> TransTable {
        TransTable::Bounded {
            slots: vec![None; BOUNDED_SLOTS].into_boxed_slice(),
            size: 0,
        }
    }

    /// Look up a position. Bounded slots verify the full key, so a hash
    /// collision reads as a miss rather than a wrong entry.
    pub fn probe(&self, key: u64) -> Option<&TtEntry> {
        match self {
            TransTable::Unbounded(map) => map.get(&key),
            TransTable::Bounded { slots, .. } => {
                match &slots[(key as usize) & (BOUNDED_SLOTS - 1)] {
                    Some((stored_key, entry)) if *stored_key == key => Some(entry),
                    _ => None,
                }
            }
        }
    }

    /// Store a position, replacing whatever occupied the slot.
    pub fn store(&mut self, key: u64, entry: TtEntry) {
        match self {
            TransTable::Unbounded(map) => {
                map.insert(key, entry);
            }
            TransTable::Bounded { slots, size } => {
                let slot = &mut slots[(key as usize) & (BOUNDED_SLOTS - 1)];
                if slot.is_none() {
                    *size += 1;
                }
                *slot = Some((key, entry));
            }
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        match self {
            TransTable::Unbounded(map) => map.len(),
            TransTable::Bounded { size, .. } => *size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Flag, TransTable, TtEntry};
    use luft_core::{Move, Square};

    fn entry(depth: u32, score: i32) -> TtEntry {
        TtEntry {
            depth,
            score,
            flag: Flag::Exact,
            best_move: Some(Move::new(Square::E1, Square::E8)),
        }
    }

    #[test]
    fn unbounded_roundtrip() {
        let mut tt = TransTable::unbounded();
        tt.store(42, entry(3, 100));
        let found = tt.probe(42).unwrap();
        assert_eq!(found.depth, 3);
        assert_eq!(found.score, 100);
        assert_eq!(found.flag, Flag::Exact);
        assert!(tt.probe(43).is_none());
        assert_eq!(tt.len(), 1);
    }

    #[test]
    fn bounded_roundtrip() {
        let mut tt = TransTable::bounded();
        tt.store(42, entry(3, 100));
        assert!(tt.probe(42).is_some());
        assert!(tt.probe(43).is_none());
        assert_eq!(tt.len(), 1);
    }

    #[test]
    fn bounded_replaces_always() {
        let mut tt = TransTable::bounded();
        // Same slot: keys differ by exactly the table size.
        let a = 5u64;
        let b = 5u64 + 4096;
        tt.store(a, entry(9, 1));
        tt.store(b, entry(1, 2));
        assert!(tt.probe(a).is_none(), "shallower entry still replaces");
        assert_eq!(tt.probe(b).unwrap().score, 2);
        assert_eq!(tt.len(), 1);
    }

    #[test]
    fn bounded_collision_reads_as_miss() {
        let mut tt = TransTable::bounded();
        tt.store(5, entry(3, 7));
        assert!(tt.probe(5 + 4096).is_none());
    }
}
