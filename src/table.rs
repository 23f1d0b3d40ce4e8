// Copyright 2017-2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The transposition table, which memoizes search results for positions
//! already seen along a different sequence of moves.
//!
//! Unlike the teacher's process-wide, multi-threaded table, this one is a
//! single flat `Vec`, sized once and owned entirely by one search: Connect
//! Four's search is single-threaded and each solve starts from a fresh table
//! (see `search.rs`).
//!
//! # Node kinds
//!
//! * A `Pv` ("principal variation") node: every move was searched and the
//!   value is exact.
//! * A `Cut` ("fail-high") node: a move was found good enough to cause a
//!   beta cutoff. The stored value is a lower bound.
//! * An `All` ("fail-low") node: every move was searched but none exceeded
//!   alpha. The stored value is an upper bound.

use crate::board::Column;
use crate::eval::Score;

/// Default table capacity: `2^20` entries. Larger than the spec's `2^18`
/// floor because `TableEntry` here is small enough that the larger table
/// still comfortably fits the 32 MiB budget.
pub const DEFAULT_CAPACITY: usize = 1 << 20;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Pv(Score),
    Cut(Score),
    All(Score),
}

#[derive(Copy, Clone, Debug)]
pub struct TableEntry {
    hash: u64,
    best_move: Option<Column>,
    height: u32,
    node: NodeKind,
}

impl TableEntry {
    pub fn best_move(&self) -> Option<Column> {
        self.best_move
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn kind(&self) -> NodeKind {
        self.node
    }
}

/// A fixed-capacity, depth-preferred-replacement transposition table.
pub struct Table {
    entries: Vec<Option<TableEntry>>,
    capacity: usize,
    hits: u64,
    replacements: u64,
    ignores: u64,
}

impl Table {
    pub fn new(capacity: usize) -> Table {
        Table {
            entries: vec![None; capacity],
            capacity,
            hits: 0,
            replacements: 0,
            ignores: 0,
        }
    }

    fn slot(&self, hash: u64) -> usize {
        (hash as usize) % self.capacity
    }

    /// Looks up `hash`, returning the stored entry only if it is a genuine
    /// match (guards against the rare index collision between two different
    /// positions).
    pub fn query(&mut self, hash: u64) -> Option<&TableEntry> {
        let slot = self.slot(hash);
        match &self.entries[slot] {
            Some(entry) if entry.hash == hash => {
                self.hits += 1;
                Some(entry)
            }
            _ => None,
        }
    }

    pub fn record_pv(&mut self, hash: u64, best_move: Option<Column>, height: u32, value: Score) {
        self.store(hash, best_move, height, NodeKind::Pv(value));
    }

    pub fn record_cut(&mut self, hash: u64, best_move: Option<Column>, height: u32, value: Score) {
        self.store(hash, best_move, height, NodeKind::Cut(value));
    }

    /// Records a fail-low node.
    pub fn record_all(&mut self, hash: u64, height: u32, value: Score) {
        self.store(hash, None, height, NodeKind::All(value));
    }

    fn store(&mut self, hash: u64, best_move: Option<Column>, height: u32, node: NodeKind) {
        let slot = self.slot(hash);
        let should_replace = match &self.entries[slot] {
            None => true,
            Some(existing) => height > existing.height,
        };

        if should_replace {
            if self.entries[slot].is_some() {
                self.replacements += 1;
            }
            self.entries[slot] = Some(TableEntry {
                hash,
                best_move,
                height,
                node,
            });
        } else {
            self.ignores += 1;
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn replacements(&self) -> u64 {
        self.replacements
    }

    pub fn ignores(&self) -> u64 {
        self.ignores
    }
}

impl Default for Table {
    fn default() -> Table {
        Table::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(c: u32) -> Column {
        Column::new(c).unwrap()
    }

    #[test]
    fn query_misses_on_empty_table() {
        let mut table = Table::new(64);
        assert!(table.query(42).is_none());
    }

    #[test]
    fn stores_and_retrieves_pv_entry() {
        let mut table = Table::new(64);
        table.record_pv(42, Some(col(3)), 5, 100);
        let entry = table.query(42).unwrap();
        assert_eq!(entry.best_move(), Some(col(3)));
        assert_eq!(entry.height(), 5);
        assert_eq!(entry.kind(), NodeKind::Pv(100));
    }

    #[test]
    fn index_collision_does_not_return_wrong_position() {
        let mut table = Table::new(64);
        table.record_pv(42, Some(col(3)), 5, 100);
        // Same slot (42 % 64 == 106 % 64), different hash.
        assert!(table.query(106).is_none());
    }

    #[test]
    fn deeper_result_replaces_shallower_at_same_slot() {
        let mut table = Table::new(64);
        table.record_pv(42, Some(col(1)), 2, 10);
        table.record_pv(42, Some(col(2)), 6, 20);
        let entry = table.query(42).unwrap();
        assert_eq!(entry.best_move(), Some(col(2)));
        assert_eq!(table.replacements(), 1);
    }

    #[test]
    fn shallower_result_does_not_replace_deeper() {
        let mut table = Table::new(64);
        table.record_pv(42, Some(col(2)), 6, 20);
        table.record_pv(42, Some(col(1)), 2, 10);
        let entry = table.query(42).unwrap();
        assert_eq!(entry.height(), 6);
        assert_eq!(table.ignores(), 1);
    }

    #[test]
    fn shallower_all_node_does_not_replace_deeper_cut_node() {
        let mut table = Table::new(64);
        table.record_cut(42, Some(col(0)), 4, 50);
        // Replacement is governed purely by height, not node kind.
        table.record_all(42, 1, 10);
        let entry = table.query(42).unwrap();
        assert_eq!(entry.kind(), NodeKind::Cut(50));
    }

    #[test]
    fn equal_height_result_does_not_replace_existing_entry() {
        let mut table = Table::new(64);
        table.record_pv(42, Some(col(1)), 4, 10);
        table.record_pv(42, Some(col(2)), 4, 20);
        let entry = table.query(42).unwrap();
        assert_eq!(entry.best_move(), Some(col(1)));
        assert_eq!(table.ignores(), 1);
    }
}
