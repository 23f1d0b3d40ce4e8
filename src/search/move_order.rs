// Copyright 2017-2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Move ordering for the negamax search.
//!
//! Alpha-beta performs best when strong moves are searched first, so that the
//! remaining siblings are cut off quickly. Without a true search to rank
//! moves by, we fall back on two cheap heuristics: a stale value left in the
//! transposition table by a shallower iteration of iterative deepening, and a
//! static bonus for columns nearer the centre (a piece there takes part in
//! more potential four-in-a-rows).

use crate::board::{Board, Column, NUM_COLUMNS};
use crate::table::{NodeKind, Table};

/// Bonus dwarfing any realistic evaluation swing, so that centre-distance
/// only breaks ties between moves the table says nothing about.
const CENTRE_BONUS_SCALE: i32 = 100_000;

/// Orders `columns` (each `Some(column)` for a legal move, `None` for a
/// column that cannot be played) from most to least promising, stable with
/// respect to equal-valued moves. `None` entries always sort last.
///
/// `children[column]` must be the board that results from playing `column`,
/// still from the mover's viewpoint before the swap to the opponent - that
/// is, whatever board `Table` was queried with when that entry was stored.
pub fn order_moves(table: &mut Table, children: &[Board], columns: &mut [Option<Column>]) {
    let mut values = [0i32; NUM_COLUMNS as usize];
    for &column in columns.iter().flatten() {
        let child = &children[column.index()];
        let stale_value = match table.query(child.get_hash()) {
            Some(entry) => match entry.kind() {
                NodeKind::Pv(v) => v,
                _ => 0,
            },
            None => 0,
        };
        let centre = (NUM_COLUMNS as i32) / 2;
        let centre_bonus = CENTRE_BONUS_SCALE * (centre - (column.get() as i32 - centre).abs());
        values[column.index()] = stale_value + centre_bonus;
    }

    columns.sort_by_key(|entry| match entry {
        Some(column) => std::cmp::Reverse(values[column.index()]),
        None => std::cmp::Reverse(i32::MIN),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Column;

    fn col(c: u32) -> Option<Column> {
        Column::new(c)
    }

    #[test]
    fn centre_columns_sort_before_edges_with_empty_table() {
        let mut table = Table::new(64);
        let children = vec![Board::new(); NUM_COLUMNS as usize];
        let mut columns = [col(0), col(1), col(2), col(3), col(4), col(5), col(6)];
        order_moves(&mut table, &children, &mut columns);
        assert_eq!(columns[0], col(3));
    }

    #[test]
    fn unplayable_columns_sort_last() {
        let mut table = Table::new(64);
        let children = vec![Board::new(); NUM_COLUMNS as usize];
        let mut columns = [col(0), None, col(2), col(3), col(4), col(5), col(6)];
        order_moves(&mut table, &children, &mut columns);
        assert_eq!(columns[6], None);
    }
}
