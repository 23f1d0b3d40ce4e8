// Copyright 2017-2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Iterative-deepening negamax search with alpha-beta pruning and a
//! transposition table.
//!
//! Each call to [`search`] owns a fresh [`Table`] - unlike the teacher's
//! process-wide table shared across threads, Connect Four's search here is
//! single-threaded and the table's whole purpose is memoizing within one
//! `solve`, so there is nothing to gain from keeping it around afterward.

mod move_order;

use std::time::{Duration, Instant};

use crate::board::{Board, Column, NUM_COLUMNS, NUM_ROWS};
use crate::eval::{Score, Scorer};
use crate::table::{NodeKind, Table};
use crate::tracing::constants;

const TOTAL_CELLS: u32 = NUM_COLUMNS * NUM_ROWS;

/// Parameters governing one iterative-deepening search.
#[derive(Copy, Clone, Debug)]
pub struct SearchOptions {
    /// Height searched by the first iteration.
    pub start_height: u32,
    /// Increase in height after each iteration.
    pub height_step: u32,
    /// Upper bound on height, beyond whatever the remaining empty cells
    /// already impose. `None` searches all the way to a full board.
    pub max_height: Option<u32>,
    /// Wall-clock budget for the whole search. Checked coarsely (every
    /// fourth height of remaining search) rather than on every node, so the
    /// search can occasionally run slightly over budget.
    pub time_limit: Duration,
}

impl Default for SearchOptions {
    fn default() -> SearchOptions {
        SearchOptions {
            start_height: 1,
            height_step: 1,
            max_height: None,
            time_limit: Duration::from_secs(5),
        }
    }
}

/// The outcome of an iterative-deepening search.
#[derive(Copy, Clone, Debug)]
pub struct SearchResult {
    pub best_move: Option<Column>,
    pub best_score: Score,
    /// The deepest height fully completed before the time budget ran out.
    pub height_reached: u32,
    pub nodes_examined: u64,
    pub table_hits: u64,
    pub table_replacements: u64,
    pub table_ignores: u64,
}

struct Search<'a> {
    table: Table,
    scorer: &'a dyn Scorer,
    deadline: Instant,
    out_of_time: bool,
    nodes_examined: u64,
}

impl<'a> Search<'a> {
    fn new(scorer: &'a dyn Scorer, time_limit: Duration) -> Search<'a> {
        Search {
            table: Table::default(),
            scorer,
            deadline: Instant::now() + time_limit,
            out_of_time: false,
            nodes_examined: 0,
        }
    }

    fn run(&mut self, board: &Board, options: &SearchOptions) -> SearchResult {
        let moves_to_draw = TOTAL_CELLS - board.total_count();
        let max_height = options
            .max_height
            .map(|m| m.min(moves_to_draw))
            .unwrap_or(moves_to_draw);
        let mut height = options.start_height.min(max_height.max(1));

        let mut best_move = None;
        let mut best_score = 0;
        let mut height_reached = 0;

        loop {
            let span = tracing::debug_span!(
                target: "quartet::search",
                "iterative_deepening_step",
                name = constants::ITERATIVE_DEEPENING_STEP,
                height
            );
            let _enter = span.enter();

            let (score, mv) = self.negamax(board, height, Score::MIN + 1, Score::MAX - 1);
            if mv.is_none() {
                tracing::debug!(name = constants::SEARCH_TERMINATION, height);
                break;
            }

            best_move = mv;
            best_score = score;
            height_reached = height;

            if height >= max_height {
                break;
            }
            height = (height + options.height_step).min(max_height);
        }

        SearchResult {
            best_move,
            best_score,
            height_reached,
            nodes_examined: self.nodes_examined,
            table_hits: self.table.hits(),
            table_replacements: self.table.replacements(),
            table_ignores: self.table.ignores(),
        }
    }

    /// Scores `board` from the viewpoint of the player to move at `board`,
    /// searching `height` plies deeper. Mirrors the teacher's
    /// `alpha_beta`/`bestMove` shape: a transposition-table probe, a leaf
    /// evaluation, then a fully-negated recursive fan-out over legal moves.
    fn negamax(
        &mut self,
        board: &Board,
        height: u32,
        mut alpha: Score,
        beta: Score,
    ) -> (Score, Option<Column>) {
        let span = tracing::debug_span!(
            target: "quartet::search",
            "negamax",
            name = constants::NEGAMAX,
            height
        );
        let _enter = span.enter();

        let hash = board.get_hash();
        if let Some(entry) = self.table.query(hash) {
            if entry.height() == height {
                match entry.kind() {
                    NodeKind::Pv(value) => {
                        tracing::debug!(name = constants::TT_CUTOFF);
                        return (value, entry.best_move());
                    }
                    NodeKind::Cut(value) if value >= beta => {
                        tracing::debug!(name = constants::TT_CUTOFF);
                        return (beta, entry.best_move());
                    }
                    NodeKind::All(value) if value <= alpha => {
                        tracing::debug!(name = constants::TT_CUTOFF);
                        return (alpha, entry.best_move());
                    }
                    _ => {}
                }
            }
        }

        self.nodes_examined += 1;

        if height == 0 {
            let value = if board.total_count() == TOTAL_CELLS {
                0
            } else {
                self.scorer.score(board)
            };
            self.table.record_pv(hash, None, 0, value);
            return (value, None);
        }

        let mut children: [Option<Board>; NUM_COLUMNS as usize] = Default::default();
        let mut columns: [Option<Column>; NUM_COLUMNS as usize] = Default::default();
        let mut winning_move = None;

        for c in 0..NUM_COLUMNS {
            let column = Column::new(c).expect("0..NUM_COLUMNS is always in range");
            if !board.can_play(column) {
                continue;
            }

            let mut child = *board;
            child.play(column);
            if child.is_win() {
                winning_move = Some(column);
            }
            child.swap();

            children[column.index()] = Some(child);
            columns[column.index()] = Some(column);
        }

        if let Some(column) = winning_move {
            let remaining = TOTAL_CELLS - board.total_count();
            let value = (remaining as Score + 1) * 1000;
            tracing::debug!(name = constants::IMMEDIATE_WIN);
            self.table.record_pv(hash, Some(column), height, value);
            return (value, Some(column));
        }

        let children_boards: Vec<Board> = children.iter().map(|c| c.unwrap_or_default()).collect();
        move_order::order_moves(&mut self.table, &children_boards, &mut columns);

        if height % 4 == 0 {
            self.out_of_time = Instant::now() >= self.deadline;
        }

        let mut best_move = None;
        let mut best_value = Score::MIN;
        let mut node_kind = NodeKind::All(alpha);

        for entry in columns {
            let column = match entry {
                Some(c) => c,
                None => continue,
            };
            let child = children[column.index()].expect("column was marked playable above");

            let (child_value, _) = self.negamax(&child, height - 1, -beta, -alpha);

            if self.out_of_time {
                return (best_value, best_move);
            }

            let value = -child_value;
            if value > best_value {
                best_value = value;
                best_move = Some(column);
            }
            if value > alpha {
                alpha = value;
                node_kind = NodeKind::Pv(value);
            }
            if alpha >= beta {
                tracing::debug!(name = constants::MOVE_BETA_CUTOFF, ?column);
                node_kind = NodeKind::Cut(value);
                break;
            }
        }

        if let NodeKind::Pv(value) = node_kind {
            tracing::debug!(name = constants::MOVE_IMPROVED_ALPHA, value);
        }

        match node_kind {
            NodeKind::Pv(v) => self.table.record_pv(hash, best_move, height, v),
            NodeKind::Cut(v) => self.table.record_cut(hash, best_move, height, v),
            NodeKind::All(v) => self.table.record_all(hash, height, v),
        }

        (best_value, best_move)
    }
}

/// Runs an iterative-deepening search of `board` using `scorer` as the leaf
/// evaluator, stopping at `options.time_limit` (or a fully-searched board,
/// whichever comes first).
pub fn search(board: &Board, scorer: &dyn Scorer, options: &SearchOptions) -> SearchResult {
    Search::new(scorer, options.time_limit).run(board, options)
}

/// The outcome of a fixed-depth search (see [`fixed_depth`]).
///
/// `table_hits`/`table_replacements`/`table_ignores` are always zero here:
/// `fixed_depth` deliberately keeps no transposition table (see its doc
/// comment), so there is nothing to count.
#[derive(Copy, Clone, Debug)]
pub struct FixedDepthResult {
    pub best_move: Option<Column>,
    pub best_score: Score,
    pub nodes_examined: u64,
    pub table_hits: u64,
    pub table_replacements: u64,
    pub table_ignores: u64,
}

/// A plain fixed-depth minimax search, with alpha-beta pruning only if
/// `prune` is set, and no transposition table. Exists alongside the
/// iterative-deepening [`search`] for callers that want to compare raw node
/// counts with and without pruning - a transposition table would make that
/// comparison meaningless, so this function intentionally doesn't use one.
pub fn fixed_depth(
    board: &Board,
    scorer: &dyn Scorer,
    depth: u32,
    prune: bool,
) -> FixedDepthResult {
    let mut nodes_examined = 0u64;
    let (best_score, best_move) = fixed_depth_move(
        board,
        scorer,
        depth,
        Score::MIN + 1,
        Score::MAX - 1,
        prune,
        &mut nodes_examined,
    );
    FixedDepthResult {
        best_move,
        best_score,
        nodes_examined,
        table_hits: 0,
        table_replacements: 0,
        table_ignores: 0,
    }
}

fn fixed_depth_move(
    board: &Board,
    scorer: &dyn Scorer,
    depth: u32,
    mut alpha: Score,
    beta: Score,
    prune: bool,
    nodes_examined: &mut u64,
) -> (Score, Option<Column>) {
    *nodes_examined += 1;

    let mut other = *board;
    other.swap();

    if board.is_win() {
        return (10_000, None);
    } else if other.is_win() {
        return (-10_000, None);
    } else if board.total_count() == TOTAL_CELLS {
        return (0, None);
    }

    if depth == 0 {
        return (scorer.score(board), None);
    }

    let mut best_value = Score::MIN;
    let mut best_column = None;

    for c in 0..NUM_COLUMNS {
        let column = Column::new(c).expect("0..NUM_COLUMNS is always in range");
        if !board.can_play(column) {
            continue;
        }

        let mut child = *board;
        child.play(column);
        child.swap();

        let (child_value, _) =
            fixed_depth_move(&child, scorer, depth - 1, -beta, -alpha, prune, nodes_examined);
        let value = -child_value;

        if value > best_value {
            best_value = value;
            best_column = Some(column);
        }

        if prune {
            if value > alpha {
                alpha = value;
            }
            if alpha >= beta {
                break;
            }
        }
    }

    (best_value, best_column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Column;
    use crate::eval::MaterialScorer;

    fn col(c: u32) -> Column {
        Column::new(c).unwrap()
    }

    fn quick_options(max_height: u32) -> SearchOptions {
        SearchOptions {
            start_height: max_height,
            height_step: 1,
            max_height: Some(max_height),
            time_limit: Duration::from_secs(5),
        }
    }

    #[test]
    fn finds_immediate_winning_move() {
        // Current player has three in a row and can win by playing column 0 or 4.
        let board =
            Board::from_description(".......,.......,.......,.......,.......,.rrr...").unwrap();
        let scorer = MaterialScorer::new();
        let result = search(&board, &scorer, &quick_options(2));
        assert!(matches!(result.best_move, Some(c) if c == col(0) || c == col(4)));
        assert!(result.best_score > 1000);
    }

    #[test]
    fn blocks_opponent_immediate_win() {
        // After swapping, "current" must block the opponent's three in a row.
        let mut board =
            Board::from_description(".......,.......,.......,.......,.......,.yyy...").unwrap();
        board.swap();
        let scorer = MaterialScorer::new();
        let result = search(&board, &scorer, &quick_options(2));
        assert!(matches!(result.best_move, Some(c) if c == col(0) || c == col(4)));
    }

    #[test]
    fn table_counters_are_populated_after_a_search() {
        let board = Board::new();
        let scorer = MaterialScorer::new();
        let result = search(&board, &scorer, &quick_options(4));
        assert!(result.table_hits + result.table_replacements + result.table_ignores > 0);
    }

    #[test]
    fn fixed_depth_table_counters_are_always_zero() {
        let board = Board::new();
        let scorer = MaterialScorer::new();
        let result = fixed_depth(&board, &scorer, 3, true);
        assert_eq!(result.table_hits, 0);
        assert_eq!(result.table_replacements, 0);
        assert_eq!(result.table_ignores, 0);
    }

    #[test]
    fn height_reached_matches_requested_depth_when_time_permits() {
        let board = Board::new();
        let scorer = MaterialScorer::new();
        let result = search(&board, &scorer, &quick_options(3));
        assert_eq!(result.height_reached, 3);
    }

    #[test]
    fn immediate_timeout_still_returns_a_usable_move() {
        let board = Board::new();
        let scorer = MaterialScorer::new();
        let options = SearchOptions {
            start_height: 1,
            height_step: 1,
            max_height: Some(20),
            time_limit: Duration::from_millis(0),
        };
        let result = search(&board, &scorer, &options);
        // Height 1 with an already-elapsed deadline: the time check at
        // height % 4 == 0 never fires mid-iteration for a single-ply search,
        // so the first iteration still completes and returns a move.
        assert!(result.best_move.is_some());
    }

    #[test]
    fn fixed_depth_finds_the_winning_move_regardless_of_pruning() {
        let board =
            Board::from_description(".......,.......,.......,.......,.......,.rrr...").unwrap();
        let scorer = MaterialScorer::new();

        let pruned = fixed_depth(&board, &scorer, 2, true);
        let unpruned = fixed_depth(&board, &scorer, 2, false);

        assert!(matches!(pruned.best_move, Some(c) if c == col(0) || c == col(4)));
        assert!(matches!(unpruned.best_move, Some(c) if c == col(0) || c == col(4)));
        assert_eq!(pruned.best_score, unpruned.best_score);
    }

    #[test]
    fn fixed_depth_pruning_never_examines_more_nodes_than_unpruned() {
        let board = Board::new();
        let scorer = MaterialScorer::new();

        let pruned = fixed_depth(&board, &scorer, 4, true);
        let unpruned = fixed_depth(&board, &scorer, 4, false);

        assert!(pruned.nodes_examined <= unpruned.nodes_examined);
    }
}
