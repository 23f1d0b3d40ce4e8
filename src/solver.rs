// Copyright 2017-2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The stable public facade: board-description in, answer out. Every CLI
//! binary and the `ffi` shim call through here rather than touching
//! `board`/`search`/`eval` directly, grounded on how `examples/original_source/src/exports.cpp`
//! sits in front of `ConnectFour::Board`/`MainSolver`.

use std::time::Duration;

use crate::board::{Board, BoardError, Column, NUM_COLUMNS, NUM_ROWS};
use crate::eval::ThreatAwareScorer;
use crate::search::{self, SearchOptions};

/// Search budget for [`compute_move`]. Matches the `tournament` binary's
/// competitive time control rather than the fixed-depth `automarked` one,
/// since this is the entry point external callers (and the FFI shim) use to
/// get a move back in roughly real time.
const COMPUTE_MOVE_TIME_LIMIT: Duration = Duration::from_millis(950);
const COMPUTE_MOVE_START_HEIGHT: u32 = 7;

/// Returned by [`compute_move`] when the board is already full: there is no
/// column left to play, which is a different outcome from a search timeout
/// (`-1`) and must not be confused with it by callers.
pub const SKIP_COLUMN: i32 = NUM_COLUMNS as i32;

fn board_from_description(description: &str, yellow: bool) -> Result<Board, BoardError> {
    let mut board = Board::from_description(description)?;
    if yellow {
        board.swap();
    }
    Ok(board)
}

/// Picks a column to play in `description` for the side indicated by
/// `yellow`. Returns [`SKIP_COLUMN`] if the board is already full (there is
/// no legal move), or `-1` if no iteration of the search completed in time -
/// callers decide their own fallback for the latter (the `tournament` binary
/// falls back to the centre column).
pub fn compute_move(description: &str, yellow: bool) -> Result<i32, BoardError> {
    let board = board_from_description(description, yellow)?;
    if board.total_count() == NUM_COLUMNS * NUM_ROWS {
        return Ok(SKIP_COLUMN);
    }
    let scorer = ThreatAwareScorer::new();
    let options = SearchOptions {
        start_height: COMPUTE_MOVE_START_HEIGHT,
        height_step: 1,
        max_height: None,
        time_limit: COMPUTE_MOVE_TIME_LIMIT,
    };
    let result = search::search(&board, &scorer, &options);
    Ok(result.best_move.map_or(-1, |c| c.get() as i32))
}

/// The row a piece would land in if `column` were played next, counted from
/// the bottom. Returns `NUM_ROWS` (one past the top) if the column is full.
pub fn row_for_move(description: &str, column: usize) -> Result<i32, BoardError> {
    let board = board_from_description(description, false)?;
    let column = match Column::new(column as u32) {
        Some(c) => c,
        None => return Ok(crate::board::NUM_ROWS as i32),
    };
    Ok(board
        .get_free_row(column)
        .map_or(crate::board::NUM_ROWS as i32, |r| r.get() as i32))
}

/// A board description containing only the pieces making up a completed
/// four-in-a-row for the side indicated by `yellow`, or `None` if that side
/// has not won.
pub fn winning_pieces(description: &str, yellow: bool) -> Result<Option<String>, BoardError> {
    let board = board_from_description(description, yellow)?;
    let cells = board.winning_cells(false);
    if cells == 0 {
        return Ok(None);
    }

    // The stripped-down board always renders the winning pieces under their
    // *original* colour, regardless of which side `yellow` asked about -
    // swap back first so `current`/`other` line up with red/yellow again.
    let winners = if yellow {
        Board::from_raw(0, cells)
    } else {
        Board::from_raw(cells, 0)
    };
    Ok(Some(winners.get_description(None, false)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY: &str = ".......,.......,.......,.......,.......,.......";

    #[test]
    fn compute_move_rejects_malformed_description() {
        assert!(compute_move("not a board", false).is_err());
    }

    #[test]
    fn compute_move_returns_skip_column_when_the_board_is_full() {
        let full = "rrrrrrr,yyyyyyy,rrrrrrr,yyyyyyy,rrrrrrr,yyyyyyy";
        assert_eq!(compute_move(full, false).unwrap(), SKIP_COLUMN);
    }

    #[test]
    fn compute_move_finds_the_winning_column() {
        let description = ".......,.......,.......,.......,.......,.rrr...";
        let mv = compute_move(description, false).unwrap();
        assert!(mv == 0 || mv == 4);
    }

    #[test]
    fn row_for_move_on_empty_board_is_the_bottom_row() {
        assert_eq!(row_for_move(EMPTY, 3).unwrap(), 0);
    }

    #[test]
    fn row_for_move_reports_one_past_the_top_when_full() {
        let full_column =
            ".r.....,.r.....,.r.....,.r.....,.r.....,.r.....";
        assert_eq!(row_for_move(full_column, 1).unwrap(), 6);
    }

    #[test]
    fn winning_pieces_is_none_without_a_win() {
        assert_eq!(winning_pieces(EMPTY, false).unwrap(), None);
    }

    #[test]
    fn winning_pieces_describes_only_the_connected_run() {
        let description = ".......,.......,.......,.......,.......,.rrrr..";
        let winners = winning_pieces(description, false).unwrap().unwrap();
        assert_eq!(winners, ".......,.......,.......,.......,.......,.rrrr..");
    }

    #[test]
    fn winning_pieces_honours_the_yellow_flag() {
        let description = ".......,.......,.......,.......,.......,.yyyy..";
        assert_eq!(winning_pieces(description, false).unwrap(), None);
        let winners = winning_pieces(description, true).unwrap().unwrap();
        assert_eq!(winners, ".......,.......,.......,.......,.......,.yyyy..");
    }
}
