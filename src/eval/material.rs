// Copyright 2017-2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Material-plus-connections evaluator.

use crate::board::Board;
use crate::eval::{Score, Scorer};

const PIECE_WEIGHT: Score = 1;
const EXACTLY_TWO_WEIGHT: Score = 10;
const EXACTLY_THREE_WEIGHT: Score = 100;
const AT_LEAST_FOUR_WEIGHT: Score = 1000;

/// Scores a side purely on how many pieces it has on the board and how those
/// pieces are connected: a piece is worth 1 point, an open pair 10, an open
/// triple 100, and a (should-be-terminal) run of four or more 1000.
#[derive(Copy, Clone, Debug, Default)]
pub struct MaterialScorer;

impl MaterialScorer {
    pub fn new() -> MaterialScorer {
        MaterialScorer
    }

    /// The weighted material-plus-connections value for one side. Exposed to
    /// the rest of `eval/` so other scorers can build on the same base term
    /// instead of re-deriving it (see `ThreatAwareScorer`).
    pub(crate) fn score_for(board: &Board, for_opponent: bool) -> Score {
        let count = if for_opponent {
            board.total_count() - board.count()
        } else {
            board.count()
        };
        let connections = board.count_connections_for(for_opponent);

        count as Score * PIECE_WEIGHT
            + connections.exactly_two as Score * EXACTLY_TWO_WEIGHT
            + connections.exactly_three as Score * EXACTLY_THREE_WEIGHT
            + connections.at_least_four as Score * AT_LEAST_FOUR_WEIGHT
    }
}

impl Scorer for MaterialScorer {
    fn score(&self, board: &Board) -> Score {
        Self::score_for(board, false) - Self::score_for(board, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Column};

    fn col(c: u32) -> Column {
        Column::new(c).unwrap()
    }

    #[test]
    fn empty_board_scores_zero() {
        let board = Board::new();
        assert_eq!(MaterialScorer::new().score(&board), 0);
    }

    #[test]
    fn single_piece_scores_one() {
        let mut board = Board::new();
        board.play(col(3));
        assert_eq!(MaterialScorer::new().score(&board), 1);
    }

    #[test]
    fn open_three_outweighs_a_lone_pair() {
        let open_three =
            Board::from_description(".......,.......,.......,.......,.......,.rrr...").unwrap();
        let lone_pair =
            Board::from_description(".......,.......,.......,.......,.......,.rr.....").unwrap();
        assert!(
            MaterialScorer::new().score(&open_three) > MaterialScorer::new().score(&lone_pair)
        );
    }

    #[test]
    fn scorer_is_antisymmetric_under_swap() {
        let mut board =
            Board::from_description(".......,.......,.......,.......,.......,.rry....").unwrap();
        let before = MaterialScorer::new().score(&board);
        board.swap();
        let after = MaterialScorer::new().score(&board);
        assert_eq!(before, -after);
    }
}
