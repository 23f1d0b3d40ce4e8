// Copyright 2017-2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The bitboard representation at the heart of the engine.
//!
//! A `Board` packs the occupied cells of both players into a pair of `u64`
//! words and keeps a pair of incrementally-maintained Zobrist hashes in sync
//! with them. Every board-wide query - win detection, connection counting,
//! threat enumeration - reduces to a handful of shifts, masks, and
//! `count_ones()` calls on those two words; this is the performance substrate
//! that every layer above it is built on.
//!
//! # Bit layout
//!
//! Each column occupies `W + 1 = 8` consecutive bit positions ("a lane"), with
//! the least-significant bit of every lane permanently zero (the "gutter").
//! Lanes run from the top row down to the bottom row as bit position
//! decreases. Cell `(column, row)` (row 0 at the bottom) maps to bit index
//! `(H - row) * (W + 1) - column - 1`. The gutter keeps horizontal and
//! diagonal shifts from ever matching across a row boundary.

use std::fmt;

use thiserror::Error;

use crate::zobrist;

/// Board width: number of columns.
pub const NUM_COLUMNS: u32 = 7;
/// Board height: number of rows.
pub const NUM_ROWS: u32 = 6;
/// Bits per column lane, including the permanently-zero gutter bit.
pub(crate) const LANE_WIDTH: u32 = NUM_COLUMNS + 1;

/// Shift amounts for the four connection directions: horizontal, vertical,
/// diagonal going up-right, diagonal going up-left.
const DIRECTIONS: [u32; 4] = [1, LANE_WIDTH, LANE_WIDTH + 1, NUM_COLUMNS];

const CURRENT_CHAR: char = 'r';
const OTHER_CHAR: char = 'y';
const EMPTY_CHAR: char = '.';
const ROW_SEPARATOR: char = ',';

/// Length of a valid board description: `(W + 1) * H - 1` characters (rows of
/// `W` cells each, separated by `,`).
pub const DESCRIPTION_LEN: usize = (LANE_WIDTH * NUM_ROWS - 1) as usize;

/// A column index, contract-checked at the boundary where untrusted input
/// enters the engine (CLI arguments, REPL commands, board descriptions).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Column(u32);

impl Column {
    /// Validates `value` as a column in `[0, NUM_COLUMNS)`.
    pub fn new(value: u32) -> Option<Column> {
        if value < NUM_COLUMNS {
            Some(Column(value))
        } else {
            None
        }
    }

    pub(crate) fn new_unchecked(value: u32) -> Column {
        debug_assert!(value < NUM_COLUMNS);
        Column(value)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A row index, row 0 at the bottom of the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Row(u32);

impl Row {
    /// Validates `value` as a row in `[0, NUM_ROWS)`.
    pub fn new(value: u32) -> Option<Row> {
        if value < NUM_ROWS {
            Some(Row(value))
        } else {
            None
        }
    }

    pub(crate) fn new_unchecked(value: u32) -> Row {
        debug_assert!(value < NUM_ROWS);
        Row(value)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two players a cell can be occupied by, always expressed relative to
/// the side to move: `Current` is the player whose turn it is, `Other` is
/// their opponent. Re-centring the board on `Current` via [`Board::swap`]
/// rather than tracking a side-to-move flag is the load-bearing design choice
/// of this whole module; see [`Board::swap`] for why that makes every other
/// query one-sided.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(usize)]
pub enum Color {
    Current = 0,
    Other = 1,
}

/// Failure modes for parsing a board out of its textual description.
/// Out-of-range column/row arguments to the mutating primitives below are
/// programmer errors (contract violations, checked with `debug_assert!`), not
/// represented here - they are not a recoverable condition for a caller that
/// already holds a `Column`/`Row`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("board description has {actual} characters, expected {expected}")]
    WrongLength { actual: usize, expected: usize },
    #[error("board description has {actual} rows, expected {expected}")]
    WrongRowCount { actual: usize, expected: usize },
    #[error("row {row} of the board description has the wrong length")]
    WrongRowLength { row: usize },
    #[error("invalid character {0:?} in board description")]
    InvalidChar(char),
}

/// Counts of runs of the current player's pieces, by length.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Connections {
    pub exactly_two: u32,
    pub exactly_three: u32,
    pub at_least_four: u32,
}

/// Threat counts for both players, indexed by [`Color`] (`Current` = 0,
/// `Other` = 1).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ThreatInfo {
    /// Threats still live after cross-filtering: a threat is removed if the
    /// opponent has a threat directly beneath it (the opponent would win
    /// first on that column).
    pub all_threats: [u32; 2],
    /// Threats among `all_threats` that are playable right now (the cell
    /// directly below is occupied, or the threat sits on the bottom row).
    pub grounded_threats: [u32; 2],
    /// Threats among `all_threats` stacked directly above another threat of
    /// the same player - the opponent cannot block both.
    pub double_threats: [u32; 2],
}

/// A 7x6 Connect Four position, stored from the current player's viewpoint.
///
/// `current` and `other` never share a set bit. `hash_current`/`hash_other`
/// are always the XOR of the Zobrist words for the occupied cells under their
/// respective colour assignment - see [`Board::swap`] for how that invariant
/// makes viewpoint changes free.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Board {
    current: u64,
    other: u64,
    hash_current: u64,
    hash_other: u64,
}

impl Default for Board {
    fn default() -> Board {
        Board::new()
    }
}

impl Board {
    /// An empty board.
    pub fn new() -> Board {
        Board {
            current: 0,
            other: 0,
            hash_current: 0,
            hash_other: 0,
        }
    }

    /// Parses a board out of its textual description (see module docs on
    /// [`crate::board`] and the `DESCRIPTION_LEN` constant for the format).
    pub fn from_description(description: &str) -> Result<Board, BoardError> {
        let mut board = Board::new();
        board.set_from_description(description)?;
        Ok(board)
    }

    fn bit_index(column: Column, row: Row) -> u32 {
        (NUM_ROWS - row.get()) * LANE_WIDTH - column.get() - 1
    }

    /// Inverse of [`Board::bit_index`]: returns `None` for gutter bits or bits
    /// above the top row.
    fn column_row_from_bit(bit: u32) -> Option<(Column, Row)> {
        let lane_index = bit / LANE_WIDTH;
        if lane_index >= NUM_ROWS {
            return None;
        }
        let offset = bit % LANE_WIDTH;
        if offset == 0 {
            return None; // the gutter bit
        }
        let column = NUM_COLUMNS - offset;
        let row = NUM_ROWS - 1 - lane_index;
        Some((Column::new_unchecked(column), Row::new_unchecked(row)))
    }

    /// Every valid cell bit, excluding the gutter bits between rows.
    fn full_mask() -> u64 {
        let col_mask = (1u64 << NUM_COLUMNS) - 1;
        let mut mask = 0u64;
        for row in 0..NUM_ROWS {
            let lane_base = (NUM_ROWS - row) * LANE_WIDTH;
            mask |= col_mask << (lane_base - NUM_COLUMNS);
        }
        mask
    }

    fn bottom_row_mask() -> u64 {
        let col_mask = (1u64 << NUM_COLUMNS) - 1;
        let lane_base = NUM_ROWS * LANE_WIDTH;
        col_mask << (lane_base - NUM_COLUMNS)
    }

    fn recompute_hashes(&mut self) {
        let mut hash_current = 0u64;
        let mut hash_other = 0u64;
        for bit in 0..64u32 {
            let mask = 1u64 << bit;
            let (column, row) = match Self::column_row_from_bit(bit) {
                Some(cr) => cr,
                None => continue,
            };
            if self.current & mask != 0 {
                hash_current ^= zobrist::cell_key(Color::Current, column, row);
                hash_other ^= zobrist::cell_key(Color::Other, column, row);
            } else if self.other & mask != 0 {
                hash_current ^= zobrist::cell_key(Color::Other, column, row);
                hash_other ^= zobrist::cell_key(Color::Current, column, row);
            }
        }
        self.hash_current = hash_current;
        self.hash_other = hash_other;
    }

    /// Builds a board directly from raw occupancy bits, recomputing both
    /// Zobrist hashes from scratch. Used where a caller needs to construct a
    /// board out of a derived bitmask (e.g. the cells making up a winning
    /// run) rather than by replaying moves.
    pub(crate) fn from_raw(current: u64, other: u64) -> Board {
        let mut board = Board {
            current,
            other,
            hash_current: 0,
            hash_other: 0,
        };
        board.recompute_hashes();
        board
    }

    /// Clears both bitsets and both hashes.
    pub fn clear(&mut self) {
        self.current = 0;
        self.other = 0;
        self.hash_current = 0;
        self.hash_other = 0;
    }

    /// Exchanges `current` with `other` (and their hashes). Models "the other
    /// player is now to move." Because every query below (`is_win`, scoring,
    /// threats) only ever looks at `current`, this one swap is the entire
    /// mechanism by which the engine evaluates a position from either side's
    /// perspective - there is no separate side-to-move flag to thread through
    /// search.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.other);
        std::mem::swap(&mut self.hash_current, &mut self.hash_other);
    }

    /// Unconditional write at `(column, row)` on behalf of the current
    /// player: sets the current bit to `occupied` and always clears the
    /// other player's bit there, updating both hashes to match.
    pub fn set_space(&mut self, column: Column, row: Row, occupied: bool) {
        let bit = Self::bit_index(column, row);
        let mask = 1u64 << bit;

        if occupied {
            if self.current & mask == 0 {
                self.current |= mask;
                self.hash_current ^= zobrist::cell_key(Color::Current, column, row);
                self.hash_other ^= zobrist::cell_key(Color::Other, column, row);
            }
        } else if self.current & mask != 0 {
            self.current &= !mask;
            self.hash_current ^= zobrist::cell_key(Color::Current, column, row);
            self.hash_other ^= zobrist::cell_key(Color::Other, column, row);
        }

        if self.other & mask != 0 {
            self.other &= !mask;
            self.hash_current ^= zobrist::cell_key(Color::Other, column, row);
            self.hash_other ^= zobrist::cell_key(Color::Current, column, row);
        }
    }

    /// Parses `description` into this board, replacing its prior contents.
    /// Leaves the board unchanged on error.
    pub fn set_from_description(&mut self, description: &str) -> Result<(), BoardError> {
        let total_len = description.chars().count();
        if total_len != DESCRIPTION_LEN {
            return Err(BoardError::WrongLength {
                actual: total_len,
                expected: DESCRIPTION_LEN,
            });
        }

        let rows: Vec<&str> = description.split(ROW_SEPARATOR).collect();
        if rows.len() != NUM_ROWS as usize {
            return Err(BoardError::WrongRowCount {
                actual: rows.len(),
                expected: NUM_ROWS as usize,
            });
        }

        let mut new_current = 0u64;
        let mut new_other = 0u64;
        for (row_from_top, row_str) in rows.iter().enumerate() {
            if row_str.chars().count() != NUM_COLUMNS as usize {
                return Err(BoardError::WrongRowLength { row: row_from_top });
            }

            let row = Row::new_unchecked(NUM_ROWS - 1 - row_from_top as u32);
            for (col_idx, ch) in row_str.chars().enumerate() {
                let column = Column::new_unchecked(col_idx as u32);
                let bit = 1u64 << Self::bit_index(column, row);
                match ch {
                    CURRENT_CHAR => new_current |= bit,
                    OTHER_CHAR => new_other |= bit,
                    EMPTY_CHAR => {}
                    other => return Err(BoardError::InvalidChar(other)),
                }
            }
        }

        self.current = new_current;
        self.other = new_other;
        self.recompute_hashes();
        Ok(())
    }

    /// True iff `column`'s top cell is empty.
    pub fn can_play(&self, column: Column) -> bool {
        let top_bit = NUM_COLUMNS - column.get();
        (self.current | self.other) & (1u64 << top_bit) == 0
    }

    /// The row a piece dropped into `column` would land on, or `None` if the
    /// column is full.
    pub fn get_free_row(&self, column: Column) -> Option<Row> {
        let occupied = self.current | self.other;
        let mut bit = Self::bit_index(column, Row::new_unchecked(0));
        for row in 0..NUM_ROWS {
            if occupied & (1u64 << bit) == 0 {
                return Some(Row::new_unchecked(row));
            }
            bit -= LANE_WIDTH;
        }
        None
    }

    /// Drops a piece for the current player into the lowest empty row of
    /// `column`. Contract: `can_play(column)` must hold.
    pub fn play(&mut self, column: Column) {
        debug_assert!(self.can_play(column), "play() called on a full column");
        let row = self
            .get_free_row(column)
            .expect("can_play() guarantees a free row");
        let bit = Self::bit_index(column, row);
        self.current |= 1u64 << bit;
        self.hash_current ^= zobrist::cell_key(Color::Current, column, row);
        self.hash_other ^= zobrist::cell_key(Color::Other, column, row);
    }

    /// Number of pieces belonging to the current player.
    pub fn count(&self) -> u32 {
        self.current.count_ones()
    }

    /// Total number of pieces on the board.
    pub fn total_count(&self) -> u32 {
        (self.current | self.other).count_ones()
    }

    /// True iff the current player has four-in-a-row in any direction.
    pub fn is_win(&self) -> bool {
        DIRECTIONS.iter().any(|&shift| {
            let mut b = self.current & (self.current >> shift);
            b &= b >> (2 * shift);
            b != 0
        })
    }

    /// Counts the current player's runs of length exactly 2, exactly 3, and
    /// at least 4, summed over all four directions.
    pub fn count_connections(&self) -> Connections {
        self.count_connections_for(false)
    }

    /// Same as [`Board::count_connections`], but for the `other` player's
    /// pieces when `for_opponent` is true. Lets scorers compare both sides'
    /// connection counts without cloning and swapping the board.
    pub fn count_connections_for(&self, for_opponent: bool) -> Connections {
        let pieces = if for_opponent { self.other } else { self.current };
        let mut connections = Connections::default();
        for &shift in &DIRECTIONS {
            let mut b = pieces;
            let mut counts = [0u32; 4];
            for count in counts.iter_mut() {
                b &= b >> shift;
                *count = b.count_ones();
            }

            let at_least_2 = counts[0] - counts[1];
            let at_least_3 = counts[1] - counts[2];
            let at_least_4 = counts[2] - counts[3];

            connections.exactly_two += at_least_2 - at_least_3;
            connections.exactly_three += at_least_3 - at_least_4;
            connections.at_least_four += at_least_4;
        }
        connections
    }

    /// Empty cells where `for_opponent`'s `other` player (or the current
    /// player, if `!for_opponent`) has a three-in-a-row that this cell would
    /// complete to four. Returns a bitset of matching cells (not yet
    /// cross-filtered against the other player's threats - see
    /// [`Board::get_threat_info`] for that).
    pub fn get_threats(&self, for_opponent: bool) -> u64 {
        let pieces = if for_opponent { self.other } else { self.current };
        let empty = Self::full_mask() & !(self.current | self.other);

        let mut threats = 0u64;
        for &s in &DIRECTIONS {
            // A window of four cells along direction `s`, starting at bit
            // `i`, occupies bits `i, i+s, i+2s, i+3s`. For each of the four
            // possible hole positions, the other three must be filled.
            let hole_at_0 = (pieces >> s) & (pieces >> (2 * s)) & (pieces >> (3 * s));
            threats |= hole_at_0 & empty;

            let hole_at_1 = pieces & (pieces >> (2 * s)) & (pieces >> (3 * s));
            threats |= (hole_at_1 << s) & empty;

            let hole_at_2 = pieces & (pieces >> s) & (pieces >> (3 * s));
            threats |= (hole_at_2 << (2 * s)) & empty;

            let hole_at_3 = pieces & (pieces >> s) & (pieces >> (2 * s));
            threats |= (hole_at_3 << (3 * s)) & empty;
        }
        threats
    }

    /// For each player: threats after cross-filtering (a threat is dropped if
    /// the opponent has a threat directly beneath it, since the opponent
    /// would win first on that column), grounded threats (playable right
    /// now), and double threats (stacked above another threat of the same
    /// player).
    pub fn get_threat_info(&self) -> ThreatInfo {
        let raw_current = self.get_threats(false);
        let raw_other = self.get_threats(true);

        // A threat at bit i is shadowed by an opponent threat directly below
        // it (bit i + LANE_WIDTH) iff (opponent_threats >> LANE_WIDTH) has
        // bit i set.
        let current_threats = raw_current & !(raw_other >> LANE_WIDTH);
        let other_threats = raw_other & !(raw_current >> LANE_WIDTH);

        let occupied = self.current | self.other;
        let grounded_mask = (occupied >> LANE_WIDTH) | Self::bottom_row_mask();

        let current_grounded = current_threats & grounded_mask;
        let other_grounded = other_threats & grounded_mask;

        let current_double = current_threats & (current_threats >> LANE_WIDTH);
        let other_double = other_threats & (other_threats >> LANE_WIDTH);

        ThreatInfo {
            all_threats: [current_threats.count_ones(), other_threats.count_ones()],
            grounded_threats: [current_grounded.count_ones(), other_grounded.count_ones()],
            double_threats: [current_double.count_ones(), other_double.count_ones()],
        }
    }

    /// The bitmask of cells taking part in a completed four-(or-more)-in-a-row
    /// for `current` (or `other`, if `for_opponent`). Empty if that player
    /// has not won. Generalizes the shift-and-AND trick behind [`Board::is_win`]
    /// by also shifting the surviving mask back out to mark every cell in
    /// each winning run, not just detect that one exists.
    pub fn winning_cells(&self, for_opponent: bool) -> u64 {
        let pieces = if for_opponent { self.other } else { self.current };
        let mut cells = 0u64;
        for &shift in &DIRECTIONS {
            let starts = pieces
                & (pieces >> shift)
                & (pieces >> (2 * shift))
                & (pieces >> (3 * shift));
            cells |= starts | (starts << shift) | (starts << (2 * shift)) | (starts << (3 * shift));
        }
        cells
    }

    /// The current player's Zobrist fingerprint.
    pub fn get_hash(&self) -> u64 {
        self.hash_current
    }

    /// Renders the whole board, or a single `row` if given, to text. With
    /// `show_threats`, empty cells are decorated with `!` where the opponent
    /// (relative to `current`) has a threat, `.` otherwise.
    pub fn get_description(&self, row: Option<Row>, show_threats: bool) -> String {
        let threats = if show_threats {
            Some(self.get_threats(true))
        } else {
            None
        };

        let rows: Vec<Row> = match row {
            Some(r) => vec![r],
            None => (0..NUM_ROWS).rev().map(Row::new_unchecked).collect(),
        };

        let mut out = String::with_capacity(DESCRIPTION_LEN);
        for (i, &r) in rows.iter().enumerate() {
            if i > 0 {
                out.push(ROW_SEPARATOR);
            }
            for c in 0..NUM_COLUMNS {
                let column = Column::new_unchecked(c);
                let bit = 1u64 << Self::bit_index(column, r);
                if self.current & bit != 0 {
                    out.push(CURRENT_CHAR);
                } else if self.other & bit != 0 {
                    out.push(OTHER_CHAR);
                } else if threats.map(|t| t & bit != 0).unwrap_or(false) {
                    out.push('!');
                } else {
                    out.push(EMPTY_CHAR);
                }
            }
        }
        out
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get_description(None, false))
    }
}
