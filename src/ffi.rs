// Copyright 2017-2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A thin `extern "C"` adapter over [`crate::solver`], grounded on the
//! teacher's `debug.rs` pattern for handing C callers a `CString`'s pointer
//! (`Box::leak(body.into_boxed_c_str())`). Every function here takes and
//! returns primitives or C strings only; all real logic lives in `solver`.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::solver;

/// Reads a board description out of a C string. Returns `None` if `board` is
/// null or not valid UTF-8 - callers treat that the same as a parse failure.
unsafe fn read_board(board: *const c_char) -> Option<String> {
    if board.is_null() {
        return None;
    }
    CStr::from_ptr(board).to_str().ok().map(str::to_owned)
}

/// See [`solver::compute_move`]. Returns `-1` on a null pointer, invalid
/// UTF-8, or a malformed board description, indistinguishable here from "no
/// move found in time" - callers that need to tell those apart should use
/// the safe `solver` API directly.
#[no_mangle]
pub extern "C" fn c4_compute_move(board: *const c_char, yellow: bool) -> i32 {
    let description = match unsafe { read_board(board) } {
        Some(d) => d,
        None => return -1,
    };
    solver::compute_move(&description, yellow).unwrap_or(-1)
}

/// See [`solver::row_for_move`]. Returns `-1` on a null pointer, invalid
/// UTF-8, or a malformed board description.
#[no_mangle]
pub extern "C" fn c4_row_for_move(board: *const c_char, column: i32) -> i32 {
    let description = match unsafe { read_board(board) } {
        Some(d) => d,
        None => return -1,
    };
    if column < 0 {
        return -1;
    }
    solver::row_for_move(&description, column as usize).unwrap_or(-1)
}

/// See [`solver::winning_pieces`]. Returns null on a null pointer, invalid
/// UTF-8, a malformed board description, or no win for that side. The
/// returned pointer is intentionally leaked, matching `debug.rs`'s
/// `pos_fen`/`move_str` - callers own it and must free it through whatever
/// mechanism their side of the boundary uses.
#[no_mangle]
pub extern "C" fn c4_winning_pieces(board: *const c_char, yellow: bool) -> *const c_char {
    let description = match unsafe { read_board(board) } {
        Some(d) => d,
        None => return ptr::null(),
    };

    match solver::winning_pieces(&description, yellow) {
        Ok(Some(winners)) => {
            let body = CString::new(winners).unwrap();
            Box::leak(body.into_boxed_c_str()).as_ptr()
        }
        _ => ptr::null(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn as_c_char(s: &str) -> CString {
        CString::new(s).unwrap()
    }

    #[test]
    fn compute_move_rejects_null() {
        assert_eq!(c4_compute_move(ptr::null(), false), -1);
    }

    #[test]
    fn compute_move_finds_the_winning_column() {
        let board = as_c_char(".......,.......,.......,.......,.......,.rrr...");
        let mv = c4_compute_move(board.as_ptr(), false);
        assert!(mv == 0 || mv == 4);
    }

    #[test]
    fn row_for_move_rejects_negative_column() {
        let board = as_c_char(".......,.......,.......,.......,.......,.......");
        assert_eq!(c4_row_for_move(board.as_ptr(), -1), -1);
    }

    #[test]
    fn winning_pieces_null_when_nobody_has_won() {
        let board = as_c_char(".......,.......,.......,.......,.......,.......");
        assert!(c4_winning_pieces(board.as_ptr(), false).is_null());
    }

    #[test]
    fn winning_pieces_returns_a_board_description_on_a_win() {
        let board = as_c_char(".......,.......,.......,.......,.......,.rrrr..");
        let result = c4_winning_pieces(board.as_ptr(), false);
        assert!(!result.is_null());
        let text = unsafe { CStr::from_ptr(result) }.to_str().unwrap();
        assert_eq!(text, ".......,.......,.......,.......,.......,.rrrr..");
    }
}
