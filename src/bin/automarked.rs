// Copyright 2017-2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use structopt::StructOpt;

use quartet::board::Board;
use quartet::eval::MaterialScorer;
use quartet::search;

#[derive(Debug, StructOpt)]
struct Options {
    /// Board description to analyze.
    #[structopt(name = "DESCRIPTION")]
    description: String,

    /// Which side is to move: "red" or "yellow".
    #[structopt(name = "PLAYER")]
    player: String,

    /// Depth to search to.
    #[structopt(short, long)]
    depth: u32,

    /// Enable alpha-beta pruning. Off by default, to match the node counts
    /// of a plain minimax search.
    #[structopt(long)]
    prune: bool,
}

fn main() {
    let ops = Options::from_args();

    let mut board = match Board::from_description(&ops.description) {
        Ok(board) => board,
        Err(e) => {
            eprintln!("invalid board description: {e}");
            std::process::exit(1);
        }
    };
    match ops.player.as_str() {
        "yellow" => board.swap(),
        "red" => {}
        other => {
            eprintln!("invalid player {other:?}, expected \"red\" or \"yellow\"");
            std::process::exit(1);
        }
    }

    let scorer = MaterialScorer::new();
    let result = search::fixed_depth(&board, &scorer, ops.depth, ops.prune);

    match result.best_move {
        Some(column) => println!(
            "Best move: column {} (value {})",
            column.get(),
            result.best_score
        ),
        None => println!("No legal move (value {})", result.best_score),
    }
    println!("Nodes examined: {}", result.nodes_examined);
}
