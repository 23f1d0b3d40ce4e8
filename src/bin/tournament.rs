// Copyright 2017-2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use structopt::StructOpt;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use quartet::solver;

/// Centre column, used as a fallback when the search produces no move in
/// time.
const FALLBACK_COLUMN: i32 = 3;

#[derive(Debug, StructOpt)]
struct Options {
    /// Board description to play from.
    #[structopt(name = "DESCRIPTION")]
    description: String,

    /// Which side is to move: "red" or "yellow".
    #[structopt(name = "PLAYER")]
    player: String,
}

fn main() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let ops = Options::from_args();

    let yellow = match ops.player.as_str() {
        "yellow" => true,
        "red" => false,
        other => {
            eprintln!("invalid player {other:?}, expected \"red\" or \"yellow\"");
            std::process::exit(1);
        }
    };

    let column = match solver::compute_move(&ops.description, yellow) {
        Ok(-1) => FALLBACK_COLUMN,
        Ok(column) => column,
        Err(e) => {
            eprintln!("invalid argument: {e}");
            std::process::exit(1);
        }
    };

    println!("{column}");
}
